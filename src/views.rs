//! Server-rendered pages.

use chrono::NaiveDateTime;
use maud::{html, Markup, DOCTYPE};

use crate::forms::{FormErrors, RecipeForm, RegisterForm, SCORE_RANGE};
use crate::session::{login_url, Flash};
use crate::types::{CommentView, GradeSummary, RecipeView, User};

const EXCERPT_CHARS: usize = 120;

/// What every page shows around its content.
pub struct Chrome<'a> {
	pub user: Option<&'a User>,
	pub flashes: Vec<Flash>,
}

impl<'a> Chrome<'a> {
	pub fn new(user: Option<&'a User>, flashes: Vec<Flash>) -> Self {
		Chrome { user, flashes }
	}

	fn is_owner(&self, recipe: &RecipeView) -> bool {
		self.user.is_some_and(|u| u.id == recipe.recipe.user_id)
	}
}

pub fn format_date(date: &NaiveDateTime) -> String {
	date.format("%Y-%m-%d %H:%M").to_string()
}

/// Splits stored content into paragraphs, accepting both `<p>`-wrapped text
/// and blank-line separated text. Paragraph text is always escaped on output.
pub fn paragraphs(content: &str) -> Vec<String> {
	content.replace("\r\n", "\n")
		.replace("</p>", "\n\n")
		.replace("<p>", "\n\n")
		.split("\n\n")
		.map(str::trim)
		.filter(|p| !p.is_empty())
		.map(str::to_string)
		.collect()
}

pub fn excerpt(content: &str) -> String {
	let first = paragraphs(content).into_iter().next().unwrap_or_default();
	if first.chars().count() <= EXCERPT_CHARS {
		first
	} else {
		let cut: String = first.chars().take(EXCERPT_CHARS).collect();
		format!("{}…", cut.trim_end())
	}
}

fn field_errors(errors: &FormErrors, field: &str) -> Markup {
	html! {
		@for message in errors.get(field) {
			span class="field-error" { (message) }
		}
	}
}

pub fn layout(chrome: &Chrome, title: &str, content: Markup) -> Markup {
	html! {
		(DOCTYPE)
		html lang="en" {
			head {
				meta charset="utf-8";
				meta name="viewport" content="width=device-width, initial-scale=1";
				title { (title) " | Recipe Book" }
				link rel="stylesheet" href="/static/style.css";
			}
			body {
				nav {
					a href="/" { "Home" }
					a href="/about" { "About" }
					@if let Some(user) = chrome.user {
						a href="/recipe/new" { "New recipe" }
						a href="/profile" { "Profile (" (user.name) ")" }
						a href="/logout" { "Logout" }
					} @else {
						a href="/login" { "Login" }
						a href="/register" { "Register" }
					}
				}
				main {
					@for flash in &chrome.flashes {
						div class={ "flash flash-" (flash.category.as_str()) } role="alert" { (flash.message) }
					}
					(content)
				}
			}
		}
	}
}

pub fn home(chrome: &Chrome, recipes: &[RecipeView], search: Option<&str>) -> Markup {
	layout(chrome, "Home", html! {
		section class="search" {
			h2 { "Search for recipes" }
			form method="GET" action="/" {
				input name="title" type="search" placeholder="Recipe title" value=(search.unwrap_or(""));
				button type="submit" { "Search" }
			}
		}
		h1 { "List of recipes" }
		@if recipes.is_empty() {
			p class="empty" { "No recipes found." }
		}
		table class="recipes" {
			thead { tr {
				th { "Title" }
				th { "Date" }
				th { "User" }
				th { "Content" }
			} }
			tbody {
				@for view in recipes {
					tr {
						td { a href={ "/recipe/" (view.recipe.id) } { (view.recipe.title) } }
						td { (format_date(&view.recipe.date_posted)) }
						td { (view.author) }
						td { (excerpt(&view.recipe.content)) }
					}
				}
			}
		}
	})
}

pub fn about(chrome: &Chrome) -> Markup {
	layout(chrome, "About", html! {
		h1 { "About" }
		p {
			"Recipe Book is a place to share recipes. Register, post the dishes you "
			"love, and comment on and grade what others cook."
		}
	})
}

fn grade_line(grades: &GradeSummary) -> Markup {
	html! {
		@match grades.average {
			Some(average) => {
				p class="grades" {
					"Average grade: " (format!("{average:.1}")) " / " (SCORE_RANGE.end())
					" (" (grades.count) @if grades.count == 1 { " grade" } @else { " grades" } ")"
				}
			}
			None => {
				p class="grades" { "No grades yet." }
			}
		}
	}
}

pub fn recipe_detail(chrome: &Chrome, view: &RecipeView, comments: &[CommentView], grades: &GradeSummary) -> Markup {
	let recipe = &view.recipe;
	layout(chrome, &recipe.title, html! {
		article class="recipe" {
			h1 { (recipe.title) }
			p class="meta" { "Posted by " (view.author) " on " (format_date(&recipe.date_posted)) }
			(grade_line(grades))
			@for paragraph in paragraphs(&recipe.content) {
				p { (paragraph) }
			}
		}
		@if chrome.is_owner(view) {
			details class="owner" {
				summary { "Delete recipe" }
				p { "Are you sure you want to delete this recipe with title '" (recipe.title) "'? Its comments and grades go with it." }
				form method="POST" action={ "/recipe/" (recipe.id) "/delete" } {
					button class="danger" type="submit" { "Delete" }
				}
			}
		}
		section class="comments" {
			h2 { "Comments" }
			@if comments.is_empty() {
				p class="empty" { "No comments yet." }
			}
			@for view in comments {
				div class="comment" {
					p class="meta" { (view.author) " · " (format_date(&view.comment.date_posted)) }
					@for paragraph in paragraphs(&view.comment.content) {
						p { (paragraph) }
					}
				}
			}
		}
		@if chrome.user.is_some() {
			section class="feedback" {
				form method="POST" action={ "/recipe/" (recipe.id) "/grade" } {
					label for="score" { "Your grade" }
					select id="score" name="score" {
						@for score in SCORE_RANGE {
							option value=(score) { (score) }
						}
					}
					button type="submit" { "Grade" }
				}
				form method="POST" action={ "/recipe/" (recipe.id) "/comment" } {
					label for="content" { "Comment" }
					textarea id="content" name="content" rows="4" required {}
					button type="submit" { "Comment" }
				}
			}
		} @else {
			p { a href=(login_url(Some(&format!("/recipe/{}", recipe.id)))) { "Log in" } " to comment or grade this recipe." }
		}
	})
}

pub fn register(chrome: &Chrome, form: &RegisterForm, errors: &FormErrors) -> Markup {
	layout(chrome, "Register", html! {
		h1 { "Register" }
		form method="POST" action="/register" {
			label for="name" { "Name" }
			input id="name" name="name" type="text" value=(form.name) required;
			(field_errors(errors, "name"))
			label for="email" { "Email" }
			input id="email" name="email" type="email" value=(form.email) required;
			(field_errors(errors, "email"))
			label for="password" { "Password" }
			input id="password" name="password" type="password" required;
			(field_errors(errors, "password"))
			label for="confirm_password" { "Confirm password" }
			input id="confirm_password" name="confirm_password" type="password" required;
			(field_errors(errors, "confirm_password"))
			button type="submit" { "Sign up" }
		}
		p { "Already have an account? " a href="/login" { "Log in" } }
	})
}

pub fn login(chrome: &Chrome, email: &str, errors: &FormErrors, next: Option<&str>) -> Markup {
	layout(chrome, "Login", html! {
		h1 { "Login" }
		form method="POST" action=(login_url(next)) {
			label for="email" { "Email" }
			input id="email" name="email" type="email" value=(email) required;
			(field_errors(errors, "email"))
			label for="password" { "Password" }
			input id="password" name="password" type="password" required;
			(field_errors(errors, "password"))
			label class="checkbox" {
				input name="remember" type="checkbox" value="y";
				" Remember me"
			}
			button type="submit" { "Login" }
		}
		p { "Need an account? " a href="/register" { "Sign up now" } }
	})
}

pub fn profile(chrome: &Chrome, user: &User, recipes: &[RecipeView]) -> Markup {
	layout(chrome, "Profile", html! {
		h1 { "Profile" }
		dl {
			dt { "Name" } dd { (user.name) }
			dt { "Email" } dd { (user.email) }
		}
		p { a href="/update_profile" { "Update profile" } }
		h2 { "Your recipes" }
		@if recipes.is_empty() {
			p class="empty" { "You have not posted any recipes yet. " a href="/recipe/new" { "Post one!" } }
		} @else {
			ul {
				@for view in recipes {
					li {
						a href={ "/recipe/" (view.recipe.id) } { (view.recipe.title) }
						" · " (format_date(&view.recipe.date_posted))
					}
				}
			}
		}
	})
}

pub fn update_profile(chrome: &Chrome, name: &str, profile_errors: &FormErrors, password_errors: &FormErrors) -> Markup {
	layout(chrome, "Update profile", html! {
		h1 { "Update profile" }
		form method="POST" action="/update_profile" {
			fieldset {
				legend { "Name" }
				label for="name" { "Name" }
				input id="name" name="name" type="text" value=(name) required;
				(field_errors(profile_errors, "name"))
				button type="submit" { "Update name" }
			}
		}
		form method="POST" action="/update_profile" {
			fieldset {
				legend { "Password" }
				label for="current_password" { "Current password" }
				input id="current_password" name="current_password" type="password" required;
				(field_errors(password_errors, "current_password"))
				label for="new_password" { "New password" }
				input id="new_password" name="new_password" type="password" required;
				(field_errors(password_errors, "new_password"))
				label for="confirm_password" { "Confirm new password" }
				input id="confirm_password" name="confirm_password" type="password" required;
				(field_errors(password_errors, "confirm_password"))
				button type="submit" { "Change password" }
			}
		}
	})
}

pub fn new_recipe(chrome: &Chrome, form: &RecipeForm, errors: &FormErrors) -> Markup {
	layout(chrome, "New recipe", html! {
		h1 { "New recipe" }
		form method="POST" action="/recipe/new" {
			label for="title" { "Title" }
			input id="title" name="title" type="text" value=(form.title) required;
			(field_errors(errors, "title"))
			label for="content" { "Content" }
			textarea id="content" name="content" rows="12" required { (form.content) }
			(field_errors(errors, "content"))
			button type="submit" { "Post" }
		}
	})
}

fn bare(title: &str, content: Markup) -> Markup {
	layout(&Chrome::new(None, Vec::new()), title, content)
}

pub fn not_found() -> Markup {
	bare("Not found", html! {
		h1 { "Page not found" }
		p { "The page you are looking for does not exist. " a href="/" { "Back to the recipes." } }
	})
}

pub fn server_error() -> Markup {
	bare("Error", html! {
		h1 { "Something went wrong" }
		p { "Please try again later." }
	})
}
