use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Redirect, Response},
	routing::{get, post},
	Form, Router,
};
use maud::Markup;
use tower_cookies::{CookieManagerLayer, Cookies};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::forms::{
	CommentForm, FormErrors, GradeForm, LoginForm, NextQuery, RecipeForm, RegisterForm,
	SearchQuery, UpdateProfileForm,
};
use crate::session::{self, flash, take_flashes, Category, CurrentUser, MaybeUser};
use crate::types::{now, NewComment, NewGrade, NewRecipe, NewUser, Rid};
use crate::views::{self, Chrome};
use crate::{password, queries, SharedState};

pub fn router(state: SharedState) -> Router {
	let static_dir = state.config.server.static_dir.clone();

	Router::new()
		.route("/", get(display_home))
		.route("/about", get(display_about))
		.route("/recipe/new", get(display_new_recipe).post(perform_new_recipe))
		.route("/recipe/:id", get(display_recipe))
		.route("/recipe/:id/comment", post(perform_comment))
		.route("/recipe/:id/grade", post(perform_grade))
		.route("/recipe/:id/delete", post(perform_delete_recipe))
		.route("/register", get(display_register).post(perform_register))
		.route("/login", get(display_login).post(perform_login))
		.route("/logout", get(perform_logout))
		.route("/profile", get(display_profile))
		.route("/update_profile", get(display_update_profile).post(perform_update_profile))
		.nest_service("/static", ServeDir::new(static_dir))
		.fallback(display_not_found)
		.layer(CookieManagerLayer::new())
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

fn recipe_id(raw: &str) -> AppResult<Rid> {
	raw.parse().map_err(|_| AppError::NotFound(format!("recipe {raw:?}")))
}

fn to_recipe(id: Rid) -> Response {
	Redirect::to(&format!("/recipe/{id}")).into_response()
}

async fn display_not_found() -> impl IntoResponse {
	(StatusCode::NOT_FOUND, views::not_found())
}

async fn display_home(
	State(state): State<SharedState>,
	MaybeUser(user): MaybeUser,
	cookies: Cookies,
	Query(search): Query<SearchQuery>,
) -> AppResult<Markup> {
	let filter = search.filter();
	if let Some(title) = filter {
		flash(&cookies, Category::Warning, format!("search the recipe by'{title}'."));
	}
	let recipes = queries::list_recipes(&state.db, filter).await?;
	debug!(found = recipes.len(), ?filter, "listing recipes");

	let chrome = Chrome::new(user.as_ref(), take_flashes(&cookies));
	Ok(views::home(&chrome, &recipes, filter))
}

async fn display_about(MaybeUser(user): MaybeUser, cookies: Cookies) -> Markup {
	views::about(&Chrome::new(user.as_ref(), take_flashes(&cookies)))
}

async fn display_recipe(
	State(state): State<SharedState>,
	MaybeUser(user): MaybeUser,
	cookies: Cookies,
	Path(id): Path<String>,
) -> AppResult<Markup> {
	let id = recipe_id(&id)?;
	let view = queries::find_recipe(&state.db, id).await?
		.ok_or_else(|| AppError::NotFound(format!("recipe {id}")))?;
	let comments = queries::comments_for_recipe(&state.db, id).await?;
	let grades = queries::grade_summary(&state.db, id).await?;

	let chrome = Chrome::new(user.as_ref(), take_flashes(&cookies));
	Ok(views::recipe_detail(&chrome, &view, &comments, &grades))
}

async fn display_new_recipe(CurrentUser(user): CurrentUser, cookies: Cookies) -> Markup {
	let chrome = Chrome::new(Some(&user), take_flashes(&cookies));
	views::new_recipe(&chrome, &RecipeForm::default(), &FormErrors::default())
}

async fn perform_new_recipe(
	State(state): State<SharedState>,
	CurrentUser(user): CurrentUser,
	cookies: Cookies,
	Form(form): Form<RecipeForm>,
) -> AppResult<Response> {
	let form = form.normalize();
	let errors = form.validate();
	if errors.is_empty() {
		let new = NewRecipe {
			title: form.title.clone(),
			content: form.content.clone(),
			user_id: user.id,
			date_posted: None,
		};
		match queries::create_recipe(&state.db, &new).await {
			Ok(id) => {
				info!(recipe_id = id, user_id = user.id, "recipe posted");
				flash(&cookies, Category::Success, "Recipe posted successfully!");
				return Ok(to_recipe(id));
			}
			Err(e) => {
				error!(error = ?e, user_id = user.id, "failed to post recipe");
				flash(&cookies, Category::Danger, "There was an error while posting your recipe. Please try again later.");
			}
		}
	}

	let chrome = Chrome::new(Some(&user), take_flashes(&cookies));
	Ok(views::new_recipe(&chrome, &form, &errors).into_response())
}

async fn perform_comment(
	State(state): State<SharedState>,
	CurrentUser(user): CurrentUser,
	cookies: Cookies,
	Path(id): Path<String>,
	Form(form): Form<CommentForm>,
) -> AppResult<Response> {
	let id = recipe_id(&id)?;
	if queries::find_recipe(&state.db, id).await?.is_none() {
		return Err(AppError::NotFound(format!("recipe {id}")));
	}

	let errors = form.validate();
	if !errors.is_empty() {
		for message in errors.messages() {
			flash(&cookies, Category::Danger, message);
		}
		return Ok(to_recipe(id));
	}

	let new = NewComment {
		content: form.content.trim().to_string(),
		date_posted: now(),
		user_id: user.id,
		recipe_id: id,
	};
	match queries::create_comment(&state.db, &new).await {
		Ok(comment_id) => {
			info!(comment_id, recipe_id = id, user_id = user.id, "comment added");
			flash(&cookies, Category::Success, "Comment added!");
		}
		Err(e) => {
			error!(error = ?e, recipe_id = id, "failed to add comment");
			flash(&cookies, Category::Danger, "There was an error while adding your comment. Please try again later.");
		}
	}
	Ok(to_recipe(id))
}

async fn perform_grade(
	State(state): State<SharedState>,
	CurrentUser(user): CurrentUser,
	cookies: Cookies,
	Path(id): Path<String>,
	Form(form): Form<GradeForm>,
) -> AppResult<Response> {
	let id = recipe_id(&id)?;
	if queries::find_recipe(&state.db, id).await?.is_none() {
		return Err(AppError::NotFound(format!("recipe {id}")));
	}

	let score = match form.score() {
		Ok(score) => score,
		Err(errors) => {
			for message in errors.messages() {
				flash(&cookies, Category::Danger, message);
			}
			return Ok(to_recipe(id));
		}
	};

	match queries::create_grade(&state.db, &NewGrade { score, user_id: user.id, recipe_id: id }).await {
		Ok(_) => {
			info!(recipe_id = id, user_id = user.id, score, "recipe graded");
			flash(&cookies, Category::Success, "Thanks for grading!");
		}
		Err(e) => {
			error!(error = ?e, recipe_id = id, "failed to grade recipe");
			flash(&cookies, Category::Danger, "There was an error while grading. Please try again later.");
		}
	}
	Ok(to_recipe(id))
}

async fn perform_delete_recipe(
	State(state): State<SharedState>,
	CurrentUser(user): CurrentUser,
	cookies: Cookies,
	Path(id): Path<String>,
) -> AppResult<Response> {
	let home = Redirect::to("/").into_response();
	let view = match recipe_id(&id) {
		Ok(id) => queries::find_recipe(&state.db, id).await?,
		Err(_) => None,
	};
	let Some(view) = view else {
		flash(&cookies, Category::Danger, "This recipe does not exist!");
		return Ok(home);
	};
	if view.recipe.user_id != user.id {
		warn!(recipe_id = view.recipe.id, user_id = user.id, "delete attempt by non-owner");
		flash(&cookies, Category::Danger, "This recipe does not belong to you!");
		return Ok(home);
	}

	match queries::delete_recipe(&state.db, view.recipe.id).await {
		Ok(()) => {
			info!(recipe_id = view.recipe.id, user_id = user.id, "recipe deleted");
			flash(&cookies, Category::Success, "Recipe deleted successfully!");
		}
		Err(e) => {
			error!(error = ?e, recipe_id = view.recipe.id, "failed to delete recipe");
			flash(&cookies, Category::Danger, "Error while deleting recipe!");
		}
	}
	Ok(home)
}

async fn display_register(MaybeUser(user): MaybeUser, cookies: Cookies) -> Response {
	if user.is_some() {
		return Redirect::to("/").into_response();
	}
	let chrome = Chrome::new(None, take_flashes(&cookies));
	views::register(&chrome, &RegisterForm::default(), &FormErrors::default()).into_response()
}

async fn perform_register(
	State(state): State<SharedState>,
	MaybeUser(user): MaybeUser,
	cookies: Cookies,
	Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
	if user.is_some() {
		return Ok(Redirect::to("/").into_response());
	}

	let form = form.normalize();
	let mut errors = form.validate();
	if errors.is_empty() && queries::find_user_by_email(&state.db, &form.email).await?.is_some() {
		errors.push("email", "That email is taken. Please choose a different one.");
	}

	if errors.is_empty() {
		let new = NewUser {
			name: form.name.clone(),
			email: form.email.clone(),
			password_hash: password::hash_password(&form.password)?,
		};
		match queries::create_user(&state.db, &new).await {
			Ok(id) => {
				info!(user_id = id, "user registered");
				flash(&cookies, Category::Success, "User successfully created. Please log in!");
				return Ok(Redirect::to("/login").into_response());
			}
			Err(e) => {
				error!(error = ?e, "failed to create user");
				flash(&cookies, Category::Danger, "There was an error while creating your user. Please try again later.");
			}
		}
	}

	let chrome = Chrome::new(None, take_flashes(&cookies));
	Ok(views::register(&chrome, &form, &errors).into_response())
}

async fn display_login(
	MaybeUser(user): MaybeUser,
	cookies: Cookies,
	Query(next): Query<NextQuery>,
) -> Response {
	if user.is_some() {
		return Redirect::to("/").into_response();
	}
	let chrome = Chrome::new(None, take_flashes(&cookies));
	views::login(&chrome, "", &FormErrors::default(), next.local_next()).into_response()
}

async fn perform_login(
	State(state): State<SharedState>,
	MaybeUser(user): MaybeUser,
	cookies: Cookies,
	Query(next): Query<NextQuery>,
	Form(form): Form<LoginForm>,
) -> AppResult<Response> {
	if user.is_some() {
		return Ok(Redirect::to("/").into_response());
	}

	let form = form.normalize();
	let errors = form.validate();
	if errors.is_empty() {
		let found = queries::find_user_by_email(&state.db, &form.email).await?;
		debug!(email = %form.email, found = found.is_some(), "login attempt");

		if let Some(user) = found {
			if password::verify_password(&form.password, &user.password)? {
				match session::login(&state, &cookies, &user, form.remember()).await {
					Ok(()) => {
						flash(&cookies, Category::Success, "Welcome!");
						return Ok(Redirect::to(next.local_next().unwrap_or("/")).into_response());
					}
					Err(e) => {
						error!(error = ?e, user_id = user.id, "failed to start session");
						flash(&cookies, Category::Danger, "There was an error while logging you in. Please try again later.");
					}
				}
			} else {
				flash(&cookies, Category::Danger, "Login Unsuccessful. Please check email and password.");
			}
		} else {
			flash(&cookies, Category::Danger, "Login Unsuccessful. Please check email and password.");
		}
	}

	let chrome = Chrome::new(None, take_flashes(&cookies));
	Ok(views::login(&chrome, &form.email, &errors, next.local_next()).into_response())
}

async fn perform_logout(State(state): State<SharedState>, cookies: Cookies) -> Response {
	if let Err(e) = session::logout(&state, &cookies).await {
		warn!(error = ?e, "failed to remove session, dropping the cookie only");
		session::forget(&cookies);
	}
	flash(&cookies, Category::Success, "Logout successful!");
	Redirect::to("/login").into_response()
}

async fn display_profile(
	State(state): State<SharedState>,
	CurrentUser(user): CurrentUser,
	cookies: Cookies,
) -> AppResult<Markup> {
	let recipes = queries::recipes_by_user(&state.db, user.id).await?;
	let chrome = Chrome::new(Some(&user), take_flashes(&cookies));
	Ok(views::profile(&chrome, &user, &recipes))
}

async fn display_update_profile(CurrentUser(user): CurrentUser, cookies: Cookies) -> Markup {
	let chrome = Chrome::new(Some(&user), take_flashes(&cookies));
	views::update_profile(&chrome, &user.name, &FormErrors::default(), &FormErrors::default())
}

async fn perform_update_profile(
	State(state): State<SharedState>,
	CurrentUser(user): CurrentUser,
	cookies: Cookies,
	Form(form): Form<UpdateProfileForm>,
) -> AppResult<Response> {
	let mut profile_errors = FormErrors::default();
	let mut password_errors = FormErrors::default();
	let mut shown_name = user.name.clone();

	if let Some(change) = form.profile() {
		profile_errors = change.validate();
		if !profile_errors.is_empty() {
			shown_name = change.name.clone();
		}
		if profile_errors.is_empty() {
			info!(user_id = user.id, "profile form submitted");
			match queries::update_user_name(&state.db, user.id, &change.name).await {
				Ok(()) => {
					info!(user_id = user.id, "profile updated");
					flash(&cookies, Category::Success, "Profile updated successfully!");
					return Ok(Redirect::to("/profile").into_response());
				}
				Err(e) => {
					error!(error = ?e, user_id = user.id, "failed to update profile");
					flash(&cookies, Category::Danger, "There was an error while updating your profile. Please try again later.");
				}
			}
		}
	}

	if let Some(change) = form.password() {
		password_errors = change.validate();
		if !change.current_password.is_empty()
			&& !password::verify_password(&change.current_password, &user.password)?
		{
			password_errors.push("current_password", "Current password is incorrect.");
		}
		if password_errors.is_empty() {
			let hash = password::hash_password(&change.new_password)?;
			match queries::update_user_password(&state.db, user.id, &hash).await {
				Ok(()) => {
					info!(user_id = user.id, "password changed");
					session::forget(&cookies);
					flash(&cookies, Category::Success, "Password updated successfully! Log in with your new password!");
					return Ok(Redirect::to("/login").into_response());
				}
				Err(e) => {
					error!(error = ?e, user_id = user.id, "failed to change password");
					flash(&cookies, Category::Danger, "There was an error while updating your password. Please try again later.");
				}
			}
		}
	}

	let chrome = Chrome::new(Some(&user), take_flashes(&cookies));
	Ok(views::update_profile(&chrome, &shown_name, &profile_errors, &password_errors).into_response())
}
