//! Submitted forms and their validation rules.
//!
//! Every field defaults to empty so a missing field is reported as a
//! validation error instead of a rejected request.

use serde::Deserialize;

pub const NAME_LEN: std::ops::RangeInclusive<usize> = 2..=128;
pub const EMAIL_MAX: usize = 128;
pub const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 6..=60;
pub const TITLE_MAX: usize = 100;
pub const COMMENT_MAX: usize = 2000;
pub const SCORE_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Field name and message pairs, in the order they were found.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormErrors(Vec<(&'static str, String)>);

impl FormErrors {
	pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
		self.0.push((field, message.into()));
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.0.iter()
			.filter(move |(f, _)| *f == field)
			.map(|(_, m)| m.as_str())
	}

	pub fn has(&self, field: &str) -> bool {
		self.0.iter().any(|(f, _)| *f == field)
	}

	pub fn messages(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|(_, m)| m.as_str())
	}
}

fn check_len(errors: &mut FormErrors, field: &'static str, value: &str, range: std::ops::RangeInclusive<usize>) {
	let len = value.chars().count();
	if !range.contains(&len) {
		errors.push(field, format!(
			"Field must be between {} and {} characters long.",
			range.start(), range.end()
		));
	}
}

fn check_email(errors: &mut FormErrors, value: &str) {
	if value.is_empty() {
		errors.push("email", "This field is required.");
		return;
	}
	let valid = match value.split_once('@') {
		Some((local, domain)) => !local.is_empty()
			&& !domain.is_empty()
			&& !domain.contains('@')
			&& !value.contains(char::is_whitespace),
		None => false,
	};
	if !valid {
		errors.push("email", "Invalid email address.");
	} else if value.chars().count() > EMAIL_MAX {
		errors.push("email", format!("Email must be at most {} characters long.", EMAIL_MAX));
	}
}

fn check_confirm(errors: &mut FormErrors, field: &'static str, password: &str, confirm: &str) {
	if password != confirm {
		errors.push(field, "Passwords must match.");
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
	pub name: String,
	pub email: String,
	pub password: String,
	pub confirm_password: String,
}

impl RegisterForm {
	pub fn normalize(mut self) -> Self {
		self.name = self.name.trim().to_string();
		self.email = self.email.trim().to_string();
		self
	}

	pub fn validate(&self) -> FormErrors {
		let mut errors = FormErrors::default();
		check_len(&mut errors, "name", &self.name, NAME_LEN);
		check_email(&mut errors, &self.email);
		check_len(&mut errors, "password", &self.password, PASSWORD_LEN);
		check_confirm(&mut errors, "confirm_password", &self.password, &self.confirm_password);
		errors
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
	pub email: String,
	pub password: String,
	/// checkbox, only present when ticked
	pub remember: Option<String>,
}

impl LoginForm {
	pub fn normalize(mut self) -> Self {
		self.email = self.email.trim().to_string();
		self
	}

	pub fn remember(&self) -> bool {
		self.remember.is_some()
	}

	pub fn validate(&self) -> FormErrors {
		let mut errors = FormErrors::default();
		check_email(&mut errors, &self.email);
		if self.password.is_empty() {
			errors.push("password", "This field is required.");
		}
		errors
	}
}

/// `/update_profile` carries two forms; each one is considered submitted
/// when its fields are present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileForm {
	pub name: Option<String>,
	pub current_password: Option<String>,
	pub new_password: Option<String>,
	pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileChange {
	pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
	pub current_password: String,
	pub new_password: String,
	pub confirm_password: String,
}

impl UpdateProfileForm {
	pub fn profile(&self) -> Option<ProfileChange> {
		self.name.as_ref().map(|name| ProfileChange { name: name.trim().to_string() })
	}

	pub fn password(&self) -> Option<PasswordChange> {
		self.new_password.as_ref().map(|new_password| PasswordChange {
			current_password: self.current_password.clone().unwrap_or_default(),
			new_password: new_password.clone(),
			confirm_password: self.confirm_password.clone().unwrap_or_default(),
		})
	}
}

impl ProfileChange {
	pub fn validate(&self) -> FormErrors {
		let mut errors = FormErrors::default();
		check_len(&mut errors, "name", &self.name, NAME_LEN);
		errors
	}
}

impl PasswordChange {
	/// Checking `current_password` against the stored hash is up to the caller.
	pub fn validate(&self) -> FormErrors {
		let mut errors = FormErrors::default();
		if self.current_password.is_empty() {
			errors.push("current_password", "This field is required.");
		}
		check_len(&mut errors, "new_password", &self.new_password, PASSWORD_LEN);
		check_confirm(&mut errors, "confirm_password", &self.new_password, &self.confirm_password);
		errors
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecipeForm {
	pub title: String,
	pub content: String,
}

impl RecipeForm {
	pub fn normalize(mut self) -> Self {
		self.title = self.title.trim().to_string();
		self.content = self.content.trim().to_string();
		self
	}

	pub fn validate(&self) -> FormErrors {
		let mut errors = FormErrors::default();
		check_len(&mut errors, "title", &self.title, 1..=TITLE_MAX);
		if self.content.is_empty() {
			errors.push("content", "This field is required.");
		}
		errors
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
	pub content: String,
}

impl CommentForm {
	pub fn validate(&self) -> FormErrors {
		let mut errors = FormErrors::default();
		check_len(&mut errors, "content", self.content.trim(), 1..=COMMENT_MAX);
		errors
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GradeForm {
	pub score: String,
}

impl GradeForm {
	pub fn score(&self) -> Result<i64, FormErrors> {
		let mut errors = FormErrors::default();
		match self.score.trim().parse::<i64>() {
			Ok(score) if SCORE_RANGE.contains(&score) => return Ok(score),
			_ => errors.push("score", format!(
				"Grade must be a whole number from {} to {}.",
				SCORE_RANGE.start(), SCORE_RANGE.end()
			)),
		}
		Err(errors)
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
	pub title: Option<String>,
}

impl SearchQuery {
	/// Empty means no filter.
	pub fn filter(&self) -> Option<&str> {
		self.title.as_deref().filter(|t| !t.is_empty())
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextQuery {
	pub next: Option<String>,
}

impl NextQuery {
	/// Only local paths are followed after login.
	pub fn local_next(&self) -> Option<&str> {
		self.next.as_deref().filter(|next| {
			next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
		})
	}
}
