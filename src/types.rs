use chrono::NaiveDateTime;
use sqlx::FromRow;

pub type Uid = i64;
pub type Rid = i64;

#[derive(Clone, FromRow)]
pub struct User {
	pub id: Uid,
	pub name: String,
	pub email: String,
	pub password: String,
}

// keeps the password hash out of logs
impl std::fmt::Debug for User {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("User")
			.field("id", &self.id)
			.field("email", &self.email)
			.finish_non_exhaustive()
	}
}

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
	pub id: Rid,
	pub title: String,
	pub content: String,
	pub date_posted: NaiveDateTime,
	pub user_id: Uid,
}

/// A recipe joined with its owner's name, what every listing shows.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeView {
	#[sqlx(flatten)]
	pub recipe: Recipe,
	pub author: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
	pub id: i64,
	pub content: String,
	pub date_posted: NaiveDateTime,
	pub user_id: Uid,
	pub recipe_id: Rid,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentView {
	#[sqlx(flatten)]
	pub comment: Comment,
	pub author: String,
}

/// Grades are only ever read aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub struct GradeSummary {
	pub count: i64,
	pub average: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
	pub name: String,
	pub email: String,
	pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
	pub title: String,
	pub content: String,
	pub user_id: Uid,
	/// `None` means "now"
	pub date_posted: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
	pub content: String,
	pub date_posted: NaiveDateTime,
	pub user_id: Uid,
	pub recipe_id: Rid,
}

#[derive(Debug, Clone, Copy)]
pub struct NewGrade {
	pub score: i64,
	pub user_id: Uid,
	pub recipe_id: Rid,
}

pub fn now() -> NaiveDateTime {
	chrono::Local::now().naive_local()
}
