//! Every read and write against the store.
//!
//! Plain lookups take the pool. Writes go through a transaction that is
//! committed at the end; a transaction dropped on an early `?` rolls back.
//! The `insert_*` functions take any executor so the seeder can batch them
//! inside its own transactions.

use chrono::NaiveDateTime;
use sqlx::{Executor, Pool, QueryBuilder, Sqlite};

use crate::types::{
	now, CommentView, GradeSummary, NewComment, NewGrade, NewRecipe, NewUser, Rid, RecipeView,
	Uid, User,
};

const RECIPE_VIEW_SELECT: &str = "SELECT r.id, r.title, r.content, r.date_posted, r.user_id, u.name AS author \
	FROM recipes r JOIN users u ON u.id = r.user_id";

/// Title substring search ordered by post date, no filter when `title` is `None`.
pub fn recipe_search(title: Option<&str>) -> QueryBuilder<'static, Sqlite> {
	let mut qb = QueryBuilder::new(RECIPE_VIEW_SELECT);
	if let Some(title) = title {
		qb.push(" WHERE r.title LIKE ");
		qb.push_bind(format!("%{title}%"));
	}
	qb.push(" ORDER BY r.date_posted, r.id");
	qb
}

pub async fn list_recipes(db: &Pool<Sqlite>, title: Option<&str>) -> Result<Vec<RecipeView>, sqlx::Error> {
	recipe_search(title)
		.build_query_as::<RecipeView>()
		.fetch_all(db)
		.await
}

pub async fn find_recipe(db: &Pool<Sqlite>, id: Rid) -> Result<Option<RecipeView>, sqlx::Error> {
	sqlx::query_as::<_, RecipeView>(&format!("{RECIPE_VIEW_SELECT} WHERE r.id = ?"))
		.bind(id)
		.fetch_optional(db)
		.await
}

pub async fn recipes_by_user(db: &Pool<Sqlite>, user_id: Uid) -> Result<Vec<RecipeView>, sqlx::Error> {
	sqlx::query_as::<_, RecipeView>(&format!(
		"{RECIPE_VIEW_SELECT} WHERE r.user_id = ? ORDER BY r.date_posted, r.id"
	))
		.bind(user_id)
		.fetch_all(db)
		.await
}

pub async fn comments_for_recipe(db: &Pool<Sqlite>, recipe_id: Rid) -> Result<Vec<CommentView>, sqlx::Error> {
	sqlx::query_as::<_, CommentView>(
		"SELECT c.id, c.content, c.date_posted, c.user_id, c.recipe_id, u.name AS author \
		FROM comments c JOIN users u ON u.id = c.user_id \
		WHERE c.recipe_id = ? ORDER BY c.date_posted, c.id"
	)
		.bind(recipe_id)
		.fetch_all(db)
		.await
}

pub async fn grade_summary(db: &Pool<Sqlite>, recipe_id: Rid) -> Result<GradeSummary, sqlx::Error> {
	sqlx::query_as::<_, GradeSummary>(
		"SELECT COUNT(*) AS count, AVG(score) AS average FROM grades WHERE recipe_id = ?"
	)
		.bind(recipe_id)
		.fetch_one(db)
		.await
}

pub async fn find_user(db: &Pool<Sqlite>, id: Uid) -> Result<Option<User>, sqlx::Error> {
	sqlx::query_as::<_, User>("SELECT id, name, email, password FROM users WHERE id = ? LIMIT 1")
		.bind(id)
		.fetch_optional(db)
		.await
}

pub async fn find_user_by_email(db: &Pool<Sqlite>, email: &str) -> Result<Option<User>, sqlx::Error> {
	sqlx::query_as::<_, User>("SELECT id, name, email, password FROM users WHERE email = ? LIMIT 1")
		.bind(email)
		.fetch_optional(db)
		.await
}

pub async fn insert_user<'e, E>(db: E, user: &NewUser) -> Result<Uid, sqlx::Error>
where
	E: Executor<'e, Database = Sqlite>,
{
	let res = sqlx::query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
		.bind(&user.name)
		.bind(&user.email)
		.bind(&user.password_hash)
		.execute(db)
		.await?;
	Ok(res.last_insert_rowid())
}

pub async fn insert_recipe<'e, E>(db: E, recipe: &NewRecipe) -> Result<Rid, sqlx::Error>
where
	E: Executor<'e, Database = Sqlite>,
{
	let res = sqlx::query("INSERT INTO recipes (title, date_posted, content, user_id) VALUES (?, ?, ?, ?)")
		.bind(&recipe.title)
		.bind(recipe.date_posted.unwrap_or_else(now))
		.bind(&recipe.content)
		.bind(recipe.user_id)
		.execute(db)
		.await?;
	Ok(res.last_insert_rowid())
}

pub async fn insert_comment<'e, E>(db: E, comment: &NewComment) -> Result<i64, sqlx::Error>
where
	E: Executor<'e, Database = Sqlite>,
{
	let res = sqlx::query("INSERT INTO comments (content, date_posted, user_id, recipe_id) VALUES (?, ?, ?, ?)")
		.bind(&comment.content)
		.bind(comment.date_posted)
		.bind(comment.user_id)
		.bind(comment.recipe_id)
		.execute(db)
		.await?;
	Ok(res.last_insert_rowid())
}

pub async fn insert_grade<'e, E>(db: E, grade: &NewGrade) -> Result<i64, sqlx::Error>
where
	E: Executor<'e, Database = Sqlite>,
{
	let res = sqlx::query("INSERT INTO grades (score, user_id, recipe_id) VALUES (?, ?, ?)")
		.bind(grade.score)
		.bind(grade.user_id)
		.bind(grade.recipe_id)
		.execute(db)
		.await?;
	Ok(res.last_insert_rowid())
}

pub async fn create_user(db: &Pool<Sqlite>, user: &NewUser) -> Result<Uid, sqlx::Error> {
	let mut tx = db.begin().await?;
	let id = insert_user(&mut *tx, user).await?;
	tx.commit().await?;
	Ok(id)
}

pub async fn create_recipe(db: &Pool<Sqlite>, recipe: &NewRecipe) -> Result<Rid, sqlx::Error> {
	let mut tx = db.begin().await?;
	let id = insert_recipe(&mut *tx, recipe).await?;
	tx.commit().await?;
	Ok(id)
}

pub async fn create_comment(db: &Pool<Sqlite>, comment: &NewComment) -> Result<i64, sqlx::Error> {
	let mut tx = db.begin().await?;
	let id = insert_comment(&mut *tx, comment).await?;
	tx.commit().await?;
	Ok(id)
}

pub async fn create_grade(db: &Pool<Sqlite>, grade: &NewGrade) -> Result<i64, sqlx::Error> {
	let mut tx = db.begin().await?;
	let id = insert_grade(&mut *tx, grade).await?;
	tx.commit().await?;
	Ok(id)
}

pub async fn update_user_name(db: &Pool<Sqlite>, id: Uid, name: &str) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;
	sqlx::query("UPDATE users SET name = ? WHERE id = ?")
		.bind(name)
		.bind(id)
		.execute(&mut *tx)
		.await?;
	tx.commit().await
}

/// Also ends every session of the user.
pub async fn update_user_password(db: &Pool<Sqlite>, id: Uid, password_hash: &str) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;
	sqlx::query("UPDATE users SET password = ? WHERE id = ?")
		.bind(password_hash)
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM sessions WHERE user_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	tx.commit().await
}

/// Removes the recipe together with its comments and grades.
pub async fn delete_recipe(db: &Pool<Sqlite>, id: Rid) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;
	sqlx::query("DELETE FROM comments WHERE recipe_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM grades WHERE recipe_id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	sqlx::query("DELETE FROM recipes WHERE id = ?")
		.bind(id)
		.execute(&mut *tx)
		.await?;
	tx.commit().await
}

pub async fn create_session(
	db: &Pool<Sqlite>,
	token: &str,
	user_id: Uid,
	expires_at: NaiveDateTime,
) -> Result<(), sqlx::Error> {
	let created_at = now();
	let mut tx = db.begin().await?;
	sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
		.bind(created_at)
		.execute(&mut *tx)
		.await?;
	sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
		.bind(token)
		.bind(user_id)
		.bind(created_at)
		.bind(expires_at)
		.execute(&mut *tx)
		.await?;
	tx.commit().await
}

/// The user behind a live session.
pub async fn session_user(db: &Pool<Sqlite>, token: &str) -> Result<Option<User>, sqlx::Error> {
	sqlx::query_as::<_, User>(
		"SELECT u.id, u.name, u.email, u.password FROM sessions s JOIN users u ON u.id = s.user_id \
		WHERE s.token = ? AND s.expires_at > ? LIMIT 1"
	)
		.bind(token)
		.bind(now())
		.fetch_optional(db)
		.await
}

pub async fn delete_session(db: &Pool<Sqlite>, token: &str) -> Result<(), sqlx::Error> {
	sqlx::query("DELETE FROM sessions WHERE token = ?")
		.bind(token)
		.execute(db)
		.await?;
	Ok(())
}
