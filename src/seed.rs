//! `initdb`: wipe the store and fill it with demonstration data.

use chrono::Duration;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::error::AppError;
use crate::password;
use crate::queries;
use crate::sql;
use crate::types::{now, NewComment, NewGrade, NewRecipe, NewUser, Rid, Uid};

pub const DEFAULT_PASSWORD: &str = "testing";

/// (name, email) of the seeded accounts, all sharing [`DEFAULT_PASSWORD`].
pub const SEED_USERS: &[(&str, &str)] = &[
	("Default User", "default@chalmers.se"),
	("Normal User", "normal@chalmers.se"),
];

const LOREM: &[&str] = &[
	"lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit",
	"sed", "do", "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore",
	"magna", "aliqua", "enim", "ad", "minim", "veniam", "quis", "nostrud",
	"exercitation", "ullamco", "laboris", "nisi", "aliquip", "ex", "ea", "commodo",
	"consequat", "duis", "aute", "irure", "in", "reprehenderit", "voluptate",
	"velit", "esse", "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint",
	"occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui", "officia",
	"deserunt", "mollit", "anim", "id", "est", "laborum",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
	pub users: usize,
	pub recipes: usize,
	pub comments: usize,
	pub grades: usize,
}

fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

pub fn words<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
	(0..n)
		.map(|_| *LOREM.choose(rng).unwrap_or(&"lorem"))
		.collect::<Vec<_>>()
		.join(" ")
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
	let n = rng.gen_range(6..=12);
	format!("{}.", capitalize(&words(rng, n)))
}

fn paragraph<R: Rng + ?Sized>(rng: &mut R) -> String {
	let n = rng.gen_range(4..=8);
	(0..n).map(|_| sentence(rng)).collect::<Vec<_>>().join(" ")
}

/// Title of 3-7 words, capitalized.
pub fn title<R: Rng + ?Sized>(rng: &mut R) -> String {
	let n = rng.gen_range(3..=7);
	capitalize(&words(rng, n))
}

/// 1-3 paragraphs, each wrapped in `<p>`.
pub fn content<R: Rng + ?Sized>(rng: &mut R) -> String {
	let n = rng.gen_range(1..=3);
	(0..n).map(|_| format!("<p>{}</p>", paragraph(rng))).collect()
}

fn comment_text<R: Rng + ?Sized>(rng: &mut R) -> String {
	let n = rng.gen_range(1..=2);
	(0..n).map(|_| sentence(rng)).collect::<Vec<_>>().join(" ")
}

fn days_ago<R: Rng + ?Sized>(rng: &mut R, days: std::ops::RangeInclusive<i64>) -> Duration {
	Duration::days(rng.gen_range(days))
		+ Duration::hours(rng.gen_range(1..=23))
		+ Duration::minutes(rng.gen_range(1..=59))
}

/// Drops and recreates every table, then commits users, recipes, comments
/// and grades, one transaction per batch.
pub async fn initdb<R: Rng + Send + ?Sized>(db: &Pool<Sqlite>, rng: &mut R) -> Result<SeedReport, AppError> {
	sql::reset_schema(db).await?;
	let mut report = SeedReport::default();

	let pwd = password::hash_password(DEFAULT_PASSWORD)?;
	let mut users: Vec<Uid> = Vec::new();
	let mut tx = db.begin().await?;
	for (name, email) in SEED_USERS {
		let user = NewUser {
			name: name.to_string(),
			email: email.to_string(),
			password_hash: pwd.clone(),
		};
		users.push(queries::insert_user(&mut *tx, &user).await?);
	}
	tx.commit().await?;
	report.users = users.len();

	// 5-7 recipes each, posted 20-90 days ago
	let mut recipes: Vec<Rid> = Vec::new();
	let mut tx = db.begin().await?;
	for &user_id in &users {
		for _ in 0..rng.gen_range(5..=7) {
			let recipe = NewRecipe {
				title: title(rng),
				content: content(rng),
				user_id,
				date_posted: Some(now() - days_ago(rng, 20..=90)),
			};
			recipes.push(queries::insert_recipe(&mut *tx, &recipe).await?);
		}
	}
	tx.commit().await?;
	report.recipes = recipes.len();

	let mut tx = db.begin().await?;
	for &user_id in &users {
		for &recipe_id in &recipes {
			let comment = NewComment {
				content: comment_text(rng),
				date_posted: now() - days_ago(rng, 1..=20),
				user_id,
				recipe_id,
			};
			queries::insert_comment(&mut *tx, &comment).await?;
			report.comments += 1;
		}
	}
	tx.commit().await?;

	let mut tx = db.begin().await?;
	for &user_id in &users {
		for &recipe_id in &recipes {
			let grade = NewGrade {
				score: rng.gen_range(1..=5),
				user_id,
				recipe_id,
			};
			queries::insert_grade(&mut *tx, &grade).await?;
			report.grades += 1;
		}
	}
	tx.commit().await?;

	info!(
		users = report.users,
		recipes = report.recipes,
		comments = report.comments,
		grades = report.grades,
		"Success!"
	);
	Ok(report)
}
