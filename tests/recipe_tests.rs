mod common;

use axum::http::StatusCode;
use common::{seeded_app, DEFAULT_EMAIL, NORMAL_EMAIL, PASSWORD};
use recipebook::queries;

#[tokio::test]
async fn delete_control_only_for_owner() {
	let app = seeded_app().await;
	let mine = app.recipe_of(DEFAULT_EMAIL).await;
	let uri = format!("/recipe/{}", mine.recipe.id);

	let mut stranger = app.browser();
	stranger.login(NORMAL_EMAIL, PASSWORD).await;
	let page = stranger.get(&uri).await;
	assert!(!page.body.contains("Are you sure you want to delete this recipe"));
	assert!(page.body.contains("Your grade"));

	let mut owner = app.browser();
	owner.login(DEFAULT_EMAIL, PASSWORD).await;
	let page = owner.get(&uri).await;
	assert!(page.body.contains(&format!(
		"Are you sure you want to delete this recipe with title '{}'?",
		mine.recipe.title
	)));
}

#[tokio::test]
async fn posting_requires_login() {
	let app = seeded_app().await;
	let mut browser = app.browser();

	let page = browser.get("/recipe/new").await;
	assert_eq!(page.location.as_deref(), Some("/login?next=%2Frecipe%2Fnew"));

	let before = app.recipes().await.len();
	let page = browser.post("/recipe/new", &[("title", "Soup"), ("content", "Boil.")]).await;
	assert_eq!(page.status, StatusCode::SEE_OTHER);
	assert_eq!(app.recipes().await.len(), before);
}

#[tokio::test]
async fn anonymous_post_returns_to_the_recipe_after_login() {
	let app = seeded_app().await;
	let target = app.recipe_of(DEFAULT_EMAIL).await;
	let uri = format!("/recipe/{}", target.recipe.id);
	let mut browser = app.browser();

	let page = browser.post(&format!("{uri}/comment"), &[("content", "hi")]).await;
	let expected = format!("/login?next={}", urlencoding::encode(&uri));
	assert_eq!(page.location.as_deref(), Some(expected.as_str()));

	let page = browser.post(&expected, &[("email", NORMAL_EMAIL), ("password", PASSWORD)]).await;
	assert_eq!(page.location.as_deref(), Some(uri.as_str()));
	let page = browser.get(&uri).await;
	assert_eq!(page.status, StatusCode::OK);

	let page = app.browser().post("/recipe/new", &[("title", "Soup"), ("content", "Boil.")]).await;
	assert_eq!(page.location.as_deref(), Some("/login"));
}

#[tokio::test]
async fn post_comment_and_grade_a_recipe() {
	let app = seeded_app().await;
	let mut browser = app.browser();
	browser.login(NORMAL_EMAIL, PASSWORD).await;

	let page = browser.get("/recipe/new").await;
	assert_eq!(page.status, StatusCode::OK);

	let page = browser.post("/recipe/new", &[
		("title", "Pea soup"),
		("content", "Soak the peas.\n\nSimmer for two hours."),
	]).await;
	assert_eq!(page.status, StatusCode::SEE_OTHER);
	let uri = page.location.unwrap();
	let id: i64 = uri.trim_start_matches("/recipe/").parse().unwrap();

	let page = browser.get(&uri).await;
	assert!(page.body.contains("Recipe posted successfully!"));
	assert!(page.body.contains("<p>Soak the peas.</p>"));
	assert!(page.body.contains("No grades yet."));
	assert!(page.body.contains("No comments yet."));

	let page = browser.post(&format!("{uri}/comment"), &[("content", "Thursday classic")]).await;
	assert_eq!(page.location.as_deref(), Some(uri.as_str()));
	let page = browser.post(&format!("{uri}/grade"), &[("score", "4")]).await;
	assert_eq!(page.location.as_deref(), Some(uri.as_str()));

	let page = browser.get(&uri).await;
	assert!(page.body.contains("Thursday classic"));
	assert!(page.body.contains("Average grade: 4.0 / 5 (1 grade)"));

	let comments = queries::comments_for_recipe(&app.state.db, id).await.unwrap();
	assert_eq!(comments.len(), 1);
	assert_eq!(comments[0].author, "Normal User");
}

#[tokio::test]
async fn invalid_submissions_are_reported() {
	let app = seeded_app().await;
	let target = app.recipe_of(DEFAULT_EMAIL).await;
	let uri = format!("/recipe/{}", target.recipe.id);
	let mut browser = app.browser();
	browser.login(NORMAL_EMAIL, PASSWORD).await;

	let page = browser.post(&format!("{uri}/grade"), &[("score", "9")]).await;
	assert_eq!(page.location.as_deref(), Some(uri.as_str()));
	let page = browser.get(&uri).await;
	assert!(page.body.contains("Grade must be a whole number from 1 to 5."));
	assert!(page.body.contains("(2 grades)"));

	browser.post(&format!("{uri}/comment"), &[("content", "   ")]).await;
	let page = browser.get(&uri).await;
	assert!(page.body.contains("Field must be between 1 and 2000 characters long."));

	let page = browser.post("/recipe/new", &[("title", ""), ("content", "")]).await;
	assert_eq!(page.status, StatusCode::OK);
	assert!(page.body.contains("This field is required."));

	let page = browser.post("/recipe/999999/comment", &[("content", "hello")]).await;
	assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_owner_can_delete() {
	let app = seeded_app().await;
	let target = app.recipe_of(DEFAULT_EMAIL).await;
	let id = target.recipe.id;

	let mut stranger = app.browser();
	stranger.login(NORMAL_EMAIL, PASSWORD).await;
	let page = stranger.post(&format!("/recipe/{id}/delete"), &[]).await;
	assert_eq!(page.location.as_deref(), Some("/"));
	let page = stranger.get("/").await;
	assert!(page.body.contains("This recipe does not belong to you!"));
	assert!(queries::find_recipe(&app.state.db, id).await.unwrap().is_some());
}

#[tokio::test]
async fn owner_deletes_recipe_with_comments_and_grades() {
	let app = seeded_app().await;
	let target = app.recipe_of(DEFAULT_EMAIL).await;
	let id = target.recipe.id;

	let mut owner = app.browser();
	owner.login(DEFAULT_EMAIL, PASSWORD).await;
	let page = owner.post(&format!("/recipe/{id}/delete"), &[]).await;
	assert_eq!(page.location.as_deref(), Some("/"));

	let page = owner.get("/").await;
	assert!(page.body.contains("Recipe deleted successfully!"));
	assert!(!page.body.contains(&format!("href=\"/recipe/{id}\"")));

	assert!(queries::find_recipe(&app.state.db, id).await.unwrap().is_none());
	assert!(queries::comments_for_recipe(&app.state.db, id).await.unwrap().is_empty());
	assert_eq!(queries::grade_summary(&app.state.db, id).await.unwrap().count, 0);

	let page = owner.get(&format!("/recipe/{id}")).await;
	assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_missing_recipe() {
	let app = seeded_app().await;
	let mut owner = app.browser();
	owner.login(DEFAULT_EMAIL, PASSWORD).await;

	let page = owner.post("/recipe/999999/delete", &[]).await;
	assert_eq!(page.location.as_deref(), Some("/"));
	let page = owner.get("/").await;
	assert!(page.body.contains("This recipe does not exist!"));
}
