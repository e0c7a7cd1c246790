mod common;

use axum::http::StatusCode;
use common::seeded_app;

#[tokio::test]
async fn home_lists_recipes_with_columns() {
	let app = seeded_app().await;
	let mut browser = app.browser();

	let page = browser.get("/").await;
	assert_eq!(page.status, StatusCode::OK);
	for text in ["List of recipes", "Title", "Date", "User", "Content", "Search for recipes"] {
		assert!(page.body.contains(text), "missing {text:?}");
	}
	for view in app.recipes().await {
		assert!(page.body.contains(&format!("/recipe/{}", view.recipe.id)));
	}
}

#[tokio::test]
async fn search_filters_by_substring() {
	let app = seeded_app().await;
	let mut browser = app.browser();
	let recipes = app.recipes().await;
	let target = &recipes[0].recipe;
	let needle: String = target.title.split(' ').next().unwrap().to_string();

	let page = browser.get(&format!("/?title={}", urlencoding::encode(&needle))).await;
	assert_eq!(page.status, StatusCode::OK);
	assert!(page.body.contains("Search for recipes"));
	assert!(page.body.contains("search the recipe by"));

	let lower = needle.to_lowercase();
	for view in &recipes {
		let link = format!("href=\"/recipe/{}\"", view.recipe.id);
		let matches = view.recipe.title.to_lowercase().contains(&lower);
		assert_eq!(page.body.contains(&link), matches, "{}", view.recipe.title);
	}
}

#[tokio::test]
async fn search_without_hits_still_renders() {
	let app = seeded_app().await;
	let mut browser = app.browser();

	let page = browser.get("/?title=error").await;
	assert_eq!(page.status, StatusCode::OK);
	assert!(page.body.contains("Search for recipes"));
	assert!(page.body.contains("No recipes found."));
}

#[tokio::test]
async fn search_flash_is_shown_once() {
	let app = seeded_app().await;
	let mut browser = app.browser();

	browser.get("/?title=lorem").await;
	let page = browser.get("/").await;
	assert!(!page.body.contains("search the recipe by"));
}

#[tokio::test]
async fn about_page() {
	let app = seeded_app().await;
	let page = app.browser().get("/about").await;
	assert_eq!(page.status, StatusCode::OK);
	assert!(page.body.contains("About"));
}

#[tokio::test]
async fn detail_shows_recipe() {
	let app = seeded_app().await;
	let view = app.recipes().await.remove(0);

	let page = app.browser().get(&format!("/recipe/{}", view.recipe.id)).await;
	assert_eq!(page.status, StatusCode::OK);
	assert!(page.body.contains(&view.recipe.title));
	assert!(page.body.contains(&view.author));
	assert!(page.body.contains("Average grade: "));
	assert!(page.body.contains("(2 grades)"));
	assert!(page.body.contains("Comments"));
	// anonymous visitors get a login link instead of the forms
	assert!(page.body.contains("to comment or grade this recipe."));
}

#[tokio::test]
async fn detail_of_missing_recipe_is_404() {
	let app = seeded_app().await;
	let last = app.recipes().await.iter().map(|r| r.recipe.id).max().unwrap();

	let mut browser = app.browser();
	let page = browser.get(&format!("/recipe/{}", last + 100)).await;
	assert_eq!(page.status, StatusCode::NOT_FOUND);
	assert!(page.body.contains("Page not found"));

	let page = browser.get("/recipe/not-a-number").await;
	assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_404() {
	let app = seeded_app().await;
	let page = app.browser().get("/nowhere").await;
	assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stylesheet_is_served() {
	let app = seeded_app().await;
	let page = app.browser().get("/static/style.css").await;
	assert_eq!(page.status, StatusCode::OK);
	assert!(page.body.contains(".flash-danger"));
}
