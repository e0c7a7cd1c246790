//! Shared fixtures: a seeded in-memory app and a tiny cookie-keeping client.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::{
	body::Body,
	http::{header, Request, StatusCode},
	Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower::ServiceExt;

use recipebook::config::Config;
use recipebook::types::{RecipeView, User};
use recipebook::{new_shared_state, queries, routes, seed, sql, SharedState};

pub const DEFAULT_EMAIL: &str = "default@chalmers.se";
pub const NORMAL_EMAIL: &str = "normal@chalmers.se";
pub const PASSWORD: &str = seed::DEFAULT_PASSWORD;

pub struct TestApp {
	pub state: SharedState,
	pub router: Router,
}

pub async fn seeded_app() -> TestApp {
	let db = sql::connect_in_memory().await.expect("in-memory database");
	let mut rng = StdRng::seed_from_u64(2024);
	seed::initdb(&db, &mut rng).await.expect("seeding");

	let state = new_shared_state(db, Config::default());
	let router = routes::router(state.clone());
	TestApp { state, router }
}

impl TestApp {
	pub fn browser(&self) -> Browser {
		Browser { router: self.router.clone(), cookies: HashMap::new() }
	}

	pub async fn user(&self, email: &str) -> User {
		queries::find_user_by_email(&self.state.db, email).await.unwrap().unwrap()
	}

	pub async fn recipes(&self) -> Vec<RecipeView> {
		queries::list_recipes(&self.state.db, None).await.unwrap()
	}

	pub async fn recipe_of(&self, email: &str) -> RecipeView {
		let user = self.user(email).await;
		queries::recipes_by_user(&self.state.db, user.id).await.unwrap().remove(0)
	}
}

pub struct Page {
	pub status: StatusCode,
	pub location: Option<String>,
	/// raw `Set-Cookie` headers
	pub set_cookies: Vec<String>,
	pub body: String,
}

impl Page {
	pub fn set_cookie(&self, name: &str) -> Option<&str> {
		let prefix = format!("{name}=");
		self.set_cookies.iter()
			.map(String::as_str)
			.find(|raw| raw.starts_with(&prefix))
	}
}

/// Sends requests through the router, keeping cookies like a browser would.
pub struct Browser {
	router: Router,
	pub cookies: HashMap<String, String>,
}

impl Browser {
	fn cookie_header(&self) -> String {
		self.cookies.iter()
			.map(|(k, v)| format!("{k}={v}"))
			.collect::<Vec<_>>()
			.join("; ")
	}

	async fn send(&mut self, req: Request<Body>) -> Page {
		let res = self.router.clone().oneshot(req).await.unwrap();

		let mut set_cookies = Vec::new();
		for value in res.headers().get_all(header::SET_COOKIE) {
			let raw = value.to_str().unwrap();
			set_cookies.push(raw.to_string());
			let pair = raw.split(';').next().unwrap();
			let (name, val) = pair.split_once('=').unwrap();
			let removed = val.is_empty() || raw.contains("Max-Age=0");
			if removed {
				self.cookies.remove(name);
			} else {
				self.cookies.insert(name.to_string(), val.to_string());
			}
		}

		let status = res.status();
		let location = res.headers()
			.get(header::LOCATION)
			.map(|l| l.to_str().unwrap().to_string());
		let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
		Page { status, location, set_cookies, body: String::from_utf8_lossy(&bytes).into_owned() }
	}

	pub async fn get(&mut self, uri: &str) -> Page {
		let req = Request::builder()
			.uri(uri)
			.header(header::COOKIE, self.cookie_header())
			.body(Body::empty())
			.unwrap();
		self.send(req).await
	}

	pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> Page {
		let body = form.iter()
			.map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
			.collect::<Vec<_>>()
			.join("&");
		let req = Request::builder()
			.method("POST")
			.uri(uri)
			.header(header::COOKIE, self.cookie_header())
			.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
			.body(Body::from(body))
			.unwrap();
		self.send(req).await
	}

	pub async fn login(&mut self, email: &str, password: &str) -> Page {
		self.post("/login", &[("email", email), ("password", password)]).await
	}

	pub fn has_session(&self) -> bool {
		self.cookies.contains_key("session")
	}
}
