//! Cookie sessions, the current-user extractors and flash messages.

use axum::{
	async_trait,
	extract::FromRequestParts,
	http::{request::Parts, Method},
	response::{IntoResponse, Redirect, Response},
};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use uuid::Uuid;

use crate::error::AppError;
use crate::queries;
use crate::types::{now, User};
use crate::SharedState;

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	Success,
	Info,
	Warning,
	Danger,
}

impl Category {
	pub fn as_str(self) -> &'static str {
		match self {
			Category::Success => "success",
			Category::Info => "info",
			Category::Warning => "warning",
			Category::Danger => "danger",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
	pub category: Category,
	pub message: String,
}

fn read_flashes(cookies: &Cookies) -> Vec<Flash> {
	cookies.get(FLASH_COOKIE)
		.and_then(|c| urlencoding::decode(c.value()).ok().map(|v| v.into_owned()))
		.and_then(|json| serde_json::from_str(&json).ok())
		.unwrap_or_default()
}

/// Queue a message for the next rendered page.
pub fn flash(cookies: &Cookies, category: Category, message: impl Into<String>) {
	let mut flashes = read_flashes(cookies);
	flashes.push(Flash { category, message: message.into() });

	let json = match serde_json::to_string(&flashes) {
		Ok(json) => json,
		Err(e) => {
			tracing::warn!(error = ?e, "dropping flash message");
			return;
		}
	};
	cookies.add(
		Cookie::build((FLASH_COOKIE, urlencoding::encode(&json).into_owned()))
			.path("/")
			.http_only(true)
			.same_site(SameSite::Lax)
			.build(),
	);
}

/// Pending messages, removed from the cookie as they are read.
pub fn take_flashes(cookies: &Cookies) -> Vec<Flash> {
	let flashes = read_flashes(cookies);
	if cookies.get(FLASH_COOKIE).is_some() {
		cookies.remove(Cookie::build(FLASH_COOKIE).path("/").build());
	}
	flashes
}

/// When a session started now and lasting `days` runs out.
pub fn expiry(days: i64) -> Result<NaiveDateTime, AppError> {
	Duration::try_days(days)
		.and_then(|lifetime| now().checked_add_signed(lifetime))
		.ok_or_else(|| AppError::Session(format!("session lifetime of {days} days is out of range")))
}

/// Start a session for `user` and hand its token to the browser.
pub async fn login(state: &SharedState, cookies: &Cookies, user: &User, remember: bool) -> Result<(), AppError> {
	let token = Uuid::new_v4().to_string();
	let days = if remember {
		state.config.session.remember_days
	} else {
		state.config.session.session_days
	};
	queries::create_session(&state.db, &token, user.id, expiry(days)?).await?;

	let mut cookie = Cookie::build((SESSION_COOKIE, token))
		.path("/")
		.http_only(true)
		.same_site(SameSite::Lax);
	if remember {
		cookie = cookie.max_age(tower_cookies::cookie::time::Duration::days(days));
	}
	cookies.add(cookie.build());
	tracing::info!(user_id = user.id, remember, "session started");
	Ok(())
}

pub async fn logout(state: &SharedState, cookies: &Cookies) -> Result<(), AppError> {
	if let Some(cookie) = cookies.get(SESSION_COOKIE) {
		queries::delete_session(&state.db, cookie.value()).await?;
		cookies.remove(Cookie::build(SESSION_COOKIE).path("/").build());
	}
	Ok(())
}

/// Forget the browser's token without touching the store, used once
/// the store already dropped the sessions.
pub fn forget(cookies: &Cookies) {
	cookies.remove(Cookie::build(SESSION_COOKIE).path("/").build());
}

async fn lookup(parts: &mut Parts, state: &SharedState) -> Result<(Cookies, Option<User>), Response> {
	let cookies = Cookies::from_request_parts(parts, state)
		.await
		.map_err(IntoResponse::into_response)?;
	let token = match cookies.get(SESSION_COOKIE) {
		Some(cookie) => cookie.value().to_string(),
		None => return Ok((cookies, None)),
	};
	let user = queries::session_user(&state.db, &token)
		.await
		.map_err(|e| AppError::from(e).into_response())?;
	Ok((cookies, user))
}

/// Whoever is logged in, if anyone.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<SharedState> for MaybeUser {
	type Rejection = Response;

	async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
		let (_, user) = lookup(parts, state).await?;
		Ok(MaybeUser(user))
	}
}

/// Login required: anonymous requests are sent to `/login?next=<path>`.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<SharedState> for CurrentUser {
	type Rejection = Response;

	async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
		let (cookies, user) = lookup(parts, state).await?;
		match user {
			Some(user) => Ok(CurrentUser(user)),
			None => {
				let path = parts.uri.path_and_query()
					.map(|pq| pq.as_str())
					.unwrap_or("/");
				let next = login_next(&parts.method, path);
				flash(&cookies, Category::Info, "Please log in to access this page.");
				Err(Redirect::to(&login_url(next)).into_response())
			}
		}
	}
}

/// Where to return after logging in. A post on `/recipe/<id>/<action>`
/// returns to the recipe page, other posts have no `next`.
pub fn login_next<'a>(method: &Method, path: &'a str) -> Option<&'a str> {
	if *method == Method::GET {
		return Some(path);
	}
	let (parent, _) = path.rsplit_once('/')?;
	let id = parent.strip_prefix("/recipe/")?;
	id.parse::<i64>().ok().map(|_| parent)
}

pub fn login_url(next: Option<&str>) -> String {
	match next {
		Some(next) => format!("/login?next={}", urlencoding::encode(next)),
		None => "/login".to_string(),
	}
}
