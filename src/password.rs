//! Argon2id password hashing

use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
	#[error("Password hash error: {0}")]
	Hash(String),
	#[error("Stored password hash is malformed: {0}")]
	Malformed(String),
}

/// Hash with a fresh random salt, returns the PHC string stored in `users.password`.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
	let salt = SaltString::generate(&mut OsRng);

	Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| PasswordError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
	let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::Malformed(e.to_string()))?;

	Ok(Argon2::default()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hash_and_verify() {
		let hash = hash_password("testing").unwrap();

		assert!(hash.starts_with("$argon2id$"));
		assert!(verify_password("testing", &hash).unwrap());
		assert!(!verify_password("Testing", &hash).unwrap());
	}

	#[test]
	fn salts_differ() {
		let a = hash_password("same").unwrap();
		let b = hash_password("same").unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn malformed_hash_is_an_error() {
		assert!(matches!(
			verify_password("x", "plaintext"),
			Err(PasswordError::Malformed(_))
		));
	}
}
