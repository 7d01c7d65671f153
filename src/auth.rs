// Local demo auth: register, login, profile lookup.
//
// Passwords are stored and compared in plaintext. This is a deliberately
// insecure demo store and must not be used with real credentials.

use chrono::Utc;
use tracing::info;

use crate::db::Database;
use crate::error::ApiError;
use crate::models::{User, UserProfile};

/// Register a new user. The email must not already be registered.
pub fn register(
    db: &Database,
    email: &str,
    password: &str,
    name: &str,
) -> Result<UserProfile, ApiError> {
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest(format!("invalid email: {email}")));
    }
    if password.is_empty() {
        return Err(ApiError::BadRequest("password must not be empty".into()));
    }

    if db.find_user_by_email(email)?.is_some() {
        return Err(ApiError::EmailTaken(email.to_string()));
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        password: password.to_string(),
        name: if name.is_empty() {
            email.split('@').next().unwrap_or("traveler").to_string()
        } else {
            name.to_string()
        },
        preferences: serde_json::json!({}),
        created_at: Utc::now(),
    };

    db.create_user(&user)?;
    info!(user_id = %user.id, "registered new user");

    Ok(user.into())
}

/// Authenticate by email and password. Returns the profile on success.
pub fn login(db: &Database, email: &str, password: &str) -> Result<UserProfile, ApiError> {
    let Some(user) = db.find_user_by_email(email)? else {
        return Err(ApiError::InvalidCredentials);
    };
    if user.password != password {
        return Err(ApiError::InvalidCredentials);
    }
    Ok(user.into())
}

/// Fetch a user's profile by id.
pub fn profile(db: &Database, id: &str) -> Result<UserProfile, ApiError> {
    match db.get_user(id)? {
        Some(user) => Ok(user.into()),
        None => Err(ApiError::NotFound(format!("user {id}"))),
    }
}

/// Replace a user's preferences.
pub fn update_preferences(
    db: &Database,
    id: &str,
    preferences: &serde_json::Value,
) -> Result<(), ApiError> {
    if db.update_preferences(id, preferences)? {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("user {id}")))
    }
}
