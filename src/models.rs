// Persistent record types: saved trips and users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's persisted trip-planning record: the original prompt together
/// with the generated itinerary JSON and the user's annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTrip {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub destination: String,
    pub duration_days: u32,
    pub budget: String,
    pub prompt: String,
    /// Opaque itinerary JSON as produced by the trip generator.
    pub plan: serde_json::Value,
    pub favorite: bool,
    pub tags: Vec<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A registered user. The password is stored in plaintext: this is a
/// demo-only local auth store, not a real credential system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// The externally visible slice of a `User` (no password).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email,
            name: user.name,
            preferences: user.preferences,
            created_at: user.created_at,
        }
    }
}

/// Input for saving a new trip. The store assigns id and timestamps.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTrip {
    pub user_id: String,
    pub title: String,
    pub destination: String,
    pub duration_days: u32,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub prompt: String,
    pub plan: serde_json::Value,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}
