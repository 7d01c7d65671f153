// SQLite persistence layer for users, saved trips, and key-value state.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{NewTrip, SavedTrip, User};

/// SQLite-backed persistence for users, saved trips, and key-value
/// application state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                name        TEXT NOT NULL,
                preferences TEXT NOT NULL DEFAULT '{}',
                created_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS trips (
                id            TEXT PRIMARY KEY,
                user_id       TEXT NOT NULL,
                title         TEXT NOT NULL,
                destination   TEXT NOT NULL,
                duration_days INTEGER NOT NULL,
                budget        TEXT NOT NULL DEFAULT '',
                prompt        TEXT NOT NULL DEFAULT '',
                plan          TEXT NOT NULL,
                favorite      INTEGER NOT NULL DEFAULT 0,
                tags          TEXT NOT NULL DEFAULT '[]',
                notes         TEXT NOT NULL DEFAULT '',
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_trips_user_id ON trips(user_id);

            CREATE TABLE IF NOT EXISTS app_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a new user. Fails if the email is already registered
    /// (UNIQUE constraint on email).
    pub fn create_user(&self, user: &User) -> Result<()> {
        let conn = self.conn();
        let preferences_json = serde_json::to_string(&user.preferences)
            .context("failed to serialize preferences")?;
        conn.execute(
            "INSERT INTO users (id, email, password, name, preferences, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.password,
                user.name,
                preferences_json,
                user.created_at.to_rfc3339(),
            ],
        )
        .context("failed to create user")?;
        Ok(())
    }

    /// Look up a user by email. Returns `None` if no user has that email.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, email, password, name, preferences, created_at
             FROM users WHERE email = ?1",
            params![email],
            row_to_user,
        )
        .optional()
        .context("failed to query user by email")
    }

    /// Look up a user by id.
    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, email, password, name, preferences, created_at
             FROM users WHERE id = ?1",
            params![id],
            row_to_user,
        )
        .optional()
        .context("failed to query user by id")
    }

    /// Replace a user's preferences JSON. Returns `false` if no user has
    /// the given id.
    pub fn update_preferences(&self, id: &str, preferences: &serde_json::Value) -> Result<bool> {
        let conn = self.conn();
        let json = serde_json::to_string(preferences)
            .context("failed to serialize preferences")?;
        let changed = conn
            .execute(
                "UPDATE users SET preferences = ?1 WHERE id = ?2",
                params![json, id],
            )
            .context("failed to update preferences")?;
        Ok(changed == 1)
    }

    // ------------------------------------------------------------------
    // Saved trips
    // ------------------------------------------------------------------

    /// Persist a new saved trip, assigning a fresh id and timestamps.
    /// Returns the stored record.
    pub fn save_trip(&self, new: &NewTrip) -> Result<SavedTrip> {
        let now = Utc::now();
        let trip = SavedTrip {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new.user_id.clone(),
            title: new.title.clone(),
            destination: new.destination.clone(),
            duration_days: new.duration_days,
            budget: new.budget.clone(),
            prompt: new.prompt.clone(),
            plan: new.plan.clone(),
            favorite: false,
            tags: new.tags.clone(),
            notes: new.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        let plan_json =
            serde_json::to_string(&trip.plan).context("failed to serialize trip plan")?;
        let tags_json =
            serde_json::to_string(&trip.tags).context("failed to serialize trip tags")?;

        let conn = self.conn();
        conn.execute(
            "INSERT INTO trips
                (id, user_id, title, destination, duration_days, budget, prompt,
                 plan, favorite, tags, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                trip.id,
                trip.user_id,
                trip.title,
                trip.destination,
                trip.duration_days,
                trip.budget,
                trip.prompt,
                plan_json,
                trip.favorite,
                tags_json,
                trip.notes,
                trip.created_at.to_rfc3339(),
                trip.updated_at.to_rfc3339(),
            ],
        )
        .context("failed to save trip")?;

        Ok(trip)
    }

    /// Load all trips belonging to `user_id`, newest first.
    pub fn list_trips(&self, user_id: &str) -> Result<Vec<SavedTrip>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, title, destination, duration_days, budget, prompt,
                        plan, favorite, tags, notes, created_at, updated_at
                 FROM trips WHERE user_id = ?1 ORDER BY created_at DESC",
            )
            .context("failed to prepare list_trips query")?;

        let trips = stmt
            .query_map(params![user_id], row_to_trip)
            .context("failed to query trips")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map trip rows")?;

        Ok(trips)
    }

    /// Load a single trip by id.
    pub fn get_trip(&self, id: &str) -> Result<Option<SavedTrip>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, title, destination, duration_days, budget, prompt,
                    plan, favorite, tags, notes, created_at, updated_at
             FROM trips WHERE id = ?1",
            params![id],
            row_to_trip,
        )
        .optional()
        .context("failed to query trip by id")
    }

    /// Flip a trip's favorite flag. Returns the new state, or `None` if no
    /// trip has the given id. Toggling twice restores the original state.
    pub fn toggle_favorite(&self, id: &str) -> Result<Option<bool>> {
        let conn = self.conn();
        let new_state: Option<bool> = conn
            .query_row(
                "UPDATE trips
                 SET favorite = NOT favorite, updated_at = ?2
                 WHERE id = ?1
                 RETURNING favorite",
                params![id, Utc::now().to_rfc3339()],
                |row| row.get(0),
            )
            .optional()
            .context("failed to toggle favorite")?;
        Ok(new_state)
    }

    /// Replace a trip's tags. Returns `false` if no trip has the given id.
    pub fn set_tags(&self, id: &str, tags: &[String]) -> Result<bool> {
        let conn = self.conn();
        let tags_json = serde_json::to_string(tags).context("failed to serialize tags")?;
        let changed = conn
            .execute(
                "UPDATE trips SET tags = ?1, updated_at = ?2 WHERE id = ?3",
                params![tags_json, Utc::now().to_rfc3339(), id],
            )
            .context("failed to set tags")?;
        Ok(changed == 1)
    }

    /// Replace a trip's notes. Returns `false` if no trip has the given id.
    pub fn set_notes(&self, id: &str, notes: &str) -> Result<bool> {
        let conn = self.conn();
        let changed = conn
            .execute(
                "UPDATE trips SET notes = ?1, updated_at = ?2 WHERE id = ?3",
                params![notes, Utc::now().to_rfc3339(), id],
            )
            .context("failed to set notes")?;
        Ok(changed == 1)
    }

    /// Delete a trip by id. Returns `true` if a record was removed,
    /// `false` for a non-existent id (a no-op).
    pub fn delete_trip(&self, id: &str) -> Result<bool> {
        let conn = self.conn();
        let removed = conn
            .execute("DELETE FROM trips WHERE id = ?1", params![id])
            .context("failed to delete trip")?;
        Ok(removed == 1)
    }

    // ------------------------------------------------------------------
    // Key-value state
    // ------------------------------------------------------------------

    /// Persist an arbitrary JSON value under `key`. Uses INSERT OR REPLACE
    /// so repeated saves overwrite the previous value.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str =
            serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`. Returns `None` if the
    /// key does not exist.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let json_str: Option<String> = conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query app state")?;

        match json_str {
            Some(s) => {
                let value: serde_json::Value =
                    serde_json::from_str(&s).context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Row mapping helpers
// ---------------------------------------------------------------------------

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let preferences_json: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        name: row.get(3)?,
        preferences: serde_json::from_str(&preferences_json)
            .unwrap_or(serde_json::Value::Object(Default::default())),
        created_at: parse_timestamp(&created_at),
    })
}

fn row_to_trip(row: &rusqlite::Row<'_>) -> rusqlite::Result<SavedTrip> {
    let plan_json: String = row.get(7)?;
    let tags_json: String = row.get(9)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;
    Ok(SavedTrip {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        destination: row.get(3)?,
        duration_days: row.get(4)?,
        budget: row.get(5)?,
        prompt: row.get(6)?,
        plan: serde_json::from_str(&plan_json).unwrap_or(serde_json::Value::Null),
        favorite: row.get(8)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        notes: row.get(10)?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_timestamp(&updated_at),
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Helper: create a fresh in-memory database for each test.
    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    /// Helper: build a sample user.
    fn sample_user(email: &str) -> User {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password: "hunter2".to_string(),
            name: "Ada Wanderer".to_string(),
            preferences: json!({"currency": "EUR"}),
            created_at: Utc::now(),
        }
    }

    /// Helper: build a sample new-trip input.
    fn sample_trip(user_id: &str, title: &str) -> NewTrip {
        NewTrip {
            user_id: user_id.to_string(),
            title: title.to_string(),
            destination: "Lisbon, Portugal".to_string(),
            duration_days: 5,
            budget: "moderate".to_string(),
            prompt: "5 days in Lisbon on a moderate budget".to_string(),
            plan: json!({"days": [{"day": 1, "activities": ["Alfama walk"]}]}),
            tags: vec!["europe".to_string()],
            notes: String::new(),
        }
    }

    // ------------------------------------------------------------------
    // Schema / open
    // ------------------------------------------------------------------

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"trips".to_string()));
        assert!(tables.contains(&"app_state".to_string()));
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    #[test]
    fn create_and_find_user_round_trip() {
        let db = test_db();
        let user = sample_user("ada@example.com");
        db.create_user(&user).unwrap();

        let found = db.find_user_by_email("ada@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.name, "Ada Wanderer");
        assert_eq!(found.preferences, json!({"currency": "EUR"}));

        let by_id = db.get_user(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");
    }

    #[test]
    fn duplicate_email_rejected() {
        let db = test_db();
        db.create_user(&sample_user("dup@example.com")).unwrap();
        let result = db.create_user(&sample_user("dup@example.com"));
        assert!(result.is_err());
    }

    #[test]
    fn find_user_by_email_returns_none_for_unknown() {
        let db = test_db();
        assert!(db.find_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn update_preferences_replaces_value() {
        let db = test_db();
        let user = sample_user("prefs@example.com");
        db.create_user(&user).unwrap();

        let updated = db
            .update_preferences(&user.id, &json!({"currency": "JPY", "units": "metric"}))
            .unwrap();
        assert!(updated);

        let found = db.get_user(&user.id).unwrap().unwrap();
        assert_eq!(found.preferences["currency"], "JPY");

        // Unknown id is a no-op
        assert!(!db.update_preferences("missing", &json!({})).unwrap());
    }

    // ------------------------------------------------------------------
    // Saved trips
    // ------------------------------------------------------------------

    #[test]
    fn save_then_list_returns_trip_for_same_user() {
        let db = test_db();
        let saved = db.save_trip(&sample_trip("user-1", "Lisbon Getaway")).unwrap();

        let trips = db.list_trips("user-1").unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id, saved.id);
        assert_eq!(trips[0].title, "Lisbon Getaway");
        assert_eq!(trips[0].destination, "Lisbon, Portugal");
        assert_eq!(trips[0].duration_days, 5);
        assert!(!trips[0].favorite);
        assert_eq!(trips[0].tags, vec!["europe".to_string()]);
        assert_eq!(trips[0].plan["days"][0]["day"], 1);
    }

    #[test]
    fn list_trips_filters_by_user() {
        let db = test_db();
        db.save_trip(&sample_trip("user-1", "A")).unwrap();
        db.save_trip(&sample_trip("user-1", "B")).unwrap();
        db.save_trip(&sample_trip("user-2", "C")).unwrap();

        assert_eq!(db.list_trips("user-1").unwrap().len(), 2);
        assert_eq!(db.list_trips("user-2").unwrap().len(), 1);
        assert!(db.list_trips("user-3").unwrap().is_empty());
    }

    #[test]
    fn toggle_favorite_twice_restores_original_state() {
        let db = test_db();
        let saved = db.save_trip(&sample_trip("user-1", "Toggle")).unwrap();
        assert!(!saved.favorite);

        let first = db.toggle_favorite(&saved.id).unwrap();
        assert_eq!(first, Some(true));

        let second = db.toggle_favorite(&saved.id).unwrap();
        assert_eq!(second, Some(false));

        let trip = db.get_trip(&saved.id).unwrap().unwrap();
        assert!(!trip.favorite);
    }

    #[test]
    fn toggle_favorite_unknown_id_returns_none() {
        let db = test_db();
        assert_eq!(db.toggle_favorite("missing").unwrap(), None);
    }

    #[test]
    fn set_tags_and_notes() {
        let db = test_db();
        let saved = db.save_trip(&sample_trip("user-1", "Annotate")).unwrap();

        let tags = vec!["food".to_string(), "spring".to_string()];
        assert!(db.set_tags(&saved.id, &tags).unwrap());
        assert!(db.set_notes(&saved.id, "book the tram early").unwrap());

        let trip = db.get_trip(&saved.id).unwrap().unwrap();
        assert_eq!(trip.tags, tags);
        assert_eq!(trip.notes, "book the tram early");

        assert!(!db.set_tags("missing", &tags).unwrap());
        assert!(!db.set_notes("missing", "x").unwrap());
    }

    #[test]
    fn delete_trip_removes_exactly_one_record() {
        let db = test_db();
        let a = db.save_trip(&sample_trip("user-1", "Keep")).unwrap();
        let b = db.save_trip(&sample_trip("user-1", "Drop")).unwrap();

        assert!(db.delete_trip(&b.id).unwrap());

        let trips = db.list_trips("user-1").unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].id, a.id);

        // Deleting again is a no-op
        assert!(!db.delete_trip(&b.id).unwrap());
    }

    #[test]
    fn delete_trip_no_op_on_nonexistent_id() {
        let db = test_db();
        assert!(!db.delete_trip("never-existed").unwrap());
    }

    // ------------------------------------------------------------------
    // Key-value state
    // ------------------------------------------------------------------

    #[test]
    fn save_and_load_state_round_trip() {
        let db = test_db();
        let value = json!({"intent": "pi_123", "status": "pending"});

        db.save_state("payment:pi_123", &value).unwrap();

        let loaded = db.load_state("payment:pi_123").unwrap();
        assert_eq!(loaded, Some(value));
    }

    #[test]
    fn load_state_returns_none_for_missing_key() {
        let db = test_db();
        assert!(db.load_state("nonexistent").unwrap().is_none());
    }

    #[test]
    fn save_state_overwrites_previous_value() {
        let db = test_db();
        db.save_state("key", &json!(1)).unwrap();
        db.save_state("key", &json!(2)).unwrap();

        let loaded = db.load_state("key").unwrap();
        assert_eq!(loaded, Some(json!(2)));
    }
}
