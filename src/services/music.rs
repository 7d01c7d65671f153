// Music discovery wrapper.
//
// Live path speaks the Spotify Web API with client-credentials OAuth.
// The bearer token is fetched once and cached behind an async mutex
// until shortly before expiry. Without credentials every endpoint
// serves curated fallback playlists.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_secs: u32,
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub description: String,
    pub tracks: Vec<Track>,
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

pub struct MusicClient {
    http: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    token: Mutex<Option<CachedToken>>,
}

impl MusicClient {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            token: Mutex::new(None),
        }
    }

    fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    /// A valid bearer token, refreshing through the client-credentials
    /// grant when the cached one is missing or near expiry.
    async fn bearer_token(&self) -> anyhow::Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            // Refresh a minute early so in-flight requests don't race expiry.
            if cached.expires_at > Utc::now() + Duration::seconds(60) {
                return Ok(cached.access_token.clone());
            }
        }

        let (Some(id), Some(secret)) = (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            anyhow::bail!("music credentials not configured");
        };

        let body: Value = self
            .http
            .post(TOKEN_URL)
            .basic_auth(id, Some(secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("token response missing access_token"))?
            .to_string();
        let expires_in = body
            .get("expires_in")
            .and_then(Value::as_i64)
            .unwrap_or(3600);

        *guard = Some(CachedToken {
            access_token: access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(expires_in),
        });
        Ok(access_token)
    }

    /// Free-text track search. Never fails; degrades to fallback tracks.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<Track> {
        if !self.has_credentials() {
            debug!("no music credentials; serving fallback tracks");
            return fallback_tracks(query, limit);
        }

        match self.search_live(query, limit).await {
            Ok(tracks) if !tracks.is_empty() => tracks,
            Ok(_) => fallback_tracks(query, limit),
            Err(e) => {
                warn!("music search failed: {e}; serving fallback tracks");
                fallback_tracks(query, limit)
            }
        }
    }

    async fn search_live(&self, query: &str, limit: usize) -> anyhow::Result<Vec<Track>> {
        let token = self.bearer_token().await?;
        let body: Value = self
            .http
            .get(format!("{API_BASE}/search"))
            .bearer_auth(token)
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reshape_tracks(&body))
    }

    /// Travel-themed recommendations for a destination.
    pub async fn recommendations(&self, destination: &str, limit: usize) -> Vec<Track> {
        self.search(&format!("{destination} travel"), limit).await
    }

    /// A general popular-tracks list.
    pub async fn popular(&self, limit: usize) -> Vec<Track> {
        self.search("top hits", limit).await
    }

    /// Tracks matching a mood keyword.
    pub async fn by_mood(&self, mood: &str, limit: usize) -> Vec<Track> {
        if !self.has_credentials() {
            debug!("no music credentials; serving fallback mood tracks");
            return fallback_mood_tracks(mood, limit);
        }
        match self.search_live(&format!("{mood} mood"), limit).await {
            Ok(tracks) if !tracks.is_empty() => tracks,
            Ok(_) => fallback_mood_tracks(mood, limit),
            Err(e) => {
                warn!("music mood search failed: {e}; serving fallback tracks");
                fallback_mood_tracks(mood, limit)
            }
        }
    }

    /// Assemble a named playlist for a user, seeded from a destination's
    /// recommendations when one is given and from the popular list
    /// otherwise. Not persisted upstream; the caller gets a complete
    /// local object with a mock playlist id.
    pub async fn create_playlist(
        &self,
        name: &str,
        user_id: &str,
        destination: Option<&str>,
    ) -> Playlist {
        let (tracks, description) = match destination {
            Some(destination) => (
                self.recommendations(destination, 10).await,
                format!("Road trip mix for {destination}"),
            ),
            None => (self.popular(10).await, "Travel mix".to_string()),
        };
        Playlist {
            id: format!("playlist-{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            user_id: user_id.to_string(),
            description,
            tracks,
        }
    }
}

fn reshape_tracks(body: &Value) -> Vec<Track> {
    let Some(items) = body
        .get("tracks")
        .and_then(|t| t.get("items"))
        .and_then(Value::as_array)
    else {
        return vec![];
    };

    items
        .iter()
        .filter_map(|item| {
            Some(Track {
                id: item.get("id")?.as_str()?.to_string(),
                title: item.get("name")?.as_str()?.to_string(),
                artist: item
                    .get("artists")
                    .and_then(Value::as_array)
                    .and_then(|a| a.first())
                    .and_then(|a| a.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown")
                    .to_string(),
                album: item
                    .get("album")
                    .and_then(|a| a.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                duration_secs: (item
                    .get("duration_ms")
                    .and_then(Value::as_u64)
                    .unwrap_or(210_000)
                    / 1000) as u32,
                preview_url: item
                    .get("preview_url")
                    .and_then(Value::as_str)
                    .map(String::from),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fallback data
// ---------------------------------------------------------------------------

const FALLBACK_TRACKS: &[(&str, &str, &str, u32)] = &[
    ("Open Road", "The Wanderers", "Miles Ahead", 214),
    ("Golden Coastline", "Luna Tide", "Saltwater", 198),
    ("Midnight Terminal", "Jet Set Echo", "Departures", 243),
    ("Paper Maps", "Harbor Lights", "Northbound", 187),
    ("Sunrise Layover", "The Wanderers", "Miles Ahead", 226),
    ("Cobblestone Waltz", "Vieux Quartier", "Old Town", 201),
    ("Desert Frequency", "Dune Radio", "Mirage", 255),
    ("Last Ferry Home", "Harbor Lights", "Northbound", 232),
    ("Window Seat", "Luna Tide", "Saltwater", 195),
    ("Passport Stamps", "Jet Set Echo", "Departures", 209),
];

const MOOD_TRACKS: &[(&str, &[(&str, &str, &str, u32)])] = &[
    (
        "relaxed",
        &[
            ("Slow Tide", "Luna Tide", "Saltwater", 248),
            ("Hammock Hours", "Palm Court", "Shade", 231),
            ("Quiet Harbor", "Harbor Lights", "Northbound", 219),
        ],
    ),
    (
        "energetic",
        &[
            ("Runway Sprint", "Jet Set Echo", "Departures", 182),
            ("City Pulse", "Neon Transit", "Rush Hour", 176),
            ("Switchback", "Dune Radio", "Mirage", 191),
        ],
    ),
    (
        "romantic",
        &[
            ("Two Tickets", "Vieux Quartier", "Old Town", 227),
            ("Candlelit Plaza", "Palm Court", "Shade", 240),
            ("Harbor Moon", "Harbor Lights", "Northbound", 235),
        ],
    ),
    (
        "adventurous",
        &[
            ("Off the Map", "The Wanderers", "Miles Ahead", 203),
            ("Ridge Line", "Dune Radio", "Mirage", 217),
            ("No Return Ticket", "Neon Transit", "Rush Hour", 194),
        ],
    ),
];

fn build_tracks(prefix: &str, rows: &[(&str, &str, &str, u32)], limit: usize) -> Vec<Track> {
    rows.iter()
        .take(limit.max(1))
        .enumerate()
        .map(|(i, &(title, artist, album, duration))| Track {
            id: format!("{prefix}-{i}"),
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            duration_secs: duration,
            preview_url: None,
        })
        .collect()
}

/// Fallback search results: a shuffled slice of the curated list.
pub fn fallback_tracks(_query: &str, limit: usize) -> Vec<Track> {
    let mut rng = rand::thread_rng();
    let start = rng.gen_range(0..FALLBACK_TRACKS.len());
    let rotated: Vec<_> = FALLBACK_TRACKS
        .iter()
        .cycle()
        .skip(start)
        .take(FALLBACK_TRACKS.len())
        .copied()
        .collect();
    build_tracks("track", &rotated, limit.min(FALLBACK_TRACKS.len()))
}

/// Fallback mood tracks. Unknown moods get the general list.
pub fn fallback_mood_tracks(mood: &str, limit: usize) -> Vec<Track> {
    let lower = mood.trim().to_lowercase();
    match MOOD_TRACKS.iter().find(|(name, _)| *name == lower) {
        Some((name, rows)) => build_tracks(&format!("mood-{name}"), rows, limit),
        None => fallback_tracks(mood, limit),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unkeyed() -> MusicClient {
        MusicClient::new(None, None)
    }

    #[tokio::test]
    async fn unkeyed_search_returns_fallback() {
        let tracks = unkeyed().search("beach vibes", 5).await;
        assert_eq!(tracks.len(), 5);
        for track in &tracks {
            assert!(!track.title.is_empty());
            assert!(track.duration_secs > 60);
        }
    }

    #[tokio::test]
    async fn known_mood_gets_themed_tracks() {
        let tracks = unkeyed().by_mood("Relaxed", 3).await;
        assert_eq!(tracks.len(), 3);
        assert!(tracks.iter().any(|t| t.title == "Slow Tide"));
    }

    #[tokio::test]
    async fn unknown_mood_falls_back_to_general_list() {
        let tracks = unkeyed().by_mood("melancholic", 4).await;
        assert_eq!(tracks.len(), 4);
    }

    #[tokio::test]
    async fn playlist_is_named_and_owned() {
        let playlist = unkeyed()
            .create_playlist("Lisbon Mix", "user-7", Some("Lisbon"))
            .await;
        assert_eq!(playlist.name, "Lisbon Mix");
        assert_eq!(playlist.user_id, "user-7");
        assert!(playlist.id.starts_with("playlist-"));
        assert!(!playlist.tracks.is_empty());
        assert!(playlist.description.contains("Lisbon"));
    }

    #[tokio::test]
    async fn playlist_without_destination_uses_popular_tracks() {
        let playlist = unkeyed().create_playlist("My Mix", "user-7", None).await;
        assert_eq!(playlist.user_id, "user-7");
        assert!(!playlist.tracks.is_empty());
        assert_eq!(playlist.description, "Travel mix");
    }

    #[tokio::test]
    async fn bearer_token_without_credentials_errors() {
        let err = unkeyed().bearer_token().await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn reshape_maps_search_payload() {
        let body = serde_json::json!({
            "tracks": { "items": [{
                "id": "abc123",
                "name": "Song A",
                "artists": [{ "name": "Artist A" }],
                "album": { "name": "Album A" },
                "duration_ms": 215000,
                "preview_url": "https://p.example/a.mp3"
            }]}
        });
        let tracks = reshape_tracks(&body);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].artist, "Artist A");
        assert_eq!(tracks[0].duration_secs, 215);
        assert!(tracks[0].preview_url.is_some());
    }

    #[test]
    fn reshape_handles_missing_items() {
        assert!(reshape_tracks(&serde_json::json!({})).is_empty());
    }

    #[test]
    fn fallback_limit_clamped_to_catalog() {
        assert_eq!(fallback_tracks("x", 50).len(), FALLBACK_TRACKS.len());
        assert_eq!(fallback_tracks("x", 0).len(), 1);
    }
}
