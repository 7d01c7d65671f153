// Local events wrapper.
//
// Live path targets the Ticketmaster Discovery API; the fallback is a
// generated set of plausible events spread over the coming weeks.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const EVENTS_API_URL: &str = "https://app.ticketmaster.com/discovery/v2/events.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub category: String,
    pub venue: String,
    pub city: String,
    pub date: String,
    pub price_from_usd: Option<f64>,
    pub url: Option<String>,
}

pub struct EventsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    result_count: usize,
}

impl EventsClient {
    pub fn new(api_key: Option<String>, result_count: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            result_count,
        }
    }

    /// Events in a city, optionally filtered by keyword. Never fails;
    /// degrades to generated listings.
    pub async fn search(&self, city: &str, keyword: Option<&str>) -> Vec<Event> {
        let Some(key) = self.api_key.as_deref() else {
            debug!("no events credential; serving generated listings");
            return fallback_events(city, self.result_count);
        };

        match self.search_live(key, city, keyword).await {
            Ok(events) if !events.is_empty() => events,
            Ok(_) => {
                debug!("upstream returned no events; serving generated listings");
                fallback_events(city, self.result_count)
            }
            Err(e) => {
                warn!("event search failed: {e}; serving generated listings");
                fallback_events(city, self.result_count)
            }
        }
    }

    async fn search_live(
        &self,
        key: &str,
        city: &str,
        keyword: Option<&str>,
    ) -> anyhow::Result<Vec<Event>> {
        let mut params = vec![
            ("apikey", key.to_string()),
            ("city", city.to_string()),
            ("size", self.result_count.to_string()),
        ];
        if let Some(keyword) = keyword {
            params.push(("keyword", keyword.to_string()));
        }

        let body: Value = self
            .http
            .get(EVENTS_API_URL)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reshape_events(&body, city))
    }
}

fn reshape_events(body: &Value, city: &str) -> Vec<Event> {
    let Some(items) = body
        .get("_embedded")
        .and_then(|e| e.get("events"))
        .and_then(Value::as_array)
    else {
        return vec![];
    };

    items
        .iter()
        .filter_map(|item| {
            Some(Event {
                id: item.get("id")?.as_str()?.to_string(),
                name: item.get("name")?.as_str()?.to_string(),
                category: item
                    .get("classifications")
                    .and_then(Value::as_array)
                    .and_then(|c| c.first())
                    .and_then(|c| c.get("segment"))
                    .and_then(|s| s.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or("Other")
                    .to_string(),
                venue: item
                    .get("_embedded")
                    .and_then(|e| e.get("venues"))
                    .and_then(Value::as_array)
                    .and_then(|v| v.first())
                    .and_then(|v| v.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or("TBA")
                    .to_string(),
                city: city.to_string(),
                date: item
                    .get("dates")
                    .and_then(|d| d.get("start"))
                    .and_then(|s| s.get("localDate"))
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                price_from_usd: item
                    .get("priceRanges")
                    .and_then(Value::as_array)
                    .and_then(|p| p.first())
                    .and_then(|p| p.get("min"))
                    .and_then(Value::as_f64),
                url: item.get("url").and_then(Value::as_str).map(String::from),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fallback data
// ---------------------------------------------------------------------------

const FALLBACK_EVENTS: &[(&str, &str, &str)] = &[
    ("Summer Jazz Nights", "Music", "Riverside Amphitheater"),
    ("Street Food Festival", "Food & Drink", "Market Square"),
    ("Contemporary Art Open House", "Arts & Theatre", "City Gallery"),
    ("Derby Night: Local Football", "Sports", "Municipal Stadium"),
    ("Indie Film Showcase", "Film", "The Grand Cinema"),
    ("Craft Makers Market", "Market", "Old Harbor Warehouse"),
    ("Symphony Under the Stars", "Music", "Botanical Gardens"),
    ("Comedy Night Live", "Comedy", "The Cellar Club"),
];

/// Generate event listings spread over the next six weeks.
pub fn fallback_events(city: &str, count: usize) -> Vec<Event> {
    let mut rng = rand::thread_rng();
    let today = chrono::Utc::now().date_naive();

    FALLBACK_EVENTS
        .iter()
        .take(count.min(FALLBACK_EVENTS.len()).max(1))
        .enumerate()
        .map(|(i, &(name, category, venue))| {
            let offset = rng.gen_range(1..=42);
            Event {
                id: format!("event-{i}"),
                name: name.to_string(),
                category: category.to_string(),
                venue: venue.to_string(),
                city: city.to_string(),
                date: (today + chrono::Duration::days(offset)).to_string(),
                price_from_usd: Some(rng.gen_range(10..80) as f64),
                url: None,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unkeyed_search_returns_generated_listings() {
        let client = EventsClient::new(None, 6);
        let events = client.search("Barcelona", None).await;

        assert_eq!(events.len(), 6);
        for event in &events {
            assert!(!event.name.is_empty());
            assert_eq!(event.city, "Barcelona");
            assert!(event.price_from_usd.unwrap() >= 10.0);
            assert!(!event.date.is_empty());
        }
    }

    #[test]
    fn fallback_dates_are_in_the_future() {
        let today = chrono::Utc::now().date_naive().to_string();
        let events = fallback_events("Oslo", 8);
        assert!(events.iter().all(|e| e.date > today));
    }

    #[test]
    fn fallback_count_is_clamped() {
        assert_eq!(fallback_events("X", 0).len(), 1);
        assert_eq!(fallback_events("X", 100).len(), FALLBACK_EVENTS.len());
    }

    #[test]
    fn reshape_maps_discovery_payload() {
        let body = serde_json::json!({
            "_embedded": { "events": [{
                "id": "tm1",
                "name": "Big Concert",
                "url": "https://tm.example/e/tm1",
                "classifications": [{ "segment": { "name": "Music" } }],
                "dates": { "start": { "localDate": "2026-10-01" } },
                "priceRanges": [{ "min": 35.0 }],
                "_embedded": { "venues": [{ "name": "Arena One" }] }
            }]}
        });
        let events = reshape_events(&body, "Madrid");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].venue, "Arena One");
        assert_eq!(events[0].category, "Music");
        assert_eq!(events[0].price_from_usd, Some(35.0));
    }

    #[test]
    fn reshape_handles_empty_payload() {
        assert!(reshape_events(&serde_json::json!({}), "Madrid").is_empty());
    }
}
