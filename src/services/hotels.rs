// Hotel search wrapper.
//
// Live path targets a hotel aggregator API; without a credential (or on
// any upstream failure) it serves a themed fallback list with lightly
// randomized nightly prices.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

const HOTELS_API_URL: &str = "https://api.makcorps.com/city";

/// A hotel search result in the shape the UI renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub destination: String,
    pub rating: f64,
    pub price_per_night_usd: f64,
    pub currency: String,
    pub amenities: Vec<String>,
    pub distance_from_center_km: f64,
}

/// Search parameters accepted by both the GET and POST hotel endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct HotelQuery {
    pub destination: String,
    #[serde(default)]
    pub check_in: String,
    #[serde(default)]
    pub check_out: String,
    #[serde(default = "default_guests")]
    pub guests: u32,
}

fn default_guests() -> u32 {
    2
}

pub struct HotelsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    result_count: usize,
}

impl HotelsClient {
    pub fn new(api_key: Option<String>, result_count: usize) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            result_count,
        }
    }

    /// Search hotels for a destination. Never fails; degrades to fallback
    /// data without a credential or on upstream errors.
    pub async fn search(&self, query: &HotelQuery) -> Vec<Hotel> {
        let Some(key) = self.api_key.as_deref() else {
            debug!("no hotels credential; serving fallback data");
            return fallback_hotels(&query.destination, self.result_count);
        };

        match self.search_live(key, query).await {
            Ok(hotels) if !hotels.is_empty() => hotels,
            Ok(_) => {
                debug!("upstream returned no hotels; serving fallback data");
                fallback_hotels(&query.destination, self.result_count)
            }
            Err(e) => {
                warn!("hotel search failed: {e}; serving fallback data");
                fallback_hotels(&query.destination, self.result_count)
            }
        }
    }

    /// Look up one hotel by id. Fallback ids are deterministic per
    /// destination, so a fallback id from a prior search resolves.
    pub async fn get(&self, id: &str) -> Option<Hotel> {
        // Fallback ids encode the destination: "hotel-<slug>-<n>".
        if let Some(hotel) = fallback_hotel_by_id(id) {
            return Some(hotel);
        }

        let key = self.api_key.as_deref()?;
        match self.get_live(key, id).await {
            Ok(hotel) => hotel,
            Err(e) => {
                warn!("hotel lookup failed: {e}");
                None
            }
        }
    }

    async fn search_live(&self, key: &str, query: &HotelQuery) -> anyhow::Result<Vec<Hotel>> {
        let response = self
            .http
            .get(HOTELS_API_URL)
            .query(&[
                ("api_key", key),
                ("cityid", query.destination.as_str()),
                ("checkin", query.check_in.as_str()),
                ("checkout", query.check_out.as_str()),
                ("adults", &query.guests.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        Ok(reshape_hotels(&body, &query.destination))
    }

    async fn get_live(&self, key: &str, id: &str) -> anyhow::Result<Option<Hotel>> {
        let response = self
            .http
            .get(format!("{HOTELS_API_URL}/{id}"))
            .query(&[("api_key", key)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: Value = response.error_for_status()?.json().await?;
        Ok(reshape_hotels(&body, "").into_iter().next())
    }
}

/// Reshape an upstream hotel payload into `Hotel` records. Unknown or
/// partial entries are skipped rather than failing the whole response.
fn reshape_hotels(body: &Value, destination: &str) -> Vec<Hotel> {
    let Some(items) = body
        .get("hotels")
        .or_else(|| body.get("results"))
        .and_then(Value::as_array)
    else {
        return vec![];
    };

    items
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?.to_string();
            Some(Hotel {
                id: item
                    .get("id")
                    .map(|v| v.to_string().trim_matches('"').to_string())
                    .unwrap_or_else(|| name.to_lowercase().replace(' ', "-")),
                name,
                destination: destination.to_string(),
                rating: item.get("rating").and_then(Value::as_f64).unwrap_or(4.0),
                price_per_night_usd: item
                    .get("price")
                    .and_then(Value::as_f64)
                    .unwrap_or(150.0),
                currency: "USD".to_string(),
                amenities: item
                    .get("amenities")
                    .and_then(Value::as_array)
                    .map(|a| {
                        a.iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default(),
                distance_from_center_km: item
                    .get("distance")
                    .and_then(Value::as_f64)
                    .unwrap_or(1.0),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Fallback data
// ---------------------------------------------------------------------------

/// Name templates the fallback list is built from.
const FALLBACK_HOTELS: &[(&str, f64, f64, &[&str])] = &[
    ("Grand Plaza Hotel", 4.6, 210.0, &["wifi", "pool", "spa", "restaurant"]),
    ("The Harbor View", 4.4, 175.0, &["wifi", "breakfast", "bar"]),
    ("Old Town Boutique Stay", 4.7, 195.0, &["wifi", "breakfast", "terrace"]),
    ("Central Station Inn", 4.1, 110.0, &["wifi", "24h-desk"]),
    ("Garden Courtyard Hotel", 4.3, 140.0, &["wifi", "garden", "parking"]),
    ("The Travelers Rest", 3.9, 85.0, &["wifi", "shared-kitchen"]),
    ("Skyline Suites", 4.8, 320.0, &["wifi", "gym", "rooftop-pool", "spa"]),
    ("Riverside Lodge", 4.2, 130.0, &["wifi", "bikes", "breakfast"]),
];

fn slug(destination: &str) -> String {
    destination
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect()
}

/// Build the fallback hotel list for a destination. Prices vary a little
/// on each call; ids are stable so `get` can resolve them later.
pub fn fallback_hotels(destination: &str, count: usize) -> Vec<Hotel> {
    let mut rng = rand::thread_rng();
    let slug = slug(destination);

    FALLBACK_HOTELS
        .iter()
        .take(count.min(FALLBACK_HOTELS.len()).max(1))
        .enumerate()
        .map(|(i, &(name, rating, base_price, amenities))| {
            // Vary price up to +/-15%.
            let jitter = rng.gen_range(-0.15..=0.15);
            Hotel {
                id: format!("hotel-{slug}-{i}"),
                name: name.to_string(),
                destination: destination.to_string(),
                rating,
                price_per_night_usd: (base_price * (1.0 + jitter)).round(),
                currency: "USD".to_string(),
                amenities: amenities.iter().map(|s| s.to_string()).collect(),
                distance_from_center_km: (i as f64) * 0.5 + 0.3,
            }
        })
        .collect()
}

/// Resolve a fallback id of the form `hotel-<slug>-<index>` back into a
/// hotel record. Returns `None` for ids that don't match the scheme.
fn fallback_hotel_by_id(id: &str) -> Option<Hotel> {
    let rest = id.strip_prefix("hotel-")?;
    let (slug, index) = rest.rsplit_once('-')?;
    let index: usize = index.parse().ok()?;
    let &(name, rating, base_price, amenities) = FALLBACK_HOTELS.get(index)?;
    Some(Hotel {
        id: id.to_string(),
        name: name.to_string(),
        destination: slug.replace('-', " "),
        rating,
        price_per_night_usd: base_price,
        currency: "USD".to_string(),
        amenities: amenities.iter().map(|s| s.to_string()).collect(),
        distance_from_center_km: (index as f64) * 0.5 + 0.3,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn query(destination: &str) -> HotelQuery {
        HotelQuery {
            destination: destination.to_string(),
            check_in: "2026-09-01".to_string(),
            check_out: "2026-09-05".to_string(),
            guests: 2,
        }
    }

    #[tokio::test]
    async fn unkeyed_search_returns_nonempty_fallback() {
        let client = HotelsClient::new(None, 6);
        let hotels = client.search(&query("Lisbon")).await;

        assert_eq!(hotels.len(), 6);
        for hotel in &hotels {
            assert!(!hotel.name.is_empty());
            assert!(hotel.price_per_night_usd > 0.0);
            assert!(hotel.rating > 0.0 && hotel.rating <= 5.0);
            assert_eq!(hotel.destination, "Lisbon");
            assert!(!hotel.amenities.is_empty());
        }
    }

    #[tokio::test]
    async fn fallback_ids_resolve_via_get() {
        let client = HotelsClient::new(None, 4);
        let hotels = client.search(&query("Porto")).await;

        let found = client.get(&hotels[0].id).await.unwrap();
        assert_eq!(found.name, hotels[0].name);
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let client = HotelsClient::new(None, 4);
        assert!(client.get("not-a-real-id").await.is_none());
        assert!(client.get("hotel-x-999").await.is_none());
    }

    #[test]
    fn fallback_count_is_clamped() {
        assert_eq!(fallback_hotels("X", 100).len(), FALLBACK_HOTELS.len());
        assert_eq!(fallback_hotels("X", 0).len(), 1);
    }

    #[test]
    fn fallback_prices_stay_within_jitter_band() {
        for _ in 0..20 {
            let hotels = fallback_hotels("Rome", 8);
            for (hotel, &(_, _, base, _)) in hotels.iter().zip(FALLBACK_HOTELS) {
                assert!(hotel.price_per_night_usd >= (base * 0.84).floor());
                assert!(hotel.price_per_night_usd <= (base * 1.16).ceil());
            }
        }
    }

    #[test]
    fn reshape_skips_partial_entries() {
        let body = serde_json::json!({
            "hotels": [
                { "name": "Real Hotel", "rating": 4.2, "price": 99.0 },
                { "rating": 5.0 },
            ]
        });
        let hotels = reshape_hotels(&body, "Lima");
        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].name, "Real Hotel");
        assert_eq!(hotels[0].destination, "Lima");
    }

    #[test]
    fn reshape_handles_missing_list() {
        let body = serde_json::json!({ "message": "quota exceeded" });
        assert!(reshape_hotels(&body, "Lima").is_empty());
    }
}
