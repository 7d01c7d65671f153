// Hand-written fallback itineraries used when no Anthropic key is
// configured or the live call fails.
//
// The theme is chosen by crude keyword matching on the destination
// string: a handful of canned itinerary skeletons, sized to the
// requested duration.

use serde_json::{json, Value};

use super::TripRequest;

// ---------------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------------

/// The canned itinerary families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Beach,
    Mountain,
    City,
    Generic,
}

const BEACH_KEYWORDS: &[&str] = &[
    "beach", "island", "bali", "maldives", "hawaii", "cancun", "phuket", "fiji", "santorini",
    "coast",
];

const MOUNTAIN_KEYWORDS: &[&str] = &[
    "mountain", "alps", "nepal", "himalaya", "andes", "rockies", "patagonia", "swiss",
    "ski", "trek",
];

const CITY_KEYWORDS: &[&str] = &[
    "tokyo", "paris", "london", "york", "rome", "barcelona", "berlin", "singapore",
    "amsterdam", "city",
];

/// Pick an itinerary theme by keyword matching on the destination string.
pub fn theme_for(destination: &str) -> Theme {
    let lower = destination.to_lowercase();
    if BEACH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Theme::Beach
    } else if MOUNTAIN_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Theme::Mountain
    } else if CITY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Theme::City
    } else {
        Theme::Generic
    }
}

// ---------------------------------------------------------------------------
// Itinerary assembly
// ---------------------------------------------------------------------------

/// Day-part activity templates per theme, cycled across the trip length.
fn day_templates(theme: Theme) -> &'static [(&'static str, &'static str, &'static str, &'static str, f64)] {
    match theme {
        Theme::Beach => &[
            ("Arrival and first swim", "Check in and walk the shoreline", "Swim and relax on the main beach", "Sunset dinner at a beachfront grill", 90.0),
            ("Out on the water", "Snorkeling or glass-bottom boat trip", "Beach club afternoon", "Fresh seafood at the harbor", 120.0),
            ("Island slow day", "Morning yoga or a long beach walk", "Visit a nearby fishing village", "Cocktails and live music", 70.0),
            ("Reef and reef life", "Diving or kayaking excursion", "Hammock time and a good book", "Barbecue night on the sand", 110.0),
        ],
        Theme::Mountain => &[
            ("Into the mountains", "Drive up and settle into the lodge", "Acclimatization walk with valley views", "Hearty dinner by the fire", 80.0),
            ("First summit day", "Guided day hike to a viewpoint", "Picnic above the treeline", "Stargazing from the terrace", 60.0),
            ("Alpine villages", "Cable car to the high station", "Explore a mountain village and its cheese cellar", "Local tavern dinner", 75.0),
            ("The long trail", "Full-day ridge hike", "Thermal baths to recover", "Early night before the descent", 65.0),
        ],
        Theme::City => &[
            ("Old town on foot", "Walking tour of the historic center", "Landmark visit and a museum", "Dinner in the liveliest quarter", 100.0),
            ("Markets and museums", "Morning market graze", "The museum you came for", "Rooftop bar with a skyline view", 95.0),
            ("Neighborhood day", "Coffee crawl through a residential quarter", "Parks, galleries, and bookshops", "Neighborhood bistro dinner", 85.0),
            ("Day-trip radius", "Short train to a nearby town", "Castle, cathedral, or coastline", "Late return and street food", 110.0),
        ],
        Theme::Generic => &[
            ("Getting oriented", "Arrive and explore near your stay", "Main sights at an easy pace", "Dinner at a well-loved local spot", 80.0),
            ("The essentials", "Top attraction before the crowds", "Lunch and a scenic walk", "Evening show or night market", 90.0),
            ("Local flavor", "Cooking class or food tour", "Free time for shopping", "Sunset viewpoint", 85.0),
            ("Further afield", "Half-day excursion outside town", "Return and relax", "Farewell dinner", 95.0),
        ],
    }
}

fn theme_summary(theme: Theme, destination: &str, days: u32) -> String {
    match theme {
        Theme::Beach => format!(
            "{days} unhurried days in {destination}: sand, reef trips, and seafood."
        ),
        Theme::Mountain => format!(
            "{days} days in {destination} built around trails, viewpoints, and mountain food."
        ),
        Theme::City => format!(
            "{days} days covering {destination}'s neighborhoods, museums, and food scene."
        ),
        Theme::Generic => format!(
            "A balanced {days}-day visit to {destination} mixing sights, food, and downtime."
        ),
    }
}

fn theme_tips(theme: Theme) -> Vec<&'static str> {
    match theme {
        Theme::Beach => vec![
            "Pack reef-safe sunscreen; many beach destinations require it.",
            "Book water excursions a day ahead through your accommodation.",
        ],
        Theme::Mountain => vec![
            "Weather turns fast above the treeline; carry a shell layer even on clear days.",
            "Start hikes early to be off exposed ridges by afternoon.",
        ],
        Theme::City => vec![
            "Buy a multi-day transit pass on arrival; it pays for itself by day two.",
            "Reserve the headline museum online to skip the ticket line.",
        ],
        Theme::Generic => vec![
            "Keep one afternoon unplanned for whatever you discover on day one.",
            "Carry a little cash; small vendors often don't take cards.",
        ],
    }
}

/// Budget tier multiplier applied to the template costs.
fn budget_multiplier(budget: &str) -> f64 {
    match budget.to_lowercase().as_str() {
        "budget" | "low" | "cheap" | "shoestring" => 0.6,
        "luxury" | "high" | "premium" => 2.0,
        _ => 1.0,
    }
}

/// Build a complete mock itinerary for the request. Always returns a
/// well-formed itinerary with exactly `duration_days` day entries
/// (minimum one).
pub fn mock_itinerary(req: &TripRequest) -> Value {
    let days = req.duration_days.max(1);
    let theme = theme_for(&req.destination);
    let templates = day_templates(theme);
    let multiplier = budget_multiplier(&req.budget);

    let mut day_entries = Vec::with_capacity(days as usize);
    let mut total = 0.0;
    for day in 1..=days {
        let (title, morning, afternoon, evening, base_cost) =
            templates[((day - 1) as usize) % templates.len()];
        let cost = (base_cost * multiplier).round();
        total += cost;
        day_entries.push(json!({
            "day": day,
            "title": title,
            "morning": morning,
            "afternoon": afternoon,
            "evening": evening,
            "estimated_cost_usd": cost,
        }));
    }

    json!({
        "destination": req.destination,
        "duration_days": days,
        "summary": theme_summary(theme, &req.destination, days),
        "days": day_entries,
        "tips": theme_tips(theme),
        "estimated_total_usd": total,
    })
}

/// Canned reply for the chat endpoint when no LLM is configured.
pub fn canned_chat_reply(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("weather") {
        "I can't check live weather right now, but the /api/weather endpoint returns a \
         forecast for any city on your itinerary."
            .to_string()
    } else if lower.contains("visa") {
        "Visa rules change often; check your government's travel advice for the destination \
         country before booking."
            .to_string()
    } else if lower.contains("pack") {
        "Pack around layers: one warm layer, one rain layer, and shoes you can walk all day \
         in cover most destinations."
            .to_string()
    } else {
        "I'm running without an AI backend right now, so I can only offer general advice: \
         tell me a destination and I can still search hotels, flights, and weather for it."
            .to_string()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn request(destination: &str, days: u32, budget: &str) -> TripRequest {
        TripRequest {
            destination: destination.to_string(),
            duration_days: days,
            budget: budget.to_string(),
            interests: vec![],
            notes: String::new(),
        }
    }

    #[test]
    fn theme_keyword_matching() {
        assert_eq!(theme_for("Bali, Indonesia"), Theme::Beach);
        assert_eq!(theme_for("the Swiss Alps"), Theme::Mountain);
        assert_eq!(theme_for("Tokyo"), Theme::City);
        assert_eq!(theme_for("New York"), Theme::City);
        assert_eq!(theme_for("Ulaanbaatar"), Theme::Generic);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(theme_for("MALDIVES"), Theme::Beach);
        assert_eq!(theme_for("PATAGONIA"), Theme::Mountain);
    }

    #[test]
    fn itinerary_has_requested_day_count() {
        for days in [1u32, 3, 7, 14] {
            let plan = mock_itinerary(&request("Rome", days, ""));
            assert_eq!(plan["duration_days"], days);
            assert_eq!(plan["days"].as_array().unwrap().len(), days as usize);
        }
    }

    #[test]
    fn zero_days_clamps_to_one() {
        let plan = mock_itinerary(&request("Rome", 0, ""));
        assert_eq!(plan["days"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn days_are_numbered_sequentially_and_costed() {
        let plan = mock_itinerary(&request("Lisbon city break", 5, ""));
        let days = plan["days"].as_array().unwrap();
        let mut total = 0.0;
        for (i, day) in days.iter().enumerate() {
            assert_eq!(day["day"], (i + 1) as u32);
            assert!(day["morning"].as_str().is_some_and(|s| !s.is_empty()));
            assert!(day["evening"].as_str().is_some_and(|s| !s.is_empty()));
            total += day["estimated_cost_usd"].as_f64().unwrap();
        }
        assert_eq!(plan["estimated_total_usd"].as_f64().unwrap(), total);
    }

    #[test]
    fn budget_tier_scales_costs() {
        let moderate = mock_itinerary(&request("Fiji", 3, "moderate"));
        let luxury = mock_itinerary(&request("Fiji", 3, "luxury"));
        let shoestring = mock_itinerary(&request("Fiji", 3, "budget"));

        let m = moderate["estimated_total_usd"].as_f64().unwrap();
        let l = luxury["estimated_total_usd"].as_f64().unwrap();
        let s = shoestring["estimated_total_usd"].as_f64().unwrap();
        assert!(l > m);
        assert!(s < m);
    }

    #[test]
    fn beach_itinerary_reads_like_a_beach_trip() {
        let plan = mock_itinerary(&request("Phuket, Thailand", 2, ""));
        let text = plan.to_string().to_lowercase();
        assert!(text.contains("beach") || text.contains("snorkel") || text.contains("swim"));
    }

    #[test]
    fn canned_chat_reply_varies_by_topic() {
        assert!(canned_chat_reply("What's the weather like?").contains("forecast"));
        assert!(canned_chat_reply("Do I need a visa?").contains("Visa"));
        assert!(canned_chat_reply("What should I pack?").contains("layers"));
        assert!(canned_chat_reply("hello").contains("general advice"));
    }
}
