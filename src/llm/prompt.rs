// Prompt templates for trip generation and the travel chat assistant.
//
// The trip prompt asks for strict JSON so the response can be parsed
// directly into the itinerary shape the UI renders. Numbers the client
// already knows (duration, budget tier) are stated up front so the model
// fills in places and activities rather than re-deriving the basics.

use super::TripRequest;

// ---------------------------------------------------------------------------
// System prompts
// ---------------------------------------------------------------------------

/// Return the static system prompt for itinerary generation calls.
pub fn trip_system_prompt() -> String {
    "You are a travel-planning assistant that produces day-by-day trip itineraries.\n\
     \n\
     Respond with a single JSON object and nothing else. No prose before or after,\n\
     no Markdown fences. The object must have this shape:\n\
     {\n\
       \"destination\": string,\n\
       \"duration_days\": number,\n\
       \"summary\": string,\n\
       \"days\": [ { \"day\": number, \"title\": string,\n\
                     \"morning\": string, \"afternoon\": string, \"evening\": string,\n\
                     \"estimated_cost_usd\": number } ],\n\
       \"tips\": [string],\n\
       \"estimated_total_usd\": number\n\
     }\n\
     \n\
     Keep each day concrete: real neighborhoods, sights, and dishes for the\n\
     destination. Respect the stated budget tier when picking activities."
        .to_string()
}

/// Return the static system prompt for the chat endpoint.
pub fn chat_system_prompt() -> String {
    "You are a friendly, concise travel assistant. Answer questions about \
     destinations, logistics, packing, visas, food, and local customs. \
     When the user has not named a destination, ask one clarifying question \
     rather than guessing."
        .to_string()
}

// ---------------------------------------------------------------------------
// Trip generation prompt
// ---------------------------------------------------------------------------

/// Build the user message for a trip-generation request.
pub fn build_trip_prompt(req: &TripRequest) -> String {
    let mut prompt = String::with_capacity(512);

    prompt.push_str(&format!(
        "Plan a {}-day trip to {}.\n",
        req.duration_days, req.destination
    ));

    if !req.budget.is_empty() {
        prompt.push_str(&format!("Budget tier: {}.\n", req.budget));
    }

    if !req.interests.is_empty() {
        prompt.push_str(&format!("Traveler interests: {}.\n", req.interests.join(", ")));
    }

    if !req.notes.is_empty() {
        prompt.push_str(&format!("Additional requests: {}\n", req.notes));
    }

    prompt.push_str("Return the itinerary as the JSON object described in the system prompt.");

    prompt
}

/// Build the user message for a chat turn, folding prior turns in as
/// alternating transcript lines.
pub fn build_chat_prompt(message: &str, history: &[(String, String)]) -> String {
    if history.is_empty() {
        return message.to_string();
    }

    let mut prompt = String::with_capacity(512);
    prompt.push_str("Conversation so far:\n");
    for (user_turn, assistant_turn) in history {
        prompt.push_str(&format!("Traveler: {user_turn}\n"));
        prompt.push_str(&format!("Assistant: {assistant_turn}\n"));
    }
    prompt.push_str(&format!("\nTraveler: {message}"));
    prompt
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
