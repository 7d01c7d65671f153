// AI trip generation and travel chat.

pub mod client;
pub mod mock;
pub mod prompt;

use serde::Deserialize;

/// Parameters for generating a trip itinerary.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub duration_days: u32,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Free-form extra instructions from the user.
    #[serde(default)]
    pub notes: String,
}
