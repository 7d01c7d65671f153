// Service wrappers around third-party travel APIs.
//
// Every wrapper follows the same shape: build a query from the inputs,
// call the upstream REST API with reqwest, reshape the JSON into local
// structs, and on any failure or missing credential return well-typed
// fallback data so the API surface keeps working offline.

pub mod cars;
pub mod esim;
pub mod events;
pub mod flights;
pub mod hotels;
pub mod music;
pub mod payments;
pub mod translation;
pub mod weather;

use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;

/// All service wrappers, constructed once at startup and shared by the
/// route handlers.
pub struct Services {
    pub hotels: hotels::HotelsClient,
    pub flights: flights::FlightsClient,
    pub cars: cars::CarsClient,
    pub weather: weather::WeatherClient,
    pub translation: translation::TranslationClient,
    pub music: music::MusicClient,
    pub esim: esim::EsimClient,
    pub events: events::EventsClient,
    pub payments: payments::PaymentsClient,
}

impl Services {
    pub fn from_config(config: &Config, db: Arc<Database>) -> Self {
        let creds = &config.credentials;
        let count = config.fallback.result_count;
        Services {
            hotels: hotels::HotelsClient::new(creds.hotels_api_key.clone(), count),
            flights: flights::FlightsClient::new(creds.flights_api_key.clone(), count),
            cars: cars::CarsClient::new(creds.cars_api_key.clone(), count),
            weather: weather::WeatherClient::new(creds.weather_api_key.clone()),
            translation: translation::TranslationClient::new(creds.translation_api_key.clone()),
            music: music::MusicClient::new(
                creds.music_client_id.clone(),
                creds.music_client_secret.clone(),
            ),
            esim: esim::EsimClient::new(creds.esim_api_key.clone()),
            events: events::EventsClient::new(creds.events_api_key.clone(), count),
            payments: payments::PaymentsClient::new(creds.payments_api_key.clone(), db),
        }
    }
}
