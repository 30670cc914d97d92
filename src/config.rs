use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Occupancy, Site};

/// Fixed identifiers Goibibo needs in its deep link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoibiboIds {
    pub hotel_slug: String,
    pub hotel_id: String,
    pub mmt_id: String,
    pub city_code: String,
    pub city_name: String,
}

/// Everything that is fixed per agency: where to link and which rooms to ask for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Name used in the system instruction, e.g. "Booking"
    pub label: String,
    /// Name used in the extraction prompt, e.g. "Booking.com"
    pub source: String,
    pub base_url: String,
    /// Room names this agency uses for the hotel
    pub vocabulary: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goibibo: Option<GoibiboIds>,
}

fn rooms(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.trim().to_string()).collect()
}

impl SiteProfile {
    pub fn booking() -> Self {
        Self {
            label: "Booking".to_string(),
            source: "Booking.com".to_string(),
            base_url: "https://www.booking.com/hotel/in/goverdhan-greens-resort.en-gb.html"
                .to_string(),
            vocabulary: rooms(&[
                "Super Deluxe Room with Balcony",
                "Superior Double Room",
                "Deluxe King Room",
                "Deluxe Double Room",
                "Deluxe Family Room",
                "Two-Bedroom Villa",
                "Villa with Garden View",
                "Superior Villa",
            ]),
            goibibo: None,
        }
    }

    pub fn agoda() -> Self {
        Self {
            label: "Agoda".to_string(),
            source: "Agoda".to_string(),
            base_url: "https://www.agoda.com/goverdhan-greens/hotel/baradia-in.html".to_string(),
            vocabulary: rooms(&[
                "Superior Room",
                "Super Deluxe Room with Balcony",
                "Super Deluxe Room",
                "Deluxe Dbl",
                "Family Deluxe",
                "Standard Villa 2 Bedroom",
                "Standard Villa Garden View",
                "Villa - 4-Bedroom",
                "Superior Villa",
            ]),
            goibibo: None,
        }
    }

    pub fn goibibo() -> Self {
        Self {
            label: "Goibibo".to_string(),
            source: "Goibibo".to_string(),
            base_url: "https://www.goibibo.com/hotels".to_string(),
            vocabulary: rooms(&[
                "Super Delux Balcony Room",
                "Superior Rooms",
                "Deluxe Room with Balcony",
                "Super Deluxe Rooms",
            ]),
            goibibo: Some(GoibiboIds {
                hotel_slug: "goverdhan-greens-hotel-in-dwarka".to_string(),
                hotel_id: "2259653877757301726".to_string(),
                mmt_id: "201203212233088600".to_string(),
                city_code: "CTXOP".to_string(),
                city_name: "Dwarka".to_string(),
            }),
        }
    }
}

/// Per-site profiles keyed by site
pub type SiteCatalog = BTreeMap<Site, SiteProfile>;

pub fn default_catalog() -> SiteCatalog {
    BTreeMap::from([
        (Site::Booking, SiteProfile::booking()),
        (Site::Agoda, SiteProfile::agoda()),
        (Site::Goibibo, SiteProfile::goibibo()),
    ])
}

/// Runtime settings for one pipeline run
#[derive(Debug, Clone)]
pub struct Settings {
    pub occupancy: Occupancy,
    pub currency: String,
    pub catalog: SiteCatalog,
    pub nav_timeout: Duration,
    pub settle_delay: Duration,
    pub model: String,
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            occupancy: Occupancy::default(),
            currency: "INR".to_string(),
            catalog: default_catalog(),
            nav_timeout: Duration::from_secs(90),
            settle_delay: Duration::from_secs(5),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
        }
    }
}

impl Settings {
    /// Defaults overridden by the process environment (and `.env`, if present)
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.trim().is_empty()) {
            settings.model = model.trim().to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "RATE_SCOUT_NAV_TIMEOUT_SECS")? {
            settings.nav_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "RATE_SCOUT_SETTLE_SECS")? {
            settings.settle_delay = Duration::from_secs(secs);
        }
        if let Some(temperature) = parse_var::<f32>(&lookup, "RATE_SCOUT_TEMPERATURE")? {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::Config(format!(
                    "RATE_SCOUT_TEMPERATURE must be between 0 and 2, got {}",
                    temperature
                )));
            }
            settings.temperature = temperature;
        }

        Ok(settings)
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", key, raw))),
    }
}
