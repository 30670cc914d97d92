use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Currency symbol prefixed to every extracted price
pub const RUPEE: &str = "₹";

/// Travel agency a listing comes from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    Booking,
    Agoda,
    Goibibo,
}

impl Site {
    pub const ALL: [Site; 3] = [Site::Booking, Site::Agoda, Site::Goibibo];

    /// Lowercase identifier used in diagnostics and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Booking => "booking",
            Site::Agoda => "agoda",
            Site::Goibibo => "goibibo",
        }
    }

    /// Capitalised name used as a heading
    pub fn title(&self) -> &'static str {
        match self {
            Site::Booking => "Booking",
            Site::Agoda => "Agoda",
            Site::Goibibo => "Goibibo",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check-in / check-out pair, check-in strictly before check-out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    checkin: NaiveDate,
    checkout: NaiveDate,
}

impl DateRange {
    pub fn new(checkin: NaiveDate, checkout: NaiveDate) -> Result<Self> {
        if checkout <= checkin {
            return Err(Error::InvalidDateRange { checkin, checkout });
        }
        Ok(Self { checkin, checkout })
    }

    pub fn checkin(&self) -> NaiveDate {
        self.checkin
    }

    pub fn checkout(&self) -> NaiveDate {
        self.checkout
    }

    /// Length of stay in whole days (always >= 1)
    pub fn nights(&self) -> i64 {
        (self.checkout - self.checkin).num_days()
    }
}

/// Guests and rooms requested from every agency
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Occupancy {
    pub adults: u32,
    pub children: u32,
    pub rooms: u32,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self {
            adults: 2,
            children: 0,
            rooms: 1,
        }
    }
}

/// A fully built deep link into one agency's booking flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteQuery {
    pub site: Site,
    pub url: String,
}

/// Room name -> price string (already prefixed with the rupee sign)
pub type RoomPrices = BTreeMap<String, String>;

/// One validated room/price pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRecord {
    pub room: String,
    pub price: String,
}

impl PriceRecord {
    /// Trims both parts and prefixes the price with the rupee sign.
    /// Returns `None` if either part is blank.
    pub fn new(room: &str, price: &str) -> Option<Self> {
        let room = room.trim();
        let price = price.trim();
        if room.is_empty() || price.is_empty() {
            return None;
        }
        Some(Self {
            room: room.to_string(),
            price: format!("{}{}", RUPEE, price),
        })
    }
}

/// Pipeline stage a diagnostic is attributed to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Scrape,
    Extract,
}

/// User-visible, non-fatal failure for one site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub site: Site,
    pub stage: Stage,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.stage {
            Stage::Scrape => "SCRAPE ERROR",
            Stage::Extract => "EXTRACT ERROR",
        };
        write!(f, "[{}] {}: {}", tag, self.site, self.message)
    }
}

/// What happened to one site during a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SiteOutcome {
    Success(RoomPrices),
    EmptyResult,
    FetchFailed(String),
    ExtractFailed(String),
}

impl SiteOutcome {
    /// Wraps parsed prices, collapsing an empty mapping to `EmptyResult`
    pub fn from_prices(prices: RoomPrices) -> Self {
        if prices.is_empty() {
            SiteOutcome::EmptyResult
        } else {
            SiteOutcome::Success(prices)
        }
    }

    pub fn diagnostic(&self, site: Site) -> Option<Diagnostic> {
        let (stage, message) = match self {
            SiteOutcome::FetchFailed(reason) => (Stage::Scrape, reason),
            SiteOutcome::ExtractFailed(reason) => (Stage::Extract, reason),
            _ => return None,
        };
        Some(Diagnostic {
            site,
            stage,
            message: message.clone(),
        })
    }
}

/// Terminal artifact of a run: one outcome per attempted site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    outcomes: BTreeMap<Site, SiteOutcome>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, site: Site, outcome: SiteOutcome) {
        self.outcomes.insert(site, outcome);
    }

    pub fn outcome(&self, site: Site) -> Option<&SiteOutcome> {
        self.outcomes.get(&site)
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (Site, &SiteOutcome)> {
        self.outcomes.iter().map(|(site, outcome)| (*site, outcome))
    }

    /// Site -> room prices; failed and empty sites map to an empty mapping
    pub fn prices(&self) -> BTreeMap<Site, RoomPrices> {
        self.outcomes
            .iter()
            .map(|(site, outcome)| {
                let prices = match outcome {
                    SiteOutcome::Success(prices) => prices.clone(),
                    _ => RoomPrices::new(),
                };
                (*site, prices)
            })
            .collect()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.outcomes
            .iter()
            .filter_map(|(site, outcome)| outcome.diagnostic(*site))
            .collect()
    }
}

impl Serialize for ResultSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ResultSet", 2)?;
        state.serialize_field("prices", &self.prices())?;
        state.serialize_field("diagnostics", &self.diagnostics())?;
        state.end()
    }
}
