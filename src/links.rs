use chrono::NaiveDate;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::collections::BTreeMap;
use std::io;

use crate::config::{GoibiboIds, SiteProfile, Settings};
use crate::error::{Error, Result};
use crate::models::{DateRange, Occupancy, Site, SiteQuery};

/// Characters left alone when encoding a query fragment (unreserved plus '/')
const QUERY_FRAGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Site -> deep link, iterated in `Site` order
pub type SiteLinks = BTreeMap<Site, String>;

/// Goibibo's `hquery` payload. Field order fixes the serialized key order.
#[derive(Serialize)]
struct HotelQuery {
    ci: String,
    co: String,
    r: String,
    ibp: &'static str,
}

/// Validates the dates and builds one link per configured site
pub fn build_links(checkin: NaiveDate, checkout: NaiveDate, settings: &Settings) -> Result<SiteLinks> {
    let range = DateRange::new(checkin, checkout)?;
    build_links_for(&range, settings)
}

pub fn build_links_for(range: &DateRange, settings: &Settings) -> Result<SiteLinks> {
    let mut links = SiteLinks::new();
    for (site, profile) in &settings.catalog {
        let query = build_site_query(*site, profile, range, &settings.occupancy, &settings.currency)?;
        links.insert(query.site, query.url);
    }
    Ok(links)
}

pub fn build_site_query(
    site: Site,
    profile: &SiteProfile,
    range: &DateRange,
    occupancy: &Occupancy,
    currency: &str,
) -> Result<SiteQuery> {
    let url = match site {
        Site::Booking => booking_url(&profile.base_url, range, occupancy, currency),
        Site::Agoda => agoda_url(&profile.base_url, range, occupancy, currency),
        Site::Goibibo => {
            let ids = profile
                .goibibo
                .as_ref()
                .ok_or_else(|| Error::Config("Goibibo profile is missing hotel identifiers".into()))?;
            goibibo_url(&profile.base_url, ids, range, occupancy)?
        }
    };
    Ok(SiteQuery { site, url })
}

fn booking_url(base: &str, range: &DateRange, occupancy: &Occupancy, currency: &str) -> String {
    format!(
        "{}?checkin={}&checkout={}&group_adults={}&group_children={}&no_rooms={}&selected_currency={}",
        base,
        range.checkin().format("%Y-%m-%d"),
        range.checkout().format("%Y-%m-%d"),
        occupancy.adults,
        occupancy.children,
        occupancy.rooms,
        currency
    )
}

fn agoda_url(base: &str, range: &DateRange, occupancy: &Occupancy, currency: &str) -> String {
    format!(
        "{}?adults={}&children={}&rooms={}&checkIn={}&los={}&currencyCode={}",
        base,
        occupancy.adults,
        occupancy.children,
        occupancy.rooms,
        range.checkin().format("%Y-%m-%d"),
        range.nights(),
        currency
    )
}

/// Compact JSON with `", "` and `": "` separators, as Goibibo's own links carry
struct SpacedSeparators;

impl Formatter for SpacedSeparators {
    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}

fn to_spaced_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedSeparators);
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// JSON-encoded `hquery` value, percent-encoded for the query string
fn goibibo_hquery(range: &DateRange, occupancy: &Occupancy) -> Result<String> {
    let query = HotelQuery {
        ci: range.checkin().format("%Y%m%d").to_string(),
        co: range.checkout().format("%Y%m%d").to_string(),
        r: format!("{}-{}-{}", occupancy.rooms, occupancy.adults, occupancy.children),
        ibp: "",
    };
    let json = to_spaced_json(&query)
        .map_err(|e| Error::Config(format!("Failed to encode Goibibo query: {}", e)))?;
    Ok(utf8_percent_encode(&json, QUERY_FRAGMENT).to_string())
}

fn goibibo_url(base: &str, ids: &GoibiboIds, range: &DateRange, occupancy: &Occupancy) -> Result<String> {
    let hquery = goibibo_hquery(range, occupancy)?;
    Ok(format!(
        "{base}/{slug}-{hotel}/?hquery={hquery}&cc=IN&vcid={hotel}&locusId={city_code}&locusType=city\
         &cityCode={city_code}&mmtId={mmt}&topHtlId={mmt}&FS=GSU&city={city}&sType=hotel",
        base = base.trim_end_matches('/'),
        slug = ids.hotel_slug,
        hotel = ids.hotel_id,
        hquery = hquery,
        city_code = ids.city_code,
        mmt = ids.mmt_id,
        city = utf8_percent_encode(&ids.city_name, QUERY_FRAGMENT),
    ))
}
