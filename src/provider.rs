// Wire shapes of the travel provider endpoints and their normalization into core offers
// Every field the provider may omit is optional here; defaults are applied during normalization.

use crate::models::{
    ActivityOffer, Address, FlightOffer, GeoPoint, LodgingOffer, LodgingQuote,
    ACTIVITY_RESULT_CAP, LODGING_RESULT_CAP,
};
use crate::money::Money;
use serde::Deserialize;
use serde_json::Value;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

// Flight offers search
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FlightOffersResponse {
    pub data: Vec<RawFlightOffer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawFlightOffer {
    pub itineraries: Vec<RawItinerary>,
    pub price: RawFlightPrice,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawItinerary {
    pub duration: String,
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawSegment {
    pub carrier_code: String,
    pub departure: RawEndpoint,
    pub arrival: RawEndpoint,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawEndpoint {
    pub iata_code: String,
    pub at: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawFlightPrice {
    pub grand_total: Option<String>,
    pub currency: String,
}

impl RawFlightOffer {
    // Multi-leg itineraries are summarized by their first and last segment
    pub fn normalize(&self) -> Option<FlightOffer> {
        let itinerary = self.itineraries.first()?;
        let first = itinerary.segments.first()?;
        let last = itinerary.segments.last()?;

        Some(FlightOffer {
            airline: first.carrier_code.clone(),
            departure_city: first.departure.iata_code.clone(),
            departure_airport: first.departure.iata_code.clone(),
            arrival_city: last.arrival.iata_code.clone(),
            arrival_airport: last.arrival.iata_code.clone(),
            departure_time: first.departure.at.clone(),
            arrival_time: last.arrival.at.clone(),
            duration: itinerary.duration.clone(),
            price: Money::parse_opt(self.price.grand_total.as_deref()),
            currency: self.price.currency.clone(),
        })
    }
}

impl FlightOffersResponse {
    pub fn into_offers(self) -> Vec<FlightOffer> {
        self.data.iter().filter_map(RawFlightOffer::normalize).collect()
    }
}

// Lodging by city
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HotelListResponse {
    pub data: Vec<RawHotel>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawHotel {
    pub name: Option<String>,
    pub address: Option<Address>,
    pub rating: Option<Value>,
    pub hotel_id: Option<String>,
    pub geo_code: Option<RawGeoCode>,
}

// Coordinates only locate the activity search, so a partial geoCode is tolerated
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawGeoCode {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl RawGeoCode {
    fn point(&self) -> Option<GeoPoint> {
        Some(GeoPoint {
            latitude: self.latitude?,
            longitude: self.longitude?,
        })
    }
}

fn text_or_na(value: Option<String>) -> String {
    value
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

// Ratings come back as numbers or strings depending on the endpoint version
fn rating_text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

impl RawHotel {
    pub fn normalize(self) -> LodgingOffer {
        LodgingOffer {
            name: text_or_na(self.name),
            address: self.address.unwrap_or_default(),
            rating: rating_text(self.rating),
            price: None,
            hotel_id: text_or_na(self.hotel_id),
            location: self.geo_code.as_ref().and_then(RawGeoCode::point),
        }
    }
}

impl HotelListResponse {
    pub fn into_offers(self) -> Vec<LodgingOffer> {
        self.data
            .into_iter()
            .take(LODGING_RESULT_CAP)
            .map(RawHotel::normalize)
            .collect()
    }
}

// Lodging offer pricing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HotelOffersResponse {
    pub data: Vec<RawHotelOffers>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawHotelOffers {
    pub hotel: Option<RawHotelRef>,
    pub offers: Vec<RawOffer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawHotelRef {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawOffer {
    pub price: Option<RawOfferPrice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawOfferPrice {
    pub total: Option<String>,
}

impl HotelOffersResponse {
    // First offer wins; an offer without a total quotes zero, an unparseable total quotes nothing
    pub fn into_quotes(self) -> Vec<LodgingQuote> {
        self.data
            .into_iter()
            .filter_map(|entry| {
                let first = entry.offers.into_iter().next()?;
                let name = entry
                    .hotel
                    .and_then(|h| h.name)
                    .unwrap_or_else(|| "Unknown".to_string());
                let total = match first.price.and_then(|p| p.total) {
                    Some(raw) => match raw.parse::<Money>() {
                        Ok(total) => total,
                        Err(e) => {
                            tracing::debug!(hotel = %name, error = %e, "Dropping unparseable lodging quote");
                            return None;
                        }
                    },
                    None => Money::ZERO,
                };
                Some(LodgingQuote { name, total })
            })
            .collect()
    }
}

// Activities by coordinate
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActivitiesResponse {
    pub data: Vec<RawActivity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawActivity {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<RawActivityPrice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawActivityPrice {
    pub amount: Option<String>,
    pub currency_code: Option<String>,
}

impl RawActivity {
    pub fn normalize(self) -> ActivityOffer {
        let price = self.price.unwrap_or_default();
        ActivityOffer {
            name: text_or_na(self.name),
            description: text_or_na(self.description),
            price: match price.amount {
                Some(raw) => raw.parse().ok(),
                None => Some(Money::ZERO),
            },
            currency: price.currency_code.unwrap_or_else(|| "EUR".to_string()),
        }
    }
}

impl ActivitiesResponse {
    pub fn into_offers(self) -> Vec<ActivityOffer> {
        self.data
            .into_iter()
            .take(ACTIVITY_RESULT_CAP)
            .map(RawActivity::normalize)
            .collect()
    }
}
