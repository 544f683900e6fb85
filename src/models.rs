// Core data model: trip requests, normalized offers and assembled packages

use crate::error::PackageError;
use crate::money::{self, Money};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// Catalog search limits
pub const FLIGHT_SEARCH_MAX: usize = 20;
pub const LODGING_RESULT_CAP: usize = 20;
pub const ACTIVITY_RESULT_CAP: usize = 10;
pub const LODGING_RADIUS_KM: u32 = 10;
pub const ACTIVITY_RADIUS_KM: u32 = 20;

// Opaque, order-preserving address bag. Never interpreted, only passed through.
pub type Address = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageTier {
    Economic,
    Business,
    Luxury,
}

impl PackageTier {
    // Presentation order
    pub const ALL: [PackageTier; 3] = [
        PackageTier::Economic,
        PackageTier::Business,
        PackageTier::Luxury,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PackageTier::Economic => "economic",
            PackageTier::Business => "business",
            PackageTier::Luxury => "luxury",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PackageTier::Economic => "Budget-friendly options",
            PackageTier::Business => "Balanced comfort and value",
            PackageTier::Luxury => "Premium luxury experience",
        }
    }

    // The middle tier carries the "most popular" marker
    pub fn is_most_popular(self) -> bool {
        self == PackageTier::Business
    }

    // Unrecognized labels resolve to the middle tier
    pub fn from_label(label: &str) -> PackageTier {
        label.parse().unwrap_or(PackageTier::Business)
    }
}

impl fmt::Display for PackageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageTier {
    type Err = PackageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "economic" => Ok(PackageTier::Economic),
            "business" => Ok(PackageTier::Business),
            "luxury" => Ok(PackageTier::Luxury),
            other => Err(PackageError::InvalidRequest(format!(
                "unknown package type: {}",
                other
            ))),
        }
    }
}

// Inbound trip request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub adults: u32,
    #[serde(default)]
    pub budget: Option<Money>,
    #[serde(default, deserialize_with = "lenient_tier")]
    pub package_type: Option<PackageTier>,
}

// Inbound package types are free text; anything unrecognized resolves to the middle tier
fn lenient_tier<'de, D>(deserializer: D) -> Result<Option<PackageTier>, D::Error>
where
    D: Deserializer<'de>,
{
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label.map(|label| PackageTier::from_label(&label)))
}

impl TripRequest {
    pub fn validate(&self) -> Result<NaiveDate, PackageError> {
        if self.origin.trim().is_empty() {
            return Err(PackageError::InvalidRequest("origin is required".into()));
        }
        if self.destination.trim().is_empty() {
            return Err(PackageError::InvalidRequest(
                "destination is required".into(),
            ));
        }
        if self.adults == 0 {
            return Err(PackageError::InvalidRequest(
                "adults must be a positive integer".into(),
            ));
        }
        if self.budget.is_some_and(Money::is_negative) {
            return Err(PackageError::InvalidRequest(
                "budget must not be negative".into(),
            ));
        }

        NaiveDate::parse_from_str(self.departure_date.trim(), "%Y-%m-%d").map_err(|e| {
            PackageError::InvalidRequest(format!(
                "departure_date {:?} is not an ISO-8601 date: {}",
                self.departure_date, e
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearch {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub adults: u32,
    pub max_results: usize,
}

impl FlightSearch {
    pub fn new(request: &TripRequest, departure_date: NaiveDate) -> Self {
        Self {
            origin: request.origin.trim().to_string(),
            destination: request.destination.trim().to_string(),
            departure_date,
            adults: request.adults,
            max_results: FLIGHT_SEARCH_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LodgingSearch {
    pub city_code: String,
    pub radius_km: u32,
}

impl LodgingSearch {
    pub fn for_city(city_code: &str) -> Self {
        Self {
            city_code: city_code.trim().to_string(),
            radius_km: LODGING_RADIUS_KM,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySearch {
    pub location: GeoPoint,
    pub radius_km: u32,
}

impl ActivitySearch {
    pub fn around(location: GeoPoint) -> Self {
        Self {
            location,
            radius_km: ACTIVITY_RADIUS_KM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightOffer {
    pub airline: String,
    pub departure_city: String,
    pub departure_airport: String,
    pub arrival_city: String,
    pub arrival_airport: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub price: Option<Money>,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LodgingOffer {
    pub name: String,
    pub address: Address,
    pub rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(rename = "hotelId")]
    pub hotel_id: String,
    #[serde(skip)]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityOffer {
    pub name: String,
    pub description: String,
    pub price: Option<Money>,
    pub currency: String,
}

// Named price quote returned by the lodging pricing endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct LodgingQuote {
    pub name: String,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledPackage {
    #[serde(rename = "type")]
    pub tier: PackageTier,
    #[serde(serialize_with = "money::serialize_as_number")]
    pub total_price: Money,
    pub flight: FlightOffer,
    #[serde(rename = "hotel")]
    pub lodging: LodgingOffer,
    pub activities: Vec<ActivityOffer>,
    pub additional_activities: usize,
    pub description: String,
    pub most_popular: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn request() -> TripRequest {
        TripRequest {
            origin: "NYC".into(),
            destination: "BCN".into(),
            departure_date: "2025-01-20".into(),
            adults: 1,
            budget: None,
            package_type: None,
        }
    }

    #[test_case("economic", PackageTier::Economic)]
    #[test_case("LUXURY", PackageTier::Luxury)]
    #[test_case("business", PackageTier::Business)]
    #[test_case("first-class", PackageTier::Business ; "unknown label falls back to middle")]
    #[test_case("", PackageTier::Business ; "empty label falls back to middle")]
    fn test_tier_from_label(label: &str, expected: PackageTier) {
        assert_eq!(PackageTier::from_label(label), expected);
    }

    #[test]
    fn test_tier_order_and_marker() {
        let mut tiers = vec![
            PackageTier::Luxury,
            PackageTier::Economic,
            PackageTier::Business,
        ];
        tiers.sort();
        assert_eq!(tiers, PackageTier::ALL.to_vec());
        assert_eq!(
            PackageTier::ALL
                .iter()
                .filter(|t| t.is_most_popular())
                .collect::<Vec<_>>(),
            vec![&PackageTier::Business]
        );
    }

    #[test]
    fn test_request_deserializes_optional_fields() {
        let json = r#"{"origin":"NYC","destination":"BCN","departure_date":"2025-01-20","adults":2,"budget":1500,"package_type":"luxury"}"#;
        let parsed: TripRequest = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.adults, 2);
        assert_eq!(parsed.budget, Some(Money::from_units(1500)));
        assert_eq!(parsed.package_type, Some(PackageTier::Luxury));

        let unknown = r#"{"origin":"NYC","destination":"BCN","departure_date":"2025-01-20","adults":1,"package_type":"platinum"}"#;
        let parsed: TripRequest = serde_json::from_str(unknown).unwrap();
        assert_eq!(parsed.package_type, Some(PackageTier::Business));

        let minimal = r#"{"origin":"NYC","destination":"BCN","departure_date":"2025-01-20","adults":1}"#;
        let parsed: TripRequest = serde_json::from_str(minimal).unwrap();
        assert_eq!(parsed, request());
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            request().validate().unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap()
        );

        let mut bad_date = request();
        bad_date.departure_date = "20/01/2025".into();
        assert!(matches!(
            bad_date.validate(),
            Err(PackageError::InvalidRequest(_))
        ));

        let mut no_adults = request();
        no_adults.adults = 0;
        assert!(no_adults.validate().is_err());

        let mut blank_origin = request();
        blank_origin.origin = "  ".into();
        assert!(blank_origin.validate().is_err());

        let mut negative_budget = request();
        negative_budget.budget = Some(Money::from_units(-1));
        assert!(negative_budget.validate().is_err());
    }

    #[test]
    fn test_lodging_serializes_without_internal_fields() {
        let mut address = Address::new();
        address.insert("lines".into(), serde_json::json!(["1 Rambla"]));
        address.insert("cityName".into(), serde_json::json!("Barcelona"));

        let lodging = LodgingOffer {
            name: "Casa".into(),
            address,
            rating: "N/A".into(),
            price: None,
            hotel_id: "HBCN001".into(),
            location: Some(GeoPoint {
                latitude: 41.38,
                longitude: 2.17,
            }),
        };

        assert_eq!(
            serde_json::to_string(&lodging).unwrap(),
            r#"{"name":"Casa","address":{"lines":["1 Rambla"],"cityName":"Barcelona"},"rating":"N/A","hotelId":"HBCN001"}"#
        );
    }
}
