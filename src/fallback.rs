// Built-in deterministic catalog
// Answers whenever live fetching is disabled or fails. One curated flight, lodging and
// activity set per tier; the same data also serves the TravelCatalog contract so tests
// can run the live pipeline offline.

use crate::catalog::TravelCatalog;
use crate::error::PackageError;
use crate::models::{
    ActivityOffer, ActivitySearch, Address, AssembledPackage, FlightOffer, FlightSearch, GeoPoint,
    LodgingOffer, LodgingQuote, LodgingSearch, PackageTier, TripRequest,
};
use crate::money::Money;
use async_trait::async_trait;
use serde_json::json;

pub const FALLBACK_CATALOG_VERSION: &str = "2025-01";

const DEFAULT_ORIGIN_CITY: &str = "NYC";
const DEFAULT_ORIGIN_AIRPORT: &str = "JFK";
const DEFAULT_DESTINATION: &str = "BCN";
const DEFAULT_DESTINATION_CITY_NAME: &str = "Barcelona";
const CURRENCY: &str = "USD";

const CITY_CENTER: GeoPoint = GeoPoint {
    latitude: 41.3874,
    longitude: 2.1686,
};

struct FallbackFlight {
    airline: &'static str,
    departure_time: &'static str,
    arrival_time: &'static str,
    duration: &'static str,
    price: i64,
}

struct FallbackLodging {
    id: &'static str,
    name: &'static str,
    street: &'static str,
    rating: &'static str,
    price: i64,
}

struct FallbackActivity {
    name: &'static str,
    description: &'static str,
    price: i64,
}

struct FallbackTier {
    tier: PackageTier,
    quoted_total: i64,
    flight: FallbackFlight,
    lodging: FallbackLodging,
    activities: [FallbackActivity; 2],
}

static TIERS: [FallbackTier; 3] = [
    FallbackTier {
        tier: PackageTier::Economic,
        quoted_total: 850,
        flight: FallbackFlight {
            airline: "AA",
            departure_time: "2025-01-20T08:00:00Z",
            arrival_time: "2025-01-20T20:00:00Z",
            duration: "PT8H",
            price: 450,
        },
        lodging: FallbackLodging {
            id: "FBECO001",
            name: "Budget Inn Downtown",
            street: "123 Main St",
            rating: "3",
            price: 80,
        },
        activities: [
            FallbackActivity {
                name: "City Walking Tour",
                description: "Explore the historic center",
                price: 25,
            },
            FallbackActivity {
                name: "Local Food Market",
                description: "Taste local cuisine",
                price: 35,
            },
        ],
    },
    FallbackTier {
        tier: PackageTier::Business,
        quoted_total: 1450,
        flight: FallbackFlight {
            airline: "DL",
            departure_time: "2025-01-20T10:00:00Z",
            arrival_time: "2025-01-20T22:00:00Z",
            duration: "PT7H30M",
            price: 850,
        },
        lodging: FallbackLodging {
            id: "FBBUS001",
            name: "Comfort Hotel Central",
            street: "456 Business Ave",
            rating: "4",
            price: 150,
        },
        activities: [
            FallbackActivity {
                name: "Museum Pass",
                description: "Access to top museums",
                price: 65,
            },
            FallbackActivity {
                name: "Harbor Cruise",
                description: "Scenic boat tour",
                price: 45,
            },
        ],
    },
    FallbackTier {
        tier: PackageTier::Luxury,
        quoted_total: 2850,
        flight: FallbackFlight {
            airline: "UA",
            departure_time: "2025-01-20T14:00:00Z",
            arrival_time: "2025-01-21T02:00:00Z",
            duration: "PT7H",
            price: 1800,
        },
        lodging: FallbackLodging {
            id: "FBLUX001",
            name: "Grand Luxury Resort & Spa",
            street: "789 Premium Blvd",
            rating: "5",
            price: 350,
        },
        activities: [
            FallbackActivity {
                name: "Private Chef Experience",
                description: "Exclusive dining experience",
                price: 200,
            },
            FallbackActivity {
                name: "Helicopter Tour",
                description: "Aerial city views",
                price: 180,
            },
        ],
    },
];

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default
    } else {
        trimmed
    }
}

impl FallbackFlight {
    fn offer(&self, origin: &str, destination: &str) -> FlightOffer {
        FlightOffer {
            airline: self.airline.to_string(),
            departure_city: or_default(origin, DEFAULT_ORIGIN_CITY).to_string(),
            departure_airport: or_default(origin, DEFAULT_ORIGIN_AIRPORT).to_string(),
            arrival_city: or_default(destination, DEFAULT_DESTINATION).to_string(),
            arrival_airport: or_default(destination, DEFAULT_DESTINATION).to_string(),
            departure_time: self.departure_time.to_string(),
            arrival_time: self.arrival_time.to_string(),
            duration: self.duration.to_string(),
            price: Some(Money::from_units(self.price)),
            currency: CURRENCY.to_string(),
        }
    }
}

impl FallbackLodging {
    fn offer(&self, city_name: &str, price: Option<Money>) -> LodgingOffer {
        let mut address = Address::new();
        address.insert("lines".into(), json!([self.street]));
        address.insert(
            "cityName".into(),
            json!(or_default(city_name, DEFAULT_DESTINATION_CITY_NAME)),
        );

        LodgingOffer {
            name: self.name.to_string(),
            address,
            rating: self.rating.to_string(),
            price,
            hotel_id: self.id.to_string(),
            location: Some(CITY_CENTER),
        }
    }

    fn quote(&self) -> LodgingQuote {
        LodgingQuote {
            name: self.name.to_string(),
            total: Money::from_units(self.price),
        }
    }
}

impl FallbackActivity {
    fn offer(&self) -> ActivityOffer {
        ActivityOffer {
            name: self.name.to_string(),
            description: self.description.to_string(),
            price: Some(Money::from_units(self.price)),
            currency: CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackCatalog;

impl FallbackCatalog {
    pub fn version(&self) -> &'static str {
        FALLBACK_CATALOG_VERSION
    }

    // Curated packages in tier order, carrying their quoted totals
    pub fn packages(&self, request: &TripRequest) -> Vec<AssembledPackage> {
        TIERS
            .iter()
            .map(|entry| AssembledPackage {
                tier: entry.tier,
                total_price: Money::from_units(entry.quoted_total),
                flight: entry.flight.offer(&request.origin, &request.destination),
                lodging: entry
                    .lodging
                    .offer(&request.destination, Some(Money::from_units(entry.lodging.price))),
                activities: entry.activities.iter().map(FallbackActivity::offer).collect(),
                additional_activities: 0,
                description: entry.tier.description().to_string(),
                most_popular: entry.tier.is_most_popular(),
            })
            .collect()
    }
}

#[async_trait]
impl TravelCatalog for FallbackCatalog {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn search_flights(&self, search: &FlightSearch) -> Result<Vec<FlightOffer>, PackageError> {
        Ok(TIERS
            .iter()
            .map(|entry| entry.flight.offer(&search.origin, &search.destination))
            .collect())
    }

    async fn search_lodging(
        &self,
        search: &LodgingSearch,
    ) -> Result<Vec<LodgingOffer>, PackageError> {
        Ok(TIERS
            .iter()
            .map(|entry| entry.lodging.offer(&search.city_code, None))
            .collect())
    }

    async fn price_lodging(&self, hotel_ids: &[String]) -> Result<Vec<LodgingQuote>, PackageError> {
        Ok(TIERS
            .iter()
            .filter(|entry| hotel_ids.iter().any(|id| id == entry.lodging.id))
            .map(|entry| entry.lodging.quote())
            .collect())
    }

    async fn search_activities(
        &self,
        _search: &ActivitySearch,
    ) -> Result<Vec<ActivityOffer>, PackageError> {
        Ok(TIERS
            .iter()
            .flat_map(|entry| entry.activities.iter().map(FallbackActivity::offer))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(origin: &str, destination: &str) -> TripRequest {
        TripRequest {
            origin: origin.into(),
            destination: destination.into(),
            departure_date: "2025-01-20".into(),
            adults: 1,
            budget: None,
            package_type: None,
        }
    }

    #[test]
    fn test_packages_match_published_totals() {
        let packages = FallbackCatalog.packages(&request("NYC", "BCN"));
        let totals: Vec<Money> = packages.iter().map(|p| p.total_price).collect();
        assert_eq!(
            totals,
            vec![
                Money::from_units(850),
                Money::from_units(1450),
                Money::from_units(2850)
            ]
        );
        assert_eq!(
            packages.iter().map(|p| p.tier).collect::<Vec<_>>(),
            PackageTier::ALL.to_vec()
        );
        assert!(packages[1].most_popular);
        assert_eq!(packages[2].lodging.name, "Grand Luxury Resort & Spa");
    }

    #[test]
    fn test_request_locations_flow_into_offers() {
        let packages = FallbackCatalog.packages(&request("LAX", "LIS"));
        let flight = &packages[0].flight;
        assert_eq!(flight.departure_city, "LAX");
        assert_eq!(flight.departure_airport, "LAX");
        assert_eq!(flight.arrival_airport, "LIS");
        assert_eq!(packages[0].lodging.address["cityName"], json!("LIS"));

        let blank = FallbackCatalog.packages(&request("", " "));
        assert_eq!(blank[0].flight.departure_city, "NYC");
        assert_eq!(blank[0].flight.departure_airport, "JFK");
        assert_eq!(blank[0].flight.arrival_city, "BCN");
        assert_eq!(blank[0].lodging.address["cityName"], json!("Barcelona"));
    }

    #[test]
    fn test_output_is_byte_identical_across_calls() {
        let req = request("NYC", "BCN");
        let first = serde_json::to_vec(&FallbackCatalog.packages(&req)).unwrap();
        let second = serde_json::to_vec(&FallbackCatalog.packages(&req)).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_catalog_contract_prices_only_requested_ids() {
        let lodging = FallbackCatalog
            .search_lodging(&LodgingSearch::for_city("BCN"))
            .await
            .unwrap();
        assert_eq!(lodging.len(), 3);
        assert!(lodging.iter().all(|l| l.price.is_none()));

        let quotes = FallbackCatalog
            .price_lodging(&["FBLUX001".to_string(), "UNKNOWN".to_string()])
            .await
            .unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].total, Money::from_units(350));

        let activities = FallbackCatalog
            .search_activities(&ActivitySearch::around(CITY_CENTER))
            .await
            .unwrap();
        assert_eq!(activities.len(), 6);
    }
}
