// Catalog fetch contract and the live provider implementation

use crate::credential::CredentialCache;
use crate::error::PackageError;
use crate::models::{
    ActivityOffer, ActivitySearch, FlightOffer, FlightSearch, LodgingOffer, LodgingQuote,
    LodgingSearch,
};
use crate::provider::{
    ActivitiesResponse, FlightOffersResponse, HotelListResponse, HotelOffersResponse,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

// One source of flights, lodging, lodging prices and activities
#[async_trait]
pub trait TravelCatalog: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    // Called once before the first search of a request
    async fn authorize(&self) -> Result<(), PackageError> {
        Ok(())
    }

    async fn search_flights(&self, search: &FlightSearch) -> Result<Vec<FlightOffer>, PackageError>;

    async fn search_lodging(
        &self,
        search: &LodgingSearch,
    ) -> Result<Vec<LodgingOffer>, PackageError>;

    async fn price_lodging(&self, hotel_ids: &[String]) -> Result<Vec<LodgingQuote>, PackageError>;

    async fn search_activities(
        &self,
        search: &ActivitySearch,
    ) -> Result<Vec<ActivityOffer>, PackageError>;
}

pub struct LiveCatalog {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialCache>,
}

impl LiveCatalog {
    pub fn new(client: reqwest::Client, base_url: &str, credentials: Arc<CredentialCache>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    // Authorized GET; transport and status failures are mapped by the caller's catalog
    async fn get_json<T, F>(
        &self,
        path: &str,
        query: &[(&str, String)],
        fail: F,
    ) -> Result<T, PackageError>
    where
        T: DeserializeOwned,
        F: Fn(String) -> PackageError,
    {
        // Re-checked right before use, never held across calls
        let credential = self.credentials.acquire().await?;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Provider request");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, credential.bearer())
            .query(query)
            .send()
            .await
            .map_err(|e| fail(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(fail(format!("provider returned {}: {}", status, snippet)));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| fail(format!("malformed response body: {}", e)))
    }
}

#[async_trait]
impl TravelCatalog for LiveCatalog {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn authorize(&self) -> Result<(), PackageError> {
        self.credentials.acquire().await.map(|_| ())
    }

    async fn search_flights(&self, search: &FlightSearch) -> Result<Vec<FlightOffer>, PackageError> {
        let query = [
            ("originLocationCode", search.origin.clone()),
            ("destinationLocationCode", search.destination.clone()),
            (
                "departureDate",
                search.departure_date.format("%Y-%m-%d").to_string(),
            ),
            ("adults", search.adults.to_string()),
            ("max", search.max_results.to_string()),
        ];
        let response: FlightOffersResponse = self
            .get_json("/v2/shopping/flight-offers", &query, |m| {
                PackageError::provider("flights", m)
            })
            .await?;
        Ok(response.into_offers())
    }

    async fn search_lodging(
        &self,
        search: &LodgingSearch,
    ) -> Result<Vec<LodgingOffer>, PackageError> {
        let query = [
            ("cityCode", search.city_code.clone()),
            ("radius", search.radius_km.to_string()),
            ("radiusUnit", "KM".to_string()),
            ("ratings", "1,2,3,4,5".to_string()),
        ];
        let response: HotelListResponse = self
            .get_json("/v1/reference-data/locations/hotels/by-city", &query, |m| {
                PackageError::provider("lodging", m)
            })
            .await?;
        Ok(response.into_offers())
    }

    async fn price_lodging(&self, hotel_ids: &[String]) -> Result<Vec<LodgingQuote>, PackageError> {
        let query = [("hotelIds", hotel_ids.join(","))];
        let response: HotelOffersResponse = self
            .get_json("/v3/shopping/hotel-offers", &query, |m| {
                PackageError::PartialEnrichmentFailure {
                    batch: hotel_ids.to_vec(),
                    message: m,
                }
            })
            .await?;
        Ok(response.into_quotes())
    }

    async fn search_activities(
        &self,
        search: &ActivitySearch,
    ) -> Result<Vec<ActivityOffer>, PackageError> {
        let query = [
            ("latitude", search.location.latitude.to_string()),
            ("longitude", search.location.longitude.to_string()),
            ("radius", search.radius_km.to_string()),
        ];
        let response: ActivitiesResponse = self
            .get_json("/v1/shopping/activities", &query, PackageError::ActivityUnavailable)
            .await?;
        Ok(response.into_offers())
    }
}
