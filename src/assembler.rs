// Package assembly
// Orchestrates one request: credential, flights, lodging, lodging prices, activities, then three
// tiers. Any fatal fetch failure, or the deadline passing, answers from the fallback catalog.

use crate::catalog::{LiveCatalog, TravelCatalog};
use crate::config::EngineConfig;
use crate::credential::{CredentialCache, HttpIdentityProvider};
use crate::enricher::LodgingPriceEnricher;
use crate::error::PackageError;
use crate::fallback::FallbackCatalog;
use crate::models::{
    ActivityOffer, ActivitySearch, AssembledPackage, FlightOffer, FlightSearch, LodgingOffer,
    LodgingSearch, PackageTier, TripRequest,
};
use crate::money::Money;
use crate::tier::{rank_by_price, select, Priced};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// Activities shown per package; the rest are counted
pub const DISPLAYED_ACTIVITIES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageSource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub source: PackageSource,
    pub packages: Vec<AssembledPackage>,
}

impl Assembly {
    pub fn tier(&self, tier: PackageTier) -> Option<&AssembledPackage> {
        self.packages.iter().find(|p| p.tier == tier)
    }
}

pub struct PackageAssembler {
    live: Option<Arc<dyn TravelCatalog>>,
    fallback: FallbackCatalog,
    enricher: LodgingPriceEnricher,
    lodging_placeholder: Money,
    deadline: Duration,
}

impl PackageAssembler {
    pub fn new(live: Option<Arc<dyn TravelCatalog>>, config: &EngineConfig) -> Self {
        Self {
            live,
            fallback: FallbackCatalog,
            enricher: LodgingPriceEnricher::new(&config.enrichment),
            lodging_placeholder: config.lodging_placeholder_price,
            deadline: config.deadline(),
        }
    }

    // Wires the live provider stack when the configuration enables it
    pub fn from_config(config: &EngineConfig) -> Result<Self, PackageError> {
        if !config.live_fetch_enabled() {
            info!(
                version = FallbackCatalog.version(),
                "Live fetch disabled, serving the fallback catalog"
            );
            return Ok(Self::new(None, config));
        }

        let client = reqwest::Client::builder()
            .timeout(config.provider.request_timeout())
            .build()
            .map_err(|e| PackageError::Internal(format!("failed to build HTTP client: {}", e)))?;
        let identity = HttpIdentityProvider::new(client.clone(), &config.provider);
        let credentials = Arc::new(CredentialCache::new(Arc::new(identity)));
        let live = LiveCatalog::new(client, &config.provider.base_url, credentials);

        info!(base_url = %config.provider.base_url, "Live fetch enabled");
        Ok(Self::new(Some(Arc::new(live)), config))
    }

    pub fn live_fetch_enabled(&self) -> bool {
        self.live.is_some()
    }

    pub async fn assemble(&self, request: &TripRequest) -> Result<Assembly, PackageError> {
        let departure_date = request.validate()?;

        let Some(live) = self.live.as_deref() else {
            return Ok(self.fallback_assembly(request));
        };

        let started = std::time::Instant::now();
        match tokio::time::timeout(self.deadline, self.assemble_live(live, request, departure_date))
            .await
        {
            Ok(Ok(packages)) => {
                info!(
                    origin = %request.origin,
                    destination = %request.destination,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Assembled live packages"
                );
                Ok(Assembly {
                    source: PackageSource::Live,
                    packages,
                })
            }
            Ok(Err(e)) if e.triggers_fallback() => {
                warn!(error = %e, catalog = live.name(), "Live fetch failed, using fallback catalog");
                Ok(self.fallback_assembly(request))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                let e = PackageError::DeadlineExceeded(self.deadline.as_millis() as u64);
                warn!(error = %e, "Live fetch abandoned, using fallback catalog");
                Ok(self.fallback_assembly(request))
            }
        }
    }

    pub fn fallback_assembly(&self, request: &TripRequest) -> Assembly {
        Assembly {
            source: PackageSource::Fallback,
            packages: self.fallback.packages(request),
        }
    }

    async fn assemble_live(
        &self,
        catalog: &dyn TravelCatalog,
        request: &TripRequest,
        departure_date: chrono::NaiveDate,
    ) -> Result<Vec<AssembledPackage>, PackageError> {
        catalog.authorize().await?;

        let flights = catalog
            .search_flights(&FlightSearch::new(request, departure_date))
            .await?;
        let mut lodging = catalog
            .search_lodging(&LodgingSearch::for_city(&request.destination))
            .await?;

        // Selection reads lodging prices, so enrichment must finish first
        let report = self.enricher.enrich(catalog, &mut lodging).await;
        info!(
            candidates = lodging.len(),
            batches = report.batches,
            failed_batches = report.failed_batches,
            priced = report.priced,
            "Lodging enrichment finished"
        );

        let activities = self.fetch_activities(catalog, &lodging).await;

        build_packages(&flights, &lodging, &activities, self.lodging_placeholder)
    }

    // Activity failures never abort a request
    async fn fetch_activities(
        &self,
        catalog: &dyn TravelCatalog,
        lodging: &[LodgingOffer],
    ) -> Vec<ActivityOffer> {
        let Some(location) = lodging.iter().find_map(|l| l.location) else {
            let e = PackageError::ActivityUnavailable("no lodging coordinates to search around".into());
            warn!(catalog = "activities", error = %e, "Continuing without activities");
            return Vec::new();
        };

        match catalog.search_activities(&ActivitySearch::around(location)).await {
            Ok(activities) if activities.is_empty() => {
                info!(catalog = "activities", "No activities found near destination");
                activities
            }
            Ok(activities) => activities,
            Err(e) => {
                warn!(catalog = "activities", error = %e, "Continuing without activities");
                Vec::new()
            }
        }
    }
}

// Build one package per tier from live catalog results.
//
// Flights and lodging are tier-selected independently. Activities are shared by all
// tiers: the two cheapest are shown, the rest counted, and every activity is
// charged in the total. Lodging is a flat per-stay charge; an unpriced lodging
// contributes `lodging_placeholder` to the total.
pub fn build_packages(
    flights: &[FlightOffer],
    lodging: &[LodgingOffer],
    activities: &[ActivityOffer],
    lodging_placeholder: Money,
) -> Result<Vec<AssembledPackage>, PackageError> {
    if flights.is_empty() {
        return Err(PackageError::provider("flights", "no flight offers returned"));
    }
    if lodging.is_empty() {
        return Err(PackageError::provider("lodging", "no lodging returned"));
    }

    let ranked_activities = rank_by_price(activities);
    let displayed: Vec<ActivityOffer> = ranked_activities
        .iter()
        .take(DISPLAYED_ACTIVITIES)
        .map(|a| (*a).clone())
        .collect();
    let additional_activities = activities.len().saturating_sub(displayed.len());
    let activities_total: Money = activities.iter().map(Priced::rank_price).sum();

    let mut packages = Vec::with_capacity(PackageTier::ALL.len());
    for tier in PackageTier::ALL {
        let (Some(flight), Some(stay)) = (select(flights, tier), select(lodging, tier))
        else {
            return Err(PackageError::Internal(format!(
                "tier selection failed for {}",
                tier
            )));
        };

        let total_price = flight.rank_price()
            + stay.price.unwrap_or(lodging_placeholder)
            + activities_total;

        packages.push(AssembledPackage {
            tier,
            total_price,
            flight: flight.clone(),
            lodging: stay.clone(),
            activities: displayed.clone(),
            additional_activities,
            description: tier.description().to_string(),
            most_popular: tier.is_most_popular(),
        });
    }

    Ok(packages)
}
