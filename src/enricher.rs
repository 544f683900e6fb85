// Lodging price enrichment
// Candidates are priced in batches; a failed batch is logged and skipped, leaving its prices unset.

use crate::catalog::TravelCatalog;
use crate::config::EnrichmentConfig;
use crate::error::PackageError;
use crate::models::LodgingOffer;
use crate::money::Money;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EnrichmentReport {
    pub batches: usize,
    pub failed_batches: usize,
    pub priced: usize,
}

#[derive(Debug, Clone)]
pub struct LodgingPriceEnricher {
    batch_size: usize,
    max_concurrent_batches: usize,
}

impl Default for LodgingPriceEnricher {
    fn default() -> Self {
        Self::new(&EnrichmentConfig::default())
    }
}

impl LodgingPriceEnricher {
    pub fn new(config: &EnrichmentConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            max_concurrent_batches: config.max_concurrent_batches.max(1),
        }
    }

    pub async fn enrich(
        &self,
        catalog: &dyn TravelCatalog,
        lodging: &mut [LodgingOffer],
    ) -> EnrichmentReport {
        let ids: Vec<String> = lodging.iter().map(|l| l.hotel_id.clone()).collect();
        let batches: Vec<Vec<String>> = ids.chunks(self.batch_size).map(<[String]>::to_vec).collect();

        let mut report = EnrichmentReport {
            batches: batches.len(),
            ..EnrichmentReport::default()
        };

        // Results come back in batch order, so later batches win name collisions deterministically
        let results: Vec<(Vec<String>, Result<_, PackageError>)> = stream::iter(batches)
            .map(|batch| async move {
                let result = catalog.price_lodging(&batch).await;
                (batch, result)
            })
            .buffered(self.max_concurrent_batches)
            .collect()
            .await;

        let mut prices: HashMap<String, Money> = HashMap::new();
        for (batch, result) in results {
            match result {
                Ok(quotes) => {
                    debug!(batch = ?batch, quotes = quotes.len(), "Priced lodging batch");
                    for quote in quotes {
                        prices.insert(quote.name, quote.total);
                    }
                }
                Err(e) => {
                    report.failed_batches += 1;
                    warn!(
                        catalog = "lodging-pricing",
                        batch = ?batch,
                        error = %e,
                        "Lodging pricing batch failed, leaving prices unset"
                    );
                }
            }
        }

        for offer in lodging.iter_mut() {
            if let Some(price) = prices.get(&offer.name) {
                offer.price = Some(*price);
                report.priced += 1;
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActivityOffer, ActivitySearch, FlightOffer, FlightSearch, LodgingQuote, LodgingSearch,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // Quotes every hotel at 100 + its index; batches containing a poisoned id fail
    struct PricingStub {
        calls: Mutex<Vec<Vec<String>>>,
        poisoned: Option<&'static str>,
        latency: Duration,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl PricingStub {
        fn new(poisoned: Option<&'static str>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                poisoned,
                latency: Duration::ZERO,
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TravelCatalog for PricingStub {
        fn name(&self) -> &'static str {
            "pricing-stub"
        }

        async fn search_flights(&self, _: &FlightSearch) -> Result<Vec<FlightOffer>, PackageError> {
            Ok(vec![])
        }

        async fn search_lodging(&self, _: &LodgingSearch) -> Result<Vec<LodgingOffer>, PackageError> {
            Ok(vec![])
        }

        async fn price_lodging(&self, hotel_ids: &[String]) -> Result<Vec<LodgingQuote>, PackageError> {
            self.calls.lock().push(hotel_ids.to_vec());
            if !self.latency.is_zero() {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(self.latency).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            if let Some(poisoned) = self.poisoned {
                if hotel_ids.iter().any(|id| id == poisoned) {
                    return Err(PackageError::PartialEnrichmentFailure {
                        batch: hotel_ids.to_vec(),
                        message: "503 Service Unavailable".into(),
                    });
                }
            }
            Ok(hotel_ids
                .iter()
                .map(|id| {
                    let index: i64 = id.trim_start_matches('H').parse().unwrap();
                    LodgingQuote {
                        name: format!("Hotel {}", index),
                        total: Money::from_units(100 + index),
                    }
                })
                .collect())
        }

        async fn search_activities(&self, _: &ActivitySearch) -> Result<Vec<ActivityOffer>, PackageError> {
            Ok(vec![])
        }
    }

    fn candidates(count: usize) -> Vec<LodgingOffer> {
        (0..count)
            .map(|i| LodgingOffer {
                name: format!("Hotel {}", i),
                address: Default::default(),
                rating: "3".into(),
                price: None,
                hotel_id: format!("H{}", i),
                location: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_twelve_candidates_make_two_batches() {
        let stub = PricingStub::new(None);
        let mut lodging = candidates(12);

        let report = LodgingPriceEnricher::default().enrich(&stub, &mut lodging).await;

        let calls = stub.calls.lock().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].len(), 10);
        assert_eq!(calls[1], vec!["H10".to_string(), "H11".to_string()]);
        assert_eq!(
            report,
            EnrichmentReport {
                batches: 2,
                failed_batches: 0,
                priced: 12
            }
        );
        assert_eq!(lodging[11].price, Some(Money::from_units(111)));
    }

    #[tokio::test]
    async fn test_failed_second_batch_leaves_its_candidates_unpriced() {
        let stub = PricingStub::new(Some("H11"));
        let mut lodging = candidates(12);

        let report = LodgingPriceEnricher::default().enrich(&stub, &mut lodging).await;

        assert_eq!(report.batches, 2);
        assert_eq!(report.failed_batches, 1);
        assert_eq!(report.priced, 10);
        for offer in &lodging[..10] {
            assert!(offer.price.is_some(), "{} should be priced", offer.name);
        }
        for offer in &lodging[10..] {
            assert_eq!(offer.price, None, "{} should stay unpriced", offer.name);
        }
    }

    #[tokio::test]
    async fn test_failed_first_batch_does_not_abort_siblings() {
        let stub = PricingStub::new(Some("H0"));
        let mut lodging = candidates(25);

        let report = LodgingPriceEnricher::default().enrich(&stub, &mut lodging).await;

        assert_eq!(report.batches, 3);
        assert_eq!(report.failed_batches, 1);
        assert_eq!(report.priced, 15);
        assert_eq!(lodging[0].price, None);
        assert_eq!(lodging[24].price, Some(Money::from_units(124)));
    }

    #[test]
    fn test_sequential_enrichment_with_custom_batch_size() {
        let stub = PricingStub::new(None);
        let mut lodging = candidates(7);
        let enricher = LodgingPriceEnricher::new(&EnrichmentConfig {
            batch_size: 3,
            max_concurrent_batches: 1,
        });

        let report = tokio_test::block_on(enricher.enrich(&stub, &mut lodging));

        assert_eq!(report.batches, 3);
        let calls = stub.calls.lock().clone();
        assert_eq!(calls.iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 3, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_in_flight_are_bounded() {
        let stub = PricingStub {
            latency: Duration::from_millis(50),
            ..PricingStub::new(None)
        };
        let mut lodging = candidates(50);

        let report = LodgingPriceEnricher::default().enrich(&stub, &mut lodging).await;

        assert_eq!(report.batches, 5);
        assert_eq!(report.priced, 50);
        assert_eq!(stub.peak_in_flight.load(Ordering::SeqCst), 4);
        assert_eq!(stub.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_candidates_issue_no_requests() {
        let stub = PricingStub::new(None);
        let mut lodging = Vec::new();

        let report = LodgingPriceEnricher::default().enrich(&stub, &mut lodging).await;

        assert_eq!(report, EnrichmentReport::default());
        assert!(stub.calls.lock().is_empty());
    }
}
