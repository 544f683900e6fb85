// Main library file for the travel package engine

pub mod assembler;
pub mod catalog;
pub mod config;
pub mod credential;
pub mod enricher;
pub mod error;
pub mod fallback;
pub mod models;
pub mod money;
pub mod plans;
pub mod provider;
pub mod server;
pub mod tier;

// Re-export key types for convenience
pub use assembler::{build_packages, Assembly, PackageAssembler, PackageSource};
pub use catalog::{LiveCatalog, TravelCatalog};
pub use config::{EngineConfig, ProviderConfig};
pub use credential::{Credential, CredentialCache, HttpIdentityProvider, IdentityProvider};
pub use enricher::{EnrichmentReport, LodgingPriceEnricher};
pub use error::{ConfigError, PackageError};
pub use fallback::FallbackCatalog;
pub use models::{
    ActivityOffer, AssembledPackage, FlightOffer, LodgingOffer, PackageTier, TripRequest,
};
pub use money::Money;
pub use plans::{InMemoryPlanStore, PlanStore, VacationPlan};
pub use tier::{select, Priced};
