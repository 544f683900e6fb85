// Persistence collaborator for a user's chosen package
// Durable storage lives outside this crate; the in-memory store serves local runs and tests.

use crate::error::PackageError;
use crate::money::Money;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationPlan {
    pub user_id: String,
    pub starting_location: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_people: u32,
    pub budget: Money,
}

impl VacationPlan {
    pub fn trip_key(&self) -> String {
        create_trip_key(
            &self.starting_location,
            &self.destination,
            &self.start_date.to_string(),
            &self.end_date.to_string(),
        )
    }

    pub fn validate(&self) -> Result<(), PackageError> {
        if self.user_id.trim().is_empty() {
            return Err(PackageError::InvalidRequest("user_id is required".into()));
        }
        if self.end_date < self.start_date {
            return Err(PackageError::InvalidRequest(
                "end_date must not precede start_date".into(),
            ));
        }
        if self.number_of_people == 0 {
            return Err(PackageError::InvalidRequest(
                "number_of_people must be positive".into(),
            ));
        }
        Ok(())
    }
}

pub fn create_trip_key(origin: &str, destination: &str, start: &str, end: &str) -> String {
    format!("{}:{}:{}:{}", origin, destination, start, end)
}

#[async_trait]
pub trait PlanStore: Send + Sync + 'static {
    // Stores the plan keyed by user and trip; a later save for the same trip replaces it
    async fn save(&self, plan: VacationPlan) -> Result<(), PackageError>;

    async fn get(&self, user_id: &str, trip_key: &str) -> Result<Option<VacationPlan>, PackageError>;
}

#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: DashMap<(String, String), VacationPlan>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn save(&self, plan: VacationPlan) -> Result<(), PackageError> {
        plan.validate()?;
        let key = (plan.user_id.clone(), plan.trip_key());
        self.plans.insert(key, plan);
        Ok(())
    }

    async fn get(&self, user_id: &str, trip_key: &str) -> Result<Option<VacationPlan>, PackageError> {
        Ok(self
            .plans
            .get(&(user_id.to_string(), trip_key.to_string()))
            .map(|entry| entry.value().clone()))
    }
}
