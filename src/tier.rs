// Tier selection by price rank
// Pure and deterministic: a stable ascending sort, then cheapest / middle / most expensive.

use crate::models::{ActivityOffer, FlightOffer, LodgingOffer, PackageTier};
use crate::money::Money;

pub trait Priced {
    fn price(&self) -> Option<Money>;

    // Missing or unparseable prices rank as zero
    fn rank_price(&self) -> Money {
        self.price().unwrap_or(Money::ZERO)
    }
}

impl Priced for FlightOffer {
    fn price(&self) -> Option<Money> {
        self.price
    }
}

impl Priced for LodgingOffer {
    fn price(&self) -> Option<Money> {
        self.price
    }
}

impl Priced for ActivityOffer {
    fn price(&self) -> Option<Money> {
        self.price
    }
}

pub fn tier_index(len: usize, tier: PackageTier) -> usize {
    match tier {
        PackageTier::Economic => 0,
        PackageTier::Business => len / 2,
        PackageTier::Luxury => len.saturating_sub(1),
    }
}

// Stable ascending order by rank price; ties keep their input order
pub fn rank_by_price<T: Priced>(items: &[T]) -> Vec<&T> {
    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by_key(|item| item.rank_price());
    ranked
}

// Select one item for `tier` from `items`.
//
// Returns `None` only for an empty collection; callers are expected to
// guarantee at least one candidate.
pub fn select<T: Priced>(items: &[T], tier: PackageTier) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    let ranked = rank_by_price(items);
    Some(ranked[tier_index(ranked.len(), tier)])
}
