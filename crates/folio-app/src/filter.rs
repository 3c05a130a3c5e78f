// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use crate::{PortfolioCountFilter, PortfolioType, Record, SubscriptionTier, VerificationStatus};

/// Upper end of the size slider, also the default threshold.
pub const MAX_SIZE_KB: u32 = 50_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub query: String,
    pub portfolio_types: BTreeSet<PortfolioType>,
    pub portfolio_verification: BTreeSet<VerificationStatus>,
    pub id_verification: BTreeSet<VerificationStatus>,
    pub subscriptions: BTreeSet<SubscriptionTier>,
    pub location_query: String,
    pub portfolio_count: Option<PortfolioCountFilter>,
    pub max_size_kb: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            portfolio_types: BTreeSet::new(),
            portfolio_verification: BTreeSet::new(),
            id_verification: BTreeSet::new(),
            subscriptions: BTreeSet::new(),
            location_query: String::new(),
            portfolio_count: None,
            max_size_kb: MAX_SIZE_KB,
        }
    }
}

impl FilterState {
    /// Number of criteria that currently narrow the result set.
    pub fn active_count(&self) -> usize {
        [
            !self.query.is_empty(),
            !self.portfolio_types.is_empty(),
            !self.portfolio_verification.is_empty(),
            !self.id_verification.is_empty(),
            !self.subscriptions.is_empty(),
            !self.location_query.is_empty(),
            self.portfolio_count.is_some(),
            self.max_size_kb < MAX_SIZE_KB,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

/// Adds `value` when absent, removes it when present. Returns whether it is
/// selected afterwards.
pub fn toggle_member<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

/// Runs every filter stage in order over `records`, keeping their relative
/// order. Each stage sees only what the previous one kept.
pub fn filter_records<'a>(records: &'a [Record], filters: &FilterState) -> Vec<&'a Record> {
    let mut filtered: Vec<&Record> = records.iter().collect();

    if !filters.query.is_empty() {
        let needle = filters.query.to_lowercase();
        filtered.retain(|record| {
            record
                .field_texts()
                .iter()
                .any(|text| text.to_lowercase().contains(&needle))
        });
    }

    retain_members(&mut filtered, &filters.portfolio_types, |record| {
        record.portfolio_type
    });
    retain_members(&mut filtered, &filters.portfolio_verification, |record| {
        record.portfolio_verification
    });
    retain_members(&mut filtered, &filters.id_verification, |record| {
        record.id_verification
    });
    retain_members(&mut filtered, &filters.subscriptions, |record| {
        record.subscription
    });

    if !filters.location_query.is_empty() {
        let needle = filters.location_query.to_lowercase();
        filtered.retain(|record| {
            record
                .location
                .as_deref()
                .is_some_and(|location| location.to_lowercase().contains(&needle))
        });
    }

    if let Some(count_filter) = filters.portfolio_count {
        filtered.retain(|record| count_filter.matches(record.portfolio_count));
    }

    let max_size = f64::from(filters.max_size_kb);
    filtered.retain(|record| record.size_kb.is_some_and(|size| size <= max_size));

    filtered
}

fn retain_members<T: Ord + Copy>(
    filtered: &mut Vec<&Record>,
    selected: &BTreeSet<T>,
    field: impl Fn(&Record) -> Option<T>,
) {
    if selected.is_empty() {
        return;
    }
    filtered.retain(|record| field(record).is_some_and(|value| selected.contains(&value)));
}
