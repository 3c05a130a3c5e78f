// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use folio_app::{PortfolioType, Record, RecordId, SubscriptionTier, VerificationStatus};
use serde_json::json;
use std::path::PathBuf;

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const LOCATIONS: [&str; 16] = [
    "Austin, United States",
    "Seattle, United States",
    "Denver, United States",
    "Raleigh, United States",
    "Mumbai, India",
    "Bengaluru, India",
    "Pune, India",
    "Toronto, Canada",
    "Vancouver, Canada",
    "Montreal, Canada",
    "Tokyo, Japan",
    "Osaka, Japan",
    "Berlin, Germany",
    "Lisbon, Portugal",
    "Nairobi, Kenya",
    "Melbourne, Australia",
];

const USERNAME_SUFFIXES: [&str; 6] = ["", "_art", ".dev", "_studio", "42", "_x"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for plausible portfolio-owner records. The same seed
/// always yields the same sequence.
#[derive(Debug, Clone)]
pub struct PortfolioFaker {
    rng: DeterministicRng,
    issued: u64,
}

impl PortfolioFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            issued: 0,
        }
    }

    pub fn record(&mut self) -> Record {
        self.issued += 1;
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let suffix = self.pick(&USERNAME_SUFFIXES);

        let mut record = Record::new(RecordId::new(format!(
            "{:08x}{:016x}",
            self.issued,
            self.rng.next_u64()
        )));
        record.member_name = Some(format!("{first} {last}"));
        record.username = Some(format!(
            "{}{}{suffix}",
            first.to_ascii_lowercase(),
            &last[..1].to_ascii_lowercase()
        ));
        record.portfolio_type = Some(PortfolioType::ALL[self.rng.int_n(PortfolioType::ALL.len())]);
        record.portfolio_verification = self.verification();
        record.id_verification = self.verification();
        record.location = Some(self.pick(&LOCATIONS).to_owned());
        record.subscription =
            Some(SubscriptionTier::ALL[self.rng.int_n(SubscriptionTier::ALL.len())]);
        record.portfolio_count = Some(1 + self.rng.int_n(7) as i64);
        record.size_kb = Some(self.size_kb());
        record
    }

    pub fn records(&mut self, count: usize) -> Vec<Record> {
        (0..count).map(|_| self.record()).collect()
    }

    fn verification(&mut self) -> Option<VerificationStatus> {
        // One in eight members has never started verification.
        if self.rng.int_n(8) == 0 {
            return None;
        }
        Some(VerificationStatus::ALL[self.rng.int_n(VerificationStatus::ALL.len())])
    }

    fn size_kb(&mut self) -> f64 {
        let whole = self.rng.int_n(60_000) as f64;
        let fraction = self.rng.int_n(100) as f64 / 100.0;
        whole + fraction
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

/// A record with only an id and the fields needed to survive the size stage.
pub fn minimal_record(id: &str, size_kb: f64) -> Record {
    let mut record = Record::new(id);
    record.size_kb = Some(size_kb);
    record
}

/// Body of a successful `GET /api/users` response.
pub fn users_payload(records: &[Record]) -> Result<String> {
    serde_json::to_string(&json!({ "success": true, "data": records }))
        .context("encode users payload")
}

/// Body of an application-level failure response.
pub fn failure_payload(error: Option<&str>) -> String {
    match error {
        Some(error) => json!({ "success": false, "error": error }).to_string(),
        None => json!({ "success": false }).to_string(),
    }
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}

pub fn location_countries() -> Vec<&'static str> {
    let mut countries = LOCATIONS
        .iter()
        .filter_map(|location| location.rsplit(", ").next())
        .collect::<Vec<_>>();
    countries.sort_unstable();
    countries.dedup();
    countries
}
