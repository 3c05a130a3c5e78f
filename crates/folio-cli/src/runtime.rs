// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use folio_api::Client;
use folio_app::Record;
use folio_testkit::PortfolioFaker;
use folio_tui::{InternalEvent, RecordSource};
use std::sync::mpsc::Sender;
use std::thread;
use tracing::{error, info};

pub const DEMO_RECORD_COUNT: usize = 137;
const DEMO_SEED: u64 = 20_260_301;

/// Loads records from the portfolio backend.
pub struct ApiRuntime {
    client: Client,
}

impl ApiRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl RecordSource for ApiRuntime {
    fn fetch_records(&mut self) -> Result<Vec<Record>> {
        Ok(self.client.fetch_records()?)
    }

    fn spawn_fetch(&mut self, tx: Sender<InternalEvent>) -> Result<()> {
        let mut worker = ApiRuntime::new(self.client.clone());
        thread::Builder::new()
            .name("folio-fetch".to_owned())
            .spawn(move || {
                let outcome = worker
                    .fetch_records()
                    .map_err(|error| error.to_string());
                if tx.send(InternalEvent::FetchFinished(outcome)).is_err() {
                    error!("fetch finished after the UI exited");
                }
            })
            .context("spawn fetch thread")?;
        Ok(())
    }
}

/// Serves a fixed set of generated records without touching the network.
pub struct DemoRuntime {
    records: Vec<Record>,
}

impl DemoRuntime {
    pub fn new(count: usize) -> Self {
        info!(count, "generating demo records");
        Self {
            records: PortfolioFaker::new(DEMO_SEED).records(count),
        }
    }
}

impl RecordSource for DemoRuntime {
    fn fetch_records(&mut self) -> Result<Vec<Record>> {
        if self.records.is_empty() {
            return Err(anyhow!("demo data set is empty"));
        }
        Ok(self.records.clone())
    }
}
