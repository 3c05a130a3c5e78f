// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque row identity assigned by the backend (a stringified object id).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId {
    value: String,
    #[serde(skip)]
    synthesized: bool,
}

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            synthesized: false,
        }
    }

    /// Identity for a record the backend sent without `_id`.
    pub fn synthesized(index: usize) -> Self {
        Self {
            value: format!("row-{index}"),
            synthesized: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// True when the id was made up locally rather than sent by the backend.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
