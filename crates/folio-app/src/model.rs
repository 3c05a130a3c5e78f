// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PortfolioType {
    Personal,
    Corporate,
    Matrimonial,
    Business,
    Creative,
    Academic,
    #[serde(rename = "Community & Service")]
    CommunityService,
    Lifestyle,
    Professional,
}

impl PortfolioType {
    pub const ALL: [Self; 9] = [
        Self::Personal,
        Self::Corporate,
        Self::Matrimonial,
        Self::Business,
        Self::Creative,
        Self::Academic,
        Self::CommunityService,
        Self::Lifestyle,
        Self::Professional,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Corporate => "Corporate",
            Self::Matrimonial => "Matrimonial",
            Self::Business => "Business",
            Self::Creative => "Creative",
            Self::Academic => "Academic",
            Self::CommunityService => "Community & Service",
            Self::Lifestyle => "Lifestyle",
            Self::Professional => "Professional",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Not Verified")]
    NotVerified,
}

impl VerificationStatus {
    pub const ALL: [Self; 3] = [Self::Verified, Self::InProgress, Self::NotVerified];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::InProgress => "In Progress",
            Self::NotVerified => "Not Verified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubscriptionTier {
    Basic,
    Standard,
    Advanced,
    Premium,
}

impl SubscriptionTier {
    pub const ALL: [Self; 4] = [Self::Basic, Self::Standard, Self::Advanced, Self::Premium];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Standard => "Standard",
            Self::Advanced => "Advanced",
            Self::Premium => "Premium",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == value.trim())
    }
}

/// One portfolio owner as returned by the users endpoint.
///
/// Every field except the id is optional: the backend stores loosely-shaped
/// documents and a missing or unrecognized value must not break the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "Member Name", skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(rename = "Username", skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(rename = "Portfolio Type", skip_serializing_if = "Option::is_none")]
    pub portfolio_type: Option<PortfolioType>,
    #[serde(
        rename = "Portfolio Verification",
        skip_serializing_if = "Option::is_none"
    )]
    pub portfolio_verification: Option<VerificationStatus>,
    #[serde(rename = "ID Verification", skip_serializing_if = "Option::is_none")]
    pub id_verification: Option<VerificationStatus>,
    #[serde(rename = "Location", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "Subscription", skip_serializing_if = "Option::is_none")]
    pub subscription: Option<SubscriptionTier>,
    #[serde(rename = "No. of Portfolios", skip_serializing_if = "Option::is_none")]
    pub portfolio_count: Option<i64>,
    #[serde(rename = "Size (KB)", skip_serializing_if = "Option::is_none")]
    pub size_kb: Option<f64>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            member_name: None,
            username: None,
            portfolio_type: None,
            portfolio_verification: None,
            id_verification: None,
            location: None,
            subscription: None,
            portfolio_count: None,
            size_kb: None,
        }
    }

    /// String form of every present field, in wire order. This is what the
    /// free-text search looks at. Locally synthesized ids are not fields.
    pub fn field_texts(&self) -> Vec<String> {
        let mut texts = Vec::new();
        if !self.id.is_synthesized() {
            texts.push(self.id.as_str().to_owned());
        }
        texts.extend(self.member_name.clone());
        texts.extend(self.username.clone());
        texts.extend(self.portfolio_type.map(|value| value.as_str().to_owned()));
        texts.extend(
            self.portfolio_verification
                .map(|value| value.as_str().to_owned()),
        );
        texts.extend(self.id_verification.map(|value| value.as_str().to_owned()));
        texts.extend(self.location.clone());
        texts.extend(self.subscription.map(|value| value.as_str().to_owned()));
        texts.extend(self.portfolio_count.map(|value| value.to_string()));
        texts.extend(self.size_kb.map(|value| value.to_string()));
        texts
    }

    pub fn avatar_initial(&self) -> char {
        self.member_name
            .as_deref()
            .and_then(|name| name.chars().next())
            .unwrap_or('?')
    }

    /// Size rounded to whole kilobytes, blank when the backend sent nothing usable.
    pub fn size_label(&self) -> String {
        match self.size_kb {
            Some(size) if size.is_finite() => format!("{} KB", size.round() as i64),
            _ => String::new(),
        }
    }
}

/// Single-select constraint on the number of portfolios a member owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortfolioCountFilter {
    Exactly(i64),
    AtLeast(i64),
}

impl PortfolioCountFilter {
    pub const OPTIONS: [Self; 4] = [
        Self::Exactly(1),
        Self::Exactly(2),
        Self::Exactly(3),
        Self::AtLeast(4),
    ];

    pub fn matches(self, count: Option<i64>) -> bool {
        let Some(count) = count else {
            return false;
        };
        match self {
            Self::Exactly(expected) => count == expected,
            Self::AtLeast(minimum) => count >= minimum,
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Exactly(value) => value.to_string(),
            Self::AtLeast(value) => format!("{value} or more"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    Five,
    #[default]
    Ten,
    Twenty,
    Fifty,
}

impl PageSize {
    pub const ALL: [Self; 4] = [Self::Five, Self::Ten, Self::Twenty, Self::Fifty];

    pub const fn get(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
        }
    }

    pub fn from_count(value: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.get() == value)
    }

    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|size| *size == self)
            .unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    MemberName,
    Username,
    PortfolioCount,
    IdVerification,
    PortfolioVerification,
    Location,
    Size,
    Subscription,
}

impl SortColumn {
    pub const ALL: [Self; 8] = [
        Self::MemberName,
        Self::Username,
        Self::PortfolioCount,
        Self::IdVerification,
        Self::PortfolioVerification,
        Self::Location,
        Self::Size,
        Self::Subscription,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::MemberName => "Member Name",
            Self::Username => "Username",
            Self::PortfolioCount => "No. of Portfolios",
            Self::IdVerification => "ID Verification",
            Self::PortfolioVerification => "Portfolio Verification",
            Self::Location => "Location",
            Self::Size => "Size",
            Self::Subscription => "Subscription",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}
