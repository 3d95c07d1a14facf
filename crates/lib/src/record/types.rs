//! Closed value types used by user records

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RecordError;
use crate::constants::ALL_REGIONS;

/// A normalized region code, or the `ALL` wildcard.
///
/// Codes are case-insensitive on input and stored upper-case: 2 to 10 ASCII
/// letters, digits or `-`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Region(String);

impl Region {
    /// The wildcard region matching every other region.
    pub fn all() -> Self {
        Region(ALL_REGIONS.to_string())
    }

    /// Validate and normalize a region code.
    pub fn parse(value: &str) -> Result<Self, RecordError> {
        let code = value.trim().to_ascii_uppercase();
        let valid = (2..=10).contains(&code.len())
            && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !code.starts_with('-')
            && !code.ends_with('-');
        if valid {
            Ok(Region(code))
        } else {
            Err(RecordError::InvalidRegion {
                value: value.to_string(),
            })
        }
    }

    /// Whether this is the `ALL` wildcard.
    pub fn is_all(&self) -> bool {
        self.0 == ALL_REGIONS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Region {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::parse(s)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a user wants new items delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestMode {
    /// Every new item as soon as it is seen
    #[default]
    Immediate,
    /// One summary per day at the digest hour
    Daily,
    /// One summary per week at the digest weekday and hour
    Weekly,
}

impl DigestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestMode::Immediate => "immediate",
            DigestMode::Daily => "daily",
            DigestMode::Weekly => "weekly",
        }
    }
}

impl FromStr for DigestMode {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" => Ok(DigestMode::Immediate),
            "daily" => Ok(DigestMode::Daily),
            "weekly" => Ok(DigestMode::Weekly),
            _ => Err(RecordError::InvalidDigestMode {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for DigestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's relationship to a single item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Interested,
    Registered,
    Maybe,
    Skip,
}

impl ItemStatus {
    /// All statuses, in display order.
    pub const ALL: [ItemStatus; 4] = [
        ItemStatus::Interested,
        ItemStatus::Registered,
        ItemStatus::Maybe,
        ItemStatus::Skip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Interested => "interested",
            ItemStatus::Registered => "registered",
            ItemStatus::Maybe => "maybe",
            ItemStatus::Skip => "skip",
        }
    }

    /// Whether friends should see this status as interest in the item.
    pub fn is_positive(&self) -> bool {
        !matches!(self, ItemStatus::Skip)
    }
}

impl FromStr for ItemStatus {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interested" => Ok(ItemStatus::Interested),
            "registered" => Ok(ItemStatus::Registered),
            "maybe" => Ok(ItemStatus::Maybe),
            "skip" => Ok(ItemStatus::Skip),
            _ => Err(RecordError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
