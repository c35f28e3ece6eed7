//! Label identifier generation.
//!
//! Identifiers are `prefix + low-order epoch millis + zero padded random`.
//! They are unique enough for display and scanning; the inventory store's
//! primary key is the only real uniqueness guarantee.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{ID_PREFIX, ID_RANDOM_DIGITS, ID_TIME_DIGITS};

/// The scannable value encoded into a barcode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelId(String);

impl LabelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LabelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("label id must not be empty")]
pub struct EmptyLabelId;

impl FromStr for LabelId {
    type Err = EmptyLabelId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmptyLabelId);
        }
        Ok(Self(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(ID_PREFIX)
    }
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// New id from the system clock and the thread rng.
    pub fn generate(&self) -> LabelId {
        // A clock before 1970 only loses the time component.
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        self.generate_with(millis, &mut rand::rng())
    }

    pub fn generate_with<R: Rng>(&self, epoch_millis: u128, rng: &mut R) -> LabelId {
        let time_mod = 10u128.pow(ID_TIME_DIGITS);
        let random_mod = 10u32.pow(ID_RANDOM_DIGITS);
        let time_part = epoch_millis % time_mod;
        let random_part = rng.random_range(0..random_mod);
        LabelId(format!(
            "{}{:0tw$}{:0rw$}",
            self.prefix,
            time_part,
            random_part,
            tw = ID_TIME_DIGITS as usize,
            rw = ID_RANDOM_DIGITS as usize,
        ))
    }
}

/// New id with the default prefix.
pub fn generate_id() -> LabelId {
    IdGenerator::default().generate()
}
