//! Bottle identity: label types, certificate path segments and canonical URLs.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Packaging tier; each tier numbers its bottles independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelType {
    Standard,
    Premium,
    Founder,
}

impl LabelType {
    pub const ALL: [Self; 3] = [Self::Standard, Self::Premium, Self::Founder];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Founder => "founder",
        }
    }

    /// Highest bottle number issued for this label.
    #[must_use]
    pub const fn max_bottles(self) -> u16 {
        match self {
            Self::Standard => 700,
            Self::Premium => 100,
            Self::Founder => 40,
        }
    }
}

impl fmt::Display for LabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelType {
    type Err = BottleReferenceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            "founder" => Ok(Self::Founder),
            _ => Err(BottleReferenceError::UnknownLabel),
        }
    }
}

/// A bottle within some batch, as addressed by a certificate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BottleReference {
    pub label_type: LabelType,
    pub bottle_number: u16,
}

impl BottleReference {
    /// Path segment form, e.g. `premium-42`.
    #[must_use]
    pub fn segment(&self) -> String {
        format!("{}-{}", self.label_type, self.bottle_number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BottleReferenceError {
    #[error("bottle reference must look like {{label}}-{{number}}")]
    InvalidFormat,

    #[error("unknown label type")]
    UnknownLabel,

    #[error("bottle number is out of range for its label")]
    OutOfRange,
}

/// Parse a certificate path segment such as `standard-123`.
///
/// Only plain decimal digits are accepted: no sign, no leading zeros, so every
/// accepted segment is the canonical one produced by [`certificate_url`].
pub fn parse_bottle_reference(segment: &str) -> Result<BottleReference, BottleReferenceError> {
    let (label, number) = segment
        .split_once('-')
        .ok_or(BottleReferenceError::InvalidFormat)?;

    let label_type = LabelType::from_str(label)?;

    if number.is_empty()
        || number.starts_with('0')
        || !number.bytes().all(|byte| byte.is_ascii_digit())
    {
        return Err(BottleReferenceError::InvalidFormat);
    }

    let bottle_number = number
        .parse::<u16>()
        .map_err(|_overflow| BottleReferenceError::OutOfRange)?;

    if !(1..=label_type.max_bottles()).contains(&bottle_number) {
        return Err(BottleReferenceError::OutOfRange);
    }

    Ok(BottleReference {
        label_type,
        bottle_number,
    })
}

/// Canonical certificate path for a bottle.
#[must_use]
pub fn certificate_url(batch: &str, label_type: LabelType, bottle_number: u16) -> String {
    format!("/batch/{batch}/{label_type}-{bottle_number}/")
}
