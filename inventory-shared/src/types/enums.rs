//! Closed enumerations used by asset detail records.
//!
//! Every enumerated field is stored and transmitted as its lowercase (or,
//! for asset types, capitalized) string label. Parsing rejects anything
//! outside the closed set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not a member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: '{value}' (expected one of: {})", .expected.join(", "))]
pub struct ParseEnumError {
    /// Name of the field being parsed (e.g. "type").
    pub field: &'static str,
    /// The rejected input.
    pub value: String,
    /// The accepted labels.
    pub expected: &'static [&'static str],
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            const LABELS: &'static [&'static str] = &[$($label),+];

            /// The stored string label.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        field: $field,
                        value: other.to_string(),
                        expected: Self::LABELS,
                    }),
                }
            }
        }
    };
}

string_enum!(
    /// Kind of asset.
    AssetType, "type" {
        Server => "Server",
        Application => "Application",
        Device => "Device",
        Database => "Database",
    }
);

string_enum!(
    /// Data classification of an asset.
    Classification, "classification" {
        Public => "public",
        Internal => "internal",
        TopSecret => "top secret",
    }
);

string_enum!(
    /// Business value rating. Declaration order is severity order, so the
    /// derived `Ord` sorts `low < medium < high < critical`.
    AssetValue, "value" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

string_enum!(
    /// Lifecycle status of an asset.
    AssetStatus, "status" {
        Active => "active",
        Inactive => "inactive",
        InPlanning => "in planning",
        Decommissioned => "decommissioned",
    }
);

string_enum!(
    /// Impact or probability rating of a risk.
    RiskLevel, "risk level" {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

string_enum!(
    /// Outcome of the most recent audit.
    AuditResult, "audit result" {
        Compliant => "compliant",
        NonCompliant => "non-compliant",
        Pending => "pending",
    }
);

impl Default for AssetStatus {
    fn default() -> Self {
        AssetStatus::Active
    }
}

impl AssetValue {
    /// Whether the value counts towards the "high value" total of a summary.
    pub fn is_high_or_critical(&self) -> bool {
        matches!(self, AssetValue::High | AssetValue::Critical)
    }
}
