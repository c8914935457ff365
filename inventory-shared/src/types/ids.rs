//! Integer identifiers issued by the relational ownership store.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Returns the raw integer value.
            pub fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map($name)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                $name(value)
            }
        }
    };
}

integer_id!(
    /// Identifier of an asset. Generated by the relational store on insert
    /// and immutable afterwards; the document store keys detail records by it.
    AssetId
);

integer_id!(
    /// Identifier of the organization owning an asset.
    CompanyId
);

integer_id!(
    /// Identifier of the user who created an asset.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_asset_id() {
        assert_eq!("42".parse::<AssetId>().unwrap(), AssetId(42));
        assert_eq!(" 7 ".parse::<AssetId>().unwrap(), AssetId(7));
        assert!("abc".parse::<AssetId>().is_err());
        assert!("12abc".parse::<AssetId>().is_err());
        assert!("".parse::<AssetId>().is_err());
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&CompanyId(3)).unwrap();
        assert_eq!(json, "3");
        let id: AssetId = serde_json::from_str("123").unwrap();
        assert_eq!(id.value(), 123);
    }
}
