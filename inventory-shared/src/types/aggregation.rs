//! Aggregation kinds and result shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::asset::AssetDetail;
use crate::types::enums::{AssetStatus, AssetType, AssetValue, Classification, ParseEnumError};

/// A detail-record field that aggregations can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupField {
    Type,
    Status,
    Value,
    Classification,
}

impl GroupField {
    /// Name of the field inside a stored detail record.
    pub fn field_name(&self) -> &'static str {
        match self {
            GroupField::Type => "type",
            GroupField::Status => "status",
            GroupField::Value => "value",
            GroupField::Classification => "classification",
        }
    }

    /// The label of this field on `asset`, if present.
    pub fn label_of(&self, asset: &AssetDetail) -> Option<&'static str> {
        match self {
            GroupField::Type => Some(asset.asset_type.as_str()),
            GroupField::Status => Some(asset.status.as_str()),
            GroupField::Value => asset.value.as_ref().map(AssetValue::as_str),
            GroupField::Classification => asset.classification.as_ref().map(Classification::as_str),
        }
    }
}

/// The aggregations offered over a company's assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationKind {
    ByType,
    ByStatus,
    ByValue,
    ByClassification,
    ByMonth,
    Summary,
}

impl AggregationKind {
    pub const ALL: &'static [AggregationKind] = &[
        AggregationKind::ByType,
        AggregationKind::ByStatus,
        AggregationKind::ByValue,
        AggregationKind::ByClassification,
        AggregationKind::ByMonth,
        AggregationKind::Summary,
    ];

    const LABELS: &'static [&'static str] = &[
        "by-type",
        "by-status",
        "by-value",
        "by-classification",
        "by-month",
        "summary",
    ];

    /// Path segment naming this aggregation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationKind::ByType => "by-type",
            AggregationKind::ByStatus => "by-status",
            AggregationKind::ByValue => "by-value",
            AggregationKind::ByClassification => "by-classification",
            AggregationKind::ByMonth => "by-month",
            AggregationKind::Summary => "summary",
        }
    }

    /// The single field this aggregation groups by, if any.
    pub fn group_field(&self) -> Option<GroupField> {
        match self {
            AggregationKind::ByType => Some(GroupField::Type),
            AggregationKind::ByStatus => Some(GroupField::Status),
            AggregationKind::ByValue => Some(GroupField::Value),
            AggregationKind::ByClassification => Some(GroupField::Classification),
            AggregationKind::ByMonth | AggregationKind::Summary => None,
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                field: "aggregation",
                value: s.to_string(),
                expected: Self::LABELS,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: AssetStatus,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: AssetValue,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCount {
    pub classification: Classification,
    pub count: u64,
}

/// Assets created in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`.
    pub month: String,
    /// Human-readable label such as `Nov 2025`.
    pub label: String,
    pub count: u64,
}

/// Several groupings of a company's assets computed together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub total_assets: u64,
    /// Assets whose value is `high` or `critical`.
    pub high_value_assets: u64,
    pub by_type: Vec<TypeCount>,
    pub by_status: Vec<StatusCount>,
    pub by_value: Vec<ValueCount>,
    pub by_classification: Vec<ClassificationCount>,
}

/// The result of any aggregation, serialized without a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AggregationData {
    ByType(Vec<TypeCount>),
    ByStatus(Vec<StatusCount>),
    ByValue(Vec<ValueCount>),
    ByClassification(Vec<ClassificationCount>),
    ByMonth(Vec<MonthlyCount>),
    Summary(AssetSummary),
}

impl AggregationData {
    /// The zeroed result for a company that owns no assets.
    pub fn empty(kind: AggregationKind) -> Self {
        match kind {
            AggregationKind::ByType => AggregationData::ByType(Vec::new()),
            AggregationKind::ByStatus => AggregationData::ByStatus(Vec::new()),
            AggregationKind::ByValue => AggregationData::ByValue(Vec::new()),
            AggregationKind::ByClassification => AggregationData::ByClassification(Vec::new()),
            AggregationKind::ByMonth => AggregationData::ByMonth(Vec::new()),
            AggregationKind::Summary => AggregationData::Summary(AssetSummary::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_kind_parses_path_segments() {
        for kind in AggregationKind::ALL {
            assert_eq!(kind.as_str().parse::<AggregationKind>().unwrap(), *kind);
        }
        assert!("by-owner".parse::<AggregationKind>().is_err());
        assert_eq!(AggregationKind::ByValue.group_field(), Some(GroupField::Value));
        assert_eq!(AggregationKind::Summary.group_field(), None);
    }

    #[test]
    fn test_value_counts_serialize_with_dimension_key() {
        let data = AggregationData::ByValue(vec![
            ValueCount { value: AssetValue::Low, count: 2 },
            ValueCount { value: AssetValue::High, count: 1 },
        ]);
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            serde_json::json!([{"value": "low", "count": 2}, {"value": "high", "count": 1}])
        );
    }

    #[test]
    fn test_empty_summary_is_zeroed() {
        let json = serde_json::to_value(AggregationData::empty(AggregationKind::Summary)).unwrap();
        assert_eq!(json["totalAssets"], 0);
        assert_eq!(json["highValueAssets"], 0);
        assert_eq!(json["byType"], serde_json::json!([]));
    }
}
