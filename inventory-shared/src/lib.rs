//! # Inventory Shared
//!
//! This crate defines the data structures shared across the asset inventory
//! ecosystem: identifiers, the closed enumerations used by asset detail
//! records, the detail record itself, partial updates, and the shapes of
//! aggregation results.

pub mod types;

pub use types::aggregation::{
    AggregationData, AggregationKind, AssetSummary, ClassificationCount, GroupField,
    MonthlyCount, StatusCount, TypeCount, ValueCount,
};
pub use types::asset::{AssetDetail, AssetPatch, Control, LastAudit, NewAsset, Risk};
pub use types::enums::{
    AssetStatus, AssetType, AuditResult, Classification, AssetValue, ParseEnumError, RiskLevel,
};
pub use types::ids::{AssetId, CompanyId, UserId};
