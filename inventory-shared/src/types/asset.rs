//! Asset detail records as held by the document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::enums::{
    AssetStatus, AssetType, AssetValue, AuditResult, Classification, RiskLevel,
};
use crate::types::ids::AssetId;

/// A known risk attached to an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub risk_id: String,
    pub description: String,
    pub impact: RiskLevel,
    pub probability: RiskLevel,
}

/// A security control attached to an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Control {
    pub control_id: String,
    pub description: String,
}

/// Outcome of the most recent audit of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastAudit {
    pub date: DateTime<Utc>,
    pub auditor: String,
    pub result: AuditResult,
}

/// The mutable, descriptive half of an asset.
///
/// Keyed by the same `asset_id` as the identity record in the relational
/// store. `created_at` and `updated_at` are always assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDetail {
    pub asset_id: AssetId,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Free-text owner label, unrelated to the creating user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AssetValue>,
    #[serde(default)]
    pub status: AssetStatus,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub controls: Vec<Control>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_audit: Option<LastAudit>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new asset.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub name: String,
    pub asset_type: AssetType,
    pub description: Option<String>,
    pub classification: Option<Classification>,
    pub location: Option<String>,
    pub owner: Option<String>,
    pub value: Option<AssetValue>,
    /// Defaults to [`AssetStatus::Active`] when absent.
    pub status: Option<AssetStatus>,
}

impl NewAsset {
    /// Create a new asset with only the required fields set.
    pub fn new(name: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            name: name.into(),
            asset_type,
            description: None,
            classification: None,
            location: None,
            owner: None,
            value: None,
            status: None,
        }
    }
}

impl AssetDetail {
    /// Build the detail record for a freshly issued id. Risks and controls
    /// start empty and both timestamps are set to `now`.
    pub fn from_new(asset_id: AssetId, new: NewAsset, now: DateTime<Utc>) -> Self {
        Self {
            asset_id,
            name: new.name,
            asset_type: new.asset_type,
            description: new.description,
            classification: new.classification,
            location: new.location,
            owner: new.owner,
            value: new.value,
            status: new.status.unwrap_or_default(),
            risks: Vec::new(),
            controls: Vec::new(),
            last_audit: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update of a detail record.
///
/// Only fields that are `Some` are applied; everything else keeps its prior
/// value. Serializes to exactly the supplied fields, which makes it usable as
/// a partial document for stores that merge updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AssetValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssetStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<Vec<Risk>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<Control>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_audit: Option<LastAudit>,
}

impl AssetPatch {
    /// Whether no field is supplied. An empty patch still bumps `updated_at`.
    pub fn is_empty(&self) -> bool {
        self == &AssetPatch::default()
    }

    /// Apply the supplied fields to `asset` and stamp `updated_at`.
    pub fn apply(&self, asset: &mut AssetDetail, updated_at: DateTime<Utc>) {
        if let Some(name) = &self.name {
            asset.name = name.clone();
        }
        if let Some(asset_type) = self.asset_type {
            asset.asset_type = asset_type;
        }
        if let Some(description) = &self.description {
            asset.description = Some(description.clone());
        }
        if let Some(classification) = self.classification {
            asset.classification = Some(classification);
        }
        if let Some(location) = &self.location {
            asset.location = Some(location.clone());
        }
        if let Some(owner) = &self.owner {
            asset.owner = Some(owner.clone());
        }
        if let Some(value) = self.value {
            asset.value = Some(value);
        }
        if let Some(status) = self.status {
            asset.status = status;
        }
        if let Some(risks) = &self.risks {
            asset.risks = risks.clone();
        }
        if let Some(controls) = &self.controls {
            asset.controls = controls.clone();
        }
        if let Some(last_audit) = &self.last_audit {
            asset.last_audit = Some(last_audit.clone());
        }
        asset.updated_at = updated_at;
    }
}
