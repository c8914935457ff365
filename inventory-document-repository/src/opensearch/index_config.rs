//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the asset detail index.

use serde_json::{json, Value};

/// Configuration for the asset index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The alias name for the index (used for all operations).
    pub alias: String,
    /// The version number for the index (e.g., 0 for "assets_v0").
    pub version: u32,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `alias` - The index alias name
    /// * `version` - The version number
    pub fn new(alias: impl Into<String>, version: u32) -> Self {
        Self {
            alias: alias.into(),
            version,
        }
    }
}

/// The base name of the asset index (without version).
pub const INDEX_NAME: &str = "assets";

/// Get the versioned index name (e.g., "assets_v0").
pub fn get_versioned_index_name(version: Option<u32>) -> String {
    let v = version.unwrap_or(0);
    format!("{}_v{}", INDEX_NAME, v)
}

/// Get the index settings and mappings for the asset index.
///
/// Every enumerated field is a `keyword` so it can be grouped with a terms
/// aggregation; `created_at` is a `date` for the monthly histogram. Risks and
/// controls are stored as plain objects and never queried.
pub fn get_index_settings(_version: Option<u32>) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "dynamic": "strict",
            "properties": {
                "asset_id": { "type": "long" },
                "name": {
                    "type": "text",
                    "fields": {
                        "raw": { "type": "keyword" }
                    }
                },
                "type": { "type": "keyword" },
                "description": { "type": "text" },
                "classification": { "type": "keyword" },
                "location": { "type": "keyword" },
                "owner": { "type": "keyword" },
                "value": { "type": "keyword" },
                "status": { "type": "keyword" },
                "risks": {
                    "type": "object",
                    "properties": {
                        "risk_id": { "type": "keyword" },
                        "description": { "type": "text" },
                        "impact": { "type": "keyword" },
                        "probability": { "type": "keyword" }
                    }
                },
                "controls": {
                    "type": "object",
                    "properties": {
                        "control_id": { "type": "keyword" },
                        "description": { "type": "text" }
                    }
                },
                "last_audit": {
                    "type": "object",
                    "properties": {
                        "date": { "type": "date" },
                        "auditor": { "type": "keyword" },
                        "result": { "type": "keyword" }
                    }
                },
                "created_at": { "type": "date" },
                "updated_at": { "type": "date" }
            }
        }
    })
}
