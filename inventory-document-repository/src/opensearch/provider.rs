//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `AssetDocumentStore`
//! using the OpenSearch Rust crate. Writes use `refresh=wait_for` so that a
//! successful write is visible to the next read or aggregation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inventory_shared::{AssetDetail, AssetId, AssetPatch, GroupField};
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsAliasParts, IndicesExistsParts, IndicesPutAliasParts},
    params::Refresh,
    CreateParts, DeleteParts, GetParts, MgetParts, OpenSearch, SearchParts, UpdateParts,
};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info};
use url::Url;

use crate::errors::DocumentStoreError;
use crate::interfaces::AssetDocumentStore;
use crate::opensearch::index_config::{get_index_settings, get_versioned_index_name, IndexConfig};
use crate::types::{GroupBucket, MonthBucket, SummaryBuckets};

/// Upper bound on distinct keys returned by a terms aggregation.
///
/// Every grouped field is a small closed enumeration.
const TERMS_SIZE: usize = 16;

/// OpenSearch provider implementation.
///
/// # Example
///
/// ```ignore
/// use inventory_document_repository::opensearch::{IndexConfig, OpenSearchAssetStore};
/// let config = IndexConfig::new("assets", 0);
/// let store = OpenSearchAssetStore::new("http://localhost:9200", config).await?;
/// store.ensure_index_exists().await?;
/// ```
pub struct OpenSearchAssetStore {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchAssetStore {
    /// Create a new OpenSearch store connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration containing alias and version
    pub async fn new(url: &str, index_config: IndexConfig) -> Result<Self, DocumentStoreError> {
        let parsed_url = Url::parse(url).map_err(|e| DocumentStoreError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| DocumentStoreError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            alias = %index_config.alias,
            version = index_config.version,
            "Created OpenSearch asset store"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    fn ids_query(asset_ids: &[AssetId]) -> Value {
        let ids: Vec<i64> = asset_ids.iter().map(|id| id.value()).collect();
        json!({ "terms": { "asset_id": ids } })
    }

    fn terms_agg(field: GroupField) -> Value {
        json!({ "terms": { "field": field.field_name(), "size": TERMS_SIZE } })
    }

    fn month_agg() -> Value {
        json!({
            "date_histogram": {
                "field": "created_at",
                "calendar_interval": "month",
                "format": "yyyy-MM",
                "min_doc_count": 1
            }
        })
    }

    /// Run a `size: 0` search restricted to `asset_ids` and return the raw response body.
    async fn search_aggregations(
        &self,
        asset_ids: &[AssetId],
        aggs: Value,
    ) -> Result<Value, DocumentStoreError> {
        let alias = self.index_config.alias.as_str();
        let response = self
            .client
            .search(SearchParts::Index(&[alias]))
            .body(json!({
                "size": 0,
                "track_total_hits": true,
                "query": Self::ids_query(asset_ids),
                "aggs": aggs
            }))
            .send()
            .await
            .map_err(|e| DocumentStoreError::query(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Aggregation request failed");
            return Err(DocumentStoreError::query(format!(
                "Aggregation failed with status {}: {}",
                status, error_body
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| DocumentStoreError::parse(e.to_string()))
    }
}

/// Decode a get/mget entry into an asset, `None` when `found` is false.
fn parse_found_source(entry: &Value) -> Result<Option<AssetDetail>, DocumentStoreError> {
    if !entry["found"].as_bool().unwrap_or(false) {
        return Ok(None);
    }
    serde_json::from_value(entry["_source"].clone())
        .map(Some)
        .map_err(|e| DocumentStoreError::parse(e.to_string()))
}

fn parse_terms_buckets(aggregations: &Value, name: &str) -> Result<Vec<GroupBucket>, DocumentStoreError> {
    let buckets = aggregations[name]["buckets"]
        .as_array()
        .ok_or_else(|| DocumentStoreError::parse(format!("missing aggregation '{}'", name)))?;

    buckets
        .iter()
        .map(|bucket| {
            let key = bucket["key"]
                .as_str()
                .ok_or_else(|| DocumentStoreError::parse(format!("bucket in '{}' has no string key", name)))?;
            let count = bucket["doc_count"]
                .as_u64()
                .ok_or_else(|| DocumentStoreError::parse(format!("bucket in '{}' has no doc_count", name)))?;
            Ok(GroupBucket::new(key, count))
        })
        .collect()
}

fn parse_month_buckets(aggregations: &Value, name: &str) -> Result<Vec<MonthBucket>, DocumentStoreError> {
    let buckets = aggregations[name]["buckets"]
        .as_array()
        .ok_or_else(|| DocumentStoreError::parse(format!("missing aggregation '{}'", name)))?;

    let mut months = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let count = bucket["doc_count"].as_u64().unwrap_or(0);
        if count == 0 {
            continue;
        }
        let key = bucket["key_as_string"]
            .as_str()
            .ok_or_else(|| DocumentStoreError::parse("month bucket has no key_as_string"))?;
        let (year, month) = key
            .split_once('-')
            .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
            .ok_or_else(|| DocumentStoreError::parse(format!("invalid month key '{}'", key)))?;
        months.push(MonthBucket { year, month, count });
    }
    Ok(months)
}

fn parse_total_hits(body: &Value) -> Result<u64, DocumentStoreError> {
    body["hits"]["total"]["value"]
        .as_u64()
        .ok_or_else(|| DocumentStoreError::parse("missing hits.total.value"))
}

fn patch_document(patch: &AssetPatch, updated_at: DateTime<Utc>) -> Result<Value, DocumentStoreError> {
    let mut doc = match serde_json::to_value(patch) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => return Err(DocumentStoreError::serialization(e.to_string())),
    };
    doc.insert("updated_at".to_string(), json!(updated_at));
    Ok(Value::Object(doc))
}

#[async_trait]
impl AssetDocumentStore for OpenSearchAssetStore {
    /// Create the versioned index with its alias, or attach the alias to an
    /// existing index that lacks it.
    async fn ensure_index_exists(&self) -> Result<(), DocumentStoreError> {
        let alias = self.index_config.alias.as_str();
        let index_name = get_versioned_index_name(Some(self.index_config.version));

        let alias_response = self
            .client
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| DocumentStoreError::connection(e.to_string()))?;

        if alias_response.status_code().is_success() {
            debug!(alias = %alias, "Index alias already exists");
            return Ok(());
        }

        let index_response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index_name.as_str()]))
            .send()
            .await
            .map_err(|e| DocumentStoreError::connection(e.to_string()))?;

        let response = if index_response.status_code().is_success() {
            self.client
                .indices()
                .put_alias(IndicesPutAliasParts::IndexName(&[index_name.as_str()], alias))
                .send()
                .await
                .map_err(|e| DocumentStoreError::index_creation(e.to_string()))?
        } else {
            let mut body = get_index_settings(Some(self.index_config.version));
            let mut aliases = Map::new();
            aliases.insert(alias.to_string(), json!({}));
            body["aliases"] = Value::Object(aliases);

            self.client
                .indices()
                .create(IndicesCreateParts::Index(&index_name))
                .body(body)
                .send()
                .await
                .map_err(|e| DocumentStoreError::index_creation(e.to_string()))?
        };

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(DocumentStoreError::index_creation(format!(
                "Index creation failed with status {}: {}",
                status, error_body
            )));
        }

        info!(index = %index_name, alias = %alias, "Created asset index");
        Ok(())
    }

    async fn insert_asset(&self, asset: &AssetDetail) -> Result<(), DocumentStoreError> {
        let doc_id = asset.asset_id.to_string();
        let body = serde_json::to_value(asset).map_err(|e| DocumentStoreError::serialization(e.to_string()))?;

        let response = self
            .client
            .create(CreateParts::IndexId(&self.index_config.alias, &doc_id))
            .refresh(Refresh::WaitFor)
            .body(body)
            .send()
            .await
            .map_err(|e| DocumentStoreError::insert(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 409 {
            return Err(DocumentStoreError::Conflict(asset.asset_id.value()));
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Insert request failed");
            return Err(DocumentStoreError::insert(format!(
                "Insert failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(asset_id = %asset.asset_id, "Document inserted");
        Ok(())
    }

    async fn get_asset(&self, asset_id: AssetId) -> Result<Option<AssetDetail>, DocumentStoreError> {
        let doc_id = asset_id.to_string();
        let response = self
            .client
            .get(GetParts::IndexId(&self.index_config.alias, &doc_id))
            .send()
            .await
            .map_err(|e| DocumentStoreError::read(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Get request failed");
            return Err(DocumentStoreError::read(format!(
                "Get failed with status {}: {}",
                status, error_body
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| DocumentStoreError::parse(e.to_string()))?;
        parse_found_source(&body)
    }

    async fn get_assets(&self, asset_ids: &[AssetId]) -> Result<Vec<AssetDetail>, DocumentStoreError> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = asset_ids.iter().map(|id| id.to_string()).collect();
        let response = self
            .client
            .mget(MgetParts::Index(&self.index_config.alias))
            .body(json!({ "ids": ids }))
            .send()
            .await
            .map_err(|e| DocumentStoreError::read(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Multi-get request failed");
            return Err(DocumentStoreError::read(format!(
                "Multi-get failed with status {}: {}",
                status, error_body
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| DocumentStoreError::parse(e.to_string()))?;
        let docs = body["docs"]
            .as_array()
            .ok_or_else(|| DocumentStoreError::parse("missing docs in multi-get response"))?;

        let mut assets = Vec::with_capacity(docs.len());
        for doc in docs {
            if let Some(asset) = parse_found_source(doc)? {
                assets.push(asset);
            }
        }
        Ok(assets)
    }

    async fn update_asset(
        &self,
        asset_id: AssetId,
        patch: &AssetPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, DocumentStoreError> {
        let doc_id = asset_id.to_string();
        let doc = patch_document(patch, updated_at)?;

        let response = self
            .client
            .update(UpdateParts::IndexId(&self.index_config.alias, &doc_id))
            .refresh(Refresh::WaitFor)
            .body(json!({ "doc": doc }))
            .send()
            .await
            .map_err(|e| DocumentStoreError::update(e.to_string()))?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(false);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Update request failed");
            return Err(DocumentStoreError::update(format!(
                "Update failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(asset_id = %asset_id, "Document updated");
        Ok(true)
    }

    async fn delete_asset(&self, asset_id: AssetId) -> Result<bool, DocumentStoreError> {
        let doc_id = asset_id.to_string();
        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index_config.alias, &doc_id))
            .refresh(Refresh::WaitFor)
            .send()
            .await
            .map_err(|e| DocumentStoreError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 means there was nothing to delete
        if status.as_u16() == 404 {
            return Ok(false);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete request failed");
            return Err(DocumentStoreError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| DocumentStoreError::parse(e.to_string()))?;
        let deleted = body["result"].as_str() == Some("deleted");

        debug!(asset_id = %asset_id, deleted, "Document delete acknowledged");
        Ok(deleted)
    }

    async fn count_by(
        &self,
        asset_ids: &[AssetId],
        field: GroupField,
    ) -> Result<Vec<GroupBucket>, DocumentStoreError> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .search_aggregations(asset_ids, json!({ "groups": Self::terms_agg(field) }))
            .await?;
        parse_terms_buckets(&body["aggregations"], "groups")
    }

    async fn count_by_month(&self, asset_ids: &[AssetId]) -> Result<Vec<MonthBucket>, DocumentStoreError> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }

        let body = self
            .search_aggregations(asset_ids, json!({ "months": Self::month_agg() }))
            .await?;
        parse_month_buckets(&body["aggregations"], "months")
    }

    async fn summarize(&self, asset_ids: &[AssetId]) -> Result<SummaryBuckets, DocumentStoreError> {
        if asset_ids.is_empty() {
            return Ok(SummaryBuckets::default());
        }

        let aggs = json!({
            "by_type": Self::terms_agg(GroupField::Type),
            "by_status": Self::terms_agg(GroupField::Status),
            "by_value": Self::terms_agg(GroupField::Value),
            "by_classification": Self::terms_agg(GroupField::Classification),
            "high_value": {
                "filter": { "terms": { "value": ["high", "critical"] } }
            }
        });
        let body = self.search_aggregations(asset_ids, aggs).await?;
        let aggregations = &body["aggregations"];

        Ok(SummaryBuckets {
            total: parse_total_hits(&body)?,
            high_or_critical: aggregations["high_value"]["doc_count"].as_u64().unwrap_or(0),
            by_type: parse_terms_buckets(aggregations, "by_type")?,
            by_status: parse_terms_buckets(aggregations, "by_status")?,
            by_value: parse_terms_buckets(aggregations, "by_value")?,
            by_classification: parse_terms_buckets(aggregations, "by_classification")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use inventory_shared::{AssetStatus, AssetType};

    #[test]
    fn test_parse_terms_buckets() {
        let aggregations = json!({
            "groups": {
                "buckets": [
                    { "key": "Server", "doc_count": 3 },
                    { "key": "Device", "doc_count": 1 }
                ]
            }
        });

        let buckets = parse_terms_buckets(&aggregations, "groups").unwrap();
        assert_eq!(buckets, vec![GroupBucket::new("Server", 3), GroupBucket::new("Device", 1)]);
    }

    #[test]
    fn test_parse_terms_buckets_missing_aggregation() {
        let result = parse_terms_buckets(&json!({}), "groups");
        assert!(matches!(result, Err(DocumentStoreError::ParseError(_))));
    }

    #[test]
    fn test_parse_month_buckets_skips_empty_months() {
        let aggregations = json!({
            "months": {
                "buckets": [
                    { "key_as_string": "2025-10", "key": 1759276800000_i64, "doc_count": 2 },
                    { "key_as_string": "2025-11", "key": 1761955200000_i64, "doc_count": 0 },
                    { "key_as_string": "2025-12", "key": 1764547200000_i64, "doc_count": 5 }
                ]
            }
        });

        let months = parse_month_buckets(&aggregations, "months").unwrap();
        assert_eq!(
            months,
            vec![
                MonthBucket { year: 2025, month: 10, count: 2 },
                MonthBucket { year: 2025, month: 12, count: 5 },
            ]
        );
    }

    #[test]
    fn test_parse_month_buckets_rejects_bad_key() {
        let aggregations = json!({
            "months": { "buckets": [ { "key_as_string": "October", "doc_count": 1 } ] }
        });
        assert!(parse_month_buckets(&aggregations, "months").is_err());
    }

    #[test]
    fn test_parse_found_source() {
        let created = Utc.with_ymd_and_hms(2025, 11, 4, 10, 0, 0).unwrap();
        let entry = json!({
            "found": true,
            "_source": {
                "asset_id": 7,
                "name": "db-01",
                "type": "Database",
                "status": "active",
                "created_at": created,
                "updated_at": created
            }
        });

        let asset = parse_found_source(&entry).unwrap().unwrap();
        assert_eq!(asset.asset_id, AssetId(7));
        assert_eq!(asset.asset_type, AssetType::Database);
        assert_eq!(asset.status, AssetStatus::Active);

        assert!(parse_found_source(&json!({ "found": false })).unwrap().is_none());
    }

    #[test]
    fn test_patch_document_only_carries_present_fields() {
        let updated = Utc.with_ymd_and_hms(2025, 11, 5, 8, 30, 0).unwrap();
        let patch = AssetPatch {
            name: Some("renamed".to_string()),
            ..Default::default()
        };

        let doc = patch_document(&patch, updated).unwrap();
        let object = doc.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["name"], "renamed");
        assert!(object.contains_key("updated_at"));
    }

    #[test]
    fn test_parse_total_hits() {
        assert_eq!(parse_total_hits(&json!({ "hits": { "total": { "value": 12 } } })).unwrap(), 12);
        assert!(parse_total_hits(&json!({ "hits": {} })).is_err());
    }
}
