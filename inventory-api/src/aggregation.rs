//! Grouped statistics over a company's assets.
//!
//! The set of assets is resolved from the ownership store on every call; the
//! grouping itself runs in the document store restricted to that set.
//! Results are cached per `(company, kind)` with the aggregation TTL.
//!
//! Ordering of results:
//!
//! - type, status and classification: descending count, ties by label order
//! - value: severity order `low < medium < high < critical`
//! - month: chronological, each entry labelled like `Nov 2025`

use std::str::FromStr;

use chrono::NaiveDate;
use inventory_document_repository::{GroupBucket, MonthBucket, SummaryBuckets};
use inventory_shared::{
    AggregationData, AggregationKind, AssetId, AssetStatus, AssetSummary, AssetType, AssetValue,
    Classification, ClassificationCount, CompanyId, GroupField, MonthlyCount, ParseEnumError,
    StatusCount, TypeCount, ValueCount,
};
use tracing::{debug, warn};

use crate::context::Stores;
use crate::errors::AssetError;

/// Computes and caches aggregations.
#[derive(Clone)]
pub struct AggregationEngine {
    stores: Stores,
}

impl AggregationEngine {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Compute `kind` over the assets owned by `company_id`.
    ///
    /// A company without assets yields the empty result of `kind` without
    /// touching the document store or the cache.
    pub async fn aggregate(
        &self,
        kind: AggregationKind,
        company_id: CompanyId,
    ) -> Result<AggregationData, AssetError> {
        let asset_ids = self
            .stores
            .bounded(
                "resolve company assets",
                self.stores.ownership.asset_ids_for_company(company_id),
            )
            .await?;
        if asset_ids.is_empty() {
            return Ok(AggregationData::empty(kind));
        }

        if let Some(cached) = self.cached(kind, company_id).await {
            debug!(kind = %kind, company_id = %company_id, "Aggregation served from cache");
            return Ok(cached);
        }

        let documents = &self.stores.documents;
        let data = match kind {
            AggregationKind::ByMonth => {
                let months = self
                    .stores
                    .bounded("count by month", documents.count_by_month(&asset_ids))
                    .await?;
                AggregationData::ByMonth(monthly_counts(months))
            }
            AggregationKind::Summary => {
                let buckets = self
                    .stores
                    .bounded("summarize", documents.summarize(&asset_ids))
                    .await?;
                AggregationData::Summary(summary(buckets))
            }
            AggregationKind::ByType => AggregationData::ByType(type_counts(
                self.count_by(&asset_ids, GroupField::Type).await?,
            )),
            AggregationKind::ByStatus => AggregationData::ByStatus(status_counts(
                self.count_by(&asset_ids, GroupField::Status).await?,
            )),
            AggregationKind::ByValue => AggregationData::ByValue(value_counts(
                self.count_by(&asset_ids, GroupField::Value).await?,
            )),
            AggregationKind::ByClassification => AggregationData::ByClassification(
                classification_counts(self.count_by(&asset_ids, GroupField::Classification).await?),
            ),
        };

        self.stores
            .cache
            .put_aggregation(company_id, kind, &data)
            .await;
        Ok(data)
    }

    async fn count_by(
        &self,
        asset_ids: &[AssetId],
        field: GroupField,
    ) -> Result<Vec<GroupBucket>, AssetError> {
        self.stores
            .bounded(
                "count by field",
                self.stores.documents.count_by(asset_ids, field),
            )
            .await
    }

    async fn cached(&self, kind: AggregationKind, company_id: CompanyId) -> Option<AggregationData> {
        let cache = &self.stores.cache;
        match kind {
            AggregationKind::ByType => cache
                .get_aggregation::<Vec<TypeCount>>(company_id, kind)
                .await
                .map(AggregationData::ByType),
            AggregationKind::ByStatus => cache
                .get_aggregation::<Vec<StatusCount>>(company_id, kind)
                .await
                .map(AggregationData::ByStatus),
            AggregationKind::ByValue => cache
                .get_aggregation::<Vec<ValueCount>>(company_id, kind)
                .await
                .map(AggregationData::ByValue),
            AggregationKind::ByClassification => cache
                .get_aggregation::<Vec<ClassificationCount>>(company_id, kind)
                .await
                .map(AggregationData::ByClassification),
            AggregationKind::ByMonth => cache
                .get_aggregation::<Vec<MonthlyCount>>(company_id, kind)
                .await
                .map(AggregationData::ByMonth),
            AggregationKind::Summary => cache
                .get_aggregation::<AssetSummary>(company_id, kind)
                .await
                .map(AggregationData::Summary),
        }
    }
}

/// Decode bucket keys into `T`, dropping keys outside the closed set.
fn parse_buckets<T>(buckets: Vec<GroupBucket>) -> Vec<(T, u64)>
where
    T: FromStr<Err = ParseEnumError>,
{
    buckets
        .into_iter()
        .filter_map(|bucket| match bucket.key.parse::<T>() {
            Ok(label) => Some((label, bucket.count)),
            Err(e) => {
                warn!(error = %e, count = bucket.count, "Skipping unrecognized aggregation key");
                None
            }
        })
        .collect()
}

fn by_count_desc<T: Ord>(mut counts: Vec<(T, u64)>) -> Vec<(T, u64)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

fn type_counts(buckets: Vec<GroupBucket>) -> Vec<TypeCount> {
    by_count_desc(parse_buckets::<AssetType>(buckets))
        .into_iter()
        .map(|(asset_type, count)| TypeCount { asset_type, count })
        .collect()
}

fn status_counts(buckets: Vec<GroupBucket>) -> Vec<StatusCount> {
    by_count_desc(parse_buckets::<AssetStatus>(buckets))
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

fn classification_counts(buckets: Vec<GroupBucket>) -> Vec<ClassificationCount> {
    by_count_desc(parse_buckets::<Classification>(buckets))
        .into_iter()
        .map(|(classification, count)| ClassificationCount {
            classification,
            count,
        })
        .collect()
}

fn value_counts(buckets: Vec<GroupBucket>) -> Vec<ValueCount> {
    let mut counts = parse_buckets::<AssetValue>(buckets);
    counts.sort_by_key(|(value, _)| *value);
    counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect()
}

fn monthly_counts(mut months: Vec<MonthBucket>) -> Vec<MonthlyCount> {
    months.sort_by_key(|bucket| (bucket.year, bucket.month));
    months
        .into_iter()
        .filter_map(|bucket| match NaiveDate::from_ymd_opt(bucket.year, bucket.month, 1) {
            Some(first_day) => Some(MonthlyCount {
                month: first_day.format("%Y-%m").to_string(),
                label: first_day.format("%b %Y").to_string(),
                count: bucket.count,
            }),
            None => {
                warn!(year = bucket.year, month = bucket.month, "Skipping invalid month bucket");
                None
            }
        })
        .collect()
}

fn summary(buckets: SummaryBuckets) -> AssetSummary {
    AssetSummary {
        total_assets: buckets.total,
        high_value_assets: buckets.high_or_critical,
        by_type: type_counts(buckets.by_type),
        by_status: status_counts(buckets.by_status),
        by_value: value_counts(buckets.by_value),
        by_classification: classification_counts(buckets.by_classification),
    }
}
