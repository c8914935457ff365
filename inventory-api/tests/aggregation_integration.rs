//! Integration tests for the aggregation engine.

mod common;

use chrono::{TimeZone, Utc};
use common::{Harness, ACME, GLOBEX};
use inventory_api::coordinator::OwnerRef;
use inventory_document_repository::AssetDocumentStore;
use inventory_shared::{
    AggregationData, AggregationKind, AssetDetail, AssetId, AssetStatus, AssetSummary,
    AssetType, AssetValue, Classification, CompanyId, MonthlyCount, NewAsset, StatusCount,
    TypeCount, ValueCount,
};

async fn create(harness: &Harness, company_id: CompanyId, new: NewAsset) -> AssetId {
    let username = if company_id == ACME { "jdoe" } else { "asmith" };
    harness
        .coordinator()
        .create(&OwnerRef::new(username, company_id), new)
        .await
        .unwrap()
}

fn valued(name: &str, value: AssetValue) -> NewAsset {
    let mut new = NewAsset::new(name, AssetType::Server);
    new.value = Some(value);
    new
}

#[tokio::test]
async fn test_by_value_orders_by_severity() {
    let harness = Harness::new().await;
    create(&harness, ACME, valued("a", AssetValue::Low)).await;
    create(&harness, ACME, valued("b", AssetValue::Low)).await;
    create(&harness, ACME, valued("c", AssetValue::High)).await;

    let data = harness
        .engine()
        .aggregate(AggregationKind::ByValue, ACME)
        .await
        .unwrap();

    assert_eq!(
        data,
        AggregationData::ByValue(vec![
            ValueCount { value: AssetValue::Low, count: 2 },
            ValueCount { value: AssetValue::High, count: 1 },
        ])
    );
}

#[tokio::test]
async fn test_company_without_assets_gets_empty_result_without_queries() {
    let harness = Harness::new().await;
    create(&harness, ACME, valued("a", AssetValue::Low)).await;

    let engine = harness.engine();
    for kind in AggregationKind::ALL {
        let data = engine.aggregate(*kind, GLOBEX).await.unwrap();
        assert_eq!(data, AggregationData::empty(*kind));
    }

    assert_eq!(harness.documents.aggregation_query_count(), 0);
    assert!(harness.cached("agg:2:summary").await.is_none());
}

#[tokio::test]
async fn test_repeated_aggregation_is_served_from_cache() {
    let harness = Harness::new().await;
    create(&harness, ACME, NewAsset::new("a", AssetType::Server)).await;
    create(&harness, ACME, NewAsset::new("b", AssetType::Device)).await;
    let engine = harness.engine();

    let first = engine.aggregate(AggregationKind::ByType, ACME).await.unwrap();
    let second = engine.aggregate(AggregationKind::ByType, ACME).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(harness.documents.aggregation_query_count(), 1);
    assert!(harness.cached("agg:1:by-type").await.is_some());
}

#[tokio::test]
async fn test_every_kind_round_trips_through_the_cache() {
    let harness = Harness::new().await;
    let mut new = valued("a", AssetValue::Critical);
    new.classification = Some(Classification::TopSecret);
    create(&harness, ACME, new).await;
    let engine = harness.engine();

    for kind in AggregationKind::ALL {
        let computed = engine.aggregate(*kind, ACME).await.unwrap();
        let cached = engine.aggregate(*kind, ACME).await.unwrap();
        assert_eq!(computed, cached, "{}", kind);
    }
    assert_eq!(
        harness.documents.aggregation_query_count(),
        AggregationKind::ALL.len()
    );
}

#[tokio::test]
async fn test_writes_invalidate_company_aggregations() {
    let harness = Harness::new().await;
    create(&harness, ACME, NewAsset::new("a", AssetType::Server)).await;
    let engine = harness.engine();

    let before = engine.aggregate(AggregationKind::ByType, ACME).await.unwrap();
    assert_eq!(
        before,
        AggregationData::ByType(vec![TypeCount { asset_type: AssetType::Server, count: 1 }])
    );

    let device = create(&harness, ACME, NewAsset::new("b", AssetType::Device)).await;
    let after_create = engine.aggregate(AggregationKind::ByType, ACME).await.unwrap();
    assert_eq!(
        after_create,
        AggregationData::ByType(vec![
            TypeCount { asset_type: AssetType::Server, count: 1 },
            TypeCount { asset_type: AssetType::Device, count: 1 },
        ])
    );

    harness.coordinator().delete(device).await.unwrap();
    let after_delete = engine.aggregate(AggregationKind::ByType, ACME).await.unwrap();
    assert_eq!(after_delete, before);
}

#[tokio::test]
async fn test_aggregations_are_restricted_to_the_company() {
    let harness = Harness::new().await;
    create(&harness, ACME, NewAsset::new("a", AssetType::Server)).await;
    create(&harness, GLOBEX, NewAsset::new("b", AssetType::Server)).await;
    create(&harness, GLOBEX, NewAsset::new("c", AssetType::Server)).await;

    let data = harness
        .engine()
        .aggregate(AggregationKind::ByStatus, GLOBEX)
        .await
        .unwrap();

    assert_eq!(
        data,
        AggregationData::ByStatus(vec![StatusCount { status: AssetStatus::Active, count: 2 }])
    );
}

#[tokio::test]
async fn test_by_month_is_chronological_with_labels() {
    let harness = Harness::new().await;

    // Detail records with fixed creation dates, owned by ACME
    for month in [11, 2, 11] {
        let asset_id = create(&harness, ACME, NewAsset::new("x", AssetType::Device)).await;
        let stored = harness.documents.inner.get_asset(asset_id).await.unwrap().unwrap();
        harness.documents.inner.delete_asset(asset_id).await.unwrap();
        let created = Utc.with_ymd_and_hms(2025, month, 10, 9, 0, 0).unwrap();
        let dated = AssetDetail {
            created_at: created,
            updated_at: created,
            ..stored
        };
        harness.documents.inner.insert_asset(&dated).await.unwrap();
    }

    let data = harness
        .engine()
        .aggregate(AggregationKind::ByMonth, ACME)
        .await
        .unwrap();

    assert_eq!(
        data,
        AggregationData::ByMonth(vec![
            MonthlyCount {
                month: "2025-02".to_string(),
                label: "Feb 2025".to_string(),
                count: 1
            },
            MonthlyCount {
                month: "2025-11".to_string(),
                label: "Nov 2025".to_string(),
                count: 2
            },
        ])
    );
}

#[tokio::test]
async fn test_summary() {
    let harness = Harness::new().await;
    create(&harness, ACME, valued("a", AssetValue::Critical)).await;
    create(&harness, ACME, valued("b", AssetValue::High)).await;
    create(&harness, ACME, valued("c", AssetValue::Low)).await;
    create(&harness, ACME, NewAsset::new("d", AssetType::Device)).await;

    let data = harness
        .engine()
        .aggregate(AggregationKind::Summary, ACME)
        .await
        .unwrap();

    let AggregationData::Summary(AssetSummary {
        total_assets,
        high_value_assets,
        by_type,
        by_value,
        by_classification,
        ..
    }) = data
    else {
        panic!("expected a summary");
    };
    assert_eq!(total_assets, 4);
    assert_eq!(high_value_assets, 2);
    assert_eq!(
        by_type,
        vec![
            TypeCount { asset_type: AssetType::Server, count: 3 },
            TypeCount { asset_type: AssetType::Device, count: 1 },
        ]
    );
    assert_eq!(by_value.len(), 3);
    assert!(by_classification.is_empty());
}
