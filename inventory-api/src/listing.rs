//! Filtering and sorting of a company's asset list.

use std::cmp::Ordering;
use std::str::FromStr;

use inventory_shared::{AssetDetail, AssetStatus, AssetType};

use crate::errors::AssetError;

/// Field an asset list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    AssetId,
    Name,
    Type,
    Status,
    /// Severity order; assets without a value come first.
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A sort key written as `{field}-{asc|desc}`, e.g. `name-asc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            field: SortField::AssetId,
            direction: SortDirection::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            AssetError::validation(format!(
                "Invalid sort: '{}' (expected {{asset_id|name|type|status|value}}-{{asc|desc}})",
                s
            ))
        };

        let (field, direction) = s.rsplit_once('-').ok_or_else(invalid)?;
        let field = match field {
            "asset_id" => SortField::AssetId,
            "name" => SortField::Name,
            "type" => SortField::Type,
            "status" => SortField::Status,
            "value" => SortField::Value,
            _ => return Err(invalid()),
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return Err(invalid()),
        };
        Ok(Self { field, direction })
    }
}

impl SortOrder {
    fn compare(&self, a: &AssetDetail, b: &AssetDetail) -> Ordering {
        let ordering = match self.field {
            SortField::AssetId => Ordering::Equal,
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Type => a.asset_type.as_str().cmp(b.asset_type.as_str()),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Value => a.value.cmp(&b.value),
        }
        .then_with(|| a.asset_id.cmp(&b.asset_id));

        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Filters applied to a company's assets before sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetListQuery {
    /// Case-insensitive substring of the name or description.
    pub keyword: Option<String>,
    pub asset_type: Option<AssetType>,
    pub status: Option<AssetStatus>,
    pub sort: SortOrder,
}

impl AssetListQuery {
    pub fn matches(&self, asset: &AssetDetail) -> bool {
        if self.asset_type.is_some_and(|t| t != asset.asset_type) {
            return false;
        }
        if self.status.is_some_and(|s| s != asset.status) {
            return false;
        }
        match &self.keyword {
            Some(keyword) => {
                let needle = keyword.to_lowercase();
                asset.name.to_lowercase().contains(&needle)
                    || asset
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    pub fn apply(&self, mut assets: Vec<AssetDetail>) -> Vec<AssetDetail> {
        assets.retain(|asset| self.matches(asset));
        assets.sort_by(|a, b| self.sort.compare(a, b));
        assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use inventory_shared::{AssetId, AssetValue, NewAsset};

    fn asset(id: i64, name: &str, asset_type: AssetType, value: Option<AssetValue>) -> AssetDetail {
        let mut new = NewAsset::new(name, asset_type);
        new.value = value;
        AssetDetail::from_new(AssetId(id), new, Utc::now())
    }

    fn ids(assets: &[AssetDetail]) -> Vec<i64> {
        assets.iter().map(|a| a.asset_id.value()).collect()
    }

    #[test]
    fn test_parse_sort_order() {
        assert_eq!(
            "asset_id-desc".parse::<SortOrder>().unwrap(),
            SortOrder {
                field: SortField::AssetId,
                direction: SortDirection::Desc
            }
        );
        assert_eq!(
            "value-asc".parse::<SortOrder>().unwrap().field,
            SortField::Value
        );
        assert!("name".parse::<SortOrder>().is_err());
        assert!("owner-asc".parse::<SortOrder>().is_err());
        assert!("name-up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_keyword_matches_name_or_description() {
        let mut described = asset(2, "Laptop", AssetType::Device, None);
        described.description = Some("Finance MAIL relay".to_string());
        let assets = vec![
            asset(1, "Mail Server", AssetType::Server, None),
            described,
            asset(3, "CRM", AssetType::Application, None),
        ];

        let query = AssetListQuery {
            keyword: Some("mail".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(assets)), vec![1, 2]);
    }

    #[test]
    fn test_type_and_status_filters() {
        let mut retired = asset(2, "Old DB", AssetType::Database, None);
        retired.status = AssetStatus::Decommissioned;
        let assets = vec![
            asset(1, "DB", AssetType::Database, None),
            retired,
            asset(3, "Web", AssetType::Server, None),
        ];

        let query = AssetListQuery {
            asset_type: Some(AssetType::Database),
            status: Some(AssetStatus::Active),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(assets)), vec![1]);
    }

    #[test]
    fn test_value_sort_uses_severity_with_missing_lowest() {
        let assets = vec![
            asset(1, "a", AssetType::Server, Some(AssetValue::Critical)),
            asset(2, "b", AssetType::Server, None),
            asset(3, "c", AssetType::Server, Some(AssetValue::Low)),
            asset(4, "d", AssetType::Server, Some(AssetValue::High)),
        ];

        let query = AssetListQuery {
            sort: "value-desc".parse().unwrap(),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(assets)), vec![1, 4, 3, 2]);
    }

    #[test]
    fn test_name_sort_is_case_insensitive() {
        let assets = vec![
            asset(1, "beta", AssetType::Server, None),
            asset(2, "Alpha", AssetType::Server, None),
            asset(3, "Gamma", AssetType::Server, None),
        ];

        let query = AssetListQuery {
            sort: "name-asc".parse().unwrap(),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(assets)), vec![2, 1, 3]);
    }
}
