//! Request payloads and query parameters of the HTTP surface.
//!
//! Inputs arrive loosely typed (as the browser forms send them) and are
//! validated into domain types here, before any store is touched.

use std::str::FromStr;

use inventory_shared::{
    AssetId, AssetStatus, AssetType, AssetValue, Classification, CompanyId, NewAsset, ParseEnumError,
};
use serde::Deserialize;

use crate::coordinator::OwnerRef;
use crate::errors::AssetError;
use crate::listing::{AssetListQuery, SortOrder};

const MISSING_CREATE_FIELDS: &str = "Missing required fields: name, type, username, companyId";

/// A numeric identifier sent either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdParam {
    Number(i64),
    Text(String),
}

impl IdParam {
    fn parse<T: From<i64>>(&self) -> Option<T> {
        match self {
            IdParam::Number(n) => Some(T::from(*n)),
            IdParam::Text(s) => s.trim().parse::<i64>().ok().map(T::from),
        }
    }
}

/// Body of `POST /api/assets`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub description: Option<String>,
    pub classification: Option<String>,
    pub location: Option<String>,
    pub owner: Option<String>,
    pub value: Option<String>,
    pub status: Option<String>,
    pub username: Option<String>,
    pub company_id: Option<IdParam>,
}

/// Empty strings count as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_optional<T>(value: Option<String>) -> Result<Option<T>, AssetError>
where
    T: FromStr<Err = ParseEnumError>,
{
    present(value)
        .map(|v| v.parse::<T>())
        .transpose()
        .map_err(AssetError::from)
}

impl CreateAssetRequest {
    /// Validate the payload into the creating owner and the new asset.
    pub fn into_parts(self) -> Result<(OwnerRef, NewAsset), AssetError> {
        let name = present(self.name);
        let asset_type = present(self.asset_type);
        let username = present(self.username);
        let (Some(name), Some(asset_type), Some(username), Some(company_id)) =
            (name, asset_type, username, self.company_id)
        else {
            return Err(AssetError::validation(MISSING_CREATE_FIELDS));
        };

        let company_id: CompanyId = company_id
            .parse()
            .ok_or_else(|| AssetError::validation("Invalid companyId"))?;
        let asset_type = asset_type.parse::<AssetType>()?;

        let new = NewAsset {
            name,
            asset_type,
            description: present(self.description),
            classification: parse_optional::<Classification>(self.classification)?,
            location: present(self.location),
            owner: present(self.owner),
            value: parse_optional::<AssetValue>(self.value)?,
            status: parse_optional::<AssetStatus>(self.status)?,
        };

        Ok((OwnerRef::new(username, company_id), new))
    }
}

/// Parse an asset id path segment.
pub fn parse_asset_id(raw: &str) -> Result<AssetId, AssetError> {
    raw.parse::<AssetId>()
        .map_err(|_| AssetError::validation("Invalid asset id"))
}

fn require_company_id(raw: Option<&str>) -> Result<CompanyId, AssetError> {
    let raw = raw
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AssetError::validation("Missing required parameter: companyId"))?;
    raw.parse::<CompanyId>()
        .map_err(|_| AssetError::validation("Invalid companyId"))
}

/// Query of `GET /api/assets/analytics/:kind`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyParams {
    pub company_id: Option<String>,
}

impl CompanyParams {
    pub fn company_id(&self) -> Result<CompanyId, AssetError> {
        require_company_id(self.company_id.as_deref())
    }
}

/// Query of `GET /api/assets`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub company_id: Option<String>,
    pub keyword: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

impl ListParams {
    pub fn into_query(self) -> Result<(CompanyId, AssetListQuery), AssetError> {
        let company_id = require_company_id(self.company_id.as_deref())?;
        let sort = match present(self.sort) {
            Some(sort) => sort.parse::<SortOrder>()?,
            None => SortOrder::default(),
        };

        Ok((
            company_id,
            AssetListQuery {
                keyword: present(self.keyword).map(|k| k.trim().to_string()),
                asset_type: parse_optional::<AssetType>(self.asset_type)?,
                status: parse_optional::<AssetStatus>(self.status)?,
                sort,
            },
        ))
    }
}

/// Query of `GET /api/user-id`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLookupParams {
    pub username: Option<String>,
    pub company_id: Option<String>,
}

impl UserLookupParams {
    pub fn into_parts(self) -> Result<(String, CompanyId), AssetError> {
        let username = present(self.username)
            .ok_or_else(|| AssetError::validation("Missing required parameters: username, companyId"))?;
        let company_id = require_company_id(self.company_id.as_deref())?;
        Ok((username, company_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_request(body: serde_json::Value) -> CreateAssetRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_create_request_applies_defaults() {
        let (owner, new) = create_request(json!({
            "name": "Mail Server",
            "type": "Server",
            "description": "",
            "username": "jdoe",
            "companyId": 1
        }))
        .into_parts()
        .unwrap();

        assert_eq!(owner, OwnerRef::new("jdoe", CompanyId(1)));
        assert_eq!(new, NewAsset::new("Mail Server", AssetType::Server));
    }

    #[test]
    fn test_company_id_may_be_a_string() {
        let (owner, _) = create_request(json!({
            "name": "CRM",
            "type": "Application",
            "username": "jdoe",
            "companyId": "12"
        }))
        .into_parts()
        .unwrap();
        assert_eq!(owner.company_id, CompanyId(12));
    }

    #[test]
    fn test_missing_required_fields() {
        let err = create_request(json!({ "name": "CRM", "type": "", "username": "jdoe", "companyId": 1 }))
            .into_parts()
            .unwrap_err();
        assert!(matches!(err, AssetError::Validation(ref msg) if msg == MISSING_CREATE_FIELDS));
    }

    #[test]
    fn test_unknown_enum_values_are_rejected() {
        let err = create_request(json!({
            "name": "CRM",
            "type": "Application",
            "value": "priceless",
            "username": "jdoe",
            "companyId": 1
        }))
        .into_parts()
        .unwrap_err();
        assert!(matches!(err, AssetError::Validation(ref msg) if msg.contains("priceless")));
    }

    #[test]
    fn test_parse_asset_id() {
        assert_eq!(parse_asset_id("42").unwrap(), AssetId(42));
        assert!(parse_asset_id("abc").is_err());
    }

    #[test]
    fn test_list_params() {
        let params = ListParams {
            company_id: Some("3".to_string()),
            asset_type: Some("Device".to_string()),
            sort: Some("name-desc".to_string()),
            ..Default::default()
        };
        let (company_id, query) = params.into_query().unwrap();
        assert_eq!(company_id, CompanyId(3));
        assert_eq!(query.asset_type, Some(AssetType::Device));

        assert!(ListParams::default().into_query().is_err());
        let bad_status = ListParams {
            company_id: Some("3".to_string()),
            status: Some("lost".to_string()),
            ..Default::default()
        };
        assert!(bad_status.into_query().is_err());
    }
}
