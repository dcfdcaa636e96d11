//! Too Good To Go wire types and their conversion into snapshots

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::errors::ApiError;
use crate::domain::entities::{PickupInterval, StoreSnapshot, DEFAULT_ITEM_NAME};

#[derive(Debug, Serialize)]
pub struct AuthByEmailRequest<'a> {
    pub device_type: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AuthByEmailResponse {
    pub state: String,
    pub polling_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PollingRequest<'a> {
    pub device_type: &'a str,
    pub email: &'a str,
    pub request_polling_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PollingResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub startup_data: StartupData,
}

#[derive(Debug, Deserialize)]
pub struct StartupData {
    pub user: StartupUser,
}

#[derive(Debug, Deserialize)]
pub struct StartupUser {
    pub user_id: Value,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct Origin {
    pub latitude: f64,
    pub longitude: f64,
}

/// Favorites-only listing, the same query the mobile app sends
#[derive(Debug, Serialize)]
pub struct ItemsRequest<'a> {
    pub user_id: &'a str,
    pub origin: Origin,
    pub radius: u32,
    pub page_size: u32,
    pub page: u32,
    pub discover: bool,
    pub favorites_only: bool,
    pub item_categories: Vec<String>,
    pub diet_categories: Vec<String>,
    pub pickup_earliest: Option<String>,
    pub pickup_latest: Option<String>,
    pub search_phrase: Option<String>,
    pub with_stock_only: bool,
    pub hidden_only: bool,
    pub we_care_only: bool,
}

impl<'a> ItemsRequest<'a> {
    pub fn favorites(user_id: &'a str, page: u32, page_size: u32) -> Self {
        Self {
            user_id,
            origin: Origin {
                latitude: 0.0,
                longitude: 0.0,
            },
            radius: 21,
            page_size,
            page,
            discover: false,
            favorites_only: true,
            item_categories: Vec::new(),
            diet_categories: Vec::new(),
            pickup_earliest: None,
            pickup_latest: None,
            search_phrase: None,
            with_stock_only: false,
            hidden_only: false,
            we_care_only: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemsResponse {
    #[serde(default)]
    pub items: Vec<FavoriteItem>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteItem {
    pub item: ItemInfo,
    pub store: StoreInfo,
    #[serde(default)]
    pub items_available: Value,
    pub pickup_interval: Option<WireInterval>,
}

#[derive(Debug, Deserialize)]
pub struct ItemInfo {
    pub item_id: Value,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StoreInfo {
    pub store_id: Value,
    #[serde(default)]
    pub store_name: String,
    pub branch: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireInterval {
    pub start: String,
    pub end: String,
}

/// Ids arrive as strings or numbers depending on the endpoint
pub fn coerce_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn coerce_user_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Missing, negative or unparsable counts read as zero
pub fn coerce_count(value: &Value) -> u32 {
    let count = match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

impl FavoriteItem {
    pub fn into_snapshot(self) -> Result<StoreSnapshot, ApiError> {
        let store_id = coerce_id(&self.store.store_id)
            .ok_or_else(|| ApiError::other(None, format!("invalid store id {}", self.store.store_id)))?;
        let item_id = coerce_id(&self.item.item_id)
            .ok_or_else(|| ApiError::other(None, format!("invalid item id {}", self.item.item_id)))?;

        Ok(StoreSnapshot {
            store_id,
            store_name: self.store.store_name,
            branch: self.store.branch.unwrap_or_default(),
            item_id,
            item_name: self
                .item
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string()),
            items_available: coerce_count(&self.items_available),
            pickup_interval: self.pickup_interval.map(|i| PickupInterval {
                start: i.start,
                end: i.end,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_item_converts() {
        let item: FavoriteItem = serde_json::from_value(json!({
            "item": {"item_id": "123456", "name": "Magic Bag"},
            "store": {"store_id": "98765", "store_name": "Bakery", "branch": "Downtown"},
            "items_available": 2,
            "pickup_interval": {"start": "2024-06-01T10:00:00Z", "end": "2024-06-01T10:30:00Z"},
            "display_name": "Bakery - Downtown"
        }))
        .unwrap();

        let snapshot = item.into_snapshot().unwrap();
        assert_eq!(
            snapshot,
            StoreSnapshot::new(98765, "Bakery", 123456)
                .with_branch("Downtown")
                .with_item_name("Magic Bag")
                .with_available(2)
                .with_pickup("2024-06-01T10:00:00Z", "2024-06-01T10:30:00Z")
        );
    }

    #[test]
    fn test_sold_out_item_uses_fallbacks() {
        let item: FavoriteItem = serde_json::from_value(json!({
            "item": {"item_id": 5},
            "store": {"store_id": 7, "store_name": "Deli", "branch": null},
            "items_available": 0
        }))
        .unwrap();

        let snapshot = item.into_snapshot().unwrap();
        assert_eq!(snapshot.item_name, "item(s)");
        assert_eq!(snapshot.branch, "");
        assert_eq!(snapshot.items_available, 0);
        assert_eq!(snapshot.pickup_interval, None);
    }

    #[test]
    fn test_bad_store_id_rejected() {
        let item: FavoriteItem = serde_json::from_value(json!({
            "item": {"item_id": "1"},
            "store": {"store_id": "abc", "store_name": "Deli"}
        }))
        .unwrap();
        assert!(item.into_snapshot().is_err());
    }

    #[test]
    fn test_coerce_count() {
        assert_eq!(coerce_count(&json!(4)), 4);
        assert_eq!(coerce_count(&json!("3")), 3);
        assert_eq!(coerce_count(&json!(-2)), 0);
        assert_eq!(coerce_count(&json!(null)), 0);
        assert_eq!(coerce_count(&json!("lots")), 0);
    }

    #[test]
    fn test_items_request_shape() {
        let body = serde_json::to_value(ItemsRequest::favorites("42", 2, 20)).unwrap();
        assert_eq!(body["user_id"], "42");
        assert_eq!(body["page"], 2);
        assert_eq!(body["favorites_only"], true);
        assert_eq!(body["origin"]["latitude"], 0.0);
        assert!(body["pickup_earliest"].is_null());
    }

    #[test]
    fn test_polling_response_user_id() {
        let response: PollingResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "startup_data": {"user": {"user_id": 42}}
        }))
        .unwrap();
        assert_eq!(coerce_user_id(&response.startup_data.user.user_id).as_deref(), Some("42"));
    }
}
