use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::orders::OrderStatus, models::FoodItem};

/// Only the id of the referenced menu item is read; the rest of the
/// client's copy is ignored in favour of the stored item.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MenuItemRef {
    pub id: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub menu_item: MenuItemRef,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub pickup_time: String,
    pub total_price: Option<i32>,
    pub items: Vec<OrderLine>,
    pub status: Option<String>,
    #[serde(default)]
    pub is_group_order: bool,
    #[serde(default)]
    pub group_members: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub order_id: i32,
    pub token_no: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub menu_item: FoodItem,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i32,
    pub token: String,
    pub order_time: DateTime<Utc>,
    pub pickup_time: String,
    pub total_price: i32,
    pub status: OrderStatus,
    pub is_group_order: bool,
    pub group_code: Option<String>,
    pub group_members: Vec<String>,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<OrderResponse>)]
    pub items: Vec<OrderResponse>,
}

/// Kitchen view of a menu item.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodSummary {
    pub id: i32,
    pub name: String,
    pub price: i32,
    pub prep_time: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOrderItem {
    pub menu_item: FoodSummary,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOrder {
    pub id: i32,
    pub token: String,
    pub student_id: String,
    pub order_time: DateTime<Utc>,
    pub pickup_time: String,
    pub total_price: i32,
    pub status: OrderStatus,
    pub is_group_order: bool,
    pub items: Vec<ActiveOrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ActiveOrderList {
    #[schema(value_type = Vec<ActiveOrder>)]
    pub items: Vec<ActiveOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}
