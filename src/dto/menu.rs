use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::food_items::FoodCategory, models::FoodItem};

/// Body of `POST /add-food`. Without an `id` a new item is created; with one,
/// the existing item is replaced field for field.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemRequest {
    pub id: Option<i32>,
    pub name: String,
    pub description: String,
    pub category: FoodCategory,
    pub price: i32,
    pub available: bool,
    pub image: String,
    pub prep_time: i32,
    pub stock: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFoodItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<FoodCategory>,
    pub price: Option<i32>,
    pub available: Option<bool>,
    pub image: Option<String>,
    pub prep_time: Option<i32>,
    pub stock: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct MenuList {
    #[schema(value_type = Vec<FoodItem>)]
    pub items: Vec<FoodItem>,
}
