use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{
    food_items::{FoodCategory, Model as FoodItemModel},
    orders::{Model as OrderModel, OrderStatus},
    reviews::Model as ReviewModel,
    users::Model as UserModel,
};

/// A registered student. The password hash never leaves the service layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i32,
    pub student_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: FoodCategory,
    pub price: i32,
    pub available: bool,
    pub image: String,
    pub prep_time: i32,
    pub stock: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub token: String,
    pub pickup_time: String,
    pub total_price: i32,
    pub is_group_order: bool,
    pub status: OrderStatus,
    pub order_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i32,
    pub student_id: String,
    pub food_id: i32,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserModel> for Student {
    fn from(model: UserModel) -> Self {
        Student {
            id: model.id,
            student_id: model.student_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<FoodItemModel> for FoodItem {
    fn from(model: FoodItemModel) -> Self {
        FoodItem {
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            price: model.price,
            available: model.available,
            image: model.image,
            prep_time: model.prep_time,
            stock: model.stock,
        }
    }
}

impl From<OrderModel> for Order {
    fn from(model: OrderModel) -> Self {
        Order {
            id: model.id,
            user_id: model.user_id,
            token: model.token_no,
            pickup_time: model.pickup_time,
            total_price: model.total_price,
            is_group_order: model.is_group_order,
            status: model.status,
            order_time: model.created_at.with_timezone(&Utc),
        }
    }
}

impl Review {
    pub fn from_entity(model: ReviewModel, student_id: String) -> Self {
        Review {
            id: model.id,
            student_id,
            food_id: model.food_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
