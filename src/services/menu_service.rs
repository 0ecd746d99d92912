use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, EntityTrait, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use sea_orm::sea_query::LockType;

use crate::{
    audit,
    dto::menu::{FoodItemRequest, MenuList, UpdateFoodItemRequest},
    entity::food_items::{ActiveModel, Column, Entity as FoodItems},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_canteen},
    models::FoodItem,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_menu(state: &AppState) -> AppResult<ApiResponse<MenuList>> {
    let items: Vec<FoodItem> = FoodItems::find()
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(FoodItem::from)
        .collect();

    let meta = Meta::listing(items.len());
    Ok(ApiResponse::success("Menu", MenuList { items }, Some(meta)))
}

pub async fn upsert_food_item(
    state: &AppState,
    user: &AuthUser,
    payload: FoodItemRequest,
) -> AppResult<ApiResponse<FoodItem>> {
    ensure_canteen(user)?;
    validate_name(&payload.name)?;
    validate_amounts(Some(payload.price), Some(payload.prep_time), Some(payload.stock))?;

    let (food, action) = match payload.id {
        None => {
            let active = ActiveModel {
                id: NotSet,
                name: Set(payload.name.trim().to_string()),
                description: Set(payload.description),
                category: Set(payload.category),
                price: Set(payload.price),
                available: Set(payload.available),
                image: Set(payload.image),
                prep_time: Set(payload.prep_time),
                stock: Set(payload.stock),
                created_at: NotSet,
            };
            (active.insert(&state.orm).await?, "food_create")
        }
        Some(id) => {
            let txn = state.orm.begin().await?;
            let existing = FoodItems::find_by_id(id)
                .lock(LockType::Update)
                .one(&txn)
                .await?;
            let existing = match existing {
                Some(f) => f,
                None => return Err(AppError::not_found("Food item not found")),
            };

            let mut active: ActiveModel = existing.into();
            active.name = Set(payload.name.trim().to_string());
            active.description = Set(payload.description);
            active.category = Set(payload.category);
            active.price = Set(payload.price);
            active.available = Set(payload.available);
            active.image = Set(payload.image);
            active.prep_time = Set(payload.prep_time);
            active.stock = Set(payload.stock);
            let food = active.update(&txn).await?;
            txn.commit().await?;
            (food, "food_replace")
        }
    };

    tracing::info!(food_id = food.id, name = %food.name, action, "menu item saved");
    audit::record(
        &state.pool,
        Some(user.subject.as_str()),
        action,
        "food_items",
        serde_json::json!({ "food_id": food.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Food item saved",
        FoodItem::from(food),
        Some(Meta::empty()),
    ))
}

pub async fn update_food_item(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateFoodItemRequest,
) -> AppResult<ApiResponse<FoodItem>> {
    ensure_canteen(user)?;
    if let Some(name) = payload.name.as_deref() {
        validate_name(name)?;
    }
    validate_amounts(payload.price, payload.prep_time, payload.stock)?;

    let txn = state.orm.begin().await?;
    let existing = FoodItems::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(f) => f,
        None => return Err(AppError::not_found("Food item not found")),
    };

    let mut active: ActiveModel = existing.clone().into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(category) = payload.category {
        active.category = Set(category);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(available) = payload.available {
        active.available = Set(available);
    }
    if let Some(image) = payload.image {
        active.image = Set(image);
    }
    if let Some(prep_time) = payload.prep_time {
        active.prep_time = Set(prep_time);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }

    // An empty patch leaves the row untouched.
    let food = if active.is_changed() {
        active.update(&txn).await?
    } else {
        existing
    };
    txn.commit().await?;

    tracing::info!(food_id = food.id, name = %food.name, "menu item updated");
    audit::record(
        &state.pool,
        Some(user.subject.as_str()),
        "food_update",
        "food_items",
        serde_json::json!({ "food_id": food.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        FoodItem::from(food),
        Some(Meta::empty()),
    ))
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::bad_request("name must not be blank"));
    }
    Ok(())
}

fn validate_amounts(price: Option<i32>, prep_time: Option<i32>, stock: Option<i32>) -> AppResult<()> {
    for (field, value) in [("price", price), ("prepTime", prep_time), ("stock", stock)] {
        if value.is_some_and(|v| v < 0) {
            return Err(AppError::bad_request(format!("{field} must not be negative")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_amounts(Some(20), Some(5), Some(10)).is_ok());
        assert!(validate_amounts(None, None, None).is_ok());
        let err = validate_amounts(Some(20), None, Some(-1)).unwrap_err();
        assert_eq!(err.to_string(), "stock must not be negative");
        assert!(validate_amounts(Some(-5), None, None).is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(validate_name("Samosa").is_ok());
        assert!(validate_name("   ").is_err());
    }
}
