use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};

use crate::{
    dto::{
        menu::{FoodItemRequest, MenuList, UpdateFoodItemRequest},
        reviews::ReviewList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::FoodItem,
    response::ApiResponse,
    services::{menu_service, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-food", post(add_food))
        .route("/menu", get(list_menu))
        .route("/menu/{id}", put(update_food_item))
        .route("/menu/{id}/reviews", get(list_reviews))
}

#[utoipa::path(
    get,
    path = "/menu",
    responses(
        (status = 200, description = "Every menu item, available or not", body = ApiResponse<MenuList>)
    ),
    tag = "Menu"
)]
pub async fn list_menu(State(state): State<AppState>) -> AppResult<Json<ApiResponse<MenuList>>> {
    let resp = menu_service::list_menu(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/add-food",
    request_body = FoodItemRequest,
    responses(
        (status = 201, description = "Create or replace a menu item", body = ApiResponse<FoodItem>),
        (status = 400, description = "Invalid field value"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Food item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn add_food(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<FoodItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<FoodItem>>)> {
    let status = if payload.id.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    let resp = menu_service::upsert_food_item(&state, &user, payload).await?;
    Ok((status, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/menu/{id}",
    params(
        ("id" = i32, Path, description = "Food item ID")
    ),
    request_body = UpdateFoodItemRequest,
    responses(
        (status = 200, description = "Partially update a menu item", body = ApiResponse<FoodItem>),
        (status = 400, description = "Invalid field value"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Food item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn update_food_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateFoodItemRequest>,
) -> AppResult<Json<ApiResponse<FoodItem>>> {
    let resp = menu_service::update_food_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/menu/{id}/reviews",
    params(
        ("id" = i32, Path, description = "Food item ID")
    ),
    responses(
        (status = 200, description = "Reviews for a menu item, newest first", body = ApiResponse<ReviewList>),
        (status = 404, description = "Food item not found")
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_reviews(&state, id).await?;
    Ok(Json(resp))
}
