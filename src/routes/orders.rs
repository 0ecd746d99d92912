use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};

use crate::{
    dto::orders::{OrderList, PlaceOrderRequest, PlaceOrderResponse, UpdateOrderStatusRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    services::{order_service, status_service},
    state::AppState,
};

// `{id}` is the student id on the collection route and the numeric order id
// on the status route; the router needs one parameter name per segment.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/order/{id}", get(list_orders).post(place_order))
        .route("/order/{id}/status", patch(update_order_status))
}

#[utoipa::path(
    get,
    path = "/order/{id}",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student orders, newest first", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path(student_id): Path<String>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders_for_student(&state, &user, &student_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/order/{id}",
    params(
        ("id" = String, Path, description = "Student ID")
    ),
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = ApiResponse<PlaceOrderResponse>),
        (status = 400, description = "Invalid order"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not registered or food item not available")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(student_id): Path<String>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PlaceOrderResponse>>)> {
    let resp = order_service::place_order(&state, &user, &student_id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/order/{id}/status",
    params(
        ("id" = i32, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Update order status", body = ApiResponse<Order>),
        (status = 400, description = "Status must be pending, preparing or ready"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Canteen"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = status_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
