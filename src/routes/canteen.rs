use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::orders::ActiveOrderList,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/orders", get(list_active_orders))
}

#[utoipa::path(
    get,
    path = "/canteen/orders",
    responses(
        (status = 200, description = "Orders not yet completed, oldest first", body = ApiResponse<ActiveOrderList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Canteen"
)]
pub async fn list_active_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ActiveOrderList>>> {
    let resp = order_service::list_active_orders(&state, &user).await?;
    Ok(Json(resp))
}
