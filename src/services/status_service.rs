use sea_orm::{ActiveModelTrait, EntityTrait, QuerySelect, Set, TransactionTrait};
use sea_orm::sea_query::LockType;

use crate::{
    audit,
    dto::orders::UpdateOrderStatusRequest,
    entity::orders::{ActiveModel as OrderActive, Entity as Orders, OrderStatus},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_canteen},
    models::Order,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Statuses a caller may set directly. `completed` is a valid stored state
/// but is not accepted here.
pub const SETTABLE_STATUSES: [OrderStatus; 3] = [
    OrderStatus::Pending,
    OrderStatus::Preparing,
    OrderStatus::Ready,
];

pub fn parse_settable_status(raw: &str) -> AppResult<OrderStatus> {
    raw.trim()
        .parse::<OrderStatus>()
        .ok()
        .filter(|status| SETTABLE_STATUSES.contains(status))
        .ok_or_else(|| AppError::bad_request("Invalid order status"))
}

/// Overwrites the status regardless of the current one; moving backwards
/// (ready -> pending) is allowed.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_canteen(user)?;
    let status = parse_settable_status(&payload.status)?;

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::not_found("Order not found")),
    };
    let previous = existing.status;

    let mut active: OrderActive = existing.into();
    active.status = Set(status);
    let order = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(order_id = order.id, from = %previous, to = %order.status, "order status updated");
    audit::record(
        &state.pool,
        Some(user.subject.as_str()),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": previous, "to": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}
