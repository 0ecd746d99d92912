use std::collections::HashMap;

use chrono::Utc;
use password_hash::rand_core::{OsRng, RngCore};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};

use crate::{
    audit,
    dto::orders::{
        ActiveOrder, ActiveOrderItem, ActiveOrderList, FoodSummary, OrderItemResponse, OrderLine,
        OrderList, OrderResponse, PlaceOrderRequest, PlaceOrderResponse,
    },
    entity::{
        food_items::{Column as FoodCol, Entity as FoodItems, Model as FoodItemModel},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders,
            Model as OrderModel, OrderStatus,
        },
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_canteen, ensure_student},
    models::FoodItem,
    response::{ApiResponse, Meta},
    services::{auth_service::find_student, group_service, status_service::parse_settable_status},
    state::AppState,
};

const TOKEN_PREFIX: &str = "A-";
const TOKEN_MIN_DIGITS: u32 = 3;
const TOKEN_MAX_DIGITS: u32 = 6;
const TOKEN_ATTEMPTS_PER_WIDTH: usize = 8;
const TOKEN_INSERT_ATTEMPTS: usize = 5;

type OrderLines = HashMap<i32, Vec<(OrderItemModel, FoodItemModel)>>;

/// Places an order for `student_id`. Availability of every line is checked
/// inside the same transaction that writes the order, so a rejected line
/// leaves no rows behind.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    student_id: &str,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<PlaceOrderResponse>> {
    ensure_student(user, student_id)?;
    let status = match payload.status.as_deref() {
        Some(raw) => parse_settable_status(raw)?,
        None => OrderStatus::Pending,
    };
    if payload.pickup_time.trim().is_empty() {
        return Err(AppError::bad_request("pickupTime must not be blank"));
    }
    validate_lines(&payload.items)?;

    let txn = state.orm.begin().await?;
    let student = find_student(&txn, student_id).await?;

    let mut total: i64 = 0;
    for line in &payload.items {
        let food_id = line.menu_item.id;
        let food = FoodItems::find_by_id(food_id)
            .filter(FoodCol::Available.eq(true))
            .one(&txn)
            .await?;
        let food = match food {
            Some(f) => f,
            None => {
                tracing::info!(food_id, student_id, "order rejected: item unavailable");
                return Err(AppError::not_found(format!(
                    "Food item {food_id} not available"
                )));
            }
        };
        total += i64::from(food.price) * i64::from(line.quantity);
    }
    let total_price =
        i32::try_from(total).map_err(|_| AppError::bad_request("Order total is too large"))?;
    if let Some(client_total) = payload.total_price.filter(|t| *t != total_price) {
        tracing::warn!(
            client_total,
            total_price,
            student_id,
            "client total differs from menu prices; storing computed total"
        );
    }

    let order = insert_order(
        &txn,
        OrderActive {
            id: NotSet,
            user_id: Set(student.id),
            token_no: NotSet,
            pickup_time: Set(payload.pickup_time),
            total_price: Set(total_price),
            is_group_order: Set(payload.is_group_order),
            status: Set(status),
            created_at: NotSet,
        },
    )
    .await?;

    for line in &payload.items {
        OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            food_id: Set(line.menu_item.id),
            quantity: Set(line.quantity),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    if order.is_group_order {
        group_service::attach_group_members(&order, &payload.group_members);
    }

    txn.commit().await?;

    tracing::info!(
        order_id = order.id,
        token_no = %order.token_no,
        student_id,
        total_price,
        lines = payload.items.len(),
        "order placed"
    );
    audit::record(
        &state.pool,
        Some(student_id),
        "order_placed",
        "orders",
        serde_json::json!({ "order_id": order.id, "token_no": order.token_no }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed successfully",
        PlaceOrderResponse {
            order_id: order.id,
            token_no: order.token_no,
        },
        Some(Meta::empty()),
    ))
}

/// Newest first. Line items carry the food item as it is now, not as it was
/// when ordered.
pub async fn list_orders_for_student(
    state: &AppState,
    user: &AuthUser,
    student_id: &str,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_student(user, student_id)?;
    let student = find_student(&state.orm, student_id).await?;

    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(student.id))
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let mut lines = load_lines(&state.orm, &order_ids).await?;
    let mut groups = group_service::load_groups(&state.orm, &order_ids).await?;

    let items: Vec<OrderResponse> = orders
        .into_iter()
        .map(|order| {
            let group = groups.remove(&order.id).unwrap_or_default();
            let items = lines
                .remove(&order.id)
                .unwrap_or_default()
                .into_iter()
                .map(|(item, food)| OrderItemResponse {
                    menu_item: FoodItem::from(food),
                    quantity: item.quantity,
                })
                .collect();
            OrderResponse {
                id: order.id,
                token: order.token_no,
                order_time: order.created_at.with_timezone(&Utc),
                pickup_time: order.pickup_time,
                total_price: order.total_price,
                status: order.status,
                is_group_order: order.is_group_order,
                group_code: (!group.group_code.is_empty()).then_some(group.group_code),
                group_members: group.members,
                items,
            }
        })
        .collect();

    let meta = Meta::listing(items.len());
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

/// Kitchen queue: every order that is not completed, oldest first.
pub async fn list_active_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ActiveOrderList>> {
    ensure_canteen(user)?;

    let orders = Orders::find()
        .filter(OrderCol::Status.ne(OrderStatus::Completed))
        .find_also_related(Users)
        .order_by_asc(OrderCol::CreatedAt)
        .order_by_asc(OrderCol::Id)
        .all(&state.orm)
        .await?;

    let order_ids: Vec<i32> = orders.iter().map(|(o, _)| o.id).collect();
    let mut lines = load_lines(&state.orm, &order_ids).await?;

    let items: Vec<ActiveOrder> = orders
        .into_iter()
        .map(|(order, student)| {
            let items = lines
                .remove(&order.id)
                .unwrap_or_default()
                .into_iter()
                .map(|(item, food)| ActiveOrderItem {
                    menu_item: FoodSummary {
                        id: food.id,
                        name: food.name,
                        price: food.price,
                        prep_time: food.prep_time,
                    },
                    quantity: item.quantity,
                })
                .collect();
            ActiveOrder {
                id: order.id,
                token: order.token_no,
                student_id: student.map(|s| s.student_id).unwrap_or_default(),
                order_time: order.created_at.with_timezone(&Utc),
                pickup_time: order.pickup_time,
                total_price: order.total_price,
                status: order.status,
                is_group_order: order.is_group_order,
                items,
            }
        })
        .collect();

    let meta = Meta::listing(items.len());
    Ok(ApiResponse::success(
        "Active orders",
        ActiveOrderList { items },
        Some(meta),
    ))
}

fn validate_lines(lines: &[OrderLine]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::bad_request("Order must contain at least one item"));
    }
    if let Some(line) = lines.iter().find(|line| line.quantity <= 0) {
        return Err(AppError::bad_request(format!(
            "Quantity for food item {} must be positive",
            line.menu_item.id
        )));
    }
    Ok(())
}

/// Order lines joined with their food item, in creation order, keyed by order id.
async fn load_lines<C: ConnectionTrait>(conn: &C, order_ids: &[i32]) -> AppResult<OrderLines> {
    let mut lines: OrderLines = HashMap::new();
    if order_ids.is_empty() {
        return Ok(lines);
    }

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.iter().copied()))
        .find_also_related(FoodItems)
        .order_by_asc(OrderItemCol::CreatedAt)
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await?;

    for (item, food) in rows {
        match food {
            Some(food) => lines.entry(item.order_id).or_default().push((item, food)),
            None => tracing::warn!(order_item_id = item.id, "order item without food item"),
        }
    }
    Ok(lines)
}

/// Inserts `order` under a fresh token. The insert runs in a savepoint so a
/// token taken by a concurrent placement only rolls back that attempt.
async fn insert_order(txn: &DatabaseTransaction, order: OrderActive) -> AppResult<OrderModel> {
    let mut attempt = 1;
    loop {
        let mut candidate = order.clone();
        candidate.token_no = Set(allocate_token(txn).await?);

        let savepoint = txn.begin().await?;
        match candidate.insert(&savepoint).await {
            Ok(inserted) => {
                savepoint.commit().await?;
                return Ok(inserted);
            }
            Err(err) if attempt < TOKEN_INSERT_ATTEMPTS && is_token_conflict(&err) => {
                savepoint.rollback().await?;
                tracing::debug!(attempt, "order token taken concurrently, retrying");
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn is_token_conflict(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(detail)) if detail.contains("token_no")
    )
}

/// Draws `A-` tokens and re-checks them against stored orders. Each width
/// gets a fixed number of attempts before moving to one more digit.
async fn allocate_token<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    let mut rng = OsRng;
    for digits in TOKEN_MIN_DIGITS..=TOKEN_MAX_DIGITS {
        for _ in 0..TOKEN_ATTEMPTS_PER_WIDTH {
            let candidate = token_candidate(&mut rng, digits);
            let taken = Orders::find()
                .filter(OrderCol::TokenNo.eq(candidate.as_str()))
                .count(conn)
                .await?;
            if taken == 0 {
                return Ok(candidate);
            }
        }
        tracing::debug!(digits, "token width crowded, widening");
    }
    Err(AppError::Internal(anyhow::anyhow!(
        "could not allocate a unique order token"
    )))
}

/// A random `digits`-wide token, e.g. `A-123` for three digits.
fn token_candidate<R: RngCore>(rng: &mut R, digits: u32) -> String {
    let low = 10u32.pow(digits - 1);
    let span = 9 * low;
    format!("{TOKEN_PREFIX}{}", low + rng.next_u32() % span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::orders::MenuItemRef;

    fn line(id: i32, quantity: i32) -> OrderLine {
        OrderLine {
            menu_item: MenuItemRef { id },
            quantity,
        }
    }

    #[test]
    fn three_digit_tokens_stay_in_range() {
        let mut rng = OsRng;
        for _ in 0..500 {
            let token = token_candidate(&mut rng, 3);
            let number: u32 = token
                .strip_prefix("A-")
                .expect("prefix")
                .parse()
                .expect("numeric suffix");
            assert!((100..=999).contains(&number), "{token}");
        }
    }

    #[test]
    fn wider_tokens_have_exact_width() {
        let mut rng = OsRng;
        for digits in TOKEN_MIN_DIGITS..=TOKEN_MAX_DIGITS {
            let token = token_candidate(&mut rng, digits);
            assert_eq!(token.len(), TOKEN_PREFIX.len() + digits as usize, "{token}");
        }
    }

    #[test]
    fn only_token_violations_are_retried() {
        assert!(!is_token_conflict(&DbErr::Custom("connection reset".into())));
        assert!(!is_token_conflict(&DbErr::RecordNotInserted));
    }

    #[test]
    fn empty_order_is_rejected() {
        let err = validate_lines(&[]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn non_positive_quantity_names_the_item() {
        let err = validate_lines(&[line(1, 2), line(7, 0)]).unwrap_err();
        assert_eq!(err.to_string(), "Quantity for food item 7 must be positive");
        assert!(validate_lines(&[line(1, -3)]).is_err());
        assert!(validate_lines(&[line(1, 2), line(1, 1)]).is_ok());
    }
}
