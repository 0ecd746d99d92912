mod common;

use canteen_orders::{
    dto::menu::UpdateFoodItemRequest,
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders, OrderStatus},
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{auth_service::find_student, menu_service, order_service},
    state::AppState,
};
use common::{create_food, create_student, order_request, setup_state};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

async fn persisted_rows(state: &AppState, student_id: &str) -> anyhow::Result<(u64, u64)> {
    let student = find_student(&state.orm, student_id).await?;
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(student.id))
        .count(&state.orm)
        .await?;
    let order_ids: Vec<i32> = Orders::find()
        .select_only()
        .column(OrderCol::Id)
        .filter(OrderCol::UserId.eq(student.id))
        .into_tuple()
        .all(&state.orm)
        .await?;
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .count(&state.orm)
        .await?;
    Ok((orders, items))
}

// Samosa at 20, ordered twice over, reads back with quantity 2 and price 20.
#[tokio::test]
async fn samosa_order_round_trip() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let samosa = create_food(&state, "Samosa", 20, true, 10).await?;
    let student_id = create_student(&state).await?;
    let user = AuthUser::student(student_id.clone());

    let mut request = order_request(&[(samosa.id, 2)]);
    request.total_price = Some(40);
    let placed = order_service::place_order(&state, &user, &student_id, request)
        .await?
        .data
        .expect("placed order");

    let number: u32 = placed
        .token_no
        .strip_prefix("A-")
        .expect("token prefix")
        .parse()
        .expect("numeric token");
    assert!((100..=999_999).contains(&number));

    let orders = order_service::list_orders_for_student(&state, &user, &student_id)
        .await?
        .data
        .expect("orders")
        .items;
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.id, placed.order_id);
    assert_eq!(order.token, placed.token_no);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, 40);
    assert!(!order.is_group_order);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].menu_item.id, samosa.id);
    assert_eq!(order.items[0].menu_item.price, 20);
    assert_eq!(order.items[0].menu_item.name, "Samosa");

    // Stock is advisory and untouched by ordering.
    assert_eq!(order.items[0].menu_item.stock, 10);
    Ok(())
}

#[tokio::test]
async fn unavailable_item_leaves_no_rows() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let tea = create_food(&state, "Masala Tea", 15, true, 50).await?;
    let puff = create_food(&state, "Veg Puff", 25, true, 20).await?;
    let student_id = create_student(&state).await?;
    let user = AuthUser::student(student_id.clone());

    menu_service::update_food_item(
        &state,
        &AuthUser::canteen(),
        puff.id,
        UpdateFoodItemRequest {
            available: Some(false),
            ..Default::default()
        },
    )
    .await?;

    // The available line comes first; it must not survive the rejection.
    let err = order_service::place_order(
        &state,
        &user,
        &student_id,
        order_request(&[(tea.id, 1), (puff.id, 2)]),
    )
    .await
    .unwrap_err();
    match err {
        AppError::NotFound(detail) => {
            assert_eq!(detail, format!("Food item {} not available", puff.id))
        }
        other => panic!("expected NotFound, got {other:?}"),
    }

    assert_eq!(persisted_rows(&state, &student_id).await?, (0, 0));
    Ok(())
}

#[tokio::test]
async fn unknown_item_leaves_no_rows() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let student_id = create_student(&state).await?;
    let user = AuthUser::student(student_id.clone());

    let err = order_service::place_order(&state, &user, &student_id, order_request(&[(i32::MAX, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(persisted_rows(&state, &student_id).await?, (0, 0));
    Ok(())
}

#[tokio::test]
async fn invalid_placement_requests_are_rejected() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let food = create_food(&state, "Idli", 30, true, 10).await?;
    let student_id = create_student(&state).await?;
    let user = AuthUser::student(student_id.clone());

    let err = order_service::place_order(&state, &user, &student_id, order_request(&[(food.id, 0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let mut completed = order_request(&[(food.id, 1)]);
    completed.status = Some("completed".into());
    let err = order_service::place_order(&state, &user, &student_id, completed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::place_order(&state, &user, "someone-else", order_request(&[(food.id, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    assert_eq!(persisted_rows(&state, &student_id).await?, (0, 0));
    Ok(())
}

#[tokio::test]
async fn caller_status_and_computed_total_are_stored() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let dosa = create_food(&state, "Masala Dosa", 80, true, 10).await?;
    let coffee = create_food(&state, "Cold Coffee", 70, true, 10).await?;
    let student_id = create_student(&state).await?;
    let user = AuthUser::student(student_id.clone());

    let mut request = order_request(&[(dosa.id, 2), (coffee.id, 1)]);
    request.status = Some("preparing".into());
    // Client total is wrong; the stored total comes from menu prices.
    request.total_price = Some(1);
    order_service::place_order(&state, &user, &student_id, request).await?;

    let orders = order_service::list_orders_for_student(&state, &user, &student_id)
        .await?
        .data
        .expect("orders")
        .items;
    assert_eq!(orders[0].status, OrderStatus::Preparing);
    assert_eq!(orders[0].total_price, 230);
    let quantities: Vec<(i32, i32)> = orders[0]
        .items
        .iter()
        .map(|line| (line.menu_item.id, line.quantity))
        .collect();
    assert_eq!(quantities, vec![(dosa.id, 2), (coffee.id, 1)]);
    Ok(())
}

#[tokio::test]
async fn orders_are_listed_newest_first() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let fries = create_food(&state, "French Fries", 50, true, 10).await?;
    let student_id = create_student(&state).await?;
    let user = AuthUser::student(student_id.clone());

    let mut placed = Vec::new();
    for quantity in 1..=3 {
        let resp = order_service::place_order(
            &state,
            &user,
            &student_id,
            order_request(&[(fries.id, quantity)]),
        )
        .await?;
        placed.push(resp.data.expect("placed").order_id);
    }

    let orders = order_service::list_orders_for_student(&state, &user, &student_id)
        .await?
        .data
        .expect("orders")
        .items;
    let listed: Vec<i32> = orders.iter().map(|o| o.id).collect();
    placed.reverse();
    assert_eq!(listed, placed);
    for pair in orders.windows(2) {
        assert!(pair[0].order_time > pair[1].order_time);
    }

    let tokens: std::collections::HashSet<&str> = orders.iter().map(|o| o.token.as_str()).collect();
    assert_eq!(tokens.len(), 3);
    Ok(())
}

#[tokio::test]
async fn past_orders_show_current_food_details() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let brownie = create_food(&state, "Chocolate Brownie", 60, true, 10).await?;
    let student_id = create_student(&state).await?;
    let user = AuthUser::student(student_id.clone());

    order_service::place_order(&state, &user, &student_id, order_request(&[(brownie.id, 1)])).await?;
    menu_service::update_food_item(
        &state,
        &AuthUser::canteen(),
        brownie.id,
        UpdateFoodItemRequest {
            price: Some(75),
            ..Default::default()
        },
    )
    .await?;

    let orders = order_service::list_orders_for_student(&state, &user, &student_id)
        .await?
        .data
        .expect("orders")
        .items;
    assert_eq!(orders[0].items[0].menu_item.price, 75);
    assert_eq!(orders[0].total_price, 60);
    Ok(())
}

#[tokio::test]
async fn unknown_student_is_not_found() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let user = AuthUser::student("ghost-student");
    let err = order_service::list_orders_for_student(&state, &user, "ghost-student")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_placements_all_get_tokens() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    // Leave only a small slice of three-digit tokens free so placements collide.
    let filler = find_student(&state.orm, &create_student(&state).await?).await?;
    sqlx::query(
        r#"
        INSERT INTO orders (user_id, token_no, pickup_time, total_price, status)
        SELECT $1, 'A-' || n, '12:00', 0, 'completed'
        FROM generate_series(100, 849) AS n
        ON CONFLICT (token_no) DO NOTHING
        "#,
    )
    .bind(filler.id)
    .execute(&state.pool)
    .await?;

    let chai_id = create_food(&state, "Masala Chai", 15, true, 500).await?.id;
    let mut handles = Vec::new();
    for _ in 0..40 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            let student_id = create_student(&state).await?;
            let user = AuthUser::student(student_id.clone());
            let placed = order_service::place_order(
                &state,
                &user,
                &student_id,
                order_request(&[(chai_id, 1)]),
            )
            .await?;
            anyhow::Ok(placed.data.expect("placed order").token_no)
        }));
    }

    let mut tokens = std::collections::HashSet::new();
    for handle in handles {
        let token = handle.await??;
        assert!(tokens.insert(token.clone()), "duplicate token {token}");
    }
    assert_eq!(tokens.len(), 40);
    Ok(())
}
