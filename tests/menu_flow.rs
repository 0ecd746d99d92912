mod common;

use canteen_orders::{
    dto::menu::{FoodItemRequest, UpdateFoodItemRequest},
    entity::{
        food_items::FoodCategory,
        group_members::ActiveModel as MemberActive,
        group_orders::ActiveModel as GroupActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    services::{auth_service::find_student, menu_service, order_service},
};
use common::{create_food, create_student, order_request, setup_state, unique};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};

#[tokio::test]
async fn menu_lists_unavailable_items_too() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let hidden = create_food(&state, &unique("Sold Out Pie"), 90, false, 0).await?;

    let menu = menu_service::list_menu(&state).await?.data.expect("menu").items;
    let listed = menu.iter().find(|f| f.id == hidden.id).expect("unavailable item listed");
    assert!(!listed.available);
    Ok(())
}

#[tokio::test]
async fn partial_update_keeps_absent_fields() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let canteen = AuthUser::canteen();
    let food = create_food(&state, "Paneer Roll", 90, true, 12).await?;

    let updated = menu_service::update_food_item(
        &state,
        &canteen,
        food.id,
        UpdateFoodItemRequest {
            stock: Some(7),
            category: Some(FoodCategory::MainCourse),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("food");
    assert_eq!(updated.stock, 7);
    assert_eq!(updated.category, FoodCategory::MainCourse);
    assert_eq!(updated.name, "Paneer Roll");
    assert_eq!(updated.price, 90);
    assert!(updated.available);
    assert_eq!(updated.description, food.description);

    let unchanged = menu_service::update_food_item(
        &state,
        &canteen,
        food.id,
        UpdateFoodItemRequest::default(),
    )
    .await?
    .data
    .expect("food");
    assert_eq!(unchanged.stock, 7);

    let err = menu_service::update_food_item(
        &state,
        &canteen,
        i32::MAX,
        UpdateFoodItemRequest {
            price: Some(10),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = menu_service::update_food_item(
        &state,
        &canteen,
        food.id,
        UpdateFoodItemRequest {
            stock: Some(-1),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn upsert_with_id_replaces_item() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let canteen = AuthUser::canteen();
    let food = create_food(&state, "Lemon Soda", 30, true, 40).await?;
    let replacement = |id: i32| FoodItemRequest {
        id: Some(id),
        name: "Mint Soda".into(),
        description: "Fresh mint".into(),
        category: FoodCategory::Beverages,
        price: 35,
        available: false,
        image: "mint.png".into(),
        prep_time: 2,
        stock: 15,
    };

    let replaced = menu_service::upsert_food_item(&state, &canteen, replacement(food.id))
        .await?
        .data
        .expect("food");
    assert_eq!(replaced.id, food.id);
    assert_eq!(replaced.name, "Mint Soda");
    assert_eq!(replaced.category, FoodCategory::Beverages);
    assert!(!replaced.available);

    let err = menu_service::upsert_food_item(&state, &canteen, replacement(i32::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn students_cannot_edit_menu() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let food = create_food(&state, "Vada Pav", 25, true, 30).await?;
    let err = menu_service::update_food_item(
        &state,
        &AuthUser::student("S-1"),
        food.id,
        UpdateFoodItemRequest {
            available: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}

#[tokio::test]
async fn group_rows_show_in_order_listing() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let food = create_food(&state, "Pav Bhaji", 70, true, 20).await?;
    let owner = create_student(&state).await?;
    let friend = create_student(&state).await?;
    let user = AuthUser::student(owner.clone());

    let mut request = order_request(&[(food.id, 3)]);
    request.is_group_order = true;
    request.group_members = vec![friend.clone()];
    let placed = order_service::place_order(&state, &user, &owner, request)
        .await?
        .data
        .expect("placed");

    // Placement alone records only the flag.
    let orders = order_service::list_orders_for_student(&state, &user, &owner)
        .await?
        .data
        .expect("orders")
        .items;
    assert!(orders[0].is_group_order);
    assert_eq!(orders[0].group_code, None);
    assert!(orders[0].group_members.is_empty());

    let code = unique("GRP");
    let group = GroupActive {
        id: NotSet,
        order_id: Set(placed.order_id),
        group_code: Set(code.clone()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    for student_id in [&owner, &friend] {
        let member = find_student(&state.orm, student_id).await?;
        MemberActive {
            id: NotSet,
            group_order_id: Set(group.id),
            user_id: Set(member.id),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;
    }

    let orders = order_service::list_orders_for_student(&state, &user, &owner)
        .await?
        .data
        .expect("orders")
        .items;
    assert_eq!(orders[0].group_code.as_deref(), Some(code.as_str()));
    assert_eq!(orders[0].group_members, vec![owner, friend]);
    Ok(())
}
