use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    audit,
    dto::reviews::{CreateReviewRequest, ReviewList},
    entity::{
        food_items::Entity as FoodItems,
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_student},
    models::Review,
    response::{ApiResponse, Meta},
    services::auth_service::find_student,
    state::AppState,
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    ensure_student(user, &payload.student_id)?;
    validate_rating(payload.rating)?;

    let student = find_student(&state.orm, &payload.student_id).await?;
    if FoodItems::find_by_id(payload.food_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Food item not found"));
    }

    let review = ReviewActive {
        id: NotSet,
        user_id: Set(student.id),
        food_id: Set(payload.food_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment.trim().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        Some(student.student_id.as_str()),
        "review_create",
        "reviews",
        serde_json::json!({ "review_id": review.id, "food_id": review.food_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review created",
        Review::from_entity(review, student.student_id),
        Some(Meta::empty()),
    ))
}

pub async fn list_reviews(state: &AppState, food_id: i32) -> AppResult<ApiResponse<ReviewList>> {
    if FoodItems::find_by_id(food_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Food item not found"));
    }

    let items: Vec<Review> = Reviews::find()
        .filter(ReviewCol::FoodId.eq(food_id))
        .find_also_related(Users)
        .order_by_desc(ReviewCol::CreatedAt)
        .order_by_desc(ReviewCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(review, user)| {
            let student_id = user.map(|u| u.student_id).unwrap_or_default();
            Review::from_entity(review, student_id)
        })
        .collect();

    let meta = Meta::listing(items.len());
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

fn validate_rating(rating: i32) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::bad_request(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}
