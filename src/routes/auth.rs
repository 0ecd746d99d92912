use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::auth::{
        CanteenLoginRequest, CanteenLoginResponse, SignupRequest, StudentLoginRequest,
        StudentLoginResponse,
    },
    error::AppResult,
    models::Student,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login/student", post(login_student))
        .route("/login/canteen", post(login_canteen))
}

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Register student", body = ApiResponse<Student>),
        (status = 400, description = "Student ID already registered")
    ),
    tag = "Auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Student>>)> {
    let resp = auth_service::signup(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/login/student",
    request_body = StudentLoginRequest,
    responses(
        (status = 200, description = "Login student", body = ApiResponse<StudentLoginResponse>),
        (status = 400, description = "Incorrect password"),
        (status = 404, description = "Student not registered")
    ),
    tag = "Auth"
)]
pub async fn login_student(
    State(state): State<AppState>,
    Json(payload): Json<StudentLoginRequest>,
) -> AppResult<Json<ApiResponse<StudentLoginResponse>>> {
    let resp = auth_service::login_student(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/login/canteen",
    request_body = CanteenLoginRequest,
    responses(
        (status = 200, description = "Login canteen counter", body = ApiResponse<CanteenLoginResponse>),
        (status = 400, description = "Incorrect password")
    ),
    tag = "Auth"
)]
pub async fn login_canteen(
    State(state): State<AppState>,
    Json(payload): Json<CanteenLoginRequest>,
) -> AppResult<Json<ApiResponse<CanteenLoginResponse>>> {
    let resp = auth_service::login_canteen(&state, payload).await?;
    Ok(Json(resp))
}
