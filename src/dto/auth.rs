use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Student;

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub student_id: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentLoginRequest {
    pub student_id: String,
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct CanteenLoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentLoginResponse {
    pub token: String,
    pub student: Student,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CanteenLoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}
