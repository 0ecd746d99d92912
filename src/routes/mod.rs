use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod canteen;
pub mod doc;
pub mod health;
pub mod menu;
pub mod orders;
pub mod reviews;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(menu::router())
        .merge(orders::router())
        .merge(reviews::router())
        .nest("/canteen", canteen::router())
}
