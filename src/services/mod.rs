pub mod auth_service;
pub mod group_service;
pub mod menu_service;
pub mod order_service;
pub mod review_service;
pub mod status_service;
