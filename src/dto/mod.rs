pub mod auth;
pub mod menu;
pub mod orders;
pub mod reviews;
