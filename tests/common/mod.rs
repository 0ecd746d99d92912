#![allow(dead_code)]

use canteen_orders::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        auth::SignupRequest,
        menu::FoodItemRequest,
        orders::{MenuItemRef, OrderLine, PlaceOrderRequest},
    },
    entity::food_items::FoodCategory,
    middleware::auth::AuthUser,
    models::FoodItem,
    services::{auth_service, menu_service},
    state::AppState,
};
use tokio::sync::OnceCell;
use uuid::Uuid;

pub const CANTEEN_PASSWORD: &str = "canteen-test-secret";
pub const JWT_SECRET: &str = "jwt-test-secret";

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Returns `None` when no database is configured, so DB-backed tests skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run DB-backed tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url).await?;
    let state = AppState::new(pool, test_config(database_url));
    MIGRATED
        .get_or_try_init(|| async { run_migrations(&state.orm).await })
        .await?;
    Ok(Some(state))
}

pub fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: JWT_SECRET.into(),
        canteen_password: CANTEEN_PASSWORD.into(),
        cors_origins: vec![],
        token_ttl_hours: 1,
    }
}

/// Unique per call so tests can share one database without truncating it.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn create_student(state: &AppState) -> anyhow::Result<String> {
    let student_id = unique("S");
    auth_service::signup(
        state,
        SignupRequest {
            student_id: student_id.clone(),
            password: "student-pass".into(),
        },
    )
    .await?;
    Ok(student_id)
}

pub async fn create_food(
    state: &AppState,
    name: &str,
    price: i32,
    available: bool,
    stock: i32,
) -> anyhow::Result<FoodItem> {
    let resp = menu_service::upsert_food_item(
        state,
        &AuthUser::canteen(),
        FoodItemRequest {
            id: None,
            name: name.to_string(),
            description: format!("{name} from the test kitchen"),
            category: FoodCategory::Snacks,
            price,
            available,
            image: String::new(),
            prep_time: 5,
            stock,
        },
    )
    .await?;
    Ok(resp.data.expect("food item"))
}

pub fn order_request(lines: &[(i32, i32)]) -> PlaceOrderRequest {
    PlaceOrderRequest {
        pickup_time: "12:30".into(),
        total_price: None,
        items: lines
            .iter()
            .map(|(id, quantity)| OrderLine {
                menu_item: MenuItemRef { id: *id },
                quantity: *quantity,
            })
            .collect(),
        status: None,
        is_group_order: false,
        group_members: vec![],
    }
}
