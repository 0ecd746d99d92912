use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            CanteenLoginRequest, CanteenLoginResponse, SignupRequest, StudentLoginRequest,
            StudentLoginResponse,
        },
        menu::{FoodItemRequest, MenuList, UpdateFoodItemRequest},
        orders::{
            ActiveOrder, ActiveOrderItem, ActiveOrderList, FoodSummary, MenuItemRef,
            OrderItemResponse, OrderLine, OrderList, OrderResponse, PlaceOrderRequest,
            PlaceOrderResponse, UpdateOrderStatusRequest,
        },
        reviews::{CreateReviewRequest, ReviewList},
    },
    entity::{food_items::FoodCategory, orders::OrderStatus},
    models::{FoodItem, Order, Review, Student},
    response::{ApiResponse, Meta},
    routes::{auth, canteen, health, menu, orders, reviews},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::signup,
        auth::login_student,
        auth::login_canteen,
        menu::list_menu,
        menu::add_food,
        menu::update_food_item,
        menu::list_reviews,
        orders::list_orders,
        orders::place_order,
        orders::update_order_status,
        canteen::list_active_orders,
        reviews::create_review
    ),
    components(
        schemas(
            Student,
            FoodItem,
            FoodCategory,
            Order,
            OrderStatus,
            Review,
            SignupRequest,
            StudentLoginRequest,
            StudentLoginResponse,
            CanteenLoginRequest,
            CanteenLoginResponse,
            FoodItemRequest,
            UpdateFoodItemRequest,
            MenuList,
            MenuItemRef,
            OrderLine,
            PlaceOrderRequest,
            PlaceOrderResponse,
            OrderItemResponse,
            OrderResponse,
            OrderList,
            FoodSummary,
            ActiveOrderItem,
            ActiveOrder,
            ActiveOrderList,
            UpdateOrderStatusRequest,
            CreateReviewRequest,
            ReviewList,
            health::HealthData,
            Meta,
            ApiResponse<FoodItem>,
            ApiResponse<MenuList>,
            ApiResponse<OrderList>,
            ApiResponse<ActiveOrderList>,
            ApiResponse<Order>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Student and canteen login"),
        (name = "Menu", description = "Menu browsing and stock management"),
        (name = "Orders", description = "Student order placement and history"),
        (name = "Canteen", description = "Kitchen queue and status workflow"),
        (name = "Reviews", description = "Food reviews"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
