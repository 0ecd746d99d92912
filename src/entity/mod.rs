pub mod food_items;
pub mod group_members;
pub mod group_orders;
pub mod order_items;
pub mod orders;
pub mod reviews;
pub mod users;

pub use food_items::Entity as FoodItems;
pub use group_members::Entity as GroupMembers;
pub use group_orders::Entity as GroupOrders;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use reviews::Entity as Reviews;
pub use users::Entity as Users;
