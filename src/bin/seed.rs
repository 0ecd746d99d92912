use anyhow::Context;
use canteen_orders::{
    db::{create_pool, orm_from_pool, run_migrations},
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let pool = create_pool(&database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm_from_pool(pool.clone())).await?;

    let first = ensure_student(&pool, "S1001", "student123").await?;
    let second = ensure_student(&pool, "S1002", "student123").await?;
    seed_menu(&pool).await?;
    seed_group_order(&pool, first, second).await?;

    println!("Seed completed. Students: S1001 (id {first}), S1002 (id {second})");
    Ok(())
}

async fn ensure_student(pool: &sqlx::PgPool, student_id: &str, password: &str) -> anyhow::Result<i32> {
    let password_hash = hash_password(password)?;

    let row: Option<(i32,)> = sqlx::query_as(
        r#"
        INSERT INTO users (student_id, password_hash)
        VALUES ($1, $2)
        ON CONFLICT (student_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(student_id)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If the student already exists, fetch id
    let id = match row {
        Some((id,)) => id,
        None => {
            let existing: (i32,) = sqlx::query_as("SELECT id FROM users WHERE student_id = $1")
                .bind(student_id)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured student {student_id}");
    Ok(id)
}

async fn seed_menu(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let items = vec![
        ("Classic Burger", "Grilled patty with fresh veggies", "MainCourse", 120, 8, 40),
        ("Chicken Biryani", "Fragrant rice with spiced chicken", "MainCourse", 150, 10, 30),
        ("Masala Dosa", "Crispy dosa with potato filling", "MainCourse", 80, 8, 50),
        ("Samosa", "Two potato samosas with chutney", "Snacks", 20, 3, 100),
        ("French Fries", "Salted crispy fries", "Snacks", 50, 6, 60),
        ("Cold Coffee", "Iced coffee with cream", "Beverages", 70, 3, 40),
        ("Mango Smoothie", "Fresh mango blended with yogurt", "Beverages", 80, 4, 25),
        ("Chocolate Brownie", "Warm brownie with fudge", "Desserts", 60, 2, 30),
    ];

    for (name, description, category, price, prep_time, stock) in items {
        sqlx::query(
            r#"
            INSERT INTO food_items (name, description, category, price, available, image, prep_time, stock)
            SELECT $1, $2, $3, $4, TRUE, '', $5, $6
            WHERE NOT EXISTS (SELECT 1 FROM food_items WHERE name = $1)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(category)
        .bind(price)
        .bind(prep_time)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu");
    Ok(())
}

/// Group orders have no creation endpoint; this writes one directly so the
/// listing path has something to show.
async fn seed_group_order(pool: &sqlx::PgPool, owner: i32, member: i32) -> anyhow::Result<()> {
    let mut txn = pool.begin().await?;

    let existing: Option<(i32,)> =
        sqlx::query_as("SELECT id FROM group_orders WHERE group_code = $1")
            .bind("GRP-DEMO")
            .fetch_optional(&mut *txn)
            .await?;
    if existing.is_some() {
        println!("Group order already seeded");
        return Ok(());
    }

    let food: (i32, i32) =
        sqlx::query_as("SELECT id, price FROM food_items WHERE name = 'Samosa'")
            .fetch_one(&mut *txn)
            .await?;

    let order: (i32,) = sqlx::query_as(
        r#"
        INSERT INTO orders (user_id, token_no, pickup_time, total_price, is_group_order, status)
        VALUES ($1, $2, '12:30', $3, TRUE, 'pending')
        RETURNING id
        "#,
    )
    .bind(owner)
    .bind("A-DEMO")
    .bind(food.1 * 4)
    .fetch_one(&mut *txn)
    .await?;

    sqlx::query("INSERT INTO order_items (order_id, food_id, quantity) VALUES ($1, $2, 4)")
        .bind(order.0)
        .bind(food.0)
        .execute(&mut *txn)
        .await?;

    let group: (i32,) = sqlx::query_as(
        "INSERT INTO group_orders (order_id, group_code) VALUES ($1, $2) RETURNING id",
    )
    .bind(order.0)
    .bind("GRP-DEMO")
    .fetch_one(&mut *txn)
    .await?;

    for user_id in [owner, member] {
        sqlx::query("INSERT INTO group_members (group_order_id, user_id) VALUES ($1, $2)")
            .bind(group.0)
            .bind(user_id)
            .execute(&mut *txn)
            .await?;
    }

    txn.commit().await?;
    println!("Seeded group order GRP-DEMO");
    Ok(())
}
