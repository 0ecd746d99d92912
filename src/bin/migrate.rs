use anyhow::Context;
use canteen_orders::db::{create_pool, orm_from_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let orm = orm_from_pool(create_pool(&database_url).await?);
    run_migrations(&orm).await?;
    println!("Migrations applied");
    Ok(())
}
