use sea_orm::{ConnectionTrait, Database, Statement};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL")?;

    let db = Database::connect(database_url).await?;
    let backend = db.get_database_backend();

    for table in ["files", "users", "seaql_migrations"] {
        db.execute(Statement::from_string(
            backend,
            format!("DROP TABLE IF EXISTS {};", table),
        ))
        .await?;
        println!("Dropped {}", table);
    }

    println!("Database reset; migrations run again on the next server start");
    Ok(())
}
