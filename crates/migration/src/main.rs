use sea_orm::Database;
use sea_orm_migration::prelude::*;

use migration::Migrator;

const DEFAULT_DB_URL: &str = "sqlite:./centavo.db?mode=rwc";

fn usage() -> ! {
    eprintln!("Usage: cargo run -p migration -- [up|down|fresh|status] [database-url]");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let cmd = args.next();
    let db_url = args
        .next()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DB_URL.to_string());

    let db = Database::connect(&db_url).await?;

    match cmd.as_deref() {
        Some("up") | None => Migrator::up(&db, None).await?,
        Some("down") => Migrator::down(&db, None).await?,
        Some("fresh") => Migrator::fresh(&db).await?,
        Some("status") => Migrator::status(&db).await?,
        Some(_) => usage(),
    }

    Ok(())
}
