use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::DatabaseConfig;
use crate::database::DatabaseManager;

pub async fn handle(database: &DatabaseConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(database).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;

    output_success(output_format, "Migrations applied", None)
}
