/// PostgreSQL plumbing
///
/// - `pool`: connection pool creation with a startup health check
/// - `migrations`: embedded schema migrations
///
/// Queries live with their models in `crate::models`; the store in
/// `crate::store::postgres` composes them.
///
/// # Example
///
/// ```no_run
/// use eduai_shared::db::pool::{create_pool, DatabaseConfig};
/// use eduai_shared::db::migrations::run_migrations;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
