pub mod digests;
pub mod episodes;
pub mod error;
pub mod feeds;
pub mod models;
pub mod settings;
pub mod topics;

pub use error::{Result, StoreError};
pub use settings::load_settings;

/// Runs the embedded SQL migrations against `pool`.
pub async fn migrate(pool: &sqlx::PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
