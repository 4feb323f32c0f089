use sqlx::PgPool;

/// Shared server state: the RSS endpoint's only dependency is
/// the State Store itself — no phase's in-memory state crosses into the
/// read path.
pub struct AppState {
    pub pool: PgPool,
}
