//! The Dynamic RSS Generator: a stateless read path over
//! the State Store that renders an RSS 2.0 document on demand. No static
//! file is ever materialized — every request is a fresh render.

pub mod error;
pub mod feed;
pub mod routes;
pub mod slug;
pub mod state;

pub use error::RssError;
pub use routes::build_router;
pub use state::AppState;
