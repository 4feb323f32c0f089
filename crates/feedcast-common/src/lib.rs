pub mod config;
pub mod error;
pub mod settings;
pub mod time;
pub mod types;

pub use config::Config;
pub use error::ErrorKind;
pub use settings::Settings;
pub use types::{Digest, Episode, EpisodeStatus, Feed, Topic};
