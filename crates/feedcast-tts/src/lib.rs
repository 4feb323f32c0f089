pub mod atomic;
pub mod client;
pub mod error;
pub mod probe;
pub mod traits;

pub use atomic::{stage_audio, StagedAudio};
pub use client::HttpTtsClient;
pub use error::TtsError;
pub use traits::TtsClient;
