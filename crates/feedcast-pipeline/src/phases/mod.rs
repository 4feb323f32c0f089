pub mod audio;
pub mod digest;
pub mod discovery;
pub mod publishing;
pub mod retention;
pub mod tts;

pub use audio::run_audio;
pub use digest::run_digest;
pub use discovery::run_discovery;
pub use publishing::run_publishing;
pub use retention::run_retention;
pub use tts::run_tts;
