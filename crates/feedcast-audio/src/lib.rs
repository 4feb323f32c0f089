pub mod chunker;
pub mod downloader;
pub mod error;
pub mod protocol;
pub mod traits;
pub mod transcriber;

pub use chunker::FfmpegChunker;
pub use downloader::HttpAudioDownloader;
pub use error::AudioError;
pub use protocol::transcribe_episode;
pub use traits::{AudioChunker, AudioDownloader, Transcriber, TranscriptSink};
pub use transcriber::WhisperCliTranscriber;
