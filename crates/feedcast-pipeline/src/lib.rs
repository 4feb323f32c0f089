//! The Phase Orchestrator and its six phases: wires the
//! independent boundary crates (`feedcast-feed`, `feedcast-audio`,
//! `feedcast-ai`, `feedcast-tts`, `feedcast-artifacts`) and the State
//! Store (`feedcast-store`) into a bounded-concurrency pipeline.

pub mod context;
pub mod deps;
pub mod error;
pub mod orchestrator;
pub mod phases;
pub mod report;
pub mod text;

pub use context::{PhaseLimits, RunContext};
pub use deps::PipelineDeps;
pub use error::PipelineError;
pub use orchestrator::run;
pub use report::{ItemFailure, PhaseName, PhaseReport};
