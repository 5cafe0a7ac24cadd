//! The goal-to-advice pipeline
//!
//! A goal is refined into a search query, matched against the three corpora,
//! explained item by item and finally summarized. [`Pipeline`] drives the
//! stages; each stage is usable on its own.

pub mod explain;
pub mod orchestrator;
pub mod prompts;
pub mod refiner;
pub mod search;
pub mod synthesize;

pub use explain::{ExplanationFanOut, FanOutReport};
pub use orchestrator::{failure_message, Pipeline, PipelineState, SessionState, Submission};
pub use refiner::QueryRefiner;
pub use search::CorpusSearch;
pub use synthesize::ResponseSynthesizer;
