//! Retrieval-augmented answer generation.
//!
//! `prompt` assembles the completion request; `pipeline` runs retrieval,
//! completion and history bookkeeping for one query.

pub mod pipeline;
pub mod prompt;

pub use pipeline::{GenerationPipeline, PipelineSettings};
