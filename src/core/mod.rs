// src/core/mod.rs
//! Shared building blocks: file handling and the inference client

pub mod fs_ops;
pub mod llm_client;

pub use fs_ops::FsOps;
pub use llm_client::{ChatMessage, LlmClient, SamplingOptions};
