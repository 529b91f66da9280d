//! # agentlog-core
//!
//! The action pipeline for AGENTLOG.
//!
//! This crate provides:
//! - The two collaborator traits (`ProofGenerator`, `LedgerClient`)
//! - The `ActionPipeline` that drives each action from creation to a
//!   ledger reference and owns the per-agent history
//! - Pipeline events and TOML configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use agentlog_core::{ActionPipeline, config::AgentLogConfig};
//!
//! let config = AgentLogConfig::from_toml_str("")?;
//! let pipeline = Arc::new(ActionPipeline::new(prover, ledger, config.pipeline));
//! let reference = pipeline
//!     .log_action(agent_id, ActionType::TaskCompletion, metadata, "addr_1")
//!     .await?;
//! ```

pub mod config;
pub mod events;
pub mod history;
pub mod pipeline;
pub mod traits;

pub use pipeline::ActionPipeline;
