//! Bedrock Pre-Check
//!
//! CloudFormation custom resource that validates an Amazon Bedrock
//! environment before a deployment proceeds:
//!
//! 1. the Bedrock control plane answers in this region
//! 2. the requested model is listed and ACTIVE
//! 3. a minimal invocation of the model succeeds
//!
//! The first failing check ends the run. Every invocation produces exactly
//! one callback to the presigned `ResponseURL`; Delete requests are
//! acknowledged without running any check.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod telemetry;

#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use contracts::*;
pub use error::{PrecheckError, PrecheckFailure, Result};
