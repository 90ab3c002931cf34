//! Test execution
//!
//! [`ExecutionEngine`] is a stateless orchestrator: it resolves definitions in
//! the registry, performs requests through a [`crate::client::ResourceClient`],
//! evaluates responses and appends every terminal result to the result store.

mod engine;

pub use engine::ExecutionEngine;

/// Failure reason of a result whose test id is not registered
pub const TEST_NOT_FOUND: &str = "test not found";
/// Failure reason of a result whose suite id is not registered
pub const SUITE_NOT_FOUND: &str = "suite not found";
/// Failure reason of tests left unexecuted after a stop-on-failure abort
pub const SUITE_ABORTED: &str = "suite aborted";
