//! Post-login API load testing with ordered endpoint checks.
//!
//! `loadsteps` logs in once through the OTP flow, then drives a fixed
//! sequence of REST checks per iteration across a pool of virtual users.
//! Every step is counted: a step passes when its response meets all of its
//! expectations, fails otherwise, and a step that errors or panics is
//! recorded as failed without aborting the iteration.
//!
//! # Architecture
//!
//! Login happens exactly once per run and its bearer token is shared,
//! read-only, by every virtual user. Virtual users claim iterations from a
//! shared counter until the configured total is reached or the time limit
//! fires. Each finished iteration is reported to a single aggregator that
//! builds the end-of-run summary.
//!
//! # Modules
//!
//! - [`api`]: Command orchestration (`run_load`, `list_steps`)
//! - [`checks`]: The endpoint catalogue and response expectations
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`error`]: Semantic error types for the application
//! - [`executor`]: Shared-iterations scheduling across virtual users
//! - [`http`]: Thin HTTP client with the backend's header conventions
//! - [`logging`]: Tracing subscriber set-up
//! - [`runner`]: Fault-isolating step runner and per-iteration tallies
//! - [`scenario`]: Step sequences and their default load shapes
//! - [`session`]: The one-time OTP login
//! - [`summary`]: Iteration statistics and the final summary report

pub mod api;
pub mod checks;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod logging;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod summary;
