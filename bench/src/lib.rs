//! Benchmark utilities for the sparse-set registry.
//!
//! - **Microbenchmarks**: individual registry operations (create/destroy, assign, get, remove,
//!   single and multi-type queries)
//! - **Scenario benchmarks**: workloads mixing storages of very different sizes and steady
//!   entity churn
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p rusty_sparse_bench
//!
//! # Run specific benchmark group
//! cargo bench -p rusty_sparse_bench -- query
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod components;
pub mod scenarios;
