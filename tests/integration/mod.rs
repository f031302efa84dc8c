//! Integration test suite for the pedigree engine and the `pedigree` CLI
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pedigree**: end-to-end tree properties (depth bound, cycles, shared ancestors)
//! - **coordinator**: request supersession and the observable build state
//! - **http_lookup**: the REST client against an in-process fake loft backend
//! - **cli**: the binary, driven through `assert_cmd`
//! - **config**: config file resolution through the environment

mod cli;
mod config;
mod coordinator;
mod http_lookup;
