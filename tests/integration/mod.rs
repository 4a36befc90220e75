//! Integration test suite for renderfs
//!
//! End-to-end tests of the copy engine against real directories, the
//! in-memory and archive backends, and the `renderfs` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **rendering**: path and content rendering, skips, strictness, binaries
//! - **conflicts**: conflict policies, identical detection, re-runs
//! - **failures**: write and close errors from the destination
//! - **ignore**: ignore-file and explicit pattern handling
//! - **symlinks**: symlink recreation and symlinked destinations
//! - **archive**: zip destination
//! - **cli**: the `renderfs` command

mod archive;
mod conflicts;
mod failures;
mod ignore;
mod rendering;
mod symlinks;
