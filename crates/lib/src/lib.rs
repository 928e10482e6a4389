//! srcbuild-lib: Core types and logic for srcbuild
//!
//! This crate provides the pieces used to build an ordered list of
//! autotools-based source repositories into a shared install prefix:
//! - `Manifest`: the build file, an ordered list of `BuildTarget`s plus run settings
//! - `clean`: removal of previously installed footprints
//! - `workspace`: the scratch directory every clone and build happens in
//! - `fetch`: shallow single-branch clones of each target
//! - `build`: the bootstrap → configure → compile → install pipeline
//! - `verify`: post-install unit tests and CLI smoke test
//! - `orchestrator`: the fail-fast run state machine tying it together

pub mod build;
pub mod clean;
pub mod consts;
pub mod context;
pub mod error;
pub mod execute;
pub mod fetch;
pub mod manifest;
pub mod orchestrator;
pub mod platform;
pub mod prefix;
pub mod target;
pub mod util;
pub mod verify;
pub mod workspace;
