//! End-to-end runs of the srcbuild binary.
//!
//! The primary target is built in place (CI context) from a checkout of
//! shell scripts standing in for autotools, so no network access is needed.

#![cfg(unix)]

mod build_tests;
mod common;
