//! Shared utilities.
//!
//! Test doubles for the process and fetch seams live here.

#[cfg(test)]
pub mod testutil;
