//! On-disk build file schema.
//!
//! These types mirror the TOML build file one-to-one and are converted into
//! a validated [`Manifest`](super::Manifest) after parsing. Everything
//! optional here is filled from defaults during that conversion.
//!
//! # Example
//!
//! ```toml
//! prefix = "/usr/local"
//! primary = "libbitcoin-system"
//!
//! [[target]]
//! account = "bitcoin-core"
//! repo = "secp256k1"
//! branch = "v0.1.0.13"
//! options = ["--disable-tests", "--enable-module-recovery"]
//! footprint = ["include/secp256k1*.h", "lib/libsecp256k1*"]
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use super::CleanupPolicy;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestFile {
  pub host: Option<String>,
  pub prefix: Option<PathBuf>,
  pub workspace: Option<PathBuf>,
  pub jobs: Option<usize>,
  pub cleanup: Option<CleanupPolicy>,
  pub elevate: Option<String>,
  pub refresh_linker_cache: Option<bool>,
  pub primary: Option<String>,
  #[serde(default)]
  pub tools: ToolsDef,
  #[serde(default, rename = "target")]
  pub targets: Vec<TargetDef>,
  #[serde(default)]
  pub verify: VerifyDef,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsDef {
  pub configure: Option<String>,
  pub make: Option<String>,
  pub ldconfig: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDef {
  pub account: String,
  pub repo: String,
  pub branch: String,
  pub host: Option<String>,
  #[serde(default)]
  pub options: Vec<String>,
  #[serde(default)]
  pub footprint: Vec<String>,
  pub bootstrap: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyDef {
  pub test_binary: Option<PathBuf>,
  pub test_args: Option<Vec<String>>,
  #[serde(default)]
  pub smoke: Vec<String>,
}
