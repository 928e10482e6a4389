/// Operating systems srcbuild knows how to drive autotools builds on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  FreeBsd,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "freebsd" => Some(Self::FreeBsd),
      _ => None,
    }
  }

  /// Whether freshly installed shared objects need an `ldconfig` run before
  /// later targets can link against them.
  pub fn has_linker_cache(&self) -> bool {
    matches!(self, Self::Linux)
  }
}
