/// Git version string, set at compile time.
pub const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");
/// Package version followed by the git version string, e.g. "0.1.0-aabbccdd".
pub const PBX_VERSION: &str = const_format::formatcp!("{}-{}", env!("CARGO_PKG_VERSION"), GIT_VERSION);
