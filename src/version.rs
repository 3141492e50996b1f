//! Version information for postlet.

/// Postlet version from Cargo.toml.
pub const POSTLET_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent header value sent on outbound requests.
pub const USER_AGENT: &str = concat!("postlet/", env!("CARGO_PKG_VERSION"));
