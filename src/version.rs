// Build-time identity from Cargo.toml

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `User-Agent` sent with health probes, e.g. "servicewatch/0.3.0".
pub fn user_agent() -> String {
    format!("{}/{}", NAME, VERSION)
}
