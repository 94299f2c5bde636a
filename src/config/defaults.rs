use std::path::PathBuf;

pub const DEFAULT_RESOURCE_NAME: &str = "user";
pub const DEFAULT_TOKEN_ATTRIBUTE_NAME: &str = "token";
pub const DEFAULT_IDENTIFICATION_ATTRIBUTE_NAME: &str = "email";
pub const DEFAULT_SERVER_ENDPOINT: &str = "/users/sign_in";
pub const DEFAULT_APPLICATION_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 500;

pub fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join("sessionward")
        .join("session.json")
}
