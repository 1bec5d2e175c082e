use std::env;

/// # Environment Variables
///
/// - `SERVER_ADDR`: listen address (default: `0.0.0.0:3000`)
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}
