use std::env;

use dotenv::dotenv;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    api_url: String,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::with_api_url(env::var("EXPENSE_API_URL").ok())
    }

    pub fn with_api_url(api_url: Option<String>) -> Self {
        let api_url = api_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}
