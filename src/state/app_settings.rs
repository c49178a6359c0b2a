use std::path::PathBuf;

use unrivaled_api::keys::FREE_TIER_KEY;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api_key: String,
    pub data_dir: PathBuf,
}

impl AppSettings {
    pub fn load() -> Self {
        let api_key = std::env::var("UNRIVALED_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| FREE_TIER_KEY.to_string());
        let data_dir = std::env::var("UNRIVALED_DATA_DIR")
            .ok()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".unrivaled"));
        Self { api_key, data_dir }
    }
}
