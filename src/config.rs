use crate::error::{Result, VipError};
use crate::host::{self, StorageArea};
use log::warn;
use serde::{Deserialize, Serialize};

pub const WATCH_CONFIG_KEY: &str = "watchConfig";
pub const BACKEND_CONFIG_KEY: &str = "backendConfig";
pub const DEFAULT_COLLECTION: &str = "shared-vips";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatchConfig {
    pub host: String,
    pub root_selector: String,
    pub header_selector: String,
    pub content_selector: String,
    pub container_selector: String,
    pub sender_attribute: String,
    pub settle_delay_ms: i32,
    pub initial_delay_ms: i32,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            host: "mail.google.com".to_string(),
            root_selector: "div[role=\"main\"]".to_string(),
            header_selector: "span.gD, tr.zA .yW .zF, tr.zA .yW .yP".to_string(),
            content_selector: ".a3s.aiL".to_string(),
            container_selector: ".adn, tr.zA".to_string(),
            sender_attribute: "email".to_string(),
            settle_delay_ms: 1000,
            initial_delay_ms: 500,
        }
    }
}

impl WatchConfig {
    pub fn matches_host(&self, hostname: &str) -> bool {
        hostname.eq_ignore_ascii_case(&self.host)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackendConfig {
    pub project_id: String,
    pub api_key: String,
    pub collection: String,
}

impl BackendConfig {
    pub fn validate(mut self) -> Result<Self> {
        if self.project_id.trim().is_empty() || self.api_key.trim().is_empty() {
            return Err(VipError::Config(
                "Missing projectId or apiKey in backend config".to_string(),
            ));
        }
        if self.collection.trim().is_empty() {
            self.collection = DEFAULT_COLLECTION.to_string();
        }
        Ok(self)
    }
}

pub async fn load_watch_config() -> WatchConfig {
    match host::read_key::<WatchConfig>(StorageArea::Local, WATCH_CONFIG_KEY).await {
        Ok(Some(config)) => config,
        Ok(None) => WatchConfig::default(),
        Err(err) => {
            warn!("watch config unreadable, using defaults: {err}");
            WatchConfig::default()
        }
    }
}

pub async fn load_backend_config() -> Result<BackendConfig> {
    host::read_key::<BackendConfig>(StorageArea::Local, BACKEND_CONFIG_KEY)
        .await?
        .ok_or_else(|| VipError::Config("Backend configuration not found".to_string()))?
        .validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_watch_config_overrides_only_named_fields() {
        let config: WatchConfig =
            serde_json::from_str(r#"{ "host": "mail.example.com", "settleDelayMs": 250 }"#).unwrap();
        assert_eq!(config.host, "mail.example.com");
        assert_eq!(config.settle_delay_ms, 250);
        assert_eq!(config.content_selector, WatchConfig::default().content_selector);
    }

    #[test]
    fn host_check_ignores_case() {
        let config = WatchConfig::default();
        assert!(config.matches_host("Mail.Google.com"));
        assert!(!config.matches_host("calendar.google.com"));
    }

    #[test]
    fn backend_config_requires_project_and_key() {
        let missing: BackendConfig = serde_json::from_str(r#"{ "projectId": "vips" }"#).unwrap();
        assert!(matches!(missing.validate(), Err(VipError::Config(_))));

        let config: BackendConfig =
            serde_json::from_str(r#"{ "projectId": "vips", "apiKey": "k" }"#).unwrap();
        let config = config.validate().unwrap();
        assert_eq!(config.collection, DEFAULT_COLLECTION);
    }
}
