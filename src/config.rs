use std::time::Duration;

use embedded_graphics::prelude::Size;

use crate::site::MAX_READINGS;

pub const SITES: [&str; 8] = [
    "Sakti",
    "Likir",
    "Baroo",
    "Tuna",
    "Ayee",
    "Chanigund",
    "Stakmo",
    "Igoo",
];

const DEFAULT_WIFI_SSID: &str = "YOUR_WIFI_SSID";
const DEFAULT_WIFI_PASS: &str = "";
const DEFAULT_API_SERVER: &str = "api.example.invalid";
const DEFAULT_API_PATH: &str = "/prod/site";
const DEFAULT_REGION: &str = "Ladakh";

/// Load-time configuration. Secrets come from `wifi.local.rs` through
/// `build.rs` when present.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sites: Vec<String>,
    pub region: String,
    pub default_site_index: usize,

    pub wifi_ssid: String,
    pub wifi_pass: String,

    pub api_server: String,
    pub api_path: String,
    pub reading_count: usize,
    pub http_timeout: Duration,
    pub max_body_bytes: usize,

    pub ntp_servers: [String; 2],
    /// Local display offset from UTC.
    pub utc_offset_minutes: i32,

    pub debounce_ms: u64,
    pub fetch_attempts: u32,
    pub fetch_backoff_ms: u32,
    pub site_pacing_ms: u32,
    pub queue_depth: usize,

    pub screen: Size,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sites: SITES.iter().map(|s| s.to_string()).collect(),
            region: DEFAULT_REGION.into(),
            default_site_index: 0,
            wifi_ssid: option_env!("LOCAL_WIFI_SSID")
                .unwrap_or(DEFAULT_WIFI_SSID)
                .into(),
            wifi_pass: option_env!("LOCAL_WIFI_PASS")
                .unwrap_or(DEFAULT_WIFI_PASS)
                .into(),
            api_server: option_env!("LOCAL_SITE_API_SERVER")
                .unwrap_or(DEFAULT_API_SERVER)
                .into(),
            api_path: DEFAULT_API_PATH.into(),
            reading_count: MAX_READINGS,
            http_timeout: Duration::from_secs(10),
            max_body_bytes: 48 * 1024,
            ntp_servers: ["pool.ntp.org".into(), "time.cloudflare.com".into()],
            utc_offset_minutes: 5 * 60 + 30,
            debounce_ms: 200,
            fetch_attempts: 2,
            fetch_backoff_ms: 1000,
            site_pacing_ms: 2000,
            queue_depth: 10,
            screen: Size::new(400, 300),
        }
    }
}

impl AppConfig {
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn site_name(&self, index: usize) -> Option<&str> {
        self.sites.get(index).map(String::as_str)
    }

    /// A persisted index, or the default when it no longer names a site.
    pub fn validate_site_index(&self, saved: Option<i64>) -> usize {
        match saved {
            Some(i) if i >= 0 && (i as usize) < self.site_count() => i as usize,
            _ => self.default_site_index.min(self.site_count().saturating_sub(1)),
        }
    }

    pub fn site_url(&self, site: &str, count: usize) -> String {
        format!(
            "https://{}{}?site_name={}&count={}",
            self.api_server, self.api_path, site, count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_known_sites() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.site_count(), 8);
        assert_eq!(cfg.site_name(5), Some("Chanigund"));
        assert_eq!(cfg.site_name(8), None);
        assert_eq!(cfg.reading_count, 288);
        assert_eq!(cfg.screen, Size::new(400, 300));
    }

    #[test]
    fn out_of_range_index_falls_back() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.validate_site_index(Some(3)), 3);
        assert_eq!(cfg.validate_site_index(Some(8)), 0);
        assert_eq!(cfg.validate_site_index(Some(-1)), 0);
        assert_eq!(cfg.validate_site_index(None), 0);
    }

    #[test]
    fn url_carries_site_and_count() {
        let cfg = AppConfig {
            api_server: "data.example.org".into(),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.site_url("Tuna", cfg.reading_count),
            "https://data.example.org/prod/site?site_name=Tuna&count=288"
        );
    }
}
