use anyhow::Result;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::http_client;
use crate::platform::Network;
use crate::site::SiteReport;

const CONNECT_ATTEMPTS: u32 = 5;

/// Log association state from ESP-IDF internals.
fn log_wifi_diag(label: &str) {
    unsafe {
        let mut ap_info: esp_idf_sys::wifi_ap_record_t = core::mem::zeroed();
        let ap_rc = esp_idf_sys::esp_wifi_sta_get_ap_info(&mut ap_info);
        if ap_rc == esp_idf_sys::ESP_OK {
            let ssid = core::str::from_utf8(&ap_info.ssid)
                .unwrap_or("?")
                .trim_end_matches('\0');
            info!(
                "WiFi [{}]: assoc=YES rssi={} ch={} ssid={}",
                label, ap_info.rssi, ap_info.primary, ssid
            );
        } else {
            info!("WiFi [{}]: assoc=NO (ap_info err={})", label, ap_rc);
        }
    }
}

/// Station link plus the data-source endpoint it talks to.
pub struct WifiLink {
    wifi: BlockingWifi<EspWifi<'static>>,
    ssid: String,
    config: AppConfig,
}

impl WifiLink {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &AppConfig,
    ) -> Result<Self> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        let auth = if config.wifi_pass.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let mut ssid = heapless::String::<32>::new();
        let mut pass = heapless::String::<64>::new();
        ssid.push_str(&config.wifi_ssid).ok();
        pass.push_str(&config.wifi_pass).ok();

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid,
            password: pass,
            auth_method: auth,
            ..Default::default()
        }))?;

        Ok(Self {
            wifi,
            ssid: config.wifi_ssid.clone(),
            config: config.clone(),
        })
    }

    fn connect(&mut self) -> Result<bool> {
        if !self.wifi.is_started()? {
            self.wifi.start()?;
        }
        info!("WiFi connecting to '{}'...", self.ssid);

        for attempt in 1..=CONNECT_ATTEMPTS {
            let t0 = unsafe { esp_idf_sys::esp_timer_get_time() };
            match self.wifi.connect() {
                Ok(()) => {
                    let elapsed_ms = (unsafe { esp_idf_sys::esp_timer_get_time() } - t0) / 1000;
                    info!("WiFi connect OK on attempt {} ({}ms)", attempt, elapsed_ms);
                    log_wifi_diag(&format!("attempt {} OK", attempt));

                    self.wifi.wait_netif_up()?;
                    let ip_info = self.wifi.wifi().sta_netif().get_ip_info()?;
                    info!("WiFi connected, IP: {}", ip_info.ip);
                    return Ok(true);
                }
                Err(e) => {
                    let elapsed_ms = (unsafe { esp_idf_sys::esp_timer_get_time() } - t0) / 1000;
                    warn!(
                        "WiFi connect attempt {}/{} failed after {}ms: {}",
                        attempt, CONNECT_ATTEMPTS, elapsed_ms, e
                    );
                    log_wifi_diag(&format!("attempt {} FAIL", attempt));

                    if attempt < CONNECT_ATTEMPTS {
                        // Full stop/start cycle to reset radio state
                        let _ = self.wifi.disconnect();
                        self.wifi.stop().ok();
                        std::thread::sleep(Duration::from_millis(500));
                        self.wifi.start().ok();
                        std::thread::sleep(Duration::from_millis(300));
                    }
                }
            }
        }
        warn!("WiFi failed after {} attempts", CONNECT_ATTEMPTS);
        Ok(false)
    }
}

impl Network for WifiLink {
    fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    fn ensure_connected(&mut self) -> Result<(), FetchError> {
        if self.is_connected() {
            return Ok(());
        }
        match self.connect() {
            Ok(true) => Ok(()),
            Ok(false) => Err(FetchError::Network(format!(
                "could not associate with '{}'",
                self.ssid
            ))),
            Err(e) => Err(FetchError::Network(format!("{:#}", e))),
        }
    }

    fn fetch_site(&mut self, site: &str, count: usize) -> Result<SiteReport, FetchError> {
        let url = self.config.site_url(site, count);
        let body = http_client::fetch_json(
            &url,
            self.config.http_timeout,
            self.config.max_body_bytes,
        )?;
        SiteReport::parse(&body)
    }
}
