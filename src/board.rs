use esp_idf_hal::delay::FreeRtos;
use esp_idf_svc::sntp::EspSntp;
use log::{info, warn};

use crate::clock::MIN_VALID_YEAR;
use crate::platform::Board;
use crate::time_sync;

/// Unix seconds at 2020-01-01T00:00:00Z.
const MIN_VALID_UNIX: i64 = 1_577_836_800;
const RELEASE_POLL_MS: u32 = 20;

/// SoC services: timers, SNTP and light sleep with a GPIO wake source.
pub struct EspBoard {
    ntp_servers: Vec<String>,
    sntp: Option<EspSntp<'static>>,
    wake_gpio: i32,
}

impl EspBoard {
    pub fn new(ntp_servers: &[String], wake_gpio: i32) -> Self {
        Self {
            ntp_servers: ntp_servers.to_vec(),
            sntp: None,
            wake_gpio,
        }
    }

    fn wake_pin_low(&self) -> bool {
        unsafe { esp_idf_sys::gpio_get_level(self.wake_gpio) == 0 }
    }
}

impl Board for EspBoard {
    fn unix_time(&self) -> Option<i64> {
        let now = time_sync::unix_now();
        if now < MIN_VALID_UNIX {
            info!("Clock not set (before {})", MIN_VALID_YEAR);
            return None;
        }
        Some(now)
    }

    fn sync_clock(&mut self) -> bool {
        if self.sntp.is_none() {
            let servers: Vec<&str> = self.ntp_servers.iter().map(String::as_str).collect();
            match time_sync::start(&servers) {
                Ok(sntp) => self.sntp = Some(sntp),
                Err(e) => {
                    warn!("SNTP start failed: {:#}", e);
                    return false;
                }
            }
        }
        match &self.sntp {
            Some(sntp) => time_sync::wait_synced(sntp),
            None => false,
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }

    fn sleep_until_wake(&mut self) {
        // The press that requested sleep must be released first or the
        // level trigger wakes us immediately.
        while self.wake_pin_low() {
            FreeRtos::delay_ms(RELEASE_POLL_MS);
        }

        info!("Entering light sleep, wake on GPIO{}", self.wake_gpio);
        unsafe {
            esp_idf_sys::gpio_wakeup_enable(
                self.wake_gpio,
                esp_idf_sys::gpio_int_type_t_GPIO_INTR_LOW_LEVEL,
            );
            esp_idf_sys::esp_sleep_enable_gpio_wakeup();
            esp_idf_sys::esp_light_sleep_start();
            esp_idf_sys::gpio_wakeup_disable(self.wake_gpio);
            esp_idf_sys::gpio_set_intr_type(
                self.wake_gpio,
                esp_idf_sys::gpio_int_type_t_GPIO_INTR_NEGEDGE,
            );
        }
        info!(
            "Woke up, cause={}",
            unsafe { esp_idf_sys::esp_sleep_get_wakeup_cause() }
        );

        while self.wake_pin_low() {
            FreeRtos::delay_ms(RELEASE_POLL_MS);
        }
    }
}
