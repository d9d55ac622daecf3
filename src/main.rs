#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "site-display v{} is firmware for ESP32-S3; build it for the espidf target",
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(target_os = "espidf")]
mod firmware {
    use anyhow::Result;
    use esp_idf_hal::gpio::{IOPin, InputPin, OutputPin};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use log::{info, warn};

    use site_display::board::EspBoard;
    use site_display::buttons::{ButtonPins, Buttons};
    use site_display::config::AppConfig;
    use site_display::controller::Controller;
    use site_display::epd::{EpdPins, EpdScreen};
    use site_display::nvs_store::NvsSettings;
    use site_display::wifi::WifiLink;

    pub fn run() -> Result<()> {
        esp_idf_sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();

        info!(
            "BOOT site-display e-paper dashboard v{}",
            env!("CARGO_PKG_VERSION")
        );

        let config = AppConfig::default();
        if config.wifi_ssid.is_empty() {
            warn!("No WiFi SSID configured (set it in wifi.local.rs)");
        }

        // Peripherals
        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs_partition = EspDefaultNvsPartition::take()?;

        // Persistent settings
        let settings = NvsSettings::open(nvs_partition.clone())?;

        // Display
        let screen = EpdScreen::new(
            peripherals.spi2,
            EpdPins {
                sclk: pins.gpio12.downgrade_output(),
                sdo: pins.gpio11.downgrade_output(),
                cs: pins.gpio10.downgrade_output(),
                busy: pins.gpio7.downgrade_input(),
                dc: pins.gpio9.downgrade_output(),
                rst: pins.gpio8.downgrade_output(),
                power: pins.gpio6.downgrade_output(),
            },
            config.screen,
        )?;

        // Buttons
        let buttons = Buttons::new(
            ButtonPins {
                rotate_up: pins.gpio4.downgrade(),
                rotate_down: pins.gpio5.downgrade(),
                fetch: pins.gpio15.downgrade(),
                fetch_all: pins.gpio16.downgrade(),
                sleep: pins.gpio17.downgrade(),
            },
            config.queue_depth,
        )?;
        let wake_gpio = buttons.sleep_gpio().unwrap_or(17);

        // WiFi
        let network = WifiLink::new(peripherals.modem, sysloop, nvs_partition, &config)?;

        let board = EspBoard::new(&config.ntp_servers, wake_gpio);

        let mut controller = Controller::new(config, network, board, screen, settings);
        controller.boot();

        info!("Entering event loop");
        let mut queue = buttons;
        controller.run(&mut queue);

        warn!("Event queue closed");
        Ok(())
    }
}
