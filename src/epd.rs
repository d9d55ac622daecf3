//! 4.2" 400x300 e-paper panel. The frame buffer lives here and survives
//! between refreshes, so overlays draw on top of the last screen.

use anyhow::{bail, Result};
use embedded_graphics::{draw_target::DrawTargetExt, geometry::Size};
use epd_waveshare::{
    epd4in2::{Display4in2, Epd4in2},
    prelude::*,
};
use esp_idf_hal::{
    delay, gpio,
    gpio::{Input, Output, PinDriver},
    peripheral,
    prelude::*,
    spi,
    spi::{Dma, SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig},
};
use log::info;

use crate::canvas::{Canvas, DrawTargetCanvas};
use crate::dashboard::{self, DashboardView, Header};
use crate::platform::Screen;

const SPI_BAUD_MHZ: u32 = 10;
/// Settle time after switching panel power on.
const POWER_ON_SETTLE_MS: u32 = 100;

pub type Epd<'a> = Epd4in2<
    SpiDeviceDriver<'a, SpiDriver<'a>>,
    PinDriver<'a, gpio::AnyOutputPin, Output>,
    PinDriver<'a, gpio::AnyInputPin, Input>,
    PinDriver<'a, gpio::AnyOutputPin, Output>,
    PinDriver<'a, gpio::AnyOutputPin, Output>,
    delay::Ets,
>;

pub struct EpdPins {
    pub sclk: gpio::AnyOutputPin,
    pub sdo: gpio::AnyOutputPin,
    pub cs: gpio::AnyOutputPin,
    pub busy: gpio::AnyInputPin,
    pub dc: gpio::AnyOutputPin,
    pub rst: gpio::AnyOutputPin,
    pub power: gpio::AnyOutputPin,
}

pub struct EpdScreen {
    display: Box<Display4in2>,
    driver: SpiDeviceDriver<'static, SpiDriver<'static>>,
    epd: Epd<'static>,
    power: PinDriver<'static, gpio::AnyOutputPin, Output>,
    powered: bool,
}

impl EpdScreen {
    pub fn new(
        spi: impl peripheral::Peripheral<P = impl spi::SpiAnyPins> + 'static,
        pins: EpdPins,
        expected: Size,
    ) -> Result<Self> {
        let mut power = PinDriver::output(pins.power)?;
        power.set_high()?;
        esp_idf_hal::delay::FreeRtos::delay_ms(POWER_ON_SETTLE_MS);

        let mut driver = SpiDeviceDriver::new_single(
            spi,
            pins.sclk,
            pins.sdo,
            Option::<gpio::AnyIOPin>::None,
            Option::<gpio::AnyOutputPin>::None,
            &SpiDriverConfig::new().dma(Dma::Disabled),
            &SpiConfig::new().baudrate(SPI_BAUD_MHZ.MHz().into()),
        )?;

        let epd = Epd4in2::new(
            &mut driver,
            PinDriver::output(pins.cs)?,
            PinDriver::input(pins.busy)?,
            PinDriver::output(pins.dc)?,
            PinDriver::output(pins.rst)?,
            &mut delay::Ets,
            Some(100),
        )?;

        let panel = Size::new(epd.width(), epd.height());
        if panel != expected {
            bail!(
                "Panel is {}x{}, layout expects {}x{}",
                panel.width,
                panel.height,
                expected.width,
                expected.height
            );
        }

        let display = Box::<Display4in2>::default();
        info!("Display initialized: {}x{}", panel.width, panel.height);

        Ok(Self {
            display,
            driver,
            epd,
            power,
            powered: true,
        })
    }

    fn power_on(&mut self) -> Result<()> {
        if !self.powered {
            self.power.set_high()?;
            esp_idf_hal::delay::FreeRtos::delay_ms(POWER_ON_SETTLE_MS);
            self.epd.wake_up(&mut self.driver, &mut delay::Ets)?;
            self.powered = true;
        }
        Ok(())
    }

    /// Draw into the frame buffer, push it to the panel and put the panel
    /// back to deep sleep.
    fn refresh(&mut self, draw: impl FnOnce(&mut dyn Canvas)) -> Result<()> {
        self.power_on()?;
        {
            let mut canvas = DrawTargetCanvas::new(self.display.color_converted());
            draw(&mut canvas);
        }
        info!("Updating display...");
        self.epd
            .update_and_display_frame(&mut self.driver, self.display.buffer(), &mut delay::Ets)?;
        self.sleep_panel()
    }

    fn sleep_panel(&mut self) -> Result<()> {
        if self.powered {
            self.epd.sleep(&mut self.driver, &mut delay::Ets)?;
            self.power.set_low()?;
            self.powered = false;
        }
        Ok(())
    }
}

impl Screen for EpdScreen {
    fn show_dashboard(&mut self, view: &DashboardView<'_>) -> Result<()> {
        info!("Drawing site data");
        self.refresh(|c| dashboard::draw_dashboard(c, view))
    }

    fn show_no_data(&mut self, header: &Header<'_>) -> Result<()> {
        info!("Drawing no data screen");
        self.refresh(|c| dashboard::draw_no_data(c, header))
    }

    fn show_wifi_error(&mut self, header: &Header<'_>, ssid: &str) -> Result<()> {
        info!("Drawing WiFi error screen");
        self.refresh(|c| dashboard::draw_wifi_error(c, header, ssid))
    }

    fn indicate_error(&mut self, message: &str) -> Result<()> {
        info!("Drawing error banner: {}", message);
        self.refresh(|c| dashboard::draw_error_banner(c, message))
    }

    fn power_off(&mut self) -> Result<()> {
        self.sleep_panel()
    }
}
