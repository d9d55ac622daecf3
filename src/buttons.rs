//! Push buttons on falling-edge GPIO interrupts. The ISR only stamps the
//! press and pushes it onto a FreeRTOS queue; the consumer re-arms the pin
//! after taking the press off the queue.

use std::sync::Arc;

use anyhow::Result;
use esp_idf_hal::delay::{BLOCK, NON_BLOCK};
use esp_idf_hal::gpio::{AnyIOPin, Input, InterruptType, PinDriver, Pull};
use esp_idf_hal::task::queue::Queue;
use log::{info, warn};

use crate::events::{ButtonEvent, EventQueue, Press};

pub struct ButtonPins {
    pub rotate_up: AnyIOPin,
    pub rotate_down: AnyIOPin,
    pub fetch: AnyIOPin,
    pub fetch_all: AnyIOPin,
    pub sleep: AnyIOPin,
}

pub struct Buttons {
    queue: Arc<Queue<Press>>,
    pins: Vec<(ButtonEvent, PinDriver<'static, AnyIOPin, Input>)>,
}

fn uptime_ms() -> u64 {
    (unsafe { esp_idf_sys::esp_timer_get_time() } / 1000) as u64
}

impl Buttons {
    pub fn new(pins: ButtonPins, depth: usize) -> Result<Self> {
        let queue = Arc::new(Queue::new(depth));
        let mut drivers = Vec::with_capacity(ButtonEvent::ALL.len());

        for (button, pin) in [
            (ButtonEvent::RotateUp, pins.rotate_up),
            (ButtonEvent::RotateDown, pins.rotate_down),
            (ButtonEvent::FetchCurrent, pins.fetch),
            (ButtonEvent::FetchAll, pins.fetch_all),
            (ButtonEvent::Sleep, pins.sleep),
        ] {
            let mut driver = PinDriver::input(pin)?;
            driver.set_pull(Pull::Up)?;
            driver.set_interrupt_type(InterruptType::NegEdge)?;

            let q = queue.clone();
            // Safety: the callback runs in ISR context and only touches the
            // queue, which is ISR-safe.
            unsafe {
                driver.subscribe(move || {
                    q.send_back(Press::new(button, uptime_ms()), NON_BLOCK).ok();
                })?;
            }
            driver.enable_interrupt()?;
            info!("Button {} on GPIO{}", button.as_str(), driver.pin());
            drivers.push((button, driver));
        }

        Ok(Self {
            queue,
            pins: drivers,
        })
    }

    /// GPIO number of the sleep button, used as the wake source.
    pub fn sleep_gpio(&self) -> Option<i32> {
        self.pins
            .iter()
            .find(|(b, _)| *b == ButtonEvent::Sleep)
            .map(|(_, d)| d.pin())
    }

    fn rearm(&mut self, button: ButtonEvent) {
        if let Some((_, driver)) = self.pins.iter_mut().find(|(b, _)| *b == button) {
            if let Err(e) = driver.enable_interrupt() {
                warn!("Re-arming {} failed: {}", button.as_str(), e);
            }
        }
    }
}

impl EventQueue for Buttons {
    fn recv(&mut self) -> Option<Press> {
        let (press, _) = self.queue.recv_front(BLOCK)?;
        self.rearm(press.button);
        Some(press)
    }

    fn try_recv(&mut self) -> Option<Press> {
        let (press, _) = self.queue.recv_front(NON_BLOCK)?;
        self.rearm(press.button);
        Some(press)
    }
}
