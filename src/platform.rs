//! Collaborators the controller drives. The firmware implements these over
//! ESP-IDF; tests use in-memory fakes.

use anyhow::Result;

use crate::dashboard::{DashboardView, Header};
use crate::error::FetchError;
use crate::site::SiteReport;

/// Link to the data source.
pub trait Network {
    fn is_connected(&self) -> bool;

    /// Associate if not already associated.
    fn ensure_connected(&mut self) -> Result<(), FetchError>;

    /// One request for `site`, `count` readings. No retries here.
    fn fetch_site(&mut self, site: &str, count: usize) -> Result<SiteReport, FetchError>;
}

/// Timekeeping and power.
pub trait Board {
    /// Wall clock in unix seconds, if it has ever been set.
    fn unix_time(&self) -> Option<i64>;

    /// Start network time sync and wait for it. Returns whether the clock
    /// is now synchronized.
    fn sync_clock(&mut self) -> bool;

    fn delay_ms(&mut self, ms: u32);

    /// Suspend until the wake input fires.
    fn sleep_until_wake(&mut self);
}

/// Output device for full screens.
pub trait Screen {
    fn show_dashboard(&mut self, view: &DashboardView<'_>) -> Result<()>;
    fn show_no_data(&mut self, header: &Header<'_>) -> Result<()>;
    fn show_wifi_error(&mut self, header: &Header<'_>, ssid: &str) -> Result<()>;
    /// Overlay `message` on the frame currently shown.
    fn indicate_error(&mut self, message: &str) -> Result<()>;
    fn power_off(&mut self) -> Result<()>;
}

/// Values that must survive power loss.
pub trait SettingsStore {
    fn load_site_index(&mut self) -> Option<i64>;
    fn save_site_index(&mut self, index: usize) -> Result<()>;
    fn first_boot_done(&mut self) -> bool;
    fn mark_first_boot_done(&mut self) -> Result<()>;
}

/// Settings kept in RAM only.
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    pub site_index: Option<i64>,
    pub first_boot_done: bool,
    pub writes: usize,
}

impl SettingsStore for MemorySettings {
    fn load_site_index(&mut self) -> Option<i64> {
        self.site_index
    }

    fn save_site_index(&mut self, index: usize) -> Result<()> {
        self.site_index = Some(index as i64);
        self.writes += 1;
        Ok(())
    }

    fn first_boot_done(&mut self) -> bool {
        self.first_boot_done
    }

    fn mark_first_boot_done(&mut self) -> Result<()> {
        self.first_boot_done = true;
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_settings_round_trip() {
        let mut s = MemorySettings::default();
        assert_eq!(s.load_site_index(), None);
        assert!(!s.first_boot_done());
        s.save_site_index(4).unwrap();
        s.mark_first_boot_done().unwrap();
        assert_eq!(s.load_site_index(), Some(4));
        assert!(s.first_boot_done());
        assert_eq!(s.writes, 2);
    }
}
