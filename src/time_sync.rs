use anyhow::Result;
use esp_idf_svc::sntp::{EspSntp, OperatingMode, SntpConf, SyncMode, SyncStatus};
use log::{info, warn};
use std::thread;
use std::time::Duration;

const SYNC_TIMEOUT_MS: u32 = 10_000;
const POLL_INTERVAL_MS: u32 = 500;

/// Start SNTP against `servers`. The returned handle must be kept alive to
/// keep the clock disciplined.
pub fn start(servers: &[&str]) -> Result<EspSntp<'static>> {
    let mut conf = SntpConf {
        sync_mode: SyncMode::Immediate,
        operating_mode: OperatingMode::Poll,
        ..Default::default()
    };
    // Slot count comes from CONFIG_LWIP_SNTP_MAX_SERVERS.
    for (slot, server) in conf.servers.iter_mut().zip(servers) {
        *slot = *server;
    }
    info!("Starting SNTP with {:?}", conf.servers);
    let sntp = EspSntp::new_with_callback(&conf, |_| {
        info!("Time synchronized");
    })?;
    Ok(sntp)
}

/// Wait up to 10 s for the first sync. Returns whether it completed.
pub fn wait_synced(sntp: &EspSntp<'static>) -> bool {
    let mut elapsed_ms = 0u32;
    while elapsed_ms < SYNC_TIMEOUT_MS {
        if sntp.get_sync_status() == SyncStatus::Completed {
            info!("SNTP synchronized after {}ms", elapsed_ms);
            return true;
        }
        info!("Waiting for NTP sync... ({}ms)", elapsed_ms);
        thread::sleep(Duration::from_millis(POLL_INTERVAL_MS as u64));
        elapsed_ms += POLL_INTERVAL_MS;
    }
    warn!(
        "SNTP sync not completed within {}s",
        SYNC_TIMEOUT_MS / 1000
    );
    false
}

/// Current wall clock in unix seconds.
pub fn unix_now() -> i64 {
    let mut now: libc::time_t = 0;
    unsafe {
        libc::time(&mut now);
    }
    now as i64
}
