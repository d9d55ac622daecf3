//! Input-driven state machine: one consumer handles every press to
//! completion, so the cache and the current buffer need no locking.

use log::{debug, error, info, warn};
use time::UtcOffset;

use crate::cache::SiteCache;
use crate::clock::{self, Stamp};
use crate::config::AppConfig;
use crate::dashboard::{DashboardView, Header};
use crate::error::FetchError;
use crate::events::{ButtonEvent, Debouncer, EventQueue, Press};
use crate::platform::{Board, Network, Screen, SettingsStore};
use crate::site::{Reading, SiteReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Nothing to show for the selected site.
    Idle,
    DisplayingSite,
    Fetching,
    FetchingAll,
    Sleeping,
}

/// The single live reading buffer, oldest first.
#[derive(Debug, Clone, Default)]
struct CurrentSeries {
    readings: Vec<Reading>,
    display_time: String,
    display_date: String,
}

pub struct Controller<N, B, S, P> {
    config: AppConfig,
    network: N,
    board: B,
    screen: S,
    settings: P,
    cache: SiteCache,
    debouncer: Debouncer,
    offset: UtcOffset,
    state: ControllerState,
    site_index: usize,
    data_loaded: bool,
    current: CurrentSeries,
    /// Last wall-clock stamp taken, for screens without data.
    stamp: Stamp,
    clock_synced: bool,
}

fn header<'a>(config: &'a AppConfig, site: usize, time: &'a str, date: &'a str) -> Header<'a> {
    Header {
        site: config.site_name(site).unwrap_or("?"),
        region: &config.region,
        time,
        date,
    }
}

impl<N, B, S, P> Controller<N, B, S, P>
where
    N: Network,
    B: Board,
    S: Screen,
    P: SettingsStore,
{
    pub fn new(config: AppConfig, network: N, board: B, screen: S, mut settings: P) -> Self {
        let saved = settings.load_site_index();
        let site_index = config.validate_site_index(saved);
        if saved.is_some() && saved != Some(site_index as i64) {
            warn!("Saved site index {:?} out of range, using {}", saved, site_index);
        }
        info!(
            "Site: {} (index {})",
            config.site_name(site_index).unwrap_or("?"),
            site_index
        );

        Self {
            cache: SiteCache::new(config.site_count()),
            debouncer: Debouncer::new(config.debounce_ms),
            offset: clock::offset_from_minutes(config.utc_offset_minutes),
            config,
            network,
            board,
            screen,
            settings,
            state: ControllerState::Idle,
            site_index,
            data_loaded: false,
            current: CurrentSeries::default(),
            stamp: Stamp::default(),
            clock_synced: false,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn site_index(&self) -> usize {
        self.site_index
    }

    pub fn site_name(&self) -> &str {
        self.config.site_name(self.site_index).unwrap_or("?")
    }

    pub fn data_loaded(&self) -> bool {
        self.data_loaded
    }

    pub fn current_readings(&self) -> &[Reading] {
        &self.current.readings
    }

    pub fn cache(&self) -> &SiteCache {
        &self.cache
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn screen(&self) -> &S {
        &self.screen
    }

    pub fn settings(&self) -> &P {
        &self.settings
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Bring the link up, show the first screen and run the one-time
    /// first-boot refresh.
    pub fn boot(&mut self) {
        match self.network.ensure_connected() {
            Ok(()) => {
                info!("WiFi connected");
                self.render_selected();
            }
            Err(e) => {
                error!("WiFi connection failed: {}", e);
                self.show_wifi_error();
                return;
            }
        }

        if !self.settings.first_boot_done() {
            info!("First boot: fetching every site");
            self.fetch_all();
            if let Err(e) = self.settings.mark_first_boot_done() {
                warn!("Failed to persist first-boot flag: {:?}", e);
            }
        }
    }

    /// Consume presses until the queue closes.
    pub fn run<Q: EventQueue + ?Sized>(&mut self, queue: &mut Q) {
        info!("System ready - press fetch button to get data");
        while let Some(press) = queue.recv() {
            self.dispatch(press, queue);
        }
        warn!("Input queue closed");
    }

    /// Handle one press. Returns `false` if it was debounced.
    pub fn dispatch<Q: EventQueue + ?Sized>(&mut self, press: Press, queue: &mut Q) -> bool {
        if !self.debouncer.accept(press) {
            debug!("Debounced {} at {}ms", press.button.as_str(), press.at_ms);
            return false;
        }
        info!("Button: {}", press.button.as_str());

        match press.button {
            ButtonEvent::RotateUp => self.rotate(1, queue),
            ButtonEvent::RotateDown => self.rotate(-1, queue),
            ButtonEvent::FetchCurrent => match self.fetch_current() {
                Ok(()) => debug!("Fetch for {} done", self.site_name()),
                Err(e) => debug!("Fetch for {} ended with: {}", self.site_name(), e),
            },
            ButtonEvent::FetchAll => self.fetch_all(),
            ButtonEvent::Sleep => self.sleep(queue),
        }
        true
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Step the selection by `delta`, show its cached data (or the no-data
    /// screen) and throw away presses that queued up meanwhile.
    pub fn rotate<Q: EventQueue + ?Sized>(&mut self, delta: isize, queue: &mut Q) {
        let n = self.config.site_count();
        if n == 0 {
            return;
        }
        self.site_index = (self.site_index as isize + delta).rem_euclid(n as isize) as usize;
        info!("Site changed to: {}", self.site_name());

        if let Err(e) = self.settings.save_site_index(self.site_index) {
            warn!("Failed to persist site index: {:?}", e);
        }

        self.render_selected();

        let dropped = queue.drain();
        if dropped > 0 {
            debug!("Discarded {} presses queued during render", dropped);
        }
    }

    pub fn fetch_current(&mut self) -> Result<(), FetchError> {
        self.state = ControllerState::Fetching;
        let result = self.fetch_site(self.site_index);
        self.state = self.resting_state();
        result
    }

    /// Refresh every site in order, one at a time, then return to the
    /// original selection. Any failure during the pass is shown again on
    /// top of the final screen.
    pub fn fetch_all(&mut self) {
        let n = self.config.site_count();
        let original = self.site_index;
        let mut fetched = 0;
        let mut failed = 0;
        let mut abort: Option<&'static str> = None;

        self.state = ControllerState::FetchingAll;
        for i in 0..n {
            self.site_index = i;
            match self.fetch_site(i) {
                Ok(()) => fetched += 1,
                Err(FetchError::ClockNotSynchronized) => {
                    abort = Some("Clock not set");
                    break;
                }
                Err(e) if !self.network.is_connected() => {
                    warn!("Fetch-all stopped at {}: {}", self.site_name(), e);
                    abort = Some("Connection lost");
                    break;
                }
                Err(_) => failed += 1,
            }
            if i + 1 < n {
                self.board.delay_ms(self.config.site_pacing_ms);
            }
        }
        self.site_index = original;
        info!(
            "Fetch-all done: {}/{} sites, {} failed",
            fetched, n, failed
        );

        self.state = ControllerState::Idle;
        self.render_selected();

        if let Some(reason) = abort {
            self.show_error(reason);
        } else if failed > 0 {
            let msg = if failed == 1 {
                "1 site failed".to_string()
            } else {
                format!("{} sites failed", failed)
            };
            self.show_error(&msg);
        }
    }

    /// Power the panel down and suspend until woken, then redraw.
    pub fn sleep<Q: EventQueue + ?Sized>(&mut self, queue: &mut Q) {
        self.state = ControllerState::Sleeping;
        info!("Entering sleep");
        if let Err(e) = self.screen.power_off() {
            warn!("Display power off failed: {:?}", e);
        }
        self.board.sleep_until_wake();
        info!("Woke up");

        self.state = ControllerState::Idle;
        queue.drain();
        self.render_selected();
    }

    // ── Internals ───────────────────────────────────────────────────

    fn resting_state(&self) -> ControllerState {
        if self.data_loaded {
            ControllerState::DisplayingSite
        } else {
            ControllerState::Idle
        }
    }

    /// Fetch, cache and show `site`. Failures are shown on screen here;
    /// the current buffer and cache stay as they were.
    fn fetch_site(&mut self, site: usize) -> Result<(), FetchError> {
        let name = self
            .config
            .site_name(site)
            .ok_or(FetchError::UnknownSite(site))?
            .to_string();

        if !self.network.is_connected() {
            info!("WiFi not connected, reconnecting...");
            if let Err(e) = self.network.ensure_connected() {
                error!("WiFi reconnect failed: {}", e);
                self.show_wifi_error();
                return Err(e);
            }
            info!("WiFi reconnected");
        }

        if !self.clock_synced {
            self.clock_synced = self.board.sync_clock();
        }
        let Some(stamp) = self
            .board
            .unix_time()
            .and_then(|t| clock::local_stamp(t, self.offset))
        else {
            error!("Time not synchronized, refusing to fetch");
            self.clock_synced = false;
            self.show_error("Clock not set");
            return Err(FetchError::ClockNotSynchronized);
        };
        info!("Time: {} {}", stamp.date, stamp.time);
        self.stamp = stamp.clone();

        let report = match self.fetch_with_retry(&name) {
            Ok(r) => r,
            Err(e) => {
                error!("Failed to fetch data for {}: {}", name, e);
                self.show_error("Fetch failed");
                return Err(e);
            }
        };

        let (meta, _latest, readings) = report.into_parts();
        if meta.name != name {
            warn!("Asked for {} but got data for {}", name, meta.name);
        }

        if let Err(e) = self.cache.save(site, &readings, &stamp.time, &stamp.date) {
            warn!("Cache write for {} failed: {}", name, e);
        }

        if readings.is_empty() {
            warn!("No readings returned for {}", name);
            self.render_selected();
            return Ok(());
        }

        self.current = CurrentSeries {
            readings,
            display_time: stamp.time,
            display_date: stamp.date,
        };
        self.data_loaded = true;
        self.show_current();
        Ok(())
    }

    fn fetch_with_retry(&mut self, name: &str) -> Result<SiteReport, FetchError> {
        let attempts = self.config.fetch_attempts.max(1);
        let mut attempt = 1;
        loop {
            debug!("Fetching {} (attempt {}/{})", name, attempt, attempts);
            match self.network.fetch_site(name, self.config.reading_count) {
                Ok(report) => return Ok(report),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!("Fetch attempt {} failed: {}, retrying...", attempt, e);
                    self.board.delay_ms(self.config.fetch_backoff_ms);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Load the selected site from the cache into the current buffer and
    /// show it, or show the no-data screen. A running fetch-all pass keeps
    /// its state.
    fn render_selected(&mut self) {
        match self.cache.load(self.site_index) {
            Some(entry) => {
                self.current.readings.clone_from(&entry.readings);
                self.current.display_time.clone_from(&entry.display_time);
                self.current.display_date.clone_from(&entry.display_date);
                self.data_loaded = true;
                self.show_current();
            }
            None => {
                self.current.readings.clear();
                self.data_loaded = false;
                let h = header(
                    &self.config,
                    self.site_index,
                    &self.stamp.time,
                    &self.stamp.date,
                );
                if let Err(e) = self.screen.show_no_data(&h) {
                    warn!("No-data screen failed: {:?}", e);
                }
            }
        }
        if self.state != ControllerState::FetchingAll {
            self.state = self.resting_state();
        }
    }

    fn show_current(&mut self) {
        let view = DashboardView {
            header: header(
                &self.config,
                self.site_index,
                &self.current.display_time,
                &self.current.display_date,
            ),
            readings: &self.current.readings,
        };
        info!(
            "Rendering {} with {} readings",
            view.header.site,
            view.readings.len()
        );
        if let Err(e) = self.screen.show_dashboard(&view) {
            warn!("Dashboard render failed: {:?}", e);
        }
    }

    fn show_wifi_error(&mut self) {
        let h = header(
            &self.config,
            self.site_index,
            &self.stamp.time,
            &self.stamp.date,
        );
        if let Err(e) = self.screen.show_wifi_error(&h, &self.config.wifi_ssid) {
            warn!("WiFi error screen failed: {:?}", e);
        }
    }

    fn show_error(&mut self, message: &str) {
        if let Err(e) = self.screen.indicate_error(message) {
            warn!("Error banner failed: {:?}", e);
        }
    }
}
