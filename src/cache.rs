use std::collections::TryReserveError;

use log::{info, warn};

use crate::error::FetchError;
use crate::site::Reading;

/// Last fetched data for one site.
///
/// `has_data` implies `readings` is non-empty. Entries are only ever
/// replaced as a whole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteCacheEntry {
    pub has_data: bool,
    /// Oldest first.
    pub readings: Vec<Reading>,
    pub display_time: String,
    pub display_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Stored(usize),
    /// Empty series: the previous entry is kept as it was.
    KeptPrevious,
}

/// One entry per known site, all empty at start.
#[derive(Debug, Clone)]
pub struct SiteCache {
    entries: Vec<SiteCacheEntry>,
}

impl SiteCache {
    pub fn new(site_count: usize) -> Self {
        Self {
            entries: vec![SiteCacheEntry::default(); site_count],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cached_sites(&self) -> usize {
        self.entries.iter().filter(|e| e.has_data).count()
    }

    /// The entry for `site` if it holds data.
    pub fn load(&self, site: usize) -> Option<&SiteCacheEntry> {
        self.entries.get(site).filter(|e| e.has_data)
    }

    /// Replace the entry for `site` with a copy of `readings`.
    ///
    /// An empty `readings` leaves the current entry alone. Otherwise the old
    /// storage is released before the new one is reserved; if that
    /// reservation fails the entry is left empty and `Allocation` is
    /// returned.
    pub fn save(
        &mut self,
        site: usize,
        readings: &[Reading],
        display_time: &str,
        display_date: &str,
    ) -> Result<SaveOutcome, FetchError> {
        self.save_with(site, readings, display_time, display_date, |n| {
            let mut buf = Vec::new();
            buf.try_reserve_exact(n)?;
            Ok(buf)
        })
    }

    fn save_with<F>(
        &mut self,
        site: usize,
        readings: &[Reading],
        display_time: &str,
        display_date: &str,
        reserve: F,
    ) -> Result<SaveOutcome, FetchError>
    where
        F: FnOnce(usize) -> Result<Vec<Reading>, TryReserveError>,
    {
        let entry = self
            .entries
            .get_mut(site)
            .ok_or(FetchError::UnknownSite(site))?;

        if readings.is_empty() {
            info!("Cache: empty result for site {}, keeping previous entry", site);
            return Ok(SaveOutcome::KeptPrevious);
        }

        *entry = SiteCacheEntry::default();

        let mut buf = match reserve(readings.len()) {
            Ok(buf) => buf,
            Err(e) => {
                warn!(
                    "Cache: cannot reserve {} readings for site {}: {}",
                    readings.len(),
                    site,
                    e
                );
                return Err(FetchError::Allocation);
            }
        };
        buf.extend_from_slice(readings);

        *entry = SiteCacheEntry {
            has_data: true,
            readings: buf,
            display_time: display_time.to_string(),
            display_date: display_date.to_string(),
        };
        info!("Cache: stored {} readings for site {}", readings.len(), site);
        Ok(SaveOutcome::Stored(readings.len()))
    }

    pub fn clear(&mut self, site: usize) {
        if let Some(entry) = self.entries.get_mut(site) {
            *entry = SiteCacheEntry::default();
        }
    }

    pub fn clear_all(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = SiteCacheEntry::default());
    }
}
