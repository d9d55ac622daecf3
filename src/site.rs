use log::{debug, info};
use serde::Deserialize;

use crate::error::FetchError;

/// Historical window bound: 24 hours at 5-minute intervals.
pub const MAX_READINGS: usize = 288;

// ── Data types ──────────────────────────────────────────────────────

/// One sample from a site. Field names on the wire follow the data
/// source (`dt`, `water_temp`, `voltage`, `counter`).
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Reading {
    #[serde(rename = "dt")]
    pub timestamp: i64,
    #[serde(rename = "timestamp", default)]
    pub display_time: String,
    pub temperature: f32,
    #[serde(rename = "water_temp")]
    pub secondary_temperature: f32,
    pub pressure: f32,
    #[serde(rename = "voltage")]
    pub supply_voltage: f32,
    #[serde(rename = "counter", default)]
    pub sequence_counter: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    #[default]
    Air,
    Drip,
}

impl SiteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SiteKind::Air => "air",
            SiteKind::Drip => "drip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SiteMeta {
    pub name: String,
    pub kind: SiteKind,
    pub active: bool,
    pub tz_offset: i64,
    pub query_time: i64,
}

// ── Wire record ─────────────────────────────────────────────────────

/// Record returned by the data source for one site.
///
/// `readings` arrive **newest first**. Nothing downstream accepts that
/// order: call [`SiteReport::into_parts`] to get the oldest-first series
/// the aggregator and graph renderer require.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteReport {
    pub site_name: String,
    #[serde(default)]
    pub site_type: SiteKind,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub timezone_offset: i64,
    #[serde(default)]
    pub query_time: i64,
    #[serde(default)]
    pub current: Option<Reading>,
    #[serde(default)]
    pub readings: Vec<Reading>,
}

impl SiteReport {
    /// Parse a response body. Either the whole record parses or nothing is
    /// returned; a half-filled reading never escapes.
    pub fn parse(body: &str) -> Result<SiteReport, FetchError> {
        let report: SiteReport = serde_json::from_str(body)?;
        debug!(
            "Parsed site {} ({}) with {} readings",
            report.site_name,
            report.site_type.as_str(),
            report.readings.len()
        );
        Ok(report)
    }

    /// Split into metadata, the latest reading and the history, keeping at
    /// most [`MAX_READINGS`] of the newest samples and reversing them to
    /// oldest-first.
    pub fn into_parts(self) -> (SiteMeta, Option<Reading>, Vec<Reading>) {
        let meta = SiteMeta {
            name: self.site_name,
            kind: self.site_type,
            active: self.active,
            tz_offset: self.timezone_offset,
            query_time: self.query_time,
        };

        let mut readings = self.readings;
        readings.truncate(MAX_READINGS);
        readings.reverse();

        if let Some(cur) = &self.current {
            info!(
                "Site: {} | Readings: {} | Current: {:.1}C",
                meta.name,
                readings.len(),
                cur.temperature
            );
        }

        (meta, self.current, readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "site_name": "Likir",
        "site_type": "drip",
        "active": true,
        "timezone_offset": 19800,
        "query_time": 1732350000,
        "current": {"dt": 300, "timestamp": "00:05", "temperature": 3.5,
                    "water_temp": 1.0, "pressure": 0.8, "voltage": 3.9, "counter": 7},
        "readings": [
            {"dt": 300, "timestamp": "00:05", "temperature": 3.5,
             "water_temp": 1.0, "pressure": 0.8, "voltage": 3.9, "counter": 7},
            {"dt": 0, "timestamp": "00:00", "temperature": 2.5,
             "water_temp": 0.5, "pressure": 0.7, "voltage": 3.8, "counter": 6}
        ]
    }"#;

    #[test]
    fn parses_wire_field_names() {
        let report = SiteReport::parse(BODY).unwrap();
        assert_eq!(report.site_name, "Likir");
        assert_eq!(report.site_type, SiteKind::Drip);
        let cur = report.current.as_ref().unwrap();
        assert_eq!(cur.timestamp, 300);
        assert_eq!(cur.display_time, "00:05");
        assert_eq!(cur.secondary_temperature, 1.0);
        assert_eq!(cur.supply_voltage, 3.9);
        assert_eq!(cur.sequence_counter, 7);
    }

    #[test]
    fn into_parts_returns_oldest_first() {
        let (meta, _, readings) = SiteReport::parse(BODY).unwrap().into_parts();
        assert_eq!(meta.tz_offset, 19800);
        assert!(meta.active);
        assert_eq!(readings[0].timestamp, 0);
        assert_eq!(readings[1].timestamp, 300);
    }

    #[test]
    fn keeps_only_the_newest_window() {
        let readings = (0..(MAX_READINGS as i64 + 10))
            .rev()
            .map(|t| Reading { timestamp: t, ..Default::default() })
            .collect();
        let report = SiteReport {
            site_name: "Tuna".into(),
            site_type: SiteKind::Air,
            active: true,
            timezone_offset: 0,
            query_time: 0,
            current: None,
            readings,
        };
        let (_, _, readings) = report.into_parts();
        assert_eq!(readings.len(), MAX_READINGS);
        assert_eq!(readings.first().unwrap().timestamp, 10);
        assert_eq!(readings.last().unwrap().timestamp, MAX_READINGS as i64 + 9);
    }

    #[test]
    fn missing_required_reading_field_is_malformed() {
        let body = r#"{"site_name": "Igoo", "readings": [{"dt": 1, "temperature": 1.0}]}"#;
        assert!(matches!(SiteReport::parse(body), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn unknown_site_type_is_malformed() {
        let body = r#"{"site_name": "Igoo", "site_type": "soil"}"#;
        assert!(SiteReport::parse(body).is_err());
    }

    #[test]
    fn metadata_defaults_when_absent() {
        let report = SiteReport::parse(r#"{"site_name": "Ayee"}"#).unwrap();
        assert_eq!(report.site_type, SiteKind::Air);
        assert!(report.readings.is_empty());
        assert!(report.current.is_none());
    }
}
