//! E-paper dashboard for remote environmental sites.
//!
//! The portable core (aggregation, graph rendering, cache, controller)
//! builds on any host. Board support is only compiled for ESP-IDF.

pub mod aggregate;
pub mod cache;
pub mod canvas;
pub mod clock;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod graph;
pub mod platform;
pub mod site;

#[cfg(target_os = "espidf")]
pub mod board;
#[cfg(target_os = "espidf")]
pub mod buttons;
#[cfg(target_os = "espidf")]
pub mod epd;
#[cfg(target_os = "espidf")]
pub mod http_client;
#[cfg(target_os = "espidf")]
pub mod nvs_store;
#[cfg(target_os = "espidf")]
pub mod time_sync;
#[cfg(target_os = "espidf")]
pub mod wifi;
