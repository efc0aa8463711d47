//! Danmaku Relay - live room event listener and fan-out.
//!
//! Listens to one upstream live room at a time, normalizes its chat, gift,
//! paid message and membership events, broadcasts them to every subscribed
//! viewer and records a write-through history.

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
