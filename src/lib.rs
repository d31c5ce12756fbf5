#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod config;
pub mod control;
pub mod metrics;
pub use app::MonitorApp;
