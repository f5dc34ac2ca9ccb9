//! Event store ports and the command-layer facade.

pub mod ports;
pub mod service;

pub use service::EventService;
