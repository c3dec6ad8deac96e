pub mod aggregate;
pub mod browser;
pub mod catalog;
pub mod config;
pub mod credentials;
pub mod error;
pub mod model;
pub mod output;
pub mod ranking;
pub mod scoring;
pub mod session;
pub mod stderr_buffer;
pub mod store;
pub mod tui;
