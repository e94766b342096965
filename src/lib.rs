pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod games;
pub mod input;
pub mod scores;
pub mod server;
pub mod ui;
