//! Console frontend for StefanPOS
//!
//! Reads commands line by line, renders the tables as text and asks
//! confirmations as y/n prompts.

pub mod app_main;
pub mod command;
pub mod config;
pub mod launcher;
pub mod prompt;
pub mod render;

pub use app_main::ConsoleApp;
pub use config::LaunchConfig;
pub use launcher::run_app;
