#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod answer;
pub mod config;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod retrieval;
pub mod scrape;
pub mod sessions;

pub use config::Config;
pub use error::{Result, SiteChatError};
