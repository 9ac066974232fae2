pub mod calendar;
pub mod config;
pub mod error;
pub mod events;
pub mod meals;
pub mod overview;
pub mod provider;
pub mod tracker;
pub mod ui;

pub use error::{Error, ErrorKind, Result};
