//! Core library for the assistant tools.
//!
//! This crate defines:
//! - The clock tool (`current_time`)
//! - The weather lookup pipeline (Nominatim geocoding, then Open-Meteo forecast)
//! - Tool descriptors and tool-call dispatch for assistants
//! - Configuration of endpoints and client label
//!
//! It is used by `tools-cli`, but can also be embedded in other assistants.

pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod tool;

pub use clock::current_time;
pub use config::Config;
pub use error::ToolError;
pub use model::{Coordinates, WeatherLookup, WeatherResult};
pub use provider::{OpenMeteoProvider, WeatherProvider, get_weather, provider_from_config};
pub use tool::{Tool, ToolBox, ToolCall, builtin_tools};
