//! Ekman - an interactive terminal explorer for labeled multi-dimensional datasets.
//!
//! Ekman loads a dataset (named dimensions, coordinates and data variables)
//! and builds a dashboard of linked controls around it: a variable picker,
//! axis and per-dimension disposition selectors, style and projection
//! options. Plotting renders a 2-D slice of the selected variable, with
//! index selectors or players for the remaining dimensions, and tapping
//! the plot extracts a series along a chosen dimension.
//!
//! Controls talk to each other through a small named-signal bus
//! ([`sigslot::SigSlot`]); the whole user intent at any time is captured by
//! [`Kwargs`].
//!
//! # Features
//!
//! - NetCDF reading with CF-style axis guessing
//! - Aggregation (mean, max, min, median, std, count) over any dimension
//! - Animated players and index selectors for remaining dimensions
//! - Optional geographic projection settings
//! - Gruvbox color themes and clipboard export of the current settings
//!
//! # Example
//!
//! ```ignore
//! use ekman::{Dashboard, DataReader};
//! use std::path::Path;
//!
//! let data = DataReader::read_file(Path::new("data.nc"))?;
//! let mut dashboard = Dashboard::new(data)?;
//! dashboard.select_variable("temp");
//! dashboard.plot()?;
//! println!("{}", dashboard.kwargs().to_json()?);
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod app;
pub mod clipboard;
pub mod colormaps;
pub mod config;
pub mod control;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod guess;
pub mod render;
pub mod sigslot;
pub mod ui;
pub mod widget;

pub use config::InitialParams;
pub use control::Kwargs;
pub use dashboard::{Dashboard, DashboardBuilder};
pub use data::{DataReader, Dataset, Variable};
pub use error::{EkmanError, Result};
pub use sigslot::{Observer, SigSlot};
pub use widget::Value;
