//! Data reading and representation.
//!
//! This module holds the in-memory dataset model the dashboard explores
//! and the NetCDF reader that produces it.

mod array;
mod dataset;
mod reader;

pub use array::{DataArray, Reduction};
pub use dataset::{nearest, Dataset, Variable};
pub use reader::DataReader;
