//! Windowed sampling of panel time series.
//!
//! A [`TimeSeriesDataset`] packs every series of a panel into one left padded
//! `[series, channel, time]` tensor and serves batches of rolling windows that
//! pass the sampling mask rules.

pub mod data;
pub mod error;
pub mod utils;

pub use data::{
    BatchItem, Column, Frame, FrequencyInference, PanelTables, SeriesSelection,
    TimeSeriesDataset, TimeSeriesDatasetConfig, WindowMode,
};
pub use error::{DatasetError, Result};
