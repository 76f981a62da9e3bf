pub mod batchitem;
pub mod dataset;
pub mod frame;
pub mod frequency;
pub mod mask;
pub mod packer;
pub mod panel;
pub mod sampling;
pub mod selection;
pub mod windows;

pub use batchitem::BatchItem;
pub use dataset::{TimeSeriesDataset, TimeSeriesDatasetConfig, WindowMode};
pub use frame::{Column, Frame};
pub use frequency::{FrequencyInference, NoFrequency};
pub use mask::default_mask;
pub use panel::PanelTables;
pub use selection::SeriesSelection;
