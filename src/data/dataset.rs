use std::str::FromStr;
use std::sync::Mutex;

use burn::config::Config;
use burn::data::dataset::Dataset;
use burn::tensor::{backend::Backend, Tensor};
use rand::prelude::*;
use tracing::{debug, info, warn};

use super::batchitem::BatchItem;
use super::frequency::{FrequencyInference, NoFrequency};
use super::mask::default_mask;
use super::packer::PackedPanel;
use super::panel::{normalize, Panel, PanelTables};
use super::sampling::{samplable_series, SamplingPolicy};
use super::selection::SeriesSelection;
use super::windows::{extract, WindowSpec, Windows};
use super::frame::{DS, UNIQUE_ID, Y};
use crate::error::{DatasetError, Result as DatasetResult};

/// How windows are cut from the packed panel.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum WindowMode {
    /// `input_size + output_size` wide windows over the zero padded history.
    Simple,
    /// `len_sample_chunks` wide windows, no padding.
    Full,
}

impl FromStr for WindowMode {
    type Err = DatasetError;

    fn from_str(mode: &str) -> DatasetResult<Self> {
        match mode {
            "simple" => Ok(WindowMode::Simple),
            "full" => Ok(WindowMode::Full),
            other => Err(DatasetError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Config, Debug)]
pub struct TimeSeriesDatasetConfig {
    /// Size of the input segment of a window.
    pub input_size: usize,
    /// Forecast horizon, size of the output segment of a window.
    pub output_size: usize,
    /// Trailing timestamps per series held out by the default mask.
    #[config(default = 0)]
    pub ds_in_test: usize,
    /// Default mask samples only the held out timestamps.
    #[config(default = false)]
    pub is_test: bool,
    /// Most recent timestamps considered for windows, including the output segment.
    #[config(default = 20)]
    pub window_sampling_limit: usize,
    /// Stride between consecutive windows.
    #[config(default = 1)]
    pub idx_to_sample_freq: usize,
    #[config(default = false)]
    pub complete_inputs: bool,
    #[config(default = true)]
    pub complete_outputs: bool,
    /// Window width in full mode, defaults to `input_size + output_size`.
    #[config(default = "None")]
    pub len_sample_chunks: Option<usize>,
    /// Exogenous columns known in the future.
    #[config(default = "None")]
    pub f_cols: Option<Vec<String>>,
    #[config(default = "WindowMode::Simple")]
    pub mode: WindowMode,
    /// Replace non samplable selections with random samplable series.
    #[config(default = false)]
    pub skip_nonsamplable: bool,
    /// Keep only the most recent samplable window of each series.
    #[config(default = false)]
    pub last_samplable_window: bool,
    #[config(default = 100)]
    pub max_resample_retries: usize,
    #[config(default = 42)]
    pub seed: u64,
}

impl TimeSeriesDatasetConfig {
    pub fn init<B: Backend>(&self, tables: PanelTables) -> DatasetResult<TimeSeriesDataset<B>> {
        self.init_with_frequency(tables, &NoFrequency)
    }

    /// Builds the dataset, `frequency` labels the first series' timestamps.
    pub fn init_with_frequency<B: Backend, F: FrequencyInference>(
        &self,
        tables: PanelTables,
        frequency: &F,
    ) -> DatasetResult<TimeSeriesDataset<B>> {
        self.check()?;
        tables.target.validate("target", &[UNIQUE_ID, DS, Y])?;

        let PanelTables {
            target,
            exogenous,
            statics,
            mask,
        } = tables;
        let mask = match mask {
            Some(mask) => mask,
            None => default_mask(&target, self.ds_in_test, self.is_test)?,
        };
        let panel = normalize(&target, exogenous.as_ref(), statics.as_ref(), &mask)?;
        log_split(&panel);

        let window_size = self.window_size();
        if window_size > self.window_sampling_limit {
            return Err(DatasetError::WindowSamplingLimit {
                limit: self.window_sampling_limit,
                window_size,
            });
        }

        let f_idxs = self.future_indices(&panel)?;
        let packed = PackedPanel::<B>::new(&panel);
        let max_len = packed.max_len();

        let padding = match self.mode {
            WindowMode::Simple => (self.input_size, self.output_size),
            WindowMode::Full => (0, 0),
        };
        let spec = WindowSpec {
            size: window_size,
            stride: self.idx_to_sample_freq,
            padding,
            first_ds: max_len.saturating_sub(self.window_sampling_limit),
        };
        let policy = SamplingPolicy {
            output_size: self.output_size,
            complete_inputs: self.complete_inputs,
            complete_outputs: self.complete_outputs,
        };

        let min_mask = if self.complete_inputs {
            window_size
        } else {
            self.output_size
        };
        let samplable = samplable_series(&packed.tensor, min_mask);
        let frequency = panel
            .series
            .first()
            .and_then(|s| frequency.infer(&s.timestamps));

        info!(
            n_series = panel.series.len(),
            max_len,
            n_channels = panel.n_channels(),
            n_samplable = samplable.len(),
            window_size,
            mode = ?self.mode,
            "time series dataset ready"
        );

        let Panel {
            series,
            temporal_columns,
            static_columns,
        } = panel;

        Ok(TimeSeriesDataset {
            packed,
            series_ids: series.iter().map(|s| s.unique_id.clone()).collect(),
            timestamps: series.into_iter().map(|s| s.timestamps).collect(),
            n_x: temporal_columns.len() - 3,
            n_s: static_columns.len(),
            temporal_columns,
            static_columns,
            frequency,
            f_idxs,
            spec,
            policy,
            skip_nonsamplable: self.skip_nonsamplable,
            last_samplable_window: self.last_samplable_window,
            max_resample_retries: self.max_resample_retries,
            samplable,
            rng: Mutex::new(StdRng::seed_from_u64(self.seed)),
        })
    }

    /// Effective window width for the configured mode.
    pub fn window_size(&self) -> usize {
        match self.mode {
            WindowMode::Simple => self.input_size + self.output_size,
            WindowMode::Full => self
                .len_sample_chunks
                .unwrap_or(self.input_size + self.output_size),
        }
    }

    fn check(&self) -> DatasetResult<()> {
        for (name, value) in [
            ("input_size", self.input_size),
            ("output_size", self.output_size),
            ("idx_to_sample_freq", self.idx_to_sample_freq),
        ] {
            if value == 0 {
                return Err(DatasetError::InvalidConfig {
                    name,
                    reason: "must be greater than 0".to_string(),
                });
            }
        }

        if let Some(len_sample_chunks) = self.len_sample_chunks {
            let required = self.input_size + self.output_size;
            if len_sample_chunks < required {
                return Err(DatasetError::SampleChunks {
                    len_sample_chunks,
                    required,
                });
            }
        }

        Ok(())
    }

    fn future_indices(&self, panel: &Panel) -> DatasetResult<Vec<usize>> {
        let Some(f_cols) = self.f_cols.as_ref() else {
            return Ok(Vec::new());
        };
        let exogenous = &panel.temporal_columns[1..panel.n_channels() - 2];

        let missing: Vec<&str> = f_cols
            .iter()
            .filter(|col| !exogenous.contains(*col))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(DatasetError::UnknownFutureColumns(missing.join(", ")));
        }

        Ok(f_cols
            .iter()
            .filter_map(|col| panel.temporal_columns.iter().position(|c| c == col))
            .collect())
    }
}

fn log_split(panel: &Panel) {
    let n_channels = panel.n_channels();
    let (mut n_ds, mut n_avl, mut n_ins) = (0usize, 0usize, 0usize);
    for row in panel.series.iter().flat_map(|s| s.values.chunks(n_channels)) {
        n_ds += 1;
        n_avl += (row[n_channels - 2] > 0.0) as usize;
        n_ins += (row[n_channels - 1] > 0.0) as usize;
    }
    debug!(
        n_ds,
        n_avl,
        n_ins,
        n_out = n_ds - n_ins,
        "train validation splits"
    );
}

/// Panel of time series sampled as fixed size windows.
///
/// The packed tensor is built once. Every call to [`TimeSeriesDataset::get`]
/// cuts fresh windows, filters them by the sampling policy and splits them
/// into a [`BatchItem`].
#[derive(Debug)]
pub struct TimeSeriesDataset<B: Backend> {
    packed: PackedPanel<B>,
    series_ids: Vec<String>,
    timestamps: Vec<Vec<i64>>,
    temporal_columns: Vec<String>,
    static_columns: Vec<String>,
    n_x: usize,
    n_s: usize,
    frequency: Option<String>,
    f_idxs: Vec<usize>,
    spec: WindowSpec,
    policy: SamplingPolicy,
    skip_nonsamplable: bool,
    last_samplable_window: bool,
    max_resample_retries: usize,
    samplable: Vec<usize>,
    rng: Mutex<StdRng>,
}

impl<B: Backend> TimeSeriesDataset<B> {
    /// Batch of the samplable windows of the selected series.
    pub fn get(&self, selection: impl Into<SeriesSelection>) -> DatasetResult<BatchItem<B>> {
        let mut series = selection.into().resolve(self.len())?;
        let mut retries = 0;

        loop {
            if let Some(windows) = self.samplable_windows(&series) {
                return Ok(BatchItem::from_windows(windows));
            }

            if !self.skip_nonsamplable {
                return Err(DatasetError::NonSamplable(series));
            }
            if self.samplable.is_empty() {
                return Err(DatasetError::NoSamplableSeries);
            }
            if retries == self.max_resample_retries {
                return Err(DatasetError::ExhaustedRetries { retries });
            }

            retries += 1;
            warn!(?series, retries, "selection is not samplable, resampling");
            series = self.resample(series.len());
        }
    }

    /// Every window of the selected series, before filtering.
    pub fn windows(&self, selection: impl Into<SeriesSelection>) -> DatasetResult<Option<Windows<B>>> {
        let series = selection.into().resolve(self.len())?;
        Ok(extract(&self.packed, &series, &self.spec))
    }

    fn samplable_windows(&self, series: &[usize]) -> Option<Windows<B>> {
        let windows = extract(&self.packed, series, &self.spec)?;
        let positions = self.policy.samplable_windows(&windows.tensor);
        if positions.is_empty() {
            return None;
        }

        let windows = windows.select(&positions);
        if !self.last_samplable_window {
            return Some(windows);
        }
        let last = windows.last_per_series();
        Some(windows.select(&last))
    }

    fn resample(&self, n: usize) -> Vec<usize> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (0..n)
            .map(|_| self.samplable[rng.gen_range(0..self.samplable.len())])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.series_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series_ids.is_empty()
    }

    pub fn n_series(&self) -> usize {
        self.len()
    }

    pub fn max_len(&self) -> usize {
        self.packed.max_len()
    }

    pub fn n_channels(&self) -> usize {
        self.packed.n_channels()
    }

    /// Number of exogenous and static variables.
    pub fn n_variables(&self) -> (usize, usize) {
        (self.n_x, self.n_s)
    }

    pub fn frequency(&self) -> Option<&str> {
        self.frequency.as_deref()
    }

    pub fn temporal_columns(&self) -> &[String] {
        &self.temporal_columns
    }

    pub fn static_columns(&self) -> &[String] {
        &self.static_columns
    }

    pub fn future_exogenous_indices(&self) -> &[usize] {
        &self.f_idxs
    }

    pub fn series_ids(&self) -> &[String] {
        &self.series_ids
    }

    pub fn series_timestamps(&self, index: usize) -> Option<&[i64]> {
        self.timestamps.get(index).map(Vec::as_slice)
    }

    pub fn series_lengths(&self) -> &[usize] {
        &self.packed.lengths
    }

    /// Series with enough sampleable timestamps to be drawn when resampling.
    pub fn samplable_series(&self) -> &[usize] {
        &self.samplable
    }

    pub fn window_spec(&self) -> &WindowSpec {
        &self.spec
    }

    pub fn sampling_policy(&self) -> &SamplingPolicy {
        &self.policy
    }

    pub fn packed(&self) -> &Tensor<B, 3> {
        &self.packed.tensor
    }

    pub fn static_matrix(&self) -> Option<&Tensor<B, 2>> {
        self.packed.statics.as_ref()
    }
}

/// Item `index` is the batch of series `index`, `None` when it is not samplable.
impl<B: Backend> Dataset<BatchItem<B>> for TimeSeriesDataset<B> {
    fn get(&self, index: usize) -> Option<BatchItem<B>> {
        TimeSeriesDataset::get(self, index).ok()
    }

    fn len(&self) -> usize {
        TimeSeriesDataset::len(self)
    }
}
