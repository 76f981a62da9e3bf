use std::collections::HashMap;

use burn::tensor::{backend::Backend, Tensor};
use tracing::debug;

use super::packer::PackedPanel;
use crate::utils::{index_tensor, pad_time};

/// Geometry of the rolling windows taken from a packed panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub size: usize,
    pub stride: usize,
    /// Zeros added before and after the time axis.
    pub padding: (usize, usize),
    /// Leading columns of the packed tensor that are never windowed.
    pub first_ds: usize,
}

impl WindowSpec {
    pub fn padded_len(&self, max_len: usize) -> usize {
        max_len.saturating_sub(self.first_ds) + self.padding.0 + self.padding.1
    }

    pub fn windows_per_series(&self, max_len: usize) -> usize {
        let padded = self.padded_len(max_len);
        if padded < self.size || self.stride == 0 {
            return 0;
        }
        (padded - self.size) / self.stride + 1
    }
}

/// Windows of a selection of series, ordered by series then time.
#[derive(Clone, Debug)]
pub struct Windows<B: Backend> {
    pub tensor: Tensor<B, 3>,          // [N, C, W]
    pub statics: Option<Tensor<B, 2>>, // [N, D_s]
    pub series: Vec<usize>,            // [N]
}

impl<B: Backend> Windows<B> {
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Keeps the windows at `positions`, in that order.
    pub fn select(self, positions: &[usize]) -> Self {
        let indices = index_tensor::<B>(positions);
        Self {
            tensor: self.tensor.select(0, indices.clone()),
            statics: self.statics.map(|s| s.select(0, indices)),
            series: positions.iter().map(|p| self.series[*p]).collect(),
        }
    }

    /// Positions of the last window of every distinct series, in extraction order.
    pub fn last_per_series(&self) -> Vec<usize> {
        let mut last = HashMap::with_capacity(self.series.len());
        for (pos, series) in self.series.iter().enumerate() {
            last.insert(*series, pos);
        }
        let mut positions: Vec<usize> = last.into_values().collect();
        positions.sort_unstable();
        positions
    }
}

/// Rolling windows of `spec.size` every `spec.stride` steps for `series`.
///
/// Returns `None` when the selection is empty or the padded history is
/// shorter than a window.
pub fn extract<B: Backend>(
    packed: &PackedPanel<B>,
    series: &[usize],
    spec: &WindowSpec,
) -> Option<Windows<B>> {
    let [_, n_channels, max_len] = packed.tensor.dims();
    let per_series = spec.windows_per_series(max_len);
    if series.is_empty() || per_series == 0 {
        return None;
    }

    let n = series.len();
    let tensor = packed
        .tensor
        .clone()
        .select(0, index_tensor(series))
        .slice([0..n, 0..n_channels, spec.first_ds..max_len]);
    let tensor = pad_time(tensor, spec.padding);

    // Time offsets of every window, gathered in one pass then unfolded.
    let offsets: Vec<usize> = (0..per_series)
        .flat_map(|w| (0..spec.size).map(move |k| w * spec.stride + k))
        .collect();
    let tensor: Tensor<B, 3> = tensor
        .select(2, index_tensor(&offsets))
        .reshape([n, n_channels, per_series, spec.size])
        .swap_dims(1, 2)
        .reshape([n * per_series, n_channels, spec.size]);

    let owners: Vec<usize> = series
        .iter()
        .flat_map(|s| std::iter::repeat(*s).take(per_series))
        .collect();
    let statics = packed
        .statics
        .as_ref()
        .map(|s| s.clone().select(0, index_tensor(&owners)));

    debug!(series = n, windows = owners.len(), "extracted windows");

    Some(Windows {
        tensor,
        statics,
        series: owners,
    })
}
