use burn::tensor::{backend::Backend, Tensor};

use super::panel::Panel;
use crate::utils::float_tensor;

/// Dense, left padded representation of a panel.
#[derive(Clone, Debug)]
pub struct PackedPanel<B: Backend> {
    pub tensor: Tensor<B, 3>,          // [S, C, T]
    pub statics: Option<Tensor<B, 2>>, // [S, D_s]
    pub lengths: Vec<usize>,           // [S]
}

impl<B: Backend> PackedPanel<B> {
    /// Packs every series right aligned in a zero tensor of width `max_len`.
    pub fn new(panel: &Panel) -> Self {
        let n_series = panel.series.len();
        let n_channels = panel.n_channels();
        let max_len = panel.max_len();

        let mut values = vec![0.0f32; n_series * n_channels * max_len];
        for (i, series) in panel.series.iter().enumerate() {
            let offset = max_len - series.len();
            for (t, row) in series.values.chunks(n_channels).enumerate() {
                for (c, value) in row.iter().enumerate() {
                    values[(i * n_channels + c) * max_len + offset + t] = *value;
                }
            }
        }
        let tensor = float_tensor(values, [n_series, n_channels, max_len]);

        let n_static = panel.static_columns.len();
        let statics = (n_static > 0).then(|| {
            let values = panel
                .series
                .iter()
                .flat_map(|s| s.statics.iter().copied())
                .collect();
            float_tensor(values, [n_series, n_static])
        });

        Self {
            tensor,
            statics,
            lengths: panel.series.iter().map(|s| s.len()).collect(),
        }
    }

    pub fn n_series(&self) -> usize {
        self.tensor.dims()[0]
    }

    pub fn n_channels(&self) -> usize {
        self.tensor.dims()[1]
    }

    pub fn max_len(&self) -> usize {
        self.tensor.dims()[2]
    }
}
