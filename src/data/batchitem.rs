use burn::tensor::{backend::Backend, Int, Tensor};

use super::windows::Windows;
use crate::utils::{channel, channels, index_tensor};

#[derive(Clone, Debug)]
pub struct BatchItem<B: Backend> {
    pub static_features: Option<Tensor<B, 2>>, // [N, D_s]
    pub target: Tensor<B, 2>,                  // [N, W]
    pub exogenous: Option<Tensor<B, 3>>,       // [N, D_x, W]
    pub available_mask: Tensor<B, 2>,          // [N, W]
    pub sample_mask: Tensor<B, 2>,             // [N, W]
    pub series_idx: Tensor<B, 1, Int>,         // [N]
}

impl<B: Backend> BatchItem<B> {
    /// Splits the channels of the windows into the batch fields.
    ///
    /// Channel 0 is the target, the last two channels are the availability
    /// and sample masks, everything in between is exogenous.
    pub fn from_windows(windows: Windows<B>) -> Self {
        let [_, n_channels, _] = windows.tensor.dims();
        let series_idx = index_tensor(&windows.series);

        Self {
            static_features: windows.statics,
            target: channel(windows.tensor.clone(), 0),
            exogenous: channels(windows.tensor.clone(), 1..n_channels - 2),
            available_mask: channel(windows.tensor.clone(), n_channels - 2),
            sample_mask: channel(windows.tensor, n_channels - 1),
            series_idx,
        }
    }

    pub fn len(&self) -> usize {
        self.target.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
