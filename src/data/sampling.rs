use std::ops::Range;

use burn::tensor::{backend::Backend, Tensor};

use crate::utils::float_values;

/// Mask completeness rules a window must meet to be sampled.
///
/// The output segment is the last `output_size` steps of a window and the
/// input segment everything before it. The availability and sample masks
/// are the last two channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPolicy {
    pub output_size: usize,
    pub complete_inputs: bool,
    pub complete_outputs: bool,
}

impl SamplingPolicy {
    /// Positions of the windows of a `[N, C, W]` tensor that can be sampled, ascending.
    pub fn samplable_windows<B: Backend>(&self, windows: &Tensor<B, 3>) -> Vec<usize> {
        let [n, c, w] = windows.dims();
        if n == 0 {
            return Vec::new();
        }
        let available = c - 2;
        let sample = c - 1;
        let output = w.saturating_sub(self.output_size);

        let sample_condition = all_ones(windows, sample, output..w);
        let input_condition = if self.complete_inputs {
            all_ones(windows, available, 0..output)
        } else {
            sample_condition.clone()
        };
        // One step before the output segment must be observed as well.
        let output_condition = if self.complete_outputs {
            all_ones(windows, available, output.saturating_sub(1)..w)
        } else {
            sample_condition.clone()
        };

        let samplable = sample_condition * input_condition * output_condition;
        float_values(samplable)
            .iter()
            .enumerate()
            .filter(|(_, v)| **v > 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

/// `1.0` for every window whose `channel` is all ones over `steps`, else `0.0`.
fn all_ones<B: Backend>(windows: &Tensor<B, 3>, channel: usize, steps: Range<usize>) -> Tensor<B, 1> {
    let [n, _, _] = windows.dims();
    if steps.is_empty() {
        return Tensor::ones([n]);
    }
    let expected = steps.len() as f32;
    windows
        .clone()
        .slice([0..n, channel..channel + 1, steps])
        .sum_dim(2)
        .equal_elem(expected)
        .float()
        .reshape([n])
}

/// Series whose total sample mask count exceeds `min_mask`.
///
/// A cheap screen over the whole history of each packed series, it does not
/// guarantee a samplable window.
pub fn samplable_series<B: Backend>(packed: &Tensor<B, 3>, min_mask: usize) -> Vec<usize> {
    let [n, c, t] = packed.dims();
    if n == 0 || t == 0 {
        return Vec::new();
    }
    let counts: Tensor<B, 1> = packed
        .clone()
        .slice([0..n, c - 1..c, 0..t])
        .sum_dim(2)
        .reshape([n]);

    float_values(counts)
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > min_mask as f32)
        .map(|(i, _)| i)
        .collect()
}
