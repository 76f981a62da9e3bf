use burn::tensor::{backend::Backend, Data, Int, Shape, Tensor};

pub fn float_tensor<B: Backend, const D: usize>(values: Vec<f32>, dims: [usize; D]) -> Tensor<B, D> {
    let data = Data::new(values, Shape { dims });
    Tensor::from_data(data.convert())
}

pub fn index_tensor<B: Backend>(indices: &[usize]) -> Tensor<B, 1, Int> {
    let data = Data::new(
        indices.iter().map(|i| *i as i64).collect::<Vec<i64>>(),
        Shape {
            dims: [indices.len()],
        },
    );
    Tensor::from_data(data.convert())
}

pub fn float_values<B: Backend, const D: usize>(x: Tensor<B, D>) -> Vec<f32> {
    x.into_data().convert::<f32>().value
}

pub fn int_values<B: Backend>(x: Tensor<B, 1, Int>) -> Vec<i64> {
    x.into_data().convert::<i64>().value
}

/// Zero pads the last (time) dimension of a `[N, C, T]` tensor.
pub fn pad_time<B: Backend>(x: Tensor<B, 3>, padding: (usize, usize)) -> Tensor<B, 3> {
    let (left, right) = padding;
    if left == 0 && right == 0 {
        return x;
    }

    let [n, c, _] = x.dims();
    let mut parts: Vec<Tensor<B, 3>> = Vec::with_capacity(3);
    if left > 0 {
        parts.push(Tensor::zeros([n, c, left]));
    }
    parts.push(x);
    if right > 0 {
        parts.push(Tensor::zeros([n, c, right]));
    }

    Tensor::cat(parts, 2)
}

/// Slices channels `channels` of a `[N, C, T]` tensor, `None` when the range is empty.
pub fn channels<B: Backend>(x: Tensor<B, 3>, channels: std::ops::Range<usize>) -> Option<Tensor<B, 3>> {
    if channels.is_empty() {
        return None;
    }
    let [n, _, t] = x.dims();
    Some(x.slice([0..n, channels, 0..t]))
}

/// Single channel of a `[N, C, T]` tensor as `[N, T]`.
pub fn channel<B: Backend>(x: Tensor<B, 3>, channel: usize) -> Tensor<B, 2> {
    let [n, _, t] = x.dims();
    x.slice([0..n, channel..channel + 1, 0..t]).reshape([n, t])
}
