use tracing::debug;

use super::frame::{Frame, AVAILABLE_MASK, DS, SAMPLE_MASK, UNIQUE_ID};
use crate::error::Result;

/// Builds the default mask for a target table.
///
/// Every timestamp is available. The last `ds_in_test` timestamps of each
/// series are held out of sampling, or are the only sampled ones when
/// `is_test` is set. Rows keep the target table order.
pub fn default_mask(target: &Frame, ds_in_test: usize, is_test: bool) -> Result<Frame> {
    target.validate("target", &[UNIQUE_ID, DS])?;
    let ids = target.ids("target")?;
    let ds = target.timestamps("target")?;
    let order = target.sorted_order("target")?;

    let mut sample_mask = vec![1.0f32; ids.len()];
    let mut start = 0;
    while start < order.len() {
        let id = &ids[order[start]];
        let end = start + order[start..].iter().take_while(|i| &ids[**i] == id).count();
        let held_out = ds_in_test.min(end - start);
        for row in order[end - held_out..end].iter() {
            sample_mask[*row] = 0.0;
        }
        start = end;
    }

    if is_test {
        sample_mask.iter_mut().for_each(|v| *v = 1.0 - *v);
    }

    debug!(rows = sample_mask.len(), ds_in_test, is_test, "built default mask");

    Ok(Frame::new()
        .with_column(UNIQUE_ID, ids.to_vec())
        .with_column(DS, ds.to_vec())
        .with_column(AVAILABLE_MASK, vec![1.0f32; ids.len()])
        .with_column(SAMPLE_MASK, sample_mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::Y;
    use crate::error::DatasetError;

    fn target() -> Frame {
        // Series "a" has 4 rows, "b" has 2, rows are shuffled.
        Frame::new()
            .with_column(UNIQUE_ID, vec!["a", "b", "a", "a", "b", "a"])
            .with_column(DS, vec![3i64, 2, 1, 4, 1, 2])
            .with_column(Y, vec![0.0f32; 6])
    }

    #[test]
    fn holds_out_tail_per_series() {
        let mask = default_mask(&target(), 2, false).unwrap();
        let sample = mask.values("mask", SAMPLE_MASK).unwrap();
        // a: ds 3 and 4 held out, b: both rows held out.
        assert_eq!(sample, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mask.values("mask", AVAILABLE_MASK).unwrap(), vec![1.0; 6]);
        assert_eq!(mask.ids("mask").unwrap(), target().ids("t").unwrap());
    }

    #[test]
    fn test_mode_inverts_sample_mask() {
        let mask = default_mask(&target(), 1, true).unwrap();
        let sample = mask.values("mask", SAMPLE_MASK).unwrap();
        assert_eq!(sample, vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn tail_count_is_capped_by_series_length() {
        for k in 0..6 {
            let mask = default_mask(&target(), k, false).unwrap();
            let sample = mask.values("mask", SAMPLE_MASK).unwrap();
            let ids = mask.ids("mask").unwrap();
            for (id, len) in [("a", 4usize), ("b", 2)] {
                let zeros = ids
                    .iter()
                    .zip(sample.iter())
                    .filter(|(i, s)| *i == id && **s == 0.0)
                    .count();
                assert_eq!(zeros, k.min(len));
            }
        }
    }

    #[test]
    fn zero_ds_in_test_samples_everything() {
        let mask = default_mask(&target(), 0, false).unwrap();
        assert_eq!(mask.values("mask", SAMPLE_MASK).unwrap(), vec![1.0; 6]);
    }

    #[test]
    fn ragged_target_is_rejected() {
        let target = Frame::new()
            .with_column(UNIQUE_ID, vec!["a", "a", "b"])
            .with_column(DS, vec![1i64, 2])
            .with_column(Y, vec![0.0f32; 3]);
        assert_eq!(
            default_mask(&target, 1, false).unwrap_err(),
            DatasetError::ColumnLength {
                column: "target.ds".to_string(),
                expected: 3,
                actual: 2
            }
        );
    }
}
