use std::ops::{Range, RangeFull};

use crate::error::{DatasetError, Result};

/// Series requested for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesSelection {
    Index(usize),
    Range(Range<usize>),
    List(Vec<usize>),
    All,
}

impl SeriesSelection {
    /// Series indices of the selection against a panel of `n_series` series.
    ///
    /// Ranges are clipped to the panel, single indices and list entries must
    /// exist. Empty selections are rejected.
    pub fn resolve(self, n_series: usize) -> Result<Vec<usize>> {
        let indices = match self {
            SeriesSelection::Index(index) => vec![index],
            SeriesSelection::Range(range) => (range.start..range.end.min(n_series)).collect(),
            SeriesSelection::List(indices) => indices,
            SeriesSelection::All => (0..n_series).collect(),
        };

        if indices.is_empty() {
            return Err(DatasetError::InvalidIndex("empty selection".to_string()));
        }
        if let Some(index) = indices.iter().find(|i| **i >= n_series) {
            return Err(DatasetError::InvalidIndex(format!(
                "index {index} out of range for {n_series} series"
            )));
        }

        Ok(indices)
    }
}

impl From<usize> for SeriesSelection {
    fn from(index: usize) -> Self {
        SeriesSelection::Index(index)
    }
}

impl From<Range<usize>> for SeriesSelection {
    fn from(range: Range<usize>) -> Self {
        SeriesSelection::Range(range)
    }
}

impl From<RangeFull> for SeriesSelection {
    fn from(_: RangeFull) -> Self {
        SeriesSelection::All
    }
}

impl From<Vec<usize>> for SeriesSelection {
    fn from(indices: Vec<usize>) -> Self {
        SeriesSelection::List(indices)
    }
}

impl From<&[usize]> for SeriesSelection {
    fn from(indices: &[usize]) -> Self {
        SeriesSelection::List(indices.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_each_kind() {
        assert_eq!(SeriesSelection::from(2usize).resolve(3).unwrap(), vec![2]);
        assert_eq!(SeriesSelection::from(1usize..10).resolve(3).unwrap(), vec![1, 2]);
        assert_eq!(SeriesSelection::from(vec![2usize, 0, 2]).resolve(3).unwrap(), vec![2, 0, 2]);
        assert_eq!(SeriesSelection::from(..).resolve(3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_out_of_range_and_empty() {
        assert!(matches!(
            SeriesSelection::from(3usize).resolve(3),
            Err(DatasetError::InvalidIndex(_))
        ));
        assert!(matches!(
            SeriesSelection::from(vec![0usize, 5]).resolve(3),
            Err(DatasetError::InvalidIndex(_))
        ));
        assert!(matches!(
            SeriesSelection::from(3usize..5).resolve(3),
            Err(DatasetError::InvalidIndex(_))
        ));
    }
}
