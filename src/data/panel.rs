use std::collections::HashMap;

use tracing::debug;

use super::frame::{Frame, AVAILABLE_MASK, DS, SAMPLE_MASK, UNIQUE_ID, Y};
use crate::error::{DatasetError, Result};

/// Input tables of a panel before alignment.
#[derive(Debug, Clone, Default)]
pub struct PanelTables {
    pub target: Frame,
    pub exogenous: Option<Frame>,
    pub statics: Option<Frame>,
    pub mask: Option<Frame>,
}

impl PanelTables {
    pub fn new(target: Frame) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    pub fn with_exogenous(mut self, exogenous: Frame) -> Self {
        self.exogenous = Some(exogenous);
        self
    }

    pub fn with_statics(mut self, statics: Frame) -> Self {
        self.statics = Some(statics);
        self
    }

    pub fn with_mask(mut self, mask: Frame) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// One series after alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub unique_id: String,
    pub timestamps: Vec<i64>,
    /// Row-major `[time, channel]` values.
    pub values: Vec<f32>,
    pub statics: Vec<f32>,
}

impl SeriesData {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Aligned panel grouped by series, in sorted `unique_id` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub series: Vec<SeriesData>,
    /// Channel names: `y`, exogenous columns, `available_mask`, `sample_mask`.
    pub temporal_columns: Vec<String>,
    pub static_columns: Vec<String>,
}

impl Panel {
    pub fn n_channels(&self) -> usize {
        self.temporal_columns.len()
    }

    pub fn n_exogenous(&self) -> usize {
        self.temporal_columns.len() - 3
    }

    pub fn max_len(&self) -> usize {
        self.series.iter().map(|s| s.len()).max().unwrap_or(0)
    }
}

/// Validates the tables, aligns them on `(unique_id, ds)` and groups rows by series.
///
/// A mask table missing `available_mask` gets it filled with ones.
pub fn normalize(
    target: &Frame,
    exogenous: Option<&Frame>,
    statics: Option<&Frame>,
    mask: &Frame,
) -> Result<Panel> {
    target.validate("target", &[UNIQUE_ID, DS, Y])?;
    if target.is_empty() {
        return Err(DatasetError::EmptyPanel);
    }
    let n_rows = target.len();

    if let Some(exogenous) = exogenous {
        exogenous.validate("exogenous", &[UNIQUE_ID, DS])?;
        check_rows("exogenous", n_rows, exogenous.len())?;
    }

    mask.validate("mask", &[UNIQUE_ID, DS, SAMPLE_MASK])?;
    check_rows("mask", n_rows, mask.len())?;
    let available_mask = if mask.contains(AVAILABLE_MASK) {
        mask.values("mask", AVAILABLE_MASK)?
    } else {
        debug!("available mask not provided, defaulted with 1s");
        vec![1.0; n_rows]
    };
    let sample_mask = mask.values("mask", SAMPLE_MASK)?;
    check_mask(AVAILABLE_MASK, &available_mask)?;
    check_mask(SAMPLE_MASK, &sample_mask)?;

    let order = target.sorted_order("target")?;
    let ids = target.ids("target")?;
    let ds = target.timestamps("target")?;
    for pair in order.windows(2) {
        if ids[pair[0]] == ids[pair[1]] && ds[pair[0]] == ds[pair[1]] {
            return Err(DatasetError::DuplicateKey {
                table: "target".to_string(),
                unique_id: ids[pair[0]].clone(),
                ds: ds[pair[0]],
            });
        }
    }

    // Each channel is gathered into the target's sorted row order.
    let mut temporal_columns = vec![Y.to_string()];
    let mut channels = vec![gather(&target.values("target", Y)?, &order)];

    if let Some(exogenous) = exogenous {
        let exo_order = aligned_order("exogenous", exogenous, ids, ds, &order)?;
        for name in exogenous.value_names() {
            channels.push(gather(&exogenous.values("exogenous", &name)?, &exo_order));
            temporal_columns.push(name);
        }
    }

    let mask_order = aligned_order("mask", mask, ids, ds, &order)?;
    channels.push(gather(&available_mask, &mask_order));
    channels.push(gather(&sample_mask, &mask_order));
    temporal_columns.push(AVAILABLE_MASK.to_string());
    temporal_columns.push(SAMPLE_MASK.to_string());

    let (static_columns, static_rows) = match statics {
        Some(statics) => index_statics(statics)?,
        None => (Vec::new(), HashMap::new()),
    };

    let n_channels = channels.len();
    let mut series = Vec::new();
    let mut start = 0;
    while start < order.len() {
        let unique_id = &ids[order[start]];
        let end = start + order[start..].iter().take_while(|i| &ids[**i] == unique_id).count();

        let mut values = Vec::with_capacity((end - start) * n_channels);
        for row in start..end {
            values.extend(channels.iter().map(|channel| channel[row]));
        }

        let static_values = match statics {
            Some(_) => static_rows
                .get(unique_id.as_str())
                .cloned()
                .ok_or_else(|| DatasetError::StaticMatch {
                    unique_id: unique_id.clone(),
                    count: 0,
                })?,
            None => Vec::new(),
        };

        series.push(SeriesData {
            unique_id: unique_id.clone(),
            timestamps: order[start..end].iter().map(|i| ds[*i]).collect(),
            values,
            statics: static_values,
        });
        start = end;
    }

    if static_rows.len() > series.len() {
        debug!(
            extra = static_rows.len() - series.len(),
            "static table has rows for series absent from the target table"
        );
    }

    Ok(Panel {
        series,
        temporal_columns,
        static_columns,
    })
}

fn check_rows(table: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(DatasetError::RowCount {
            table: table.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_mask(column: &str, values: &[f32]) -> Result<()> {
    if values.iter().any(|v| v.is_nan()) {
        return Err(DatasetError::MissingValues {
            table: "mask".to_string(),
            column: column.to_string(),
        });
    }
    if values.iter().any(|v| *v != 0.0 && *v != 1.0) {
        return Err(DatasetError::NonBinaryMask {
            table: "mask".to_string(),
            column: column.to_string(),
        });
    }
    Ok(())
}

fn gather(values: &[f32], order: &[usize]) -> Vec<f32> {
    order.iter().map(|i| values[*i]).collect()
}

/// Sorted row order of `frame`, checked against the target's sorted keys.
fn aligned_order(
    table: &str,
    frame: &Frame,
    ids: &[String],
    ds: &[i64],
    target_order: &[usize],
) -> Result<Vec<usize>> {
    let order = frame.sorted_order(table)?;
    let frame_ids = frame.ids(table)?;
    let frame_ds = frame.timestamps(table)?;

    let mismatch = order
        .iter()
        .zip(target_order.iter())
        .position(|(f, t)| frame_ids[*f] != ids[*t] || frame_ds[*f] != ds[*t]);
    if let Some(row) = mismatch {
        return Err(DatasetError::Misaligned {
            table: table.to_string(),
            row,
        });
    }

    Ok(order)
}

fn index_statics(statics: &Frame) -> Result<(Vec<String>, HashMap<&str, Vec<f32>>)> {
    statics.validate("static", &[UNIQUE_ID])?;
    let ids = statics.ids("static")?;
    let columns = statics
        .names()
        .filter(|n| *n != UNIQUE_ID)
        .map(String::from)
        .collect::<Vec<_>>();
    let values = columns
        .iter()
        .map(|name| statics.values("static", name))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = HashMap::with_capacity(ids.len());
    for (row, id) in ids.iter().enumerate() {
        let features = values.iter().map(|column| column[row]).collect();
        if rows.insert(id.as_str(), features).is_some() {
            return Err(DatasetError::DuplicateStatic(id.clone()));
        }
    }

    Ok((columns, rows))
}
