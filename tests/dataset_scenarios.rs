use burn::backend::NdArray;
use muonts_windows::data::frame::{AVAILABLE_MASK, DS, SAMPLE_MASK, UNIQUE_ID, Y};
use muonts_windows::utils::{float_values, int_values};
use muonts_windows::{DatasetError, Frame, PanelTables, TimeSeriesDatasetConfig, WindowMode};

type B = NdArray;

fn panel(lengths: &[usize]) -> Frame {
    let mut ids = Vec::new();
    let mut ds = Vec::new();
    let mut y = Vec::new();
    for (i, len) in lengths.iter().enumerate() {
        for t in 0..*len {
            ids.push(format!("s{i}"));
            ds.push(t as i64);
            y.push((100 * i + t) as f32);
        }
    }
    Frame::new()
        .with_column(UNIQUE_ID, ids)
        .with_column(DS, ds)
        .with_column(Y, y)
}

fn mask(target: &Frame, available: Vec<f32>, sample: Vec<f32>) -> Frame {
    Frame::new()
        .with_column(UNIQUE_ID, target.ids("target").unwrap().to_vec())
        .with_column(DS, target.timestamps("target").unwrap().to_vec())
        .with_column(AVAILABLE_MASK, available)
        .with_column(SAMPLE_MASK, sample)
}

fn full_config(chunk: usize) -> TimeSeriesDatasetConfig {
    TimeSeriesDatasetConfig::new(2, 1)
        .with_mode(WindowMode::Full)
        .with_len_sample_chunks(Some(chunk))
}

#[test]
fn two_series_are_left_padded_to_the_longest() {
    let config = TimeSeriesDatasetConfig::new(2, 1)
        .with_ds_in_test(1)
        .with_window_sampling_limit(3);
    let dataset = config.init::<B>(PanelTables::new(panel(&[5, 3]))).unwrap();

    assert_eq!(dataset.packed().dims(), [2, 3, 5]);
    let values = float_values(dataset.packed().clone());
    // series s1, channels y, available_mask, sample_mask
    assert_eq!(values[15..20], [0.0, 0.0, 100.0, 101.0, 102.0]);
    assert_eq!(values[20..25], [0.0, 0.0, 1.0, 1.0, 1.0]);
    assert_eq!(values[25..30], [0.0, 0.0, 1.0, 1.0, 0.0]);
    assert_eq!(dataset.window_spec().first_ds, 2);
}

#[test]
fn window_sampling_limit_below_window_size_fails() {
    let config = TimeSeriesDatasetConfig::new(2, 1)
        .with_ds_in_test(1)
        .with_window_sampling_limit(2);
    let err = config.init::<B>(PanelTables::new(panel(&[5, 3]))).unwrap_err();
    assert_eq!(
        err,
        DatasetError::WindowSamplingLimit {
            limit: 2,
            window_size: 3
        }
    );
}

#[test]
fn short_sample_chunks_fail_construction() {
    let config = TimeSeriesDatasetConfig::new(2, 3)
        .with_mode(WindowMode::Full)
        .with_len_sample_chunks(Some(4));
    let err = config.init::<B>(PanelTables::new(panel(&[8]))).unwrap_err();
    assert_eq!(
        err,
        DatasetError::SampleChunks {
            len_sample_chunks: 4,
            required: 5
        }
    );
}

#[test]
fn complete_outputs_excludes_unobserved_step_before_horizon() {
    // One window covering the whole series, last two available steps [1, 0].
    let target = panel(&[3]);
    let mask = mask(&target, vec![1.0, 1.0, 0.0], vec![1.0, 1.0, 1.0]);
    let tables = PanelTables::new(target).with_mask(mask);

    let strict = full_config(3)
        .with_window_sampling_limit(3)
        .init::<B>(tables.clone())
        .unwrap();
    assert_eq!(strict.get(0usize).unwrap_err(), DatasetError::NonSamplable(vec![0]));

    let relaxed = full_config(3)
        .with_window_sampling_limit(3)
        .with_complete_outputs(false)
        .init::<B>(tables)
        .unwrap();
    assert_eq!(relaxed.get(0usize).unwrap().len(), 1);
}

#[test]
fn fully_samplable_selection_keeps_every_window() {
    let config = full_config(3)
        .with_window_sampling_limit(6)
        .with_complete_inputs(true);
    let dataset = config.init::<B>(PanelTables::new(panel(&[6, 6]))).unwrap();

    let windows = dataset.windows(..).unwrap().unwrap();
    assert_eq!(windows.len(), 8);

    let batch = dataset.get(..).unwrap();
    assert_eq!(batch.len(), windows.len());
    assert_eq!(int_values(batch.series_idx), vec![0, 0, 0, 0, 1, 1, 1, 1]);
    assert_eq!(
        float_values(batch.target)[0..6],
        [0.0, 1.0, 2.0, 1.0, 2.0, 3.0]
    );
    assert!(batch.exogenous.is_none());
    assert!(batch.static_features.is_none());
}

#[test]
fn last_samplable_window_returns_each_series_once() {
    let config = full_config(3)
        .with_window_sampling_limit(6)
        .with_last_samplable_window(true);
    let dataset = config.init::<B>(PanelTables::new(panel(&[6, 4]))).unwrap();

    let batch = dataset.get(vec![0usize, 1, 0, 1]).unwrap();
    let idx = int_values(batch.series_idx);
    assert_eq!(idx, vec![0, 1]);
    // Most recent window of each series.
    assert_eq!(float_values(batch.target), vec![3.0, 4.0, 5.0, 101.0, 102.0, 103.0]);
}

#[test]
fn completeness_flags_are_monotonic() {
    let target = panel(&[8, 8]);
    let available = [1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0];
    let sample = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0];
    let tables = PanelTables::new(target.clone())
        .with_mask(mask(&target, available.to_vec(), sample.to_vec()));

    let count = |inputs: bool, outputs: bool| {
        TimeSeriesDatasetConfig::new(2, 1)
            .with_window_sampling_limit(8)
            .with_complete_inputs(inputs)
            .with_complete_outputs(outputs)
            .init::<B>(tables.clone())
            .unwrap()
            .get(..)
            .map(|batch| batch.len())
            .unwrap_or(0)
    };

    let base = count(false, false);
    assert!(base > 0);
    assert!(count(true, false) <= base);
    assert!(count(false, true) <= base);
    assert!(count(true, true) <= count(true, false));
    assert!(count(true, true) <= count(false, true));
}

#[test]
fn exogenous_and_static_features_follow_their_windows() {
    let target = panel(&[4, 4]);
    let n = target.len();
    let exogenous = Frame::new()
        .with_column(UNIQUE_ID, target.ids("target").unwrap().to_vec())
        .with_column(DS, target.timestamps("target").unwrap().to_vec())
        .with_column("temp", (0..n).map(|v| v as f32 * 0.5).collect::<Vec<f32>>())
        .with_column("promo", vec![1i64; n]);
    let statics = Frame::new()
        .with_column(UNIQUE_ID, vec!["s1", "s0"])
        .with_column("region", vec![7.0f32, 3.0])
        .with_column("size", vec![70i64, 30]);
    let tables = PanelTables::new(target)
        .with_exogenous(exogenous)
        .with_statics(statics);

    let dataset = full_config(3)
        .with_window_sampling_limit(4)
        .with_f_cols(Some(vec!["promo".to_string()]))
        .init::<B>(tables)
        .unwrap();
    assert_eq!(dataset.n_variables(), (2, 2));
    assert_eq!(
        dataset.temporal_columns(),
        ["y", "temp", "promo", AVAILABLE_MASK, SAMPLE_MASK]
    );
    assert_eq!(dataset.static_columns(), ["region", "size"]);
    assert_eq!(dataset.future_exogenous_indices(), [2]);

    let batch = dataset.get(1usize).unwrap();
    assert_eq!(batch.len(), 2);
    let exogenous = batch.exogenous.unwrap();
    assert_eq!(exogenous.dims(), [2, 2, 3]);
    // temp of series s1 (rows 4..8) in its first window
    assert_eq!(float_values(exogenous)[0..6], [2.0, 2.5, 3.0, 1.0, 1.0, 1.0]);
    assert_eq!(
        float_values(batch.static_features.unwrap()),
        vec![7.0, 70.0, 7.0, 70.0]
    );
}

#[test]
fn batches_can_be_fetched_from_several_threads() {
    let dataset = full_config(3)
        .with_window_sampling_limit(6)
        .init::<B>(PanelTables::new(panel(&[6, 6, 6])))
        .unwrap();

    let lengths: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..3usize)
            .map(|i| {
                let dataset = &dataset;
                scope.spawn(move || dataset.get(i).map(|batch| batch.len()))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect()
    });

    assert_eq!(lengths, vec![4, 4, 4]);
}
