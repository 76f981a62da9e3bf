/// Infers a step label (e.g. `"D"`, `"H"`) from ordered timestamps.
pub trait FrequencyInference {
    fn infer(&self, timestamps: &[i64]) -> Option<String>;
}

impl<F> FrequencyInference for F
where
    F: Fn(&[i64]) -> Option<String>,
{
    fn infer(&self, timestamps: &[i64]) -> Option<String> {
        self(timestamps)
    }
}

/// Leaves the frequency unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFrequency;

impl FrequencyInference for NoFrequency {
    fn infer(&self, _timestamps: &[i64]) -> Option<String> {
        None
    }
}
