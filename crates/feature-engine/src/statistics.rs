//! Column Statistics Computation

/// Summary statistics over the observed (non-NaN) values of a column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStatistics {
    /// Number of observed values
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl ColumnStatistics {
    /// Compute statistics from a column, skipping NaN entries
    pub fn compute(values: &[f64]) -> Self {
        let observed = observed(values);
        if observed.is_empty() {
            return Self::default();
        }

        let n = observed.len() as f64;

        // Mean
        let mean = observed.iter().sum::<f64>() / n;

        // Min/Max
        let min = observed.iter().cloned().fold(f64::MAX, f64::min);
        let max = observed.iter().cloned().fold(f64::MIN, f64::max);

        // Variance
        let mut m2 = 0.0;
        for &v in &observed {
            let d = v - mean;
            m2 += d * d;
        }
        let std_dev = (m2 / n).sqrt();

        Self {
            count: observed.len(),
            mean,
            std_dev,
            min,
            max,
        }
    }

    /// Whether the column had no observed values at all
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Median of the observed values; midpoint of the two central values for even counts
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = observed(values);
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent observed value; the smallest one wins ties
pub fn most_frequent(values: &[f64]) -> Option<f64> {
    let mut sorted = observed(values);
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let mut run = 1;
        while i + run < sorted.len() && sorted[i + run] == value {
            run += 1;
        }
        // Strictly greater keeps the earliest (smallest) value on ties
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        i += run;
    }

    best.map(|(value, _)| value)
}

fn observed(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}
