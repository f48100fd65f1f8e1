//! Descriptive statistics for the chart inputs: quantiles, box summaries and
//! histogram binning.

use serde::Serialize;

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// BoxSummary – five-number summary plus Tukey whiskers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Most extreme observations within 1.5 IQR of the quartiles.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Summarise the finite values; `None` when there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<BoxSummary> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let fences = (q1 - 1.5 * iqr)..=(q3 + 1.5 * iqr);

        let lower_whisker = sorted.iter().copied().find(|v| fences.contains(v)).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|v| fences.contains(v)).unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !fences.contains(v))
            .collect();

        Some(BoxSummary {
            count: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

// ---------------------------------------------------------------------------
// BinEdges – equal-width histogram bins
// ---------------------------------------------------------------------------

/// `count` equal-width bins over `[start, end]`. The last bin includes its
/// upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BinEdges {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl BinEdges {
    /// Bins spanning the observed range of the finite values. A zero-width
    /// range is widened to a unit span centred on the value.
    pub fn spanning(values: impl IntoIterator<Item = f64>, bins: usize) -> Option<BinEdges> {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let (start, end) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };
        Some(BinEdges {
            start,
            end,
            count: bins.max(1),
        })
    }

    pub fn width(&self) -> f64 {
        (self.end - self.start) / self.count as f64
    }

    pub fn center(&self, bin: usize) -> f64 {
        self.start + self.width() * (bin as f64 + 0.5)
    }

    /// Bin holding `value`, or `None` outside the edges.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        if !(value >= self.start && value <= self.end) {
            return None;
        }
        let idx = ((value - self.start) / self.width()).floor() as usize;
        Some(idx.min(self.count - 1))
    }

    /// Count the values falling into each bin.
    pub fn tally(&self, values: impl IntoIterator<Item = f64>) -> Vec<usize> {
        let mut counts = vec![0; self.count];
        for v in values {
            if let Some(i) = self.index_of(v) {
                counts[i] += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_number_summary_interpolates() {
        let s = BoxSummary::from_values([4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!((s.min, s.q1, s.median, s.q3, s.max), (1.0, 2.0, 3.0, 4.0, 5.0));

        let even = BoxSummary::from_values([1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(even.median, 2.5);
        assert_eq!(even.q1, 1.75);
        assert_eq!(even.q3, 3.25);
    }

    #[test]
    fn whiskers_stop_at_fences() {
        let s = BoxSummary::from_values([1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(s.outliers, vec![100.0]);
        assert_eq!(s.upper_whisker, 5.0);
        assert_eq!(s.lower_whisker, 1.0);
        assert_eq!(s.max, 100.0);
    }

    #[test]
    fn summary_ignores_non_finite_and_handles_empty() {
        assert!(BoxSummary::from_values(Vec::new()).is_none());
        assert!(BoxSummary::from_values([f64::NAN]).is_none());
        let single = BoxSummary::from_values([7.0, f64::NAN]).unwrap();
        assert_eq!(single.count, 1);
        assert_eq!((single.min, single.median, single.max), (7.0, 7.0, 7.0));
    }

    #[test]
    fn bins_span_range_and_include_upper_edge() {
        let edges = BinEdges::spanning([0.0, 0.5, 1.0], 4).unwrap();
        assert_eq!(edges.start, 0.0);
        assert_eq!(edges.width(), 0.25);
        assert_eq!(edges.tally([0.0, 0.24, 0.25, 0.5, 1.0]), vec![2, 1, 1, 1]);
        assert_eq!(edges.index_of(1.01), None);
        assert_eq!(edges.index_of(-0.01), None);
        assert_eq!(edges.center(0), 0.125);
    }

    #[test]
    fn degenerate_range_gets_unit_span() {
        let edges = BinEdges::spanning([0.3, 0.3], 40).unwrap();
        assert_eq!(edges.count, 40);
        assert!((edges.end - edges.start - 1.0).abs() < 1e-12);
        assert_eq!(edges.tally([0.3]).iter().sum::<usize>(), 1);
    }

    #[test]
    fn zero_bins_fall_back_to_one() {
        let edges = BinEdges::spanning([0.1, 0.9], 0).unwrap();
        assert_eq!(edges.count, 1);
        assert!(BinEdges::spanning(Vec::new(), 10).is_none());
    }
}
