use std::fmt;

use serde::Serialize;

use crate::data::model::Record;

// ---------------------------------------------------------------------------
// RiskBand – fixed probability buckets
// ---------------------------------------------------------------------------

/// One of six fixed default-probability buckets. Intervals are `[lo, hi)`
/// except the last, which also includes 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskBand {
    #[serde(rename = "0-0.1")]
    VeryLow,
    #[serde(rename = "0.1-0.2")]
    Low,
    #[serde(rename = "0.2-0.3")]
    Guarded,
    #[serde(rename = "0.3-0.5")]
    Elevated,
    #[serde(rename = "0.5-0.7")]
    High,
    #[serde(rename = "0.7-1.0")]
    Severe,
}

impl RiskBand {
    pub const ALL: [RiskBand; 6] = [
        RiskBand::VeryLow,
        RiskBand::Low,
        RiskBand::Guarded,
        RiskBand::Elevated,
        RiskBand::High,
        RiskBand::Severe,
    ];

    /// Bin edges shared by all bands.
    pub const EDGES: [f64; 7] = [0.0, 0.1, 0.2, 0.3, 0.5, 0.7, 1.0];

    pub fn label(self) -> &'static str {
        match self {
            RiskBand::VeryLow => "0-0.1",
            RiskBand::Low => "0.1-0.2",
            RiskBand::Guarded => "0.2-0.3",
            RiskBand::Elevated => "0.3-0.5",
            RiskBand::High => "0.5-0.7",
            RiskBand::Severe => "0.7-1.0",
        }
    }

    /// Position in the fixed band order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Locate a probability in the band edges. Values outside `[0, 1]` (and
    /// NaN) have no band.
    pub fn classify(probability: f64) -> Option<RiskBand> {
        if !(0.0..=1.0).contains(&probability) {
            return None;
        }
        let upper = &Self::EDGES[1..];
        let idx = upper
            .iter()
            .position(|&hi| probability < hi)
            .unwrap_or(Self::ALL.len() - 1);
        Some(Self::ALL[idx])
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// RiskLabel – binary classification against the user threshold
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskLabel {
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Low Risk")]
    Low,
}

impl RiskLabel {
    /// Legend order.
    pub const ALL: [RiskLabel; 2] = [RiskLabel::High, RiskLabel::Low];

    /// Strictly above the threshold is high risk.
    pub fn classify(probability: f64, threshold: f64) -> RiskLabel {
        if probability > threshold {
            RiskLabel::High
        } else {
            RiskLabel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLabel::High => "High Risk",
            RiskLabel::Low => "Low Risk",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Segmentation of the filtered subset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandCount {
    pub band: RiskBand,
    pub count: usize,
}

/// Derived per-record band and label, parallel to the filtered subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    pub bands: Vec<Option<RiskBand>>,
    pub labels: Vec<Option<RiskLabel>>,
    /// Non-empty bands in fixed band order.
    pub band_counts: Vec<BandCount>,
    /// Records whose probability is missing or outside `[0, 1]`.
    pub unclassified: usize,
}

/// Assign bands and labels to every record of the filtered subset.
///
/// Records without a usable probability land in the `unclassified` bucket
/// and get neither a band nor a label. Empty bands are omitted from
/// `band_counts`.
pub fn segment(records: &[&Record], threshold: f64) -> Segmentation {
    let mut tally = [0usize; RiskBand::ALL.len()];
    let mut unclassified = 0;
    let mut bands = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());

    for record in records {
        let band = record.predicted_probability.and_then(RiskBand::classify);
        match band {
            Some(b) => tally[b.index()] += 1,
            None => unclassified += 1,
        }
        bands.push(band);
        labels.push(band.and(
            record
                .predicted_probability
                .map(|p| RiskLabel::classify(p, threshold)),
        ));
    }

    let band_counts = RiskBand::ALL
        .into_iter()
        .zip(tally)
        .filter(|(_, count)| *count > 0)
        .map(|(band, count)| BandCount { band, count })
        .collect();

    Segmentation {
        bands,
        labels,
        band_counts,
        unclassified,
    }
}
