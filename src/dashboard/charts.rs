//! Chart inputs: the shapes handed to the plotting layer. Nothing here owns
//! state; every value is rebuilt on each render pass.

use serde::Serialize;

use super::segment::{BandCount, RiskBand, RiskLabel, Segmentation};
use super::stats::{BinEdges, BoxSummary};
use crate::data::model::{Column, ColumnSet, Record};

// ---------------------------------------------------------------------------
// Funnel: customers per risk band
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelChart {
    /// Non-empty bands in fixed band order.
    pub stages: Vec<BandCount>,
    /// Records left out because their probability has no band.
    pub unclassified: usize,
}

pub fn funnel(segmentation: &Segmentation) -> FunnelChart {
    FunnelChart {
        stages: segmentation.band_counts.clone(),
        unclassified: segmentation.unclassified,
    }
}

// ---------------------------------------------------------------------------
// Histogram of default probabilities, split by risk label
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramPartition {
    pub label: RiskLabel,
    /// One count per shared bin.
    pub counts: Vec<usize>,
    /// Marginal box for this partition.
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityHistogram {
    pub threshold: f64,
    /// Shared by every partition so the bars line up; `None` when the
    /// subset has no classified probability.
    pub edges: Option<BinEdges>,
    /// Non-empty partitions in legend order (High, then Low).
    pub partitions: Vec<HistogramPartition>,
}

pub fn probability_histogram(
    records: &[&Record],
    segmentation: &Segmentation,
    threshold: f64,
    bins: usize,
) -> ProbabilityHistogram {
    let labelled: Vec<(RiskLabel, f64)> = records
        .iter()
        .zip(&segmentation.labels)
        .filter_map(|(r, label)| Some(((*label)?, r.predicted_probability?)))
        .collect();

    let edges = BinEdges::spanning(labelled.iter().map(|(_, p)| *p), bins);

    let partitions = match &edges {
        None => Vec::new(),
        Some(edges) => RiskLabel::ALL
            .into_iter()
            .filter_map(|label| {
                let values = || {
                    labelled
                        .iter()
                        .filter(move |(l, _)| *l == label)
                        .map(|(_, p)| *p)
                };
                let summary = BoxSummary::from_values(values())?;
                Some(HistogramPartition {
                    label,
                    counts: edges.tally(values()),
                    summary,
                })
            })
            .collect(),
    };

    ProbabilityHistogram {
        threshold,
        edges,
        partitions,
    }
}

// ---------------------------------------------------------------------------
// Box plot of monthly income per risk band
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeGroup {
    pub band: RiskBand,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeBoxPlot {
    /// Bands with at least one known income, in fixed band order.
    pub groups: Vec<IncomeGroup>,
}

pub fn income_box_plot(records: &[&Record], segmentation: &Segmentation) -> IncomeBoxPlot {
    let mut per_band: Vec<Vec<f64>> = vec![Vec::new(); RiskBand::ALL.len()];
    for (record, band) in records.iter().zip(&segmentation.bands) {
        if let (Some(band), Some(income)) = (band, record.monthly_income) {
            per_band[band.index()].push(income);
        }
    }

    let groups = RiskBand::ALL
        .into_iter()
        .zip(per_band)
        .filter_map(|(band, incomes)| {
            BoxSummary::from_values(incomes).map(|summary| IncomeGroup { band, summary })
        })
        .collect();

    IncomeBoxPlot { groups }
}

// ---------------------------------------------------------------------------
// Preview table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRow {
    pub age: Option<i64>,
    pub monthly_income: Option<f64>,
    pub debt_ratio: Option<f64>,
    pub predicted_probability: Option<f64>,
    /// Pass-through cells, parallel to `Preview::extra_columns`.
    pub extra: Vec<String>,
}

impl PreviewRow {
    /// Display text for a required column cell.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Age => self.age.map(|a| a.to_string()),
            Column::MonthlyIncome => self.monthly_income.map(|v| format!("{v:.1}")),
            Column::DebtRatio => self.debt_ratio.map(|v| format!("{v:.6}")),
            Column::PredictedProbability => self.predicted_probability.map(|v| format!("{v:.6}")),
        }
        .unwrap_or_else(|| "NaN".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    /// Required columns present in the table, in display order.
    pub columns: Vec<Column>,
    pub extra_columns: Vec<String>,
    pub rows: Vec<PreviewRow>,
}

/// The first `limit` records of the filtered subset.
pub fn preview(
    records: &[&Record],
    columns: &ColumnSet,
    extra_columns: &[String],
    limit: usize,
) -> Preview {
    let rows = records
        .iter()
        .take(limit)
        .map(|r| PreviewRow {
            age: r.age,
            monthly_income: r.monthly_income,
            debt_ratio: r.debt_ratio,
            predicted_probability: r.predicted_probability,
            extra: extra_columns
                .iter()
                .map(|name| r.extra.get(name).cloned().unwrap_or_default())
                .collect(),
        })
        .collect();

    Preview {
        columns: Column::ALL
            .into_iter()
            .filter(|c| columns.contains(*c))
            .collect(),
        extra_columns: extra_columns.to_vec(),
        rows,
    }
}
