//! Transform layer: one render pass from table + controls to chart inputs.
//!
//! ```text
//!   Table ──► kpi (full table)
//!     │
//!     ▼
//!   filter (age / income windows)
//!     │
//!     ▼
//!   segment (risk band + risk label)
//!     │
//!     ▼
//!   charts (funnel, histogram, income box plot, preview)
//! ```
//!
//! Every pass starts from scratch; nothing is carried between passes except
//! the table itself and the user's controls.

pub mod charts;
pub mod kpi;
pub mod segment;
pub mod stats;

use serde::Serialize;
use thiserror::Error;

use crate::config::DashboardConfig;
use crate::data::filter::{filtered_indices, FilterCriteria, FilterRange};
use crate::data::model::{Column, ColumnSet, Record, Table};

use charts::{FunnelChart, IncomeBoxPlot, Preview, ProbabilityHistogram};
use kpi::Kpis;

// ---------------------------------------------------------------------------
// Per-section failures
// ---------------------------------------------------------------------------

/// Why a single dashboard section could not be produced. Other sections
/// render regardless.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum SectionError {
    #[error("column '{0}' is missing from the input file")]
    MissingColumn(Column),
}

pub type Section<T> = Result<T, SectionError>;

pub(crate) fn require(columns: &ColumnSet, column: Column) -> Section<()> {
    if columns.contains(column) {
        Ok(())
    } else {
        Err(SectionError::MissingColumn(column))
    }
}

// ---------------------------------------------------------------------------
// Controls – the user's filter and threshold choices
// ---------------------------------------------------------------------------

/// Slider granularity of the risk threshold.
pub const THRESHOLD_STEP: f64 = 0.05;

/// Snap a threshold into `[0, 1]` on the 0.05 grid.
pub fn snap_threshold(t: f64) -> f64 {
    if t.is_nan() {
        return 0.5;
    }
    let steps = (1.0 / THRESHOLD_STEP).round();
    (t.clamp(0.0, 1.0) * steps).round() / steps
}

/// Everything the user can adjust. Passed by value into each render pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Controls {
    pub filter: FilterCriteria,
    pub threshold: f64,
}

impl Controls {
    /// Initial controls for a freshly loaded table: the configured windows
    /// clamped to the observed column ranges.
    pub fn initial(table: &Table, config: &DashboardConfig) -> Controls {
        let window = |column: Column, default: (i64, i64), bounds: Option<(i64, i64)>| {
            if !table.has(column) {
                return None;
            }
            let range = FilterRange::new(default.0, default.1);
            Some(match bounds {
                Some(b) => range.clamp_to(b),
                None => range,
            })
        };

        Controls {
            filter: FilterCriteria {
                age: window(Column::Age, config.default_age_window, table.age_bounds()),
                income: window(
                    Column::MonthlyIncome,
                    config.default_income_window,
                    table.income_bounds(),
                ),
            },
            threshold: snap_threshold(config.default_threshold),
        }
    }

    pub fn set_threshold(&mut self, t: f64) {
        self.threshold = snap_threshold(t);
    }
}

// ---------------------------------------------------------------------------
// Dashboard – the output of one render pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub controls: Controls,
    /// Headline KPIs over the full, unfiltered table.
    pub kpis: Kpis,
    /// The same KPIs over the filtered subset.
    pub view_kpis: Kpis,
    pub funnel: Section<FunnelChart>,
    pub histogram: Section<ProbabilityHistogram>,
    pub income: Section<IncomeBoxPlot>,
    pub preview: Preview,
}

impl Dashboard {
    /// Run one full render pass.
    pub fn build(table: &Table, controls: &Controls, config: &DashboardConfig) -> Dashboard {
        let columns = &table.columns;
        let all: Vec<&Record> = table.records.iter().collect();
        let kpis = Kpis::compute(&all, columns);

        let subset: Vec<&Record> = filtered_indices(table, &controls.filter)
            .into_iter()
            .map(|i| &table.records[i])
            .collect();
        let view_kpis = Kpis::compute(&subset, columns);

        let segmentation = require(columns, Column::PredictedProbability)
            .map(|_| segment::segment(&subset, controls.threshold));

        let funnel = segmentation.as_ref().map(charts::funnel).map_err(Clone::clone);
        let histogram = segmentation
            .as_ref()
            .map(|seg| {
                charts::probability_histogram(&subset, seg, controls.threshold, config.histogram_bins)
            })
            .map_err(Clone::clone);
        let income = require(columns, Column::MonthlyIncome)
            .and_then(|_| segmentation.as_ref().map_err(Clone::clone))
            .map(|seg| charts::income_box_plot(&subset, seg));

        if let Ok(seg) = &segmentation {
            if seg.unclassified > 0 {
                log::warn!(
                    "{} filtered records have no usable probability and are left out of the band charts",
                    seg.unclassified
                );
            }
        }

        let preview = charts::preview(&subset, columns, &table.extra_columns, config.preview_rows);

        log::debug!(
            "render pass: {} of {} records in view, threshold {:.2}",
            subset.len(),
            table.len(),
            controls.threshold
        );

        Dashboard {
            controls: *controls,
            kpis,
            view_kpis,
            funnel,
            histogram,
            income,
            preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segment::{BandCount, RiskBand};

    fn two_customers() -> Table {
        Table::new(
            vec![
                Record::new(25, 3000.0, 0.3, 0.05),
                Record::new(70, 3000.0, 0.3, 0.95),
            ],
            ColumnSet::all(),
        )
    }

    #[test]
    fn two_customer_scenario() {
        let table = two_customers();
        let config = DashboardConfig::default();
        let controls = Controls {
            filter: FilterCriteria {
                age: Some(FilterRange::new(20, 60)),
                income: Some(FilterRange::new(2000, 10000)),
            },
            threshold: 0.5,
        };
        let d = Dashboard::build(&table, &controls, &config);

        assert_eq!(d.kpis.total_count, 2);
        assert_eq!(d.kpis.high_risk_pct, Ok(50.0));
        assert_eq!(kpi::format_pct(d.kpis.high_risk_pct.clone().unwrap()), "50.0%");
        assert_eq!(d.view_kpis.total_count, 1);
        assert_eq!(
            d.funnel.unwrap().stages,
            vec![BandCount { band: RiskBand::VeryLow, count: 1 }]
        );
        assert_eq!(d.preview.rows.len(), 1);
        assert_eq!(d.preview.rows[0].age, Some(25));
    }

    #[test]
    fn empty_view_renders_zero_states() {
        let table = two_customers();
        let controls = Controls {
            filter: FilterCriteria {
                age: Some(FilterRange::new(80, 90)),
                income: None,
            },
            threshold: 0.5,
        };
        let d = Dashboard::build(&table, &controls, &DashboardConfig::default());

        assert_eq!(d.kpis.total_count, 2);
        assert_eq!(d.view_kpis.total_count, 0);
        assert_eq!(d.view_kpis.high_risk_pct, Ok(0.0));
        assert_eq!(d.view_kpis.avg_debt_ratio, Ok(None));
        assert!(d.funnel.unwrap().stages.is_empty());
        assert!(d.histogram.unwrap().partitions.is_empty());
        assert!(d.income.unwrap().groups.is_empty());
        assert!(d.preview.rows.is_empty());
    }

    #[test]
    fn missing_probability_degrades_only_dependent_sections() {
        let mut columns = ColumnSet::default();
        columns.insert(Column::Age);
        columns.insert(Column::MonthlyIncome);
        columns.insert(Column::DebtRatio);
        let mut record = Record::new(30, 4000.0, 0.2, 0.0);
        record.predicted_probability = None;
        let table = Table::new(vec![record], columns);

        let config = DashboardConfig::default();
        let d = Dashboard::build(&table, &Controls::initial(&table, &config), &config);

        let missing = SectionError::MissingColumn(Column::PredictedProbability);
        assert_eq!(d.kpis.high_risk_pct, Err(missing.clone()));
        assert_eq!(d.funnel.map(|_| ()), Err(missing.clone()));
        assert_eq!(d.histogram.map(|_| ()), Err(missing.clone()));
        assert_eq!(d.income.map(|_| ()), Err(missing));
        assert_eq!(d.kpis.avg_debt_ratio, Ok(Some(0.2)));
        assert_eq!(d.preview.rows.len(), 1);
        assert_eq!(d.preview.columns.len(), 3);
    }

    #[test]
    fn missing_income_column_lifts_income_filter() {
        let mut columns = ColumnSet::default();
        columns.insert(Column::Age);
        columns.insert(Column::PredictedProbability);
        let mut record = Record::new(30, 0.0, 0.0, 0.4);
        record.monthly_income = None;
        record.debt_ratio = None;
        let table = Table::new(vec![record], columns);

        let config = DashboardConfig::default();
        let controls = Controls::initial(&table, &config);
        assert!(controls.filter.income.is_none());

        let d = Dashboard::build(&table, &controls, &config);
        assert_eq!(d.view_kpis.total_count, 1);
        assert_eq!(
            d.income.map(|_| ()),
            Err(SectionError::MissingColumn(Column::MonthlyIncome))
        );
        assert!(d.funnel.is_ok());
    }

    #[test]
    fn initial_controls_clamp_to_observed_ranges() {
        let table = Table::new(
            vec![
                Record::new(30, 2500.0, 0.1, 0.1),
                Record::new(45, 7000.9, 0.1, 0.1),
            ],
            ColumnSet::all(),
        );
        let c = Controls::initial(&table, &DashboardConfig::default());
        let age = c.filter.age.unwrap();
        let income = c.filter.income.unwrap();
        assert_eq!((age.min(), age.max()), (30, 45));
        assert_eq!((income.min(), income.max()), (2500, 7000));
        assert_eq!(c.threshold, 0.5);
    }

    #[test]
    fn threshold_snaps_to_grid() {
        assert_eq!(snap_threshold(0.52), 0.5);
        assert_eq!(snap_threshold(0.53), 0.55);
        assert_eq!(snap_threshold(-1.0), 0.0);
        assert_eq!(snap_threshold(3.0), 1.0);
        assert_eq!(snap_threshold(f64::NAN), 0.5);
    }

    #[test]
    fn threshold_only_moves_labels() {
        let table = Table::new(
            (0..20)
                .map(|i| Record::new(30, 5000.0, 0.2, i as f64 / 20.0))
                .collect(),
            ColumnSet::all(),
        );
        let config = DashboardConfig::default();
        let mut controls = Controls::initial(&table, &config);
        let before = Dashboard::build(&table, &controls, &config);
        controls.set_threshold(0.2);
        let after = Dashboard::build(&table, &controls, &config);

        assert_eq!(before.funnel, after.funnel);
        assert_eq!(before.income, after.income);
        assert_ne!(before.histogram, after.histogram);
    }
}
