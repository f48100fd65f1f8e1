use serde::Serialize;

use super::{require, Section};
use crate::data::model::{Column, ColumnSet, Record};

/// Fixed cut-off for the "High Risk %" headline, independent of the
/// adjustable threshold used by the charts.
pub const HIGH_RISK_CUTOFF: f64 = 0.5;

/// Headline scalars for a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_count: usize,
    /// Share of records with probability strictly above the cut-off, in percent.
    pub high_risk_pct: Section<f64>,
    /// Mean `DebtRatio` over the records that have one.
    pub avg_debt_ratio: Section<Option<f64>>,
}

impl Kpis {
    /// Compute the KPIs. The high-risk denominator is every record; a
    /// missing probability counts as not high risk. An empty input yields
    /// zeros rather than a division by zero.
    pub fn compute(records: &[&Record], columns: &ColumnSet) -> Kpis {
        let total_count = records.len();

        let high_risk_pct = require(columns, Column::PredictedProbability).map(|_| {
            if total_count == 0 {
                return 0.0;
            }
            let high = records
                .iter()
                .filter(|r| r.predicted_probability.is_some_and(|p| p > HIGH_RISK_CUTOFF))
                .count();
            high as f64 / total_count as f64 * 100.0
        });

        let avg_debt_ratio = require(columns, Column::DebtRatio).map(|_| {
            let (sum, n) = records
                .iter()
                .filter_map(|r| r.debt_ratio)
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            (n > 0).then(|| sum / n as f64)
        });

        Kpis {
            total_count,
            high_risk_pct,
            avg_debt_ratio,
        }
    }
}

// ---------------------------------------------------------------------------
// Display formatting
// ---------------------------------------------------------------------------

/// Integer with thousands separators: `150000` → `"150,000"`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Percentage to one decimal place: `6.6842` → `"6.7%"`.
pub fn format_pct(pct: f64) -> String {
    format!("{pct:.1}%")
}

/// Ratio to two decimals, `"n/a"` when there is nothing to average.
pub fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{r:.2}"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::SectionError;

    #[test]
    fn headline_numbers_for_two_customers() {
        let rows = [
            Record::new(25, 3000.0, 0.25, 0.05),
            Record::new(70, 3000.0, 0.75, 0.95),
        ];
        let refs: Vec<&Record> = rows.iter().collect();
        let k = Kpis::compute(&refs, &ColumnSet::all());
        assert_eq!(k.total_count, 2);
        assert_eq!(k.high_risk_pct, Ok(50.0));
        assert_eq!(k.avg_debt_ratio, Ok(Some(0.5)));
        assert_eq!(format_pct(50.0), "50.0%");
    }

    #[test]
    fn cutoff_is_strict_and_ignores_missing() {
        let mut missing = Record::new(40, 1.0, 0.2, 0.0);
        missing.predicted_probability = None;
        missing.debt_ratio = None;
        let rows = [Record::new(30, 1.0, 0.2, 0.5), Record::new(31, 1.0, 0.4, 0.51), missing];
        let refs: Vec<&Record> = rows.iter().collect();
        let k = Kpis::compute(&refs, &ColumnSet::all());

        let pct = k.high_risk_pct.unwrap();
        assert!((pct - 100.0 / 3.0).abs() < 1e-9);
        assert!((0.0..=100.0).contains(&pct));
        let avg = k.avg_debt_ratio.unwrap().unwrap();
        assert!((avg - 0.3).abs() < 1e-12);
    }

    #[test]
    fn empty_input_does_not_divide_by_zero() {
        let k = Kpis::compute(&[], &ColumnSet::all());
        assert_eq!(k.total_count, 0);
        assert_eq!(k.high_risk_pct, Ok(0.0));
        assert_eq!(k.avg_debt_ratio, Ok(None));
        assert_eq!(format_ratio(None), "n/a");
    }

    #[test]
    fn missing_columns_degrade_individual_kpis() {
        let mut columns = ColumnSet::default();
        columns.insert(Column::Age);
        columns.insert(Column::DebtRatio);
        let rows = [Record::new(30, 1.0, 0.25, 0.9)];
        let refs: Vec<&Record> = rows.iter().collect();
        let k = Kpis::compute(&refs, &columns);
        assert_eq!(k.total_count, 1);
        assert_eq!(
            k.high_risk_pct,
            Err(SectionError::MissingColumn(Column::PredictedProbability))
        );
        assert_eq!(k.avg_debt_ratio, Ok(Some(0.25)));
    }

    #[test]
    fn formatting_matches_dashboard_style() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(150000), "150,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_pct(6.6842), "6.7%");
        assert_eq!(format_ratio(Some(353.00503)), "353.01");
    }
}
