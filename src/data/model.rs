use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Column – the four columns the dashboard understands
// ---------------------------------------------------------------------------

/// A required column of the prediction table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Column {
    Age,
    MonthlyIncome,
    DebtRatio,
    PredictedProbability,
}

impl Column {
    pub const ALL: [Column; 4] = [
        Column::Age,
        Column::MonthlyIncome,
        Column::DebtRatio,
        Column::PredictedProbability,
    ];

    /// Header text as it appears in the input file.
    pub fn header(self) -> &'static str {
        match self {
            Column::Age => "age",
            Column::MonthlyIncome => "MonthlyIncome",
            Column::DebtRatio => "DebtRatio",
            Column::PredictedProbability => "Predicted_Probability",
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == header.trim())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// ColumnSet – which required columns a loaded file carries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnSet {
    present: [bool; 4],
}

impl ColumnSet {
    pub fn all() -> Self {
        Self { present: [true; 4] }
    }

    pub fn insert(&mut self, column: Column) {
        self.present[column as usize] = true;
    }

    pub fn contains(&self, column: Column) -> bool {
        self.present[column as usize]
    }

    pub fn is_empty(&self) -> bool {
        !self.present.iter().any(|p| *p)
    }

    /// Required columns absent from the file.
    pub fn missing(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| !self.contains(*c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Record – one customer (one row of the prediction table)
// ---------------------------------------------------------------------------

/// A single customer row. A field is `None` when the cell is empty or the
/// whole column is absent from the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub age: Option<i64>,
    pub monthly_income: Option<f64>,
    pub debt_ratio: Option<f64>,
    pub predicted_probability: Option<f64>,
    /// Pass-through columns, kept for display only.
    pub extra: BTreeMap<String, String>,
}

impl Record {
    pub fn new(age: i64, monthly_income: f64, debt_ratio: f64, probability: f64) -> Self {
        Self {
            age: Some(age),
            monthly_income: Some(monthly_income),
            debt_ratio: Some(debt_ratio),
            predicted_probability: Some(probability),
            extra: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded prediction table
// ---------------------------------------------------------------------------

/// The loaded prediction table. Immutable once built; shared read-only
/// between render passes.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub records: Vec<Record>,
    pub columns: ColumnSet,
    /// Ordered names of the pass-through columns.
    pub extra_columns: Vec<String>,
    /// Where the table came from (file name), for the status bar.
    pub source: String,
}

impl Table {
    pub fn new(records: Vec<Record>, columns: ColumnSet) -> Self {
        Self {
            records,
            columns,
            extra_columns: Vec::new(),
            source: String::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(column)
    }

    /// Observed `age` range, or `None` if no record has an age.
    pub fn age_bounds(&self) -> Option<(i64, i64)> {
        self.records.iter().filter_map(|r| r.age).fold(None, |acc, a| match acc {
            None => Some((a, a)),
            Some((lo, hi)) => Some((lo.min(a), hi.max(a))),
        })
    }

    /// Observed `MonthlyIncome` range truncated to integers, or `None` if no
    /// record has an income.
    pub fn income_bounds(&self) -> Option<(i64, i64)> {
        let (lo, hi) = self
            .records
            .iter()
            .filter_map(|r| r.monthly_income)
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some((lo.trunc() as i64, hi.trunc() as i64))
    }

    /// A new table holding the records at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Table {
        Table {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            columns: self.columns,
            extra_columns: self.extra_columns.clone(),
            source: self.source.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_headers_round_trip() {
        for c in Column::ALL {
            assert_eq!(Column::from_header(c.header()), Some(c));
        }
        assert_eq!(Column::from_header(" age "), Some(Column::Age));
        assert_eq!(Column::from_header("Age"), None);
    }

    #[test]
    fn column_set_reports_missing() {
        let mut set = ColumnSet::default();
        assert!(set.is_empty());
        set.insert(Column::Age);
        set.insert(Column::PredictedProbability);
        assert_eq!(set.missing(), vec![Column::MonthlyIncome, Column::DebtRatio]);
        assert!(ColumnSet::all().missing().is_empty());
    }

    #[test]
    fn bounds_skip_missing_cells() {
        let mut sparse = Record::new(40, 0.0, 0.1, 0.2);
        sparse.monthly_income = None;
        sparse.age = None;
        let table = Table::new(
            vec![
                Record::new(31, 2500.7, 0.2, 0.1),
                sparse,
                Record::new(58, 12000.2, 0.4, 0.6),
            ],
            ColumnSet::all(),
        );
        assert_eq!(table.age_bounds(), Some((31, 58)));
        assert_eq!(table.income_bounds(), Some((2500, 12000)));
        assert_eq!(Table::default().age_bounds(), None);
    }

    #[test]
    fn subset_preserves_requested_order() {
        let table = Table::new(
            vec![
                Record::new(20, 1.0, 0.0, 0.0),
                Record::new(30, 2.0, 0.0, 0.0),
                Record::new(40, 3.0, 0.0, 0.0),
            ],
            ColumnSet::all(),
        );
        let sub = table.subset(&[0, 2]);
        let ages: Vec<_> = sub.records.iter().map(|r| r.age).collect();
        assert_eq!(ages, vec![Some(20), Some(40)]);
        assert_eq!(sub.columns, table.columns);
    }
}
