use serde::Serialize;

use super::model::{Record, Table};

// ---------------------------------------------------------------------------
// FilterRange – an inclusive [min, max] window on one column
// ---------------------------------------------------------------------------

/// Inclusive numeric window. Always holds `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterRange<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Copy> FilterRange<T> {
    /// Build a range, swapping the ends if they arrive reversed.
    pub fn new(a: T, b: T) -> Self {
        if b < a {
            Self { min: b, max: a }
        } else {
            Self { min: a, max: b }
        }
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }

    /// Both ends inclusive.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Pull both ends inside `bounds` (an observed column range).
    pub fn clamp_to(self, bounds: (T, T)) -> Self {
        let (lo, hi) = bounds;
        let clamp = |v: T| {
            if v < lo {
                lo
            } else if v > hi {
                hi
            } else {
                v
            }
        };
        Self::new(clamp(self.min), clamp(self.max))
    }

    /// Move the lower end, dragging the upper end along if needed.
    pub fn set_min(&mut self, value: T) {
        self.min = value;
        if self.max < value {
            self.max = value;
        }
    }

    /// Move the upper end, dragging the lower end along if needed.
    pub fn set_max(&mut self, value: T) {
        self.max = value;
        if value < self.min {
            self.min = value;
        }
    }
}

// ---------------------------------------------------------------------------
// Filter predicate: age and income windows
// ---------------------------------------------------------------------------

/// The user's current filter selection.
///
/// A dimension set to `None` imposes no constraint; this is the case when the
/// corresponding column is absent from the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub age: Option<FilterRange<i64>>,
    pub income: Option<FilterRange<i64>>,
}

impl FilterCriteria {
    /// Whether a record passes every active window.
    ///
    /// A record passes a window when:
    /// * the window is `None` → passes (no constraint)
    /// * the record's cell is missing → fails (a missing value is never "between")
    /// * the cell lies within `[min, max]` → passes
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(range) = &self.age {
            match record.age {
                Some(age) if range.contains(age) => {}
                _ => return false,
            }
        }
        if let Some(range) = &self.income {
            let lo = range.min() as f64;
            let hi = range.max() as f64;
            match record.monthly_income {
                Some(income) if lo <= income && income <= hi => {}
                _ => return false,
            }
        }
        true
    }
}

/// Return indices of records that pass the filter, in source order.
pub fn filtered_indices(table: &Table, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| criteria.matches(r))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnSet;

    fn table() -> Table {
        let mut no_income = Record::new(33, 0.0, 0.2, 0.4);
        no_income.monthly_income = None;
        Table::new(
            vec![
                Record::new(25, 3000.0, 0.3, 0.05),
                Record::new(70, 3000.0, 0.3, 0.95),
                Record::new(20, 2000.0, 0.1, 0.2),
                Record::new(60, 10000.0, 0.1, 0.2),
                Record::new(45, 10000.5, 0.1, 0.2),
                no_income,
            ],
            ColumnSet::all(),
        )
    }

    fn criteria(age: (i64, i64), income: (i64, i64)) -> FilterCriteria {
        FilterCriteria {
            age: Some(FilterRange::new(age.0, age.1)),
            income: Some(FilterRange::new(income.0, income.1)),
        }
    }

    #[test]
    fn range_normalises_reversed_ends() {
        let r = FilterRange::new(60, 20);
        assert_eq!((r.min(), r.max()), (20, 60));
        assert!(r.contains(20) && r.contains(60) && !r.contains(61));
    }

    #[test]
    fn range_clamps_into_bounds() {
        let r = FilterRange::new(2000, 10000).clamp_to((2500, 8000));
        assert_eq!((r.min(), r.max()), (2500, 8000));
        let outside = FilterRange::new(20, 60).clamp_to((70, 90));
        assert_eq!((outside.min(), outside.max()), (70, 70));
    }

    #[test]
    fn set_min_and_max_keep_order() {
        let mut r = FilterRange::new(20, 60);
        r.set_min(65);
        assert_eq!((r.min(), r.max()), (65, 65));
        r.set_max(30);
        assert_eq!((r.min(), r.max()), (30, 30));
    }

    #[test]
    fn bounds_are_inclusive_and_order_preserved() {
        let t = table();
        let idx = filtered_indices(&t, &criteria((20, 60), (2000, 10000)));
        assert_eq!(idx, vec![0, 2, 3]);
    }

    #[test]
    fn missing_cells_fail_active_windows() {
        let t = table();
        let idx = filtered_indices(&t, &criteria((0, 200), (0, 1_000_000)));
        assert!(!idx.contains(&5));

        let age_only = FilterCriteria {
            age: Some(FilterRange::new(0, 200)),
            income: None,
        };
        assert!(filtered_indices(&t, &age_only).contains(&5));
    }

    #[test]
    fn no_constraints_keep_everything() {
        let t = table();
        assert_eq!(
            filtered_indices(&t, &FilterCriteria::default()),
            (0..t.len()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn filtering_is_idempotent() {
        let t = table();
        let c = criteria((20, 60), (2000, 10000));
        let once = t.subset(&filtered_indices(&t, &c));
        let twice = once.subset(&filtered_indices(&once, &c));
        assert_eq!(once.records, twice.records);
    }

    #[test]
    fn empty_result_is_valid() {
        let t = table();
        assert!(filtered_indices(&t, &criteria((80, 90), (0, 1))).is_empty());
    }
}
