use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Filter predicates: selected values or a closed range per column
// ---------------------------------------------------------------------------

/// The constraint placed on one column by its sidebar widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnFilter {
    /// Keep rows whose value is one of the selected options.
    Values {
        options: Vec<CellValue>,
        selected: BTreeSet<CellValue>,
    },
    /// Keep rows whose numeric value lies in `[low, high]`.
    Range {
        min: f64,
        max: f64,
        low: f64,
        high: f64,
    },
}

impl ColumnFilter {
    /// Widget for `column` with everything selected: a slider over the
    /// integer-rounded bounds for numeric columns, a checkbox list otherwise.
    pub fn for_column(column: &Column) -> Self {
        if column.kind.is_numeric() {
            let (min, max) = column
                .numeric_bounds()
                .map(|(lo, hi)| (lo.floor(), hi.ceil()))
                .unwrap_or((0.0, 0.0));
            ColumnFilter::Range {
                min,
                max,
                low: min,
                high: max,
            }
        } else {
            let options = column.options();
            let selected = options.iter().cloned().collect();
            ColumnFilter::Values { options, selected }
        }
    }

    /// Whether a cell passes. Missing cells never pass an active filter.
    pub fn accepts(&self, value: &CellValue) -> bool {
        if value.is_missing() {
            return false;
        }
        match self {
            ColumnFilter::Values { selected, .. } => selected.contains(value),
            ColumnFilter::Range { low, high, .. } => value
                .as_f64()
                .is_some_and(|v| v >= *low && v <= *high),
        }
    }
}

/// Per-column filter state: maps column_name → constraint.
pub type FilterState = BTreeMap<String, ColumnFilter>;

/// Make sure every column in `active` that exists in `table` has a filter,
/// initialised with everything selected. Existing selections are kept.
pub fn sync_filter_state(filters: &mut FilterState, table: &Table, active: &[String]) {
    for name in active {
        if filters.contains_key(name) {
            continue;
        }
        if let Some(column) = table.column(name) {
            filters.insert(name.clone(), ColumnFilter::for_column(column));
        }
    }
}

/// Return indices of rows that pass the filters of every `active` column.
///
/// Filters for columns not in `active` are ignored, as are columns the
/// table lacks.
pub fn filtered_indices(table: &Table, filters: &FilterState, active: &[String]) -> Vec<usize> {
    let checks: Vec<(&Column, &ColumnFilter)> = active
        .iter()
        .filter_map(|name| Some((table.column(name)?, filters.get(name)?)))
        .collect();

    (0..table.len())
        .filter(|&row| {
            checks
                .iter()
                .all(|(col, filter)| filter.accepts(&col.values[row]))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Row scoping by hotel and channel
// ---------------------------------------------------------------------------

/// Sorted distinct non-missing values of `column`, as text.
pub fn distinct_labels(table: &Table, column: &str) -> Vec<String> {
    let Some(col) = table.column(column) else {
        return Vec::new();
    };
    let labels: BTreeSet<String> = col.present().map(CellValue::to_string).collect();
    labels.into_iter().collect()
}

/// Rows of `rows` whose `column` value renders as one of `labels`.
pub fn rows_matching(table: &Table, rows: &[usize], column: &str, labels: &[String]) -> Vec<usize> {
    let Some(col) = table.column(column) else {
        return Vec::new();
    };
    rows.iter()
        .copied()
        .filter(|&row| {
            let value = &col.values[row];
            !value.is_missing() && labels.iter().any(|l| *l == value.to_string())
        })
        .collect()
}

/// Split `rows` by whether `column` equals `value`. Rows with a missing
/// channel fall on the "other" side.
pub fn split_by_value(
    table: &Table,
    rows: &[usize],
    column: &str,
    value: &str,
) -> (Vec<usize>, Vec<usize>) {
    let col = table.column(column);
    rows.iter().copied().partition(|&row| {
        col.and_then(|c| c.values.get(row))
            .and_then(CellValue::as_str)
            .is_some_and(|v| v == value)
    })
}
