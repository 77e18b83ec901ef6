use std::fmt;

use super::model::{CellValue, Column, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Colour-encoding eligibility
// ---------------------------------------------------------------------------

/// Columns offered in the "Color by" selector, in display order.
pub const CANDIDATE_COLUMNS: [&str; 8] = [
    "Pension",
    "Tipo_Habitacion",
    "GastoTotal",
    "Noches",
    "Repetidor",
    "Antelacion_Range",
    "G_Etario",
    "Agencia",
];

/// How many non-missing cells are inspected for composite values.
///
/// Only a prefix of the column is sampled; a list appearing after it is
/// caught by the cardinality step instead.
pub const SHAPE_SAMPLE_SIZE: usize = 10;

/// Why a candidate column was left out of the eligible list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// The table has no such column.
    Missing,
    /// The declared kind is not text, category, integer or float.
    UnsupportedKind(ColumnKind),
    /// A sampled cell is a list or mapping.
    CompositeSample,
    /// The values cannot be compared as category keys.
    Incomparable,
    /// Fewer than two distinct non-missing values.
    Degenerate(usize),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::Missing => write!(f, "column not present"),
            Exclusion::UnsupportedKind(kind) => write!(f, "unsupported {kind} column"),
            Exclusion::CompositeSample => write!(f, "sampled values are lists or mappings"),
            Exclusion::Incomparable => write!(f, "values are not comparable"),
            Exclusion::Degenerate(n) => write!(f, "only {n} distinct value(s)"),
        }
    }
}

/// Check a single column; `Ok(())` means it can be used as a colour encoding.
pub fn check_column(column: &Column) -> Result<(), Exclusion> {
    if !column.kind.is_encodable() {
        return Err(Exclusion::UnsupportedKind(column.kind));
    }
    if column
        .present()
        .take(SHAPE_SAMPLE_SIZE)
        .any(CellValue::is_composite)
    {
        return Err(Exclusion::CompositeSample);
    }
    match column.distinct_count() {
        None => Err(Exclusion::Incomparable),
        Some(n) if n <= 1 => Err(Exclusion::Degenerate(n)),
        Some(_) => Ok(()),
    }
}

/// Check a candidate by name against `table`.
pub fn check_candidate(table: &Table, name: &str) -> Result<(), Exclusion> {
    let column = table.column(name).ok_or(Exclusion::Missing)?;
    check_column(column)
}

/// Return the candidates usable as a colour encoding for `table`, in
/// candidate order.
///
/// Never fails: a column that is absent, of the wrong kind, list-valued or
/// constant is simply left out, so the result may be empty.
pub fn eligible_columns<S: AsRef<str>>(table: &Table, candidates: &[S]) -> Vec<String> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| match check_candidate(table, name) {
            Ok(()) => true,
            Err(reason) => {
                log::debug!("'{name}' not colorable: {reason}");
                false
            }
        })
        .map(str::to_string)
        .collect()
}

/// [`eligible_columns`] over [`CANDIDATE_COLUMNS`].
pub fn colorable_columns(table: &Table) -> Vec<String> {
    eligible_columns(table, &CANDIDATE_COLUMNS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn constant_column_is_degenerate() {
        let col = Column::inferred("Repetidor", vec![s("SI"), s("SI"), CellValue::Null]);
        assert_eq!(check_column(&col), Err(Exclusion::Degenerate(1)));
    }

    #[test]
    fn boolean_and_temporal_kinds_are_unsupported() {
        let flags = Column::inferred("Repetidor", vec![CellValue::Bool(true), CellValue::Bool(false)]);
        assert_eq!(
            check_column(&flags),
            Err(Exclusion::UnsupportedKind(ColumnKind::Boolean))
        );

        let dates = Column::new("Noches", ColumnKind::Temporal, vec![
            CellValue::Date("2025-01-01".into()),
            CellValue::Date("2025-02-01".into()),
        ]);
        assert_eq!(
            check_column(&dates),
            Err(Exclusion::UnsupportedKind(ColumnKind::Temporal))
        );
    }

    #[test]
    fn nested_kind_is_unsupported() {
        let col = Column::new("Agencia", ColumnKind::Nested, vec![
            CellValue::List(vec![s("a")]),
            CellValue::List(vec![s("b")]),
        ]);
        assert_eq!(
            check_column(&col),
            Err(Exclusion::UnsupportedKind(ColumnKind::Nested))
        );
    }

    #[test]
    fn missing_values_are_skipped_when_sampling() {
        let mut values = vec![CellValue::Null; 20];
        values.push(CellValue::Map(Default::default()));
        values.push(s("x"));
        let col = Column::inferred("Agencia", values);
        assert_eq!(check_column(&col), Err(Exclusion::CompositeSample));
    }

    #[test]
    fn composite_after_sample_is_incomparable() {
        let mut values: Vec<CellValue> = (0..SHAPE_SAMPLE_SIZE).map(|i| s(&format!("A{i}"))).collect();
        values.push(CellValue::List(vec![s("late")]));
        let col = Column::inferred("Agencia", values);
        assert_eq!(check_column(&col), Err(Exclusion::Incomparable));
    }

    #[test]
    fn categorical_column_is_encodable() {
        let mut col = Column::inferred("G_Etario", vec![s("65 años o más"), s("De 15 a 24 años")]);
        col.kind = ColumnKind::Categorical;
        assert_eq!(check_column(&col), Ok(()));
    }

    #[test]
    fn absent_candidate_is_missing() {
        let table = Table::default();
        assert_eq!(check_candidate(&table, "Pension"), Err(Exclusion::Missing));
        assert!(colorable_columns(&table).is_empty());
    }
}
