//! Colour-column eligibility over hand-built reservation tables.

use hotel_atlas::data::eligibility::{
    check_candidate, colorable_columns, eligible_columns, Exclusion, CANDIDATE_COLUMNS,
};
use hotel_atlas::data::model::{CellValue, Column, ColumnKind, Table};

fn s(v: &str) -> CellValue {
    CellValue::String(v.to_string())
}

fn strings(values: &[&str]) -> Vec<CellValue> {
    values.iter().map(|v| s(v)).collect()
}

/// A table with every candidate column populated with usable values.
fn full_table() -> Table {
    Table::from_columns(vec![
        Column::inferred("Hotel", strings(&["Arona", "Arona", "Vulcano", "Vulcano"])),
        Column::inferred("Agencia", strings(&["TUI", "Jet2", "TUI", "TUI"])),
        Column::inferred("G_Etario", strings(&[
            "De 15 a 24 años",
            "65 años o más",
            "65 años o más",
            "De 25 a 44 años",
        ])),
        Column::inferred("Antelacion_Range", strings(&["0-7 días", "8-14 días", "0-7 días", "366+ días"])),
        Column::inferred("Repetidor", strings(&["SI", "NO", "NO", "NO"])),
        Column::inferred("Noches", vec![
            CellValue::Integer(3),
            CellValue::Integer(5),
            CellValue::Integer(3),
            CellValue::Integer(7),
        ]),
        Column::inferred("GastoTotal", vec![
            CellValue::Float(120.5),
            CellValue::Float(300.0),
            CellValue::Float(85.25),
            CellValue::Float(120.5),
        ]),
        Column::inferred("Tipo_Habitacion", strings(&["DOBLE", "SUITE", "DOBLE", "DOBLE"])),
        Column::inferred("Pension", strings(&["AI", "AI", "MP", "AI"])),
    ])
}

#[test]
fn pension_and_nights_are_colorable() {
    let table = Table::from_columns(vec![
        Column::inferred("Pension", strings(&["AI", "AI", "MP", "AI"])),
        Column::inferred("Noches", vec![
            CellValue::Integer(3),
            CellValue::Integer(5),
            CellValue::Integer(3),
            CellValue::Integer(7),
        ]),
        Column::inferred("Hotel", strings(&["A", "B", "A", "B"])),
    ]);

    assert_eq!(colorable_columns(&table), vec!["Pension", "Noches"]);
}

#[test]
fn constant_repeat_flag_is_excluded() {
    let table = Table::from_columns(vec![
        Column::inferred("Repetidor", strings(&["SI", "SI", "SI", "SI"])),
        Column::inferred("Pension", strings(&["AI", "MP", "AI", "AI"])),
    ]);

    assert_eq!(colorable_columns(&table), vec!["Pension"]);
    assert_eq!(check_candidate(&table, "Repetidor"), Err(Exclusion::Degenerate(1)));
}

#[test]
fn list_valued_agency_is_excluded() {
    let table = Table::from_columns(vec![Column::inferred("Agencia", vec![
        CellValue::List(strings(&["TUI", "Jet2"])),
        CellValue::List(strings(&["TUI"])),
        CellValue::List(strings(&["loveholidays"])),
    ])]);

    assert_eq!(table.column("Agencia").map(|c| c.kind), Some(ColumnKind::Text));
    assert!(colorable_columns(&table).is_empty());
    assert_eq!(check_candidate(&table, "Agencia"), Err(Exclusion::CompositeSample));
}

#[test]
fn absent_room_type_is_skipped_silently() {
    let table = Table::from_columns(vec![
        Column::inferred("Pension", strings(&["AI", "MP"])),
        Column::inferred("Noches", vec![CellValue::Integer(2), CellValue::Integer(4)]),
    ]);

    let result = colorable_columns(&table);
    assert!(!result.iter().any(|c| c == "Tipo_Habitacion"));
    assert_eq!(result, vec!["Pension", "Noches"]);
}

#[test]
fn zero_rows_yield_nothing() {
    let table = full_table().take(&[]);
    assert!(table.is_empty());
    assert_eq!(table.columns().len(), 9);
    assert!(colorable_columns(&table).is_empty());
}

#[test]
fn float_spend_is_colorable() {
    let table = Table::from_columns(vec![Column::inferred("GastoTotal", vec![
        CellValue::Float(120.5),
        CellValue::Float(300.0),
        CellValue::Float(85.25),
        CellValue::Float(120.5),
    ])]);

    assert_eq!(colorable_columns(&table), vec!["GastoTotal"]);
}

#[test]
fn result_is_an_ordered_subset_of_present_candidates() {
    let table = full_table();
    let candidates = ["Noches", "Hotel_Inexistente", "Pension", "Agencia", "Repetidor"];

    let result = eligible_columns(&table, &candidates);

    assert_eq!(result, vec!["Noches", "Pension", "Agencia", "Repetidor"]);
    let mut last = 0;
    for name in &result {
        let pos = candidates.iter().position(|c| c == name).expect("candidate");
        assert!(pos >= last);
        last = pos;
        assert!(table.has_column(name));
    }
}

#[test]
fn default_candidates_follow_declared_order() {
    let result = colorable_columns(&full_table());
    assert_eq!(result, CANDIDATE_COLUMNS.to_vec());
}

#[test]
fn repeated_calls_agree() {
    let table = full_table();
    let first = colorable_columns(&table);
    let second = colorable_columns(&table);
    assert_eq!(first, second);
}

#[test]
fn single_value_among_missing_is_degenerate() {
    let table = Table::from_columns(vec![Column::inferred("GastoTotal", vec![
        CellValue::Null,
        CellValue::Float(99.0),
        CellValue::Float(f64::NAN),
        CellValue::Null,
    ])]);

    assert_eq!(check_candidate(&table, "GastoTotal"), Err(Exclusion::Degenerate(1)));
}

#[test]
fn unsupported_kinds_are_excluded() {
    let table = Table::from_columns(vec![
        Column::inferred("Repetidor", vec![CellValue::Bool(true), CellValue::Bool(false)]),
        Column::new("Antelacion_Range", ColumnKind::Temporal, vec![
            CellValue::Date("2025-01-03".into()),
            CellValue::Date("2025-03-01".into()),
        ]),
        Column::new("Agencia", ColumnKind::Nested, vec![
            CellValue::Map(Default::default()),
            CellValue::Null,
        ]),
    ]);

    assert!(colorable_columns(&table).is_empty());
    assert_eq!(
        check_candidate(&table, "Repetidor"),
        Err(Exclusion::UnsupportedKind(ColumnKind::Boolean))
    );
}

#[test]
fn composite_in_first_ten_values_excludes_scalar_typed_column() {
    let mut values = strings(&["TUI", "Jet2", "TUI", "Jet2", "TUI"]);
    values.push(CellValue::List(strings(&["TUI"])));
    values.extend(strings(&["Jet2", "TUI"]));
    let mut column = Column::inferred("Agencia", values);
    column.kind = ColumnKind::Text;
    let table = Table::from_columns(vec![column]);

    assert_eq!(check_candidate(&table, "Agencia"), Err(Exclusion::CompositeSample));
}

#[test]
fn hotel_subset_changes_the_answer() {
    let table = full_table();
    // Vulcano: two room bookings, both DOBLE, both non-repeat, both TUI.
    let vulcano = table.take(&[2, 3]);
    assert_eq!(
        colorable_columns(&vulcano),
        vec!["Pension", "GastoTotal", "Noches", "Antelacion_Range", "G_Etario"]
    );
}

#[test]
fn integer_market_joined_with_float_market_is_degenerate() {
    let uk = Table::from_columns(vec![Column::inferred("Noches", vec![
        CellValue::Integer(3),
        CellValue::Integer(3),
    ])]);
    let ie = Table::from_columns(vec![Column::new("Noches", ColumnKind::Float, vec![
        CellValue::Float(3.0),
    ])]);

    let table = uk.concat(ie);

    assert_eq!(table.column("Noches").map(|c| c.kind), Some(ColumnKind::Float));
    assert_eq!(check_candidate(&table, "Noches"), Err(Exclusion::Degenerate(1)));
}

#[test]
fn signed_zeros_are_one_value() {
    let table = Table::from_columns(vec![Column::inferred("GastoTotal", vec![
        CellValue::Float(0.0),
        CellValue::Float(-0.0),
    ])]);

    assert_eq!(check_candidate(&table, "GastoTotal"), Err(Exclusion::Degenerate(1)));
    assert!(colorable_columns(&table).is_empty());
}

#[test]
fn integer_and_float_spellings_are_one_value() {
    let table = Table::from_columns(vec![Column::inferred("GastoTotal", vec![
        CellValue::Integer(300),
        CellValue::Float(300.0),
    ])]);

    assert_eq!(check_candidate(&table, "GastoTotal"), Err(Exclusion::Degenerate(1)));
}
