use std::collections::BTreeMap;

use super::model::{CellValue, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Fixed category orders
// ---------------------------------------------------------------------------

/// Column name → ordered list of category labels.
pub type CategoryOrders = BTreeMap<String, Vec<String>>;

/// Orders applied to the reservation tables so legends stay consistent
/// between hotels and channels.
pub fn default_category_orders() -> CategoryOrders {
    let mut orders = CategoryOrders::new();
    orders.insert(
        "G_Etario".to_string(),
        [
            "De 15 a 24 años",
            "De 25 a 44 años",
            "De 45 a 64 años",
            "65 años o más",
        ]
        .map(String::from)
        .to_vec(),
    );
    orders.insert(
        "Antelacion_Range".to_string(),
        [
            "0-7 días",
            "8-14 días",
            "15-30 días",
            "31-60 días",
            "61-90 días",
            "91-365 días",
            "366+ días",
        ]
        .map(String::from)
        .to_vec(),
    );
    orders.insert(
        "Repetidor".to_string(),
        ["SI", "NO"].map(String::from).to_vec(),
    );
    orders
}

/// Turn every ordered column present in `table` into a categorical column.
///
/// Values that are not one of the listed categories become nulls, the same
/// way a Pandas `Categorical` drops unknown labels.
pub fn apply_category_orders(mut table: Table, orders: &CategoryOrders) -> Table {
    for (name, order) in orders {
        let Some(col) = table.column_mut(name) else {
            continue;
        };
        let categories: Vec<CellValue> = order.iter().cloned().map(CellValue::String).collect();
        let mut dropped = 0usize;
        for value in &mut col.values {
            if !value.is_missing() && !categories.contains(value) {
                *value = CellValue::Null;
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::warn!("{dropped} value(s) of '{name}' are not listed categories and were cleared");
        }
        col.kind = ColumnKind::Categorical;
        col.categories = Some(categories);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn ordered_columns_become_categorical() {
        let table = Table::from_columns(vec![
            Column::inferred("Repetidor", vec![s("NO"), s("SI"), CellValue::Null]),
            Column::inferred("Pension", vec![s("AI"), s("MP"), s("AI")]),
        ]);

        let table = apply_category_orders(table, &default_category_orders());

        let rep = table.column("Repetidor").expect("Repetidor");
        assert_eq!(rep.kind, ColumnKind::Categorical);
        assert_eq!(rep.options(), vec![s("SI"), s("NO")]);
        assert_eq!(table.column("Pension").map(|c| c.kind), Some(ColumnKind::Text));
    }

    #[test]
    fn unknown_labels_are_cleared() {
        let table = Table::from_columns(vec![Column::inferred(
            "G_Etario",
            vec![s("De 25 a 44 años"), s("Menor de 15"), CellValue::Integer(7)],
        )]);

        let table = apply_category_orders(table, &default_category_orders());

        let values = &table.column("G_Etario").expect("G_Etario").values;
        assert_eq!(values, &vec![s("De 25 a 44 años"), CellValue::Null, CellValue::Null]);
    }

    #[test]
    fn absent_columns_are_ignored() {
        let table = Table::from_columns(vec![Column::inferred("Hotel", vec![s("A")])]);
        let out = apply_category_orders(table.clone(), &default_category_orders());
        assert_eq!(out, table);
    }
}
