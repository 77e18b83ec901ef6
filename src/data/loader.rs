use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a reservation table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – Parquet file as written by `df.to_parquet()` (recommended)
/// * `.json`    – `[{ "Hotel": "...", "lat": 51.5, ... }, ...]`
/// * `.csv`     – header row followed by one reservation per line
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load one file per market and stack them into a single table.
///
/// Columns missing from a market are added to it as nulls, so every row ends
/// up with the union of all columns.
pub fn load_markets<P: AsRef<Path>>(paths: &[P]) -> Result<Table> {
    let mut combined: Option<Table> = None;
    for path in paths {
        let path = path.as_ref();
        let table = load_file(path).with_context(|| format!("loading {}", path.display()))?;
        log::info!(
            "Loaded {} reservations with {} columns from {}",
            table.len(),
            table.columns().len(),
            path.display()
        );
        combined = Some(match combined {
            None => table,
            Some(acc) => acc.concat(table),
        });
    }
    combined.context("no market files given")
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Hotel": "Spring Arona", "lat": 51.5, "lon": -0.12, "Agencia": ["A", "B"] },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    let mut order: Vec<String> = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = BTreeMap::new();
        for (key, val) in obj {
            if !order.contains(key) {
                order.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(Table::from_records(rows, &order))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        JsonValue::Array(items) => CellValue::List(items.iter().map(json_to_cell).collect()),
        JsonValue::Object(entries) => CellValue::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), json_to_cell(v)))
                .collect(),
        ),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one reservation per record.
/// Cell types are guessed per cell and column kinds inferred afterwards.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, values) in columns.iter_mut().enumerate() {
            values.push(guess_cell_type(record.get(col_idx).unwrap_or("")));
        }
    }

    Ok(Table::from_columns(
        headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::inferred(name, values))
            .collect(),
    ))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of reservations.
///
/// Every column keeps the kind its Arrow type declares (see [`arrow_kind`]);
/// list and struct columns are loaded as nested cells rather than rejected.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    // Pandas writes its index as an extra column; it is not reservation data.
    let fields: Vec<(usize, String, ColumnKind)> = builder
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.name().starts_with("__index_level_"))
        .map(|(i, f)| (i, f.name().clone(), arrow_kind(f.data_type())))
        .collect();

    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<CellValue>> = vec![Vec::new(); fields.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for ((col_idx, name, _), out) in fields.iter().zip(values.iter_mut()) {
            let array = batch.column(*col_idx);
            let cells = array_cells(array).with_context(|| format!("column '{name}'"))?;
            out.extend(cells);
        }
    }

    Ok(Table::from_columns(
        fields
            .into_iter()
            .zip(values)
            .map(|((_, name, kind), values)| Column::new(name, kind, values))
            .collect(),
    ))
}

// -- Parquet / Arrow helpers --

/// Declared column kind for an Arrow type.
pub fn arrow_kind(data_type: &DataType) -> ColumnKind {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnKind::Text,
        DataType::Dictionary(_, value) => arrow_kind(value),
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnKind::Integer,
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => ColumnKind::Float,
        DataType::Boolean => ColumnKind::Boolean,
        DataType::Date32
        | DataType::Date64
        | DataType::Timestamp(_, _)
        | DataType::Time32(_)
        | DataType::Time64(_) => ColumnKind::Temporal,
        DataType::List(_)
        | DataType::LargeList(_)
        | DataType::FixedSizeList(_, _)
        | DataType::Struct(_)
        | DataType::Map(_, _) => ColumnKind::Nested,
        // Anything else is rendered as text and left to the caller to judge.
        _ => ColumnKind::Text,
    }
}

/// Convert every row of an Arrow array into cells.
fn array_cells(array: &ArrayRef) -> Result<Vec<CellValue>> {
    let cells = match array.data_type() {
        DataType::Utf8 => {
            let arr = array.as_string::<i32>();
            (0..arr.len())
                .map(|i| text_cell(arr.is_null(i), || arr.value(i)))
                .collect()
        }
        DataType::LargeUtf8 => {
            let arr = array.as_string::<i64>();
            (0..arr.len())
                .map(|i| text_cell(arr.is_null(i), || arr.value(i)))
                .collect()
        }
        DataType::Int8 => ints(array.as_primitive::<Int8Type>().iter().map(|v| v.map(i64::from))),
        DataType::Int16 => ints(array.as_primitive::<Int16Type>().iter().map(|v| v.map(i64::from))),
        DataType::Int32 => ints(array.as_primitive::<Int32Type>().iter().map(|v| v.map(i64::from))),
        DataType::Int64 => ints(array.as_primitive::<Int64Type>().iter()),
        DataType::UInt8 => ints(array.as_primitive::<UInt8Type>().iter().map(|v| v.map(i64::from))),
        DataType::UInt16 => {
            ints(array.as_primitive::<UInt16Type>().iter().map(|v| v.map(i64::from)))
        }
        DataType::UInt32 => {
            ints(array.as_primitive::<UInt32Type>().iter().map(|v| v.map(i64::from)))
        }
        DataType::UInt64 => ints(
            array
                .as_primitive::<UInt64Type>()
                .iter()
                .map(|v| v.map(|u| i64::try_from(u).unwrap_or(i64::MAX))),
        ),
        DataType::Float32 => floats(array.as_primitive::<Float32Type>().iter().map(|v| v.map(f64::from))),
        DataType::Float64 => floats(array.as_primitive::<Float64Type>().iter()),
        DataType::Boolean => array
            .as_boolean()
            .iter()
            .map(|v| v.map_or(CellValue::Null, CellValue::Bool))
            .collect(),
        DataType::List(_) => {
            let arr = array.as_list::<i32>();
            let mut out = Vec::with_capacity(arr.len());
            for i in 0..arr.len() {
                out.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::List(array_cells(&arr.value(i))?)
                });
            }
            out
        }
        DataType::LargeList(_) => {
            let arr = array.as_list::<i64>();
            let mut out = Vec::with_capacity(arr.len());
            for i in 0..arr.len() {
                out.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::List(array_cells(&arr.value(i))?)
                });
            }
            out
        }
        DataType::FixedSizeList(_, _) => {
            let arr = array.as_fixed_size_list();
            let mut out = Vec::with_capacity(arr.len());
            for i in 0..arr.len() {
                out.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::List(array_cells(&arr.value(i))?)
                });
            }
            out
        }
        DataType::Struct(fields) => {
            let arr = array.as_struct();
            let children = arr
                .columns()
                .iter()
                .map(array_cells)
                .collect::<Result<Vec<_>>>()?;
            (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        return CellValue::Null;
                    }
                    CellValue::Map(
                        fields
                            .iter()
                            .zip(&children)
                            .map(|(f, child)| {
                                (f.name().clone(), child.get(i).cloned().unwrap_or(CellValue::Null))
                            })
                            .collect(),
                    )
                })
                .collect()
        }
        DataType::Dictionary(_, _)
        | DataType::Utf8View
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _)
        | DataType::Float16 => {
            // Decode through the matching plain type.
            let target = match arrow_kind(array.data_type()) {
                ColumnKind::Float => DataType::Float64,
                ColumnKind::Integer => DataType::Int64,
                _ => DataType::Utf8,
            };
            let plain = cast(array, &target)
                .with_context(|| format!("casting {:?} to {target:?}", array.data_type()))?;
            array_cells(&plain)?
        }
        DataType::Date32
        | DataType::Date64
        | DataType::Timestamp(_, _)
        | DataType::Time32(_)
        | DataType::Time64(_) => {
            let text = cast(array, &DataType::Utf8)
                .with_context(|| format!("formatting {:?} as text", array.data_type()))?;
            let arr = text.as_string::<i32>();
            (0..arr.len())
                .map(|i| {
                    if arr.is_null(i) {
                        CellValue::Null
                    } else {
                        CellValue::Date(arr.value(i).to_string())
                    }
                })
                .collect()
        }
        DataType::Map(_, _) => {
            let arr = array.as_map();
            let mut out = Vec::with_capacity(arr.len());
            for i in 0..arr.len() {
                if arr.is_null(i) {
                    out.push(CellValue::Null);
                    continue;
                }
                let entries = arr.value(i);
                let keys = array_cells(entries.column(0))?;
                let vals = array_cells(entries.column(1))?;
                out.push(CellValue::Map(
                    keys.into_iter().map(|k| k.to_string()).zip(vals).collect(),
                ));
            }
            out
        }
        DataType::Null => vec![CellValue::Null; array.len()],
        other => match cast(array, &DataType::Utf8) {
            Ok(text) => array_cells(&text)?,
            Err(e) => {
                log::warn!("Column type {other:?} cannot be read ({e}); loading it as nulls");
                vec![CellValue::Null; array.len()]
            }
        },
    };
    Ok(cells)
}

fn text_cell<'a>(is_null: bool, value: impl FnOnce() -> &'a str) -> CellValue {
    if is_null {
        CellValue::Null
    } else {
        CellValue::String(value().to_string())
    }
}

fn ints(values: impl Iterator<Item = Option<i64>>) -> Vec<CellValue> {
    values
        .map(|v| v.map_or(CellValue::Null, CellValue::Integer))
        .collect()
}

fn floats(values: impl Iterator<Item = Option<f64>>) -> Vec<CellValue> {
    values
        .map(|v| match v {
            Some(f) if !f.is_nan() => CellValue::Float(f),
            _ => CellValue::Null,
        })
        .collect()
}
