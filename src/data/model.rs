use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a table column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas/Arrow dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date / timestamp kept as text for simplicity.
    Date(String),
    /// A per-row sequence (Arrow list, JSON array, Python list/tuple/ndarray).
    List(Vec<CellValue>),
    /// A per-row mapping (Arrow struct/map, JSON object, Python dict).
    Map(BTreeMap<String, CellValue>),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
                List(_) => 6,
                Map(_) => 7,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            // Negative zero sorts as zero.
            (Float(a), Float(b)) => (a + 0.0).total_cmp(&(b + 0.0)),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            (List(a), List(b)) => a.cmp(b),
            (Map(a), Map(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => (f + 0.0).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::List(items) => items.hash(state),
            CellValue::Map(entries) => entries.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            CellValue::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric colour mapping.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Borrow the text of a string cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Missing-value marker: explicit null or a floating-point NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Sequence or mapping rather than an atomic scalar.
    pub fn is_composite(&self) -> bool {
        matches!(self, CellValue::List(_) | CellValue::Map(_))
    }

    /// The cell as stored in a float column: integers widen, `-0.0` becomes `0.0`.
    fn widened(self) -> CellValue {
        match self {
            CellValue::Integer(i) => CellValue::Float(i as f64),
            CellValue::Float(f) => CellValue::Float(f + 0.0),
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – declared semantic type of a column
// ---------------------------------------------------------------------------

/// Schema-level type of a column.
///
/// `Text` doubles as the "object" kind for dynamically typed sources: a
/// column whose cells are a mix of strings, lists or other values is declared
/// `Text`, and it is up to consumers to sample it if they need scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Text,
    /// Text restricted to an ordered list of categories.
    Categorical,
    Integer,
    Float,
    Boolean,
    Temporal,
    /// Declared list/struct/map column.
    Nested,
}

impl ColumnKind {
    /// Text, category, integer or float: kinds usable as a colour encoding.
    pub fn is_encodable(self) -> bool {
        matches!(
            self,
            ColumnKind::Text | ColumnKind::Categorical | ColumnKind::Integer | ColumnKind::Float
        )
    }

    /// Integer or float: drawn with a continuous scale and filtered by range.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }

    /// Kind of a column after concatenating two columns of these kinds.
    pub fn unify(self, other: ColumnKind) -> ColumnKind {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Float) | (ColumnKind::Float, ColumnKind::Integer) => {
                ColumnKind::Float
            }
            _ => ColumnKind::Text,
        }
    }

    /// Infer a kind from the non-missing values of a dynamically typed column.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a CellValue>) -> ColumnKind {
        let mut kind: Option<ColumnKind> = None;
        for value in values {
            if value.is_missing() {
                continue;
            }
            let this = match value {
                CellValue::Integer(_) => ColumnKind::Integer,
                CellValue::Float(_) => ColumnKind::Float,
                CellValue::Bool(_) => ColumnKind::Boolean,
                CellValue::Date(_) => ColumnKind::Temporal,
                _ => ColumnKind::Text,
            };
            kind = Some(match kind {
                None => this,
                Some(prev) => prev.unify(this),
            });
            if kind == Some(ColumnKind::Text) {
                break;
            }
        }
        kind.unwrap_or(ColumnKind::Text)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Text => "text",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Temporal => "temporal",
            ColumnKind::Nested => "nested",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Column – one named, typed column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
    /// Category order when `kind` is `Categorical`.
    pub categories: Option<Vec<CellValue>>,
}

impl Column {
    /// Column with an explicitly declared kind.
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<CellValue>) -> Self {
        let mut column = Column {
            name: name.into(),
            kind,
            values,
            categories: None,
        };
        column.widen_floats();
        column
    }

    /// A float column holds only float cells, so `3` and `3.0` are one value.
    fn widen_floats(&mut self) {
        if self.kind != ColumnKind::Float {
            return;
        }
        for value in &mut self.values {
            *value = std::mem::replace(value, CellValue::Null).widened();
        }
    }

    /// Column whose kind is inferred from its values.
    pub fn inferred(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let kind = ColumnKind::infer(&values);
        Column::new(name, kind, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterator over the non-missing cells.
    pub fn present(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().filter(|v| !v.is_missing())
    }

    /// Number of distinct non-missing values, or `None` when the column
    /// holds composite cells whose values cannot serve as category keys.
    pub fn distinct_count(&self) -> Option<usize> {
        let mut seen: BTreeSet<&CellValue> = BTreeSet::new();
        for value in self.present() {
            if value.is_composite() {
                return None;
            }
            seen.insert(value);
        }
        Some(seen.len())
    }

    /// Sorted distinct non-missing values, or the category order for
    /// categorical columns.
    pub fn options(&self) -> Vec<CellValue> {
        if let Some(categories) = &self.categories {
            return categories.clone();
        }
        let unique: BTreeSet<&CellValue> = self.present().collect();
        unique.into_iter().cloned().collect()
    }

    /// Numeric min/max over the non-missing values.
    pub fn numeric_bounds(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter_map(CellValue::as_f64)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Copy of this column restricted to `rows`.
    pub fn take(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            kind: self.kind,
            values: rows
                .iter()
                .map(|&i| self.values.get(i).cloned().unwrap_or(CellValue::Null))
                .collect(),
            categories: self.categories.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Ordered collection of equally long, named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, padding short columns with nulls so all share the
    /// longest column's row count.
    pub fn from_columns(mut columns: Vec<Column>) -> Self {
        let n_rows = columns.iter().map(Column::len).max().unwrap_or(0);
        for col in &mut columns {
            col.values.resize(n_rows, CellValue::Null);
        }
        Table { columns, n_rows }
    }

    /// Build a table from row records, inferring each column's kind.
    /// Column order follows first appearance across the records.
    pub fn from_records(records: Vec<BTreeMap<String, CellValue>>, order: &[String]) -> Self {
        let mut names: Vec<String> = order.to_vec();
        for rec in &records {
            for key in rec.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }
        let columns = names
            .into_iter()
            .map(|name| {
                let values = records
                    .iter()
                    .map(|rec| rec.get(&name).cloned().unwrap_or(CellValue::Null))
                    .collect();
                Column::inferred(name, values)
            })
            .collect();
        Table::from_columns(columns)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Cell at (`row`, `column`); `None` for an absent column or row.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.column(column)?.values.get(row)
    }

    /// Row-filtered copy of the table with the same schema.
    pub fn take(&self, rows: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            n_rows: rows.len(),
        }
    }

    /// Append the rows of `other`, aligning columns by name. Columns absent
    /// on either side are filled with nulls; new columns go last.
    pub fn concat(mut self, other: Table) -> Table {
        let own_rows = self.n_rows;
        let other_rows = other.n_rows;
        let mut other_columns = other.columns;

        for col in &mut self.columns {
            match other_columns.iter().position(|c| c.name == col.name) {
                Some(idx) => {
                    let incoming = other_columns.remove(idx);
                    col.kind = col.kind.unify(incoming.kind);
                    if col.categories != incoming.categories {
                        col.categories = None;
                    }
                    col.values.extend(incoming.values);
                    col.widen_floats();
                }
                None => col.values.resize(own_rows + other_rows, CellValue::Null),
            }
        }
        for mut incoming in other_columns {
            let mut values = vec![CellValue::Null; own_rows];
            values.append(&mut incoming.values);
            incoming.values = values;
            self.columns.push(incoming);
        }
        self.n_rows = own_rows + other_rows;
        self
    }
}
