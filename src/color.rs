use std::collections::BTreeMap;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::data::model::{CellValue, Column, Table};

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

/// Qualitative "Bold" palette used for discrete colour keys.
const BOLD_HEX: [&str; 11] = [
    "#7f3c8d", "#11a579", "#3969ac", "#f2b701", "#e73f74", "#80ba5a", "#e68310", "#008695",
    "#cf1c90", "#f97b72", "#a5aa99",
];

/// Viridis stops used for continuous colour keys.
const VIRIDIS_HEX: [&str; 10] = [
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde725",
];

/// Colour for rows whose colour value is missing.
pub const MISSING_COLOR: Color32 = Color32::GRAY;

fn parse_hex(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("bad palette colour {hex}: {e}");
            MISSING_COLOR
        }
    }
}

/// Parsed palettes, built once at startup.
#[derive(Debug, Clone)]
pub struct Palettes {
    pub qualitative: Vec<Color32>,
    sequential: Vec<LinSrgb>,
}

impl Default for Palettes {
    fn default() -> Self {
        Palettes {
            qualitative: BOLD_HEX.iter().map(|h| parse_hex(h)).collect(),
            sequential: VIRIDIS_HEX
                .iter()
                .map(|h| {
                    let c = parse_hex(h);
                    Srgb::new(c.r(), c.g(), c.b()).into_format::<f32>().into_linear()
                })
                .collect(),
        }
    }
}

impl Palettes {
    /// The `i`-th qualitative colour, cycling when `i` exceeds the palette.
    pub fn discrete(&self, i: usize) -> Color32 {
        if self.qualitative.is_empty() {
            return MISSING_COLOR;
        }
        self.qualitative[i % self.qualitative.len()]
    }

    /// Sample the sequential scale at `t` in `[0, 1]`.
    pub fn continuous(&self, t: f64) -> Color32 {
        let n = self.sequential.len();
        if n == 0 {
            return MISSING_COLOR;
        }
        if n == 1 {
            return to_color32(self.sequential[0]);
        }
        let pos = t.clamp(0.0, 1.0) as f32 * (n - 1) as f32;
        let i = (pos.floor() as usize).min(n - 2);
        let mixed = self.sequential[i].mix(self.sequential[i + 1], pos - i as f32);
        to_color32(mixed)
    }
}

fn to_color32(c: LinSrgb) -> Color32 {
    let rgb: Srgb<u8> = Srgb::from_linear(c);
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Fixed colour mapping: cell value → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a column to qualitative colours, so the same
/// value keeps its colour in every plot.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<CellValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the column's sorted distinct values.
    pub fn new(column: &Column, palettes: &Palettes) -> Self {
        let mapping = column
            .options()
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v, palettes.discrete(i)))
            .collect();

        ColorMap {
            column: column.name.clone(),
            mapping,
            default_color: MISSING_COLOR,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &CellValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn contains(&self, value: &CellValue) -> bool {
        self.mapping.contains_key(value)
    }

    /// Return the legend entries (value label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (v.to_string(), *c))
            .collect()
    }
}

/// Fixed colour maps, keyed by column name. Built from the full table when it
/// is ingested; read-only afterwards.
pub type ColorMappings = BTreeMap<String, ColorMap>;

pub fn build_color_mappings(table: &Table, columns: &[String], palettes: &Palettes) -> ColorMappings {
    columns
        .iter()
        .filter_map(|name| table.column(name))
        .map(|col| (col.name.clone(), ColorMap::new(col, palettes)))
        .collect()
}

// ---------------------------------------------------------------------------
// Encoding decision
// ---------------------------------------------------------------------------

/// How a colour column is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingScale {
    Continuous,
    Discrete,
}

impl EncodingScale {
    /// Integer and float columns get a continuous scale, everything else a
    /// discrete one.
    pub fn for_column(column: &Column) -> Self {
        if column.kind.is_numeric() {
            EncodingScale::Continuous
        } else {
            EncodingScale::Discrete
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn bold_palette_parses() {
        let p = Palettes::default();
        assert_eq!(p.qualitative.len(), 11);
        assert_eq!(p.discrete(0), Color32::from_rgb(0x7f, 0x3c, 0x8d));
        assert_eq!(p.discrete(11), p.discrete(0));
    }

    fn close(a: Color32, b: Color32) -> bool {
        let d = |x: u8, y: u8| (x as i16 - y as i16).abs() <= 1;
        d(a.r(), b.r()) && d(a.g(), b.g()) && d(a.b(), b.b())
    }

    #[test]
    fn continuous_scale_hits_endpoints() {
        let p = Palettes::default();
        assert!(close(p.continuous(0.0), Color32::from_rgb(0x44, 0x01, 0x54)));
        assert!(close(p.continuous(1.0), Color32::from_rgb(0xfd, 0xe7, 0x25)));
        assert_eq!(p.continuous(7.0), p.continuous(1.0));
        assert_eq!(p.continuous(-1.0), p.continuous(0.0));
    }

    #[test]
    fn color_map_is_sorted_and_stable() {
        let p = Palettes::default();
        let col = Column::inferred("Pension", vec![s("MP"), s("AI"), s("MP"), CellValue::Null]);
        let map = ColorMap::new(&col, &p);
        assert_eq!(map.color_for(&s("AI")), p.discrete(0));
        assert_eq!(map.color_for(&s("MP")), p.discrete(1));
        assert_eq!(map.color_for(&s("SA")), MISSING_COLOR);
        assert_eq!(map.legend_entries().len(), 2);
    }

    #[test]
    fn mappings_skip_absent_columns() {
        let table = Table::from_columns(vec![Column::inferred("Pension", vec![s("AI")])]);
        let maps = build_color_mappings(
            &table,
            &["Pension".to_string(), "Tipo_Habitacion".to_string()],
            &Palettes::default(),
        );
        assert_eq!(maps.keys().collect::<Vec<_>>(), vec!["Pension"]);
    }

    #[test]
    fn numeric_columns_are_continuous() {
        let col = Column::inferred("Noches", vec![CellValue::Integer(3), CellValue::Integer(5)]);
        assert_eq!(EncodingScale::for_column(&col), EncodingScale::Continuous);
        let col = Column::inferred("Pension", vec![s("AI")]);
        assert_eq!(EncodingScale::for_column(&col), EncodingScale::Discrete);
    }
}
