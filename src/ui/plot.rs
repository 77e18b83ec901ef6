use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Legend, MarkerShape, Plot, PlotPoints, Points};

use crate::color::{ColorMappings, EncodingScale, Palettes, MISSING_COLOR};
use crate::config::DashboardConfig;
use crate::data::model::{CellValue, Table};
use crate::state::{AppState, MapPanel};

/// Bins drawn for a continuous colour column.
pub const CONTINUOUS_BINS: usize = 8;

const MISSING_LABEL: &str = "<missing>";

// ---------------------------------------------------------------------------
// Point series: one legend entry each
// ---------------------------------------------------------------------------

/// Points sharing one colour and one legend label.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSeries {
    pub name: String,
    pub color: Color32,
    /// `[lon, lat]` pairs.
    pub points: Vec<[f64; 2]>,
    pub rows: Vec<usize>,
}

impl PointSeries {
    fn new(name: String, color: Color32) -> Self {
        PointSeries {
            name,
            color,
            points: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Group `rows` into coloured series by the value of `color_column`.
///
/// Rows without coordinates are skipped; rows without a colour value go to
/// a grey `<missing>` series drawn last.
pub fn build_series(
    table: &Table,
    rows: &[usize],
    color_column: Option<&str>,
    config: &DashboardConfig,
    mappings: &ColorMappings,
    palettes: &Palettes,
) -> Vec<PointSeries> {
    let (Some(lat), Some(lon)) = (
        table.column(&config.latitude_column),
        table.column(&config.longitude_column),
    ) else {
        return Vec::new();
    };

    let located: Vec<(usize, [f64; 2])> = rows
        .iter()
        .filter_map(|&row| {
            let y = lat.values.get(row)?.as_f64()?;
            let x = lon.values.get(row)?.as_f64()?;
            Some((row, [x, y]))
        })
        .collect();

    let Some(column) = color_column.and_then(|c| table.column(c)) else {
        let mut all = PointSeries::new("reservations".to_string(), palettes.discrete(0));
        for (row, point) in located {
            all.rows.push(row);
            all.points.push(point);
        }
        return vec![all];
    };

    let mut series: Vec<PointSeries> = Vec::new();
    let mut missing = PointSeries::new(MISSING_LABEL.to_string(), MISSING_COLOR);

    match EncodingScale::for_column(column) {
        EncodingScale::Continuous => {
            let values: Vec<Option<f64>> = located
                .iter()
                .map(|(row, _)| column.values[*row].as_f64())
                .collect();
            let (lo, hi) = values.iter().flatten().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), &v| (lo.min(v), hi.max(v)),
            );
            let width = (hi - lo) / CONTINUOUS_BINS as f64;
            let n_bins = if width > 0.0 { CONTINUOUS_BINS } else { 1 };
            let mut bins: Vec<PointSeries> = (0..n_bins)
                .map(|k| {
                    let name = if n_bins == 1 {
                        format!("{lo}")
                    } else {
                        let a = lo + width * k as f64;
                        format!("{a:.1} – {:.1}", a + width)
                    };
                    let t = (k as f64 + 0.5) / n_bins as f64;
                    PointSeries::new(name, palettes.continuous(t))
                })
                .collect();
            for ((row, point), value) in located.into_iter().zip(values) {
                let target = match value {
                    Some(v) if n_bins > 1 => {
                        let k = (((v - lo) / width) as usize).min(n_bins - 1);
                        &mut bins[k]
                    }
                    Some(_) => &mut bins[0],
                    None => &mut missing,
                };
                target.rows.push(row);
                target.points.push(point);
            }
            series = bins;
        }
        EncodingScale::Discrete => {
            let fixed = mappings.get(&column.name);
            // Legend order: fixed mapping, then category order, then appearance.
            let order: Vec<CellValue> = match (fixed, &column.categories) {
                (Some(map), _) => map
                    .legend_entries()
                    .iter()
                    .map(|(label, _)| CellValue::String(label.clone()))
                    .collect(),
                (None, Some(categories)) => categories.clone(),
                (None, None) => Vec::new(),
            };
            let mut keys: Vec<CellValue> = Vec::new();
            for (row, point) in located {
                let value = &column.values[row];
                if value.is_missing() {
                    missing.rows.push(row);
                    missing.points.push(point);
                    continue;
                }
                let idx = match keys.iter().position(|k| k == value) {
                    Some(i) => i,
                    None => {
                        let i = keys.len();
                        let color = match fixed {
                            Some(map) if map.contains(value) => map.color_for(value),
                            _ => {
                                let slot = order.iter().position(|o| o == value).unwrap_or(i);
                                palettes.discrete(slot)
                            }
                        };
                        keys.push(value.clone());
                        series.push(PointSeries::new(value.to_string(), color));
                        i
                    }
                };
                series[idx].rows.push(row);
                series[idx].points.push(point);
            }
            if !order.is_empty() {
                let rank = |name: &str| {
                    order
                        .iter()
                        .position(|o| o.to_string() == name)
                        .unwrap_or(usize::MAX)
                };
                series.sort_by_key(|s| rank(&s.name));
            }
        }
    }

    series.retain(|s| !s.points.is_empty());
    if !missing.points.is_empty() {
        series.push(missing);
    }
    series
}

/// Hover text for one reservation: id, colour value and hover columns.
pub fn hover_text(table: &Table, row: usize, color_column: Option<&str>, config: &DashboardConfig) -> String {
    let mut lines = Vec::new();
    if let Some(id) = table.value(row, &config.id_column) {
        lines.push(id.to_string());
    }
    let columns = color_column
        .into_iter()
        .chain(config.hover_columns.iter().map(String::as_str));
    for name in columns {
        if let Some(value) = table.value(row, name) {
            lines.push(format!("{name}: {value}"));
        }
    }
    lines.join("\n")
}

/// Row of the plotted point closest to `at`, if one lies within `max_distance`.
pub fn nearest_row(series: &[PointSeries], at: [f64; 2], max_distance: f64) -> Option<usize> {
    series
        .iter()
        .flat_map(|s| s.points.iter().zip(&s.rows))
        .map(|(p, &row)| ((p[0] - at[0]).hypot(p[1] - at[1]), row))
        .filter(|(d, _)| *d <= max_distance)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, row)| row)
}

// ---------------------------------------------------------------------------
// Reservation map (central panel)
// ---------------------------------------------------------------------------

/// Render one map panel as a lat/lon scatter.
pub fn reservation_map(ui: &mut Ui, state: &AppState, panel: &MapPanel) {
    let config = &state.config;
    ui.heading(RichText::new(&panel.heading).color(Color32::WHITE));
    ui.label(RichText::new(&panel.title).small());

    let color_col = state.color_column.as_deref();
    let series = build_series(
        &state.table,
        &panel.rows,
        color_col,
        config,
        &state.color_mappings,
        &state.palettes,
    );

    let view = &config.map;
    let half_lon = view.half_span_lon();
    let half_lat = view.half_span_lat();
    let snap = half_lon / 50.0;

    Plot::new(("reservation_map", &panel.heading))
        .height(view.height)
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect((1.0 / view.center_lat.to_radians().cos()) as f32)
        .include_x(view.center_lon - half_lon)
        .include_x(view.center_lon + half_lon)
        .include_y(view.center_lat - half_lat)
        .include_y(view.center_lat + half_lat)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(|name, value| {
            match nearest_row(&series, [value.x, value.y], snap) {
                Some(row) => hover_text(&state.table, row, color_col, config),
                None if name.is_empty() => format!("{:.3}, {:.3}", value.y, value.x),
                None => format!("{name}\n{:.3}, {:.3}", value.y, value.x),
            }
        })
        .show(ui, |plot_ui| {
            for s in &series {
                let points: PlotPoints = s.points.iter().copied().collect();
                plot_ui.points(
                    Points::new(points)
                        .name(&s.name)
                        .color(s.color)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(2.5),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::build_color_mappings;
    use crate::data::categories::apply_category_orders;
    use crate::data::model::Column;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    fn table() -> Table {
        let table = Table::from_columns(vec![
            Column::inferred("reservation_id", vec![s("R1"), s("R2"), s("R3"), s("R4")]),
            Column::inferred("lat", vec![
                CellValue::Float(51.5),
                CellValue::Float(53.3),
                CellValue::Null,
                CellValue::Float(55.9),
            ]),
            Column::inferred("lon", vec![
                CellValue::Float(-0.1),
                CellValue::Float(-6.2),
                CellValue::Float(-3.2),
                CellValue::Float(-4.2),
            ]),
            Column::inferred("Repetidor", vec![s("NO"), s("SI"), s("SI"), CellValue::Null]),
            Column::inferred("Pension", vec![s("MP"), s("AI"), s("AI"), s("SA")]),
            Column::inferred("GastoTotal", vec![
                CellValue::Float(100.0),
                CellValue::Float(180.0),
                CellValue::Float(150.0),
                CellValue::Float(20.0),
            ]),
        ]);
        apply_category_orders(table, &DashboardConfig::default().category_orders)
    }

    #[test]
    fn discrete_series_follow_category_order() {
        let t = table();
        let cfg = DashboardConfig::default();
        let p = Palettes::default();
        let series = build_series(&t, &[0, 1, 2, 3], Some("Repetidor"), &cfg, &ColorMappings::new(), &p);

        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["SI", "NO", "<missing>"]);
        assert_eq!(series[0].color, p.discrete(0));
        assert_eq!(series[1].color, p.discrete(1));
        // Row 2 has no latitude.
        assert_eq!(series[0].rows, vec![1]);
        assert_eq!(series[2].color, MISSING_COLOR);
    }

    #[test]
    fn hover_picks_the_closest_point_in_reach() {
        let t = table();
        let cfg = DashboardConfig::default();
        let p = Palettes::default();
        let series = build_series(&t, &[0, 1, 2, 3], Some("Pension"), &cfg, &ColorMappings::new(), &p);

        assert_eq!(nearest_row(&series, [-6.0, 53.0], 1.0), Some(1));
        assert_eq!(nearest_row(&series, [-4.0, 55.8], 1.0), Some(3));
        assert_eq!(nearest_row(&series, [10.0, 40.0], 1.0), None);
    }

    #[test]
    fn fixed_mapping_colours_survive_row_scope() {
        let t = table();
        let cfg = DashboardConfig::default();
        let p = Palettes::default();
        let maps = build_color_mappings(&t, &cfg.fixed_color_columns, &p);

        // Only SA is plotted, but it keeps the colour of its sorted slot.
        let series = build_series(&t, &[3], Some("Pension"), &cfg, &maps, &p);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "SA");
        assert_eq!(series[0].color, p.discrete(2));
    }

    #[test]
    fn numeric_column_is_binned() {
        let t = table();
        let cfg = DashboardConfig::default();
        let p = Palettes::default();
        let series = build_series(&t, &[0, 1, 3], Some("GastoTotal"), &cfg, &ColorMappings::new(), &p);

        let total: usize = series.iter().map(|s| s.points.len()).sum();
        assert_eq!(total, 3);
        assert_eq!(series.first().map(|s| s.rows.clone()), Some(vec![3]));
        assert_eq!(series.last().map(|s| s.rows.clone()), Some(vec![1]));
        assert!(series.len() <= CONTINUOUS_BINS);
    }

    #[test]
    fn no_colour_column_draws_one_series() {
        let t = table();
        let cfg = DashboardConfig::default();
        let series = build_series(&t, &[0, 1, 2, 3], None, &cfg, &ColorMappings::new(), &Palettes::default());
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].rows, vec![0, 1, 3]);
    }

    #[test]
    fn hover_lists_present_columns() {
        let t = table();
        let cfg = DashboardConfig::default();
        assert_eq!(
            hover_text(&t, 0, Some("Pension"), &cfg),
            "R1\nPension: MP\nGastoTotal: 100"
        );
    }
}
