use std::collections::BTreeSet;

use crate::color::{build_color_mappings, ColorMappings, Palettes};
use crate::config::DashboardConfig;
use crate::data::categories::apply_category_orders;
use crate::data::eligibility::eligible_columns;
use crate::data::filter::{
    distinct_labels, filtered_indices, rows_matching, split_by_value, sync_filter_state,
    ColumnFilter, FilterState,
};
use crate::data::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Whether the maps show every hotel at once or one set of picked hotels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotelMode {
    /// "Todos": one map per channel over all hotels.
    All,
    /// One map per channel for each selected hotel.
    Single,
}

/// Channel side of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSide {
    Direct,
    Other,
}

/// One map to draw: a title plus the rows it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct MapPanel {
    pub heading: String,
    pub title: String,
    pub side: ChannelSide,
    pub rows: Vec<usize>,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Read-only dashboard configuration.
    pub config: DashboardConfig,

    /// Palettes parsed once at startup.
    pub palettes: Palettes,

    /// Combined reservations of every market (empty until loaded).
    pub table: Table,

    /// Fixed colour maps built from the full table.
    pub color_mappings: ColorMappings,

    pub hotel_mode: HotelMode,

    /// Every hotel in the table, sorted.
    pub all_hotels: Vec<String>,

    /// Hotels picked in `Single` mode.
    pub selected_hotels: Vec<String>,

    /// Columns the user may colour by for the current hotel scope (cached).
    pub colorable: Vec<String>,

    /// Which column is used for colouring.
    pub color_column: Option<String>,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            palettes: Palettes::default(),
            table: Table::default(),
            color_mappings: ColorMappings::new(),
            hotel_mode: HotelMode::All,
            all_hotels: Vec::new(),
            selected_hotels: Vec::new(),
            colorable: Vec::new(),
            color_column: None,
            filters: FilterState::new(),
            visible_indices: Vec::new(),
            status_message: None,
        }
    }

    /// Ingest a newly loaded table: order categories, build colour maps,
    /// reset the hotel selection and filters.
    pub fn set_table(&mut self, table: Table) {
        let table = apply_category_orders(table, &self.config.category_orders);

        self.color_mappings =
            build_color_mappings(&table, &self.config.fixed_color_columns, &self.palettes);
        self.all_hotels = distinct_labels(&table, &self.config.hotel_column);
        self.selected_hotels = self.all_hotels.iter().take(1).cloned().collect();
        self.filters = FilterState::new();
        self.table = table;
        self.status_message = None;

        self.refresh_colorable();
    }

    /// Record a load failure and fall back to an empty table.
    pub fn set_load_error(&mut self, message: String) {
        self.set_table(Table::default());
        self.status_message = Some(message);
    }

    /// Recompute the colour-by choices for the current hotel scope, keep the
    /// colour column when it is still valid, then refilter.
    pub fn refresh_colorable(&mut self) {
        self.colorable = match self.hotel_mode {
            HotelMode::All => eligible_columns(&self.table, &self.config.candidate_columns),
            HotelMode::Single => {
                let all: Vec<usize> = (0..self.table.len()).collect();
                let rows = rows_matching(
                    &self.table,
                    &all,
                    &self.config.hotel_column,
                    &self.selected_hotels,
                );
                eligible_columns(&self.table.take(&rows), &self.config.candidate_columns)
            }
        };

        let keep = self
            .color_column
            .as_ref()
            .is_some_and(|c| self.colorable.contains(c));
        if !keep {
            self.color_column = self
                .colorable
                .iter()
                .find(|c| **c == self.config.preferred_color_column)
                .or_else(|| self.colorable.first())
                .cloned();
        }
        self.refilter();
    }

    pub fn set_hotel_mode(&mut self, mode: HotelMode) {
        if self.hotel_mode != mode {
            self.hotel_mode = mode;
            self.refresh_colorable();
        }
    }

    /// Add or remove a hotel from the `Single` selection.
    pub fn toggle_hotel(&mut self, hotel: &str) {
        if let Some(pos) = self.selected_hotels.iter().position(|h| h == hotel) {
            self.selected_hotels.remove(pos);
        } else {
            self.selected_hotels.push(hotel.to_string());
            // Keep the selection in the same order as the hotel list.
            let order = &self.all_hotels;
            self.selected_hotels
                .sort_by_key(|h| order.iter().position(|o| o == h).unwrap_or(usize::MAX));
        }
        self.refresh_colorable();
    }

    /// Set colour column and refilter (the colour column is never filtered).
    pub fn set_color_column(&mut self, col: String) {
        self.color_column = Some(col);
        self.refilter();
    }

    /// Columns that currently get a filter widget, in display order.
    pub fn active_filter_columns(&self) -> Vec<String> {
        let list = if self.hotel_mode == HotelMode::Single && self.selected_hotels.len() == 1 {
            &self.config.single_hotel_filters
        } else {
            &self.config.multi_hotel_filters
        };
        list.iter()
            .filter(|c| self.color_column.as_ref() != Some(*c))
            .filter(|c| self.table.has_column(c))
            .cloned()
            .collect()
    }

    /// Recompute `visible_indices` after a filter or scope change.
    pub fn refilter(&mut self) {
        let active = self.active_filter_columns();
        sync_filter_state(&mut self.filters, &self.table, &active);
        self.visible_indices = filtered_indices(&self.table, &self.filters, &active);
        self.log_panels();
    }

    fn log_panels(&self) {
        for panel in self.map_panels() {
            log::info!("{}: {} reservations plotted", panel.title, panel.rows.len());
        }
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        if let Some(ColumnFilter::Values { selected, .. }) = self.filters.get_mut(column) {
            if !selected.remove(value) {
                selected.insert(value.clone());
            }
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(ColumnFilter::Values { options, selected }) = self.filters.get_mut(column) {
            *selected = options.iter().cloned().collect();
        }
        self.refilter();
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: &str) {
        if let Some(ColumnFilter::Values { selected, .. }) = self.filters.get_mut(column) {
            *selected = BTreeSet::new();
        }
        self.refilter();
    }

    /// Set the range of a numeric filter; bounds are clamped and ordered.
    pub fn set_range(&mut self, column: &str, new_low: f64, new_high: f64) {
        if let Some(ColumnFilter::Range { min, max, low, high }) = self.filters.get_mut(column) {
            let a = new_low.clamp(*min, *max);
            let b = new_high.clamp(*min, *max);
            *low = a.min(b);
            *high = a.max(b);
        }
        self.refilter();
    }

    /// Maps to draw: the filtered rows split by channel, once in `All` mode
    /// or once per selected hotel in `Single` mode.
    pub fn map_panels(&self) -> Vec<MapPanel> {
        let color = self.color_column.as_deref().unwrap_or("-");
        let direct = &self.config.direct_channel;
        let period = &self.config.period_label;

        let scopes: Vec<(String, String, Vec<usize>)> = match self.hotel_mode {
            HotelMode::All => vec![(
                "All Hotels".to_string(),
                "All Hotels".to_string(),
                self.visible_indices.clone(),
            )],
            HotelMode::Single => self
                .selected_hotels
                .iter()
                .map(|hotel| {
                    let rows = rows_matching(
                        &self.table,
                        &self.visible_indices,
                        &self.config.hotel_column,
                        std::slice::from_ref(hotel),
                    );
                    (format!("Hotel: {hotel}"), hotel.clone(), rows)
                })
                .collect(),
        };

        let mut panels = Vec::with_capacity(scopes.len() * 2);
        for (heading, scope, rows) in scopes {
            let (direct_rows, other_rows) =
                split_by_value(&self.table, &rows, &self.config.channel_column, direct);
            for (side, label, rows) in [
                (ChannelSide::Direct, direct.clone(), direct_rows),
                (ChannelSide::Other, format!("Non-{direct}"), other_rows),
            ] {
                panels.push(MapPanel {
                    heading: format!("{heading} | Canal: {label}"),
                    title: format!(
                        "{scope} Reservations Colored by '{color}' ({period}) | Canal {label}"
                    ),
                    side,
                    rows,
                });
            }
        }
        panels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    /// Two hotels: Arona has varied ages, Bitacora a single age group.
    fn state() -> AppState {
        let table = Table::from_columns(vec![
            Column::inferred("Hotel", vec![s("Bitacora"), s("Arona"), s("Arona"), s("Bitacora")]),
            Column::inferred("Canal", vec![s("OCEAN"), s("BOOKING"), s("OCEAN"), CellValue::Null]),
            Column::inferred("G_Etario", vec![
                s("65 años o más"),
                s("De 25 a 44 años"),
                s("De 45 a 64 años"),
                s("65 años o más"),
            ]),
            Column::inferred("Pension", vec![s("AI"), s("AI"), s("AI"), s("MP")]),
            Column::inferred("Noches", vec![
                CellValue::Integer(3),
                CellValue::Integer(5),
                CellValue::Integer(3),
                CellValue::Integer(7),
            ]),
        ]);
        let mut state = AppState::new(DashboardConfig::default());
        state.set_table(table);
        state
    }

    #[test]
    fn all_mode_uses_full_table() {
        let st = state();
        assert_eq!(st.all_hotels, vec!["Arona", "Bitacora"]);
        assert_eq!(st.colorable, vec!["Pension", "Noches", "G_Etario"]);
        assert_eq!(st.color_column.as_deref(), Some("G_Etario"));
        assert_eq!(st.visible_indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn single_mode_scopes_colorable_to_hotels() {
        let mut st = state();
        st.set_hotel_mode(HotelMode::Single);
        assert_eq!(st.selected_hotels, vec!["Arona"]);
        // Arona is all-inclusive only, so Pension drops out.
        assert_eq!(st.colorable, vec!["Noches", "G_Etario"]);

        st.toggle_hotel("Arona");
        st.toggle_hotel("Bitacora");
        // Bitacora has a single age group.
        assert_eq!(st.colorable, vec!["Pension", "Noches"]);
        assert_eq!(st.color_column.as_deref(), Some("Pension"));
    }

    #[test]
    fn filter_columns_depend_on_selection() {
        let mut st = state();
        assert_eq!(st.active_filter_columns(), vec!["Noches"]);

        st.set_hotel_mode(HotelMode::Single);
        assert_eq!(st.active_filter_columns(), vec!["Pension", "Noches"]);

        st.set_color_column("Noches".to_string());
        assert_eq!(st.active_filter_columns(), vec!["Pension", "G_Etario"]);
    }

    #[test]
    fn range_filter_narrows_rows() {
        let mut st = state();
        st.set_range("Noches", 4.0, 100.0);
        assert_eq!(st.visible_indices, vec![1, 3]);
        assert_eq!(
            st.filters.get("Noches"),
            Some(&ColumnFilter::Range { min: 3.0, max: 7.0, low: 4.0, high: 7.0 })
        );
    }

    #[test]
    fn panels_split_by_channel() {
        let st = state();
        let panels = st.map_panels();
        assert_eq!(panels.len(), 2);
        assert_eq!(panels[0].rows, vec![0, 2]);
        assert_eq!(panels[1].rows, vec![1, 3]);
        assert_eq!(
            panels[0].title,
            "All Hotels Reservations Colored by 'G_Etario' (Q1/Q2 2025) | Canal OCEAN"
        );
        assert_eq!(panels[1].heading, "All Hotels | Canal: Non-OCEAN");
    }

    #[test]
    fn single_mode_panels_per_hotel() {
        let mut st = state();
        st.set_hotel_mode(HotelMode::Single);
        st.toggle_hotel("Bitacora");
        let panels = st.map_panels();
        assert_eq!(panels.len(), 4);
        assert_eq!(panels[0].heading, "Hotel: Arona | Canal: OCEAN");
        assert_eq!(panels[0].rows, vec![2]);
        assert_eq!(panels[3].heading, "Hotel: Bitacora | Canal: Non-OCEAN");
        assert_eq!(panels[3].rows, vec![3]);
    }

    #[test]
    fn load_error_leaves_empty_dashboard() {
        let mut st = state();
        st.set_load_error("Failed to load data: boom".to_string());
        assert!(st.table.is_empty());
        assert!(st.colorable.is_empty());
        assert_eq!(st.color_column, None);
        assert!(st.map_panels().iter().all(|p| p.rows.is_empty()));
        assert!(st.status_message.is_some());
    }
}
