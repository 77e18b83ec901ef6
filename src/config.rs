use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::categories::{default_category_orders, CategoryOrders};
use crate::data::eligibility::CANDIDATE_COLUMNS;
use crate::error::ConfigError;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "HOTEL_ATLAS_CONFIG";

/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "hotel-atlas.json";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// One market's reservation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSource {
    pub name: String,
    pub path: PathBuf,
}

/// Initial map viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    /// Web-map style zoom level; 5 shows roughly the British Isles.
    pub zoom: f64,
    pub height: f32,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_lat: 54.5,
            center_lon: -5.0,
            zoom: 5.0,
            height: 800.0,
        }
    }
}

impl MapView {
    /// Half the visible longitude span for the configured zoom.
    pub fn half_span_lon(&self) -> f64 {
        // One 256px web-map tile covers 360° / 2^zoom; the map is ~3.5 tiles wide.
        360.0 / 2f64.powf(self.zoom) * 3.5 / 2.0
    }

    /// Half the visible latitude span, corrected for the Mercator stretch.
    pub fn half_span_lat(&self) -> f64 {
        self.half_span_lon() * self.center_lat.to_radians().cos()
    }
}

/// Everything the dashboard reads from configuration. Built once at
/// startup and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub period_label: String,
    pub logo_path: Option<PathBuf>,
    pub markets: Vec<MarketSource>,

    pub candidate_columns: Vec<String>,
    pub category_orders: CategoryOrders,
    /// Columns whose colours are fixed across every plot.
    pub fixed_color_columns: Vec<String>,
    pub preferred_color_column: String,

    pub hotel_column: String,
    pub channel_column: String,
    /// Channel value drawn in the left-hand plots.
    pub direct_channel: String,
    pub latitude_column: String,
    pub longitude_column: String,
    pub id_column: String,
    pub hover_columns: Vec<String>,

    /// Filter widgets when exactly one hotel is selected.
    pub single_hotel_filters: Vec<String>,
    /// Filter widgets for every other selection.
    pub multi_hotel_filters: Vec<String>,

    pub map: MapView,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        fn strings(v: &[&str]) -> Vec<String> {
            v.iter().map(|s| s.to_string()).collect()
        }
        Self {
            title: "UK & Ireland Hotel Reservations Dashboard".to_string(),
            period_label: "Q1/Q2 2025".to_string(),
            logo_path: None,
            markets: vec![
                MarketSource {
                    name: "UK".to_string(),
                    path: PathBuf::from("data/UK_2025_s1_GeoData.parquet"),
                },
                MarketSource {
                    name: "IE".to_string(),
                    path: PathBuf::from("data/IE_2025_s1_GeoData.parquet"),
                },
            ],
            candidate_columns: strings(&CANDIDATE_COLUMNS),
            category_orders: default_category_orders(),
            fixed_color_columns: strings(&["Pension", "Tipo_Habitacion"]),
            preferred_color_column: "G_Etario".to_string(),
            hotel_column: "Hotel".to_string(),
            channel_column: "Canal".to_string(),
            direct_channel: "OCEAN".to_string(),
            latitude_column: "lat".to_string(),
            longitude_column: "lon".to_string(),
            id_column: "reservation_id".to_string(),
            hover_columns: strings(&["Codigo_Postal", "GastoTotal", "Edad"]),
            single_hotel_filters: strings(&[
                "Pension",
                "Tipo_Habitacion",
                "GastoTotal",
                "Noches",
                "Repetidor",
                "Antelacion_Range",
                "G_Etario",
            ]),
            multi_hotel_filters: strings(&[
                "GastoTotal",
                "Noches",
                "Repetidor",
                "Antelacion_Range",
                "G_Etario",
            ]),
            map: MapView::default(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DashboardConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config: explicit path, then `$HOTEL_ATLAS_CONFIG`, then
    /// `hotel-atlas.json` in the working directory, then built-in defaults.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            });
        match path {
            Some(p) => {
                log::info!("Reading configuration from {}", p.display());
                Self::from_file(&p)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.markets.is_empty() {
            return Err(ConfigError::Invalid("at least one market file is required".into()));
        }
        if self.latitude_column == self.longitude_column {
            return Err(ConfigError::Invalid(format!(
                "latitude and longitude both read from '{}'",
                self.latitude_column
            )));
        }
        if !(0.0..=22.0).contains(&self.map.zoom) {
            return Err(ConfigError::Invalid(format!(
                "map zoom {} outside 0..=22",
                self.map.zoom
            )));
        }
        Ok(())
    }

    /// Paths of all market files, in configured order.
    pub fn market_paths(&self) -> Vec<PathBuf> {
        self.markets.iter().map(|m| m.path.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.candidate_columns.len(), 8);
        assert_eq!(config.markets[1].path, PathBuf::from("data/IE_2025_s1_GeoData.parquet"));
    }

    #[test]
    fn partial_file_keeps_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("atlas.json");
        let mut file = std::fs::File::create(&path)?;
        write!(file, r#"{{"period_label": "Q3 2025", "map": {{"zoom": 6}}}}"#)?;

        let config = DashboardConfig::from_file(&path)?;
        assert_eq!(config.period_label, "Q3 2025");
        assert_eq!(config.map.zoom, 6.0);
        assert_eq!(config.map.center_lat, 54.5);
        assert_eq!(config.hotel_column, "Hotel");
        Ok(())
    }

    #[test]
    fn rejects_empty_market_list() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("atlas.json");
        std::fs::write(&path, r#"{"markets": []}"#)?;

        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        Ok(())
    }

    #[test]
    fn reports_parse_errors_with_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json")?;

        let err = DashboardConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
        Ok(())
    }

    #[test]
    fn zoom_five_frames_the_british_isles() {
        let view = MapView::default();
        let half = view.half_span_lon();
        assert!(half > 15.0 && half < 25.0);
        assert!(view.half_span_lat() < half);
    }
}
