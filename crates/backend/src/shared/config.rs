use contracts::dashboards::d400_sales_dashboard::PeriodGrouping;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable with an explicit path to config.toml
pub const CONFIG_ENV_VAR: &str = "SALES_DASHBOARD_CONFIG";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the built frontend (trunk output)
    pub static_dir: String,
}

/// Где и как читать таблицу продаж
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct SourceConfig {
    pub path: String,
    pub sheet: String,
    /// Rows above the header row
    pub skip_rows: u32,
    /// Excel letter range, e.g. "B:R"
    pub columns: String,
    /// Data rows read after the header; the rest is silently ignored
    pub max_rows: u32,
    pub column_names: ColumnNames,
}

/// Заголовки колонок, от которых зависит загрузчик
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct ColumnNames {
    pub timestamp: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub quantity: String,
    pub unit_price: String,
    pub total: String,
    pub product_line: String,
    pub customer_type: String,
    pub gender: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub period_grouping: PeriodGrouping,
    pub bar_color: String,
    pub currency: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            period_grouping: PeriodGrouping::Day,
            bar_color: "#0083B8".to_string(),
            currency: "US $".to_string(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r##"
[server]
host = "0.0.0.0"
port = 3000
static_dir = "dist"

[source]
path = "SALES_2022.xlsx"
sheet = "Продажи"
skip_rows = 3
columns = "B:R"
max_rows = 1000

[source.column_names]
timestamp = "Время и дата подачи заявки"
utm_source = "utm_source"
utm_medium = "utm_medium"
quantity = "Количество единиц услуги"
unit_price = "Стоимость услуги"
total = "Total"
product_line = "Product line"
customer_type = "Customer_type"
gender = "Gender"

[dashboard]
period_grouping = "day"
bar_color = "#0083B8"
currency = "US $"
"##;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Path from `SALES_DASHBOARD_CONFIG`
/// 2. Next to the executable (for production)
/// 3. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
        tracing::info!("Loading config from {}: {}", CONFIG_ENV_VAR, explicit);
        return load_config_from(Path::new(&explicit));
    }

    if let Some(exe_dir) = exe_dir() {
        let config_path = exe_dir.join("config.toml");
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            return load_config_from(&config_path);
        }
        tracing::warn!("config.toml not found at: {}", config_path.display());
    }

    tracing::info!("Using default embedded configuration");
    default_config()
}

pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

pub fn default_config() -> anyhow::Result<Config> {
    Ok(toml::from_str(DEFAULT_CONFIG)?)
}

/// Resolves the spreadsheet path.
/// Relative paths are tried next to the executable first, then against the
/// working directory.
pub fn resolve_source_path(source: &SourceConfig) -> PathBuf {
    let path = Path::new(&source.path);
    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Some(exe_dir) = exe_dir() {
        let candidate = exe_dir.join(path);
        if candidate.exists() {
            return candidate;
        }
    }

    PathBuf::from(&source.path)
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = default_config().unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.source.sheet, "Продажи");
        assert_eq!(config.source.skip_rows, 3);
        assert_eq!(config.source.columns, "B:R");
        assert_eq!(config.source.max_rows, 1000);
        assert_eq!(config.source.column_names.product_line, "Product line");
        assert_eq!(config.dashboard.period_grouping, PeriodGrouping::Day);
        assert_eq!(config.dashboard.bar_color, "#0083B8");
        assert_eq!(config.dashboard.currency, "US $");
    }

    #[test]
    fn test_dashboard_section_is_optional() {
        let trimmed: String = DEFAULT_CONFIG
            .split("[dashboard]")
            .next()
            .unwrap()
            .to_string();
        let config: Config = toml::from_str(&trimmed).unwrap();
        assert_eq!(config.dashboard, DashboardConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let contents = DEFAULT_CONFIG.replace("max_rows = 1000", "max_rows = 50");
        std::fs::write(&path, contents).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.source.max_rows, 50);
        assert!(load_config_from(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_absolute_source_path_is_kept() {
        let mut source = default_config().unwrap().source;
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("sales.xlsx");
        source.path = absolute.to_string_lossy().into_owned();
        assert_eq!(resolve_source_path(&source), absolute);
    }
}
