use serde::{Deserialize, Serialize};

/// How to format the numeric value on the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ValueFormat {
    /// Prefix currency label, fixed number of decimals
    Money { currency: String, decimals: u8 },
    Number { decimals: u8 },
}

/// A single KPI panel as rendered by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiPanel {
    pub id: String,
    pub label: String,
    /// `None` when there is nothing to average over
    pub value: Option<f64>,
    pub format: ValueFormat,
    pub subtitle: Option<String>,
}
