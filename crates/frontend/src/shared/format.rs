//! Форматирование значений KPI и подписей графиков

use contracts::shared::indicators::ValueFormat;

/// Shown instead of a value when there is nothing to average over
pub const NO_VALUE: &str = "—";

/// Число с разделителем тысяч `,` и точкой в дробной части
///
/// # Примеры
///
/// ```
/// use frontend::shared::format::format_grouped;
/// assert_eq!(format_grouped(1234.5, 2), "1,234.50");
/// ```
pub fn format_grouped(value: f64, decimals: u8) -> String {
    let formatted = format!("{:.prec$}", value.abs(), prec = decimals as usize);
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, c) in integer_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        grouped.push('-');
    }
    let grouped: String = grouped.chars().rev().collect();

    match decimal_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}

pub fn format_value(value: Option<f64>, format: &ValueFormat) -> String {
    let Some(value) = value else {
        return NO_VALUE.to_string();
    };
    match format {
        ValueFormat::Money { currency, decimals } => {
            format!("{} {}", currency, format_grouped(value, *decimals))
        }
        ValueFormat::Number { decimals } => format_grouped(value, *decimals),
    }
}
