/// Форматирует число с разделителем тысяч
///
/// # Примеры
/// ```
/// use backend::shared::format::format_thousands;
/// assert_eq!(format_thousands(1234567, '.'), "1.234.567");
/// assert_eq!(format_thousands(42, ','), "42");
/// ```
pub fn format_thousands(n: u64, separator: char) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(separator);
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Excel-style column letters for a 0-based column index (0 → "A", 26 → "AA")
pub fn column_letters(mut index: u32) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0, '.'), "0");
        assert_eq!(format_thousands(999, '.'), "999");
        assert_eq!(format_thousands(1000, '.'), "1.000");
        assert_eq!(format_thousands(1234567, ','), "1,234,567");
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(1), "B");
        assert_eq!(column_letters(17), "R");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }
}
