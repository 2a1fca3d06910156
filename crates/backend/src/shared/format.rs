/// Форматирует число с разделителями тысяч (точками)
///
/// # Примеры
/// ```
/// use backend::shared::format::format_number;
/// assert_eq!(format_number(1234567), "1.234.567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Разбирает денежную сумму из реестра продаж ("R$ 1.234,56", "1234.56", "-5").
///
/// Остаются только цифры, `,`, `.` и `-`. Если есть запятая, точки считаются
/// разделителями тысяч, а запятая считается десятичным разделителем. Далее берётся
/// самый длинный числовой префикс; если числа нет, результат 0.
///
/// ```
/// use backend::shared::format::parse_amount;
/// assert_eq!(parse_amount("R$ 1.234,56"), 1234.56);
/// assert_eq!(parse_amount("-5"), -5.0);
/// assert_eq!(parse_amount("n/a"), 0.0);
/// ```
pub fn parse_amount(raw: &str) -> f64 {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let normalized = if kept.contains(',') {
        kept.replace('.', "").replacen(',', ".", 1)
    } else {
        kept
    };

    numeric_prefix(&normalized)
        .and_then(|p| p.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Longest prefix of the form `-?digits[.digits]`
fn numeric_prefix(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        None
    } else {
        Some(&s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567890), "1.234.567.890");
    }

    #[test]
    fn test_parse_amount_brazilian_format() {
        assert_eq!(parse_amount("R$ 1.234,56"), 1234.56);
        assert_eq!(parse_amount("1.234.567,89"), 1234567.89);
        assert_eq!(parse_amount("10,5"), 10.5);
    }

    #[test]
    fn test_parse_amount_plain_decimal() {
        assert_eq!(parse_amount("1234.56"), 1234.56);
        assert_eq!(parse_amount("  300 "), 300.0);
        assert_eq!(parse_amount(".5"), 0.5);
    }

    #[test]
    fn test_parse_amount_negative_is_kept() {
        assert_eq!(parse_amount("-5"), -5.0);
        assert_eq!(parse_amount("R$ -1.000,00"), -1000.0);
    }

    #[test]
    fn test_parse_amount_non_numeric_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("-"), 0.0);
        assert_eq!(parse_amount("R$"), 0.0);
    }

    #[test]
    fn test_parse_amount_takes_numeric_prefix() {
        // "12-3" -> prefix "12"
        assert_eq!(parse_amount("12-3"), 12.0);
        assert_eq!(parse_amount("7."), 7.0);
    }
}
