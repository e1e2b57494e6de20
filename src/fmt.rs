/// Format a float as an amount with thousands separators: 1,234.56
pub fn amount(val: f64) -> String {
    if !val.is_finite() {
        return val.to_string();
    }
    let negative = val < 0.0;
    let abs = val.abs();
    let fixed = format!("{:.2}", abs);
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative && fixed != "0.00" {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}
