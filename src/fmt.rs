/// Format a float as Brazilian reais with thousands separators: R$ 1.234,56
pub fn brl(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut with_dots = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_dots.push('.');
        }
        with_dots.push(c);
    }
    let with_dots: String = with_dots.chars().rev().collect();

    if negative {
        format!("-R$ {with_dots},{dec_part}")
    } else {
        format!("R$ {with_dots},{dec_part}")
    }
}

/// Horizontal bar scaled so that `max` fills `width` cells.
pub fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count * width + max - 1) / max;
    "\u{2588}".repeat(len)
}

/// Two-decimal rendering used by classification reports.
pub fn score(val: f64) -> String {
    format!("{val:.2}")
}
