//! Display formatting for the valuation table and detail panel
//! (Brazilian conventions: `.` groups thousands, `,` marks decimals).

/// `R$ 123.457`, rounded to whole reais.
pub fn format_currency(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = group_thousands(whole.unsigned_abs());
    if whole < 0 {
        format!("R$ -{digits}")
    } else {
        format!("R$ {digits}")
    }
}

/// `15,2%`
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{}%", decimal_comma(value, decimals))
}

/// `85,5 m²`
pub fn format_area(value: f64) -> String {
    format!("{} m²", decimal_comma(value, 1))
}

/// `N/A` when there is no payback, otherwise `14,2 meses`.
pub fn format_payback(months: Option<f64>) -> String {
    match months {
        Some(m) => format!("{} meses", decimal_comma(m, 1)),
        None => "N/A".to_string(),
    }
}

fn decimal_comma(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}").replace('.', ",")
}

fn group_thousands(n: u64) -> String {
    let raw = n.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
