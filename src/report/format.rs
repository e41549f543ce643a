//! Number and layout helpers shared by the text reports.
//!
//! Output contract (relied on by golden tests):
//! - percentages: exactly two decimals, e.g. `10.40%`
//! - money: rounded to a whole number, `,` between groups of three digits,
//!   e.g. `110,400`

/// Characters between the box borders, excluding the one-space margins.
pub const BOX_INNER_WIDTH: usize = 56;

pub fn fmt_percent(v: f64) -> String {
    format!("{v:.2}%")
}

/// Round half away from zero and group thousands.
pub fn fmt_money(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    let rounded = v.round();
    let digits = (rounded.abs() as u128).to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Keep at most `max` characters (not bytes).
pub fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn box_top() -> String {
    format!("╔{}╗\n", "═".repeat(BOX_INNER_WIDTH + 2))
}

pub fn box_separator() -> String {
    format!("╠{}╣\n", "═".repeat(BOX_INNER_WIDTH + 2))
}

pub fn box_bottom() -> String {
    format!("╚{}╝\n", "═".repeat(BOX_INNER_WIDTH + 2))
}

/// Left-aligned content line; longer content is cut to the box width.
pub fn box_line(content: &str) -> String {
    format!("║ {:<width$} ║\n", truncate(content, BOX_INNER_WIDTH), width = BOX_INNER_WIDTH)
}

/// Like `box_line`, but wider content pushes the right border out instead of
/// being cut.
pub fn box_row(content: &str) -> String {
    format!("║ {content:<width$} ║\n", width = BOX_INNER_WIDTH)
}

pub fn box_line_centered(content: &str) -> String {
    format!("║ {:^width$} ║\n", truncate(content, BOX_INNER_WIDTH), width = BOX_INNER_WIDTH)
}
