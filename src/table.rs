use std::borrow::Cow;
use std::fmt::Write as _;

use crossterm::terminal;

const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Width of the attached terminal, or 80 when there is none to query.
pub fn terminal_width() -> usize {
    match terminal::size() {
        Ok((columns, _)) if columns > 0 => usize::from(columns),
        _ => DEFAULT_TERMINAL_WIDTH,
    }
}

/// Renders rows with every column given an equal share of `total_width`.
/// Cells longer than their share are cut to leave a one-space gap.
pub fn render_fixed_width(headers: &[String], rows: &[Vec<String>], total_width: usize) -> String {
    let column_count = headers.len().max(1);
    let cell_width = (total_width / column_count).max(1);
    let widths = vec![cell_width; headers.len()];

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, true));
    let separator = widths
        .iter()
        .map(|w| "-".repeat(w.saturating_sub(1).max(1)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths, true));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, true));
    }
    output
}

/// Renders rows with each column as wide as its widest cell.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }
    // Account for the two-space column gap used by `format_row`.
    let widths = widths
        .into_iter()
        .map(|w| w.max(3) + 2)
        .collect::<Vec<usize>>();

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, false));
    let separator = widths
        .iter()
        .map(|w| "-".repeat(w - 2))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths, false));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, false));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let rendered = render_table(headers, rows);
    print!("{rendered}");
}

fn format_row(values: &[String], widths: &[usize], truncate: bool) -> String {
    let mut line = String::new();
    for (value, width) in values.iter().zip(widths) {
        let sanitized = sanitize_cell(value);
        let mut cell = if truncate && display_width(&sanitized) >= *width {
            sanitized.chars().take(width.saturating_sub(1)).collect()
        } else {
            sanitized.into_owned()
        };
        let padding = width.saturating_sub(display_width(&cell));
        cell.push_str(&" ".repeat(padding));
        line.push_str(&cell);
    }
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // Skip ANSI escape sequence (e.g. \x1b[31m)
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
