// Aligned text table for the comparison on stdout

use pricecomp_recon::ComparisonRow;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Product names wider than this are cut with "..".
const MAX_PRODUCT_WIDTH: usize = 48;

const MISSING: &str = "n/a";

/// Product, one column per source, Best, Difference.
pub(crate) fn render_table(sources: &[String], rows: &[ComparisonRow]) -> String {
    let mut header: Vec<String> = Vec::with_capacity(sources.len() + 3);
    header.push("Product".to_string());
    header.extend(sources.iter().cloned());
    header.push("Best".to_string());
    header.push("Difference".to_string());

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(header.len());
            cells.push(row.product.clone());
            cells.extend(row.prices.iter().map(|p| format_price(*p)));
            cells.push(format_price(row.best_price));
            cells.push(format_price(row.difference));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| display_width(h)).collect();
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(display_width(cell));
        }
    }
    widths[0] = widths[0].min(MAX_PRODUCT_WIDTH);

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for cells in &body {
        push_line(&mut out, cells, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, w))| if i == 0 { pad_right(cell, *w) } else { pad_left(cell, *w) })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn format_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => MISSING.to_string(),
    }
}

/// Display width of a string, accounting for CJK double-width, emoji, etc.
fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to `width` display columns, adding ".." if cut.
fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    let budget = width.saturating_sub(2);
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }
    format!("{}..", &s[..end_byte])
}

fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

fn pad_left(s: &str, width: usize) -> String {
    let sw = display_width(s);
    format!("{}{}", " ".repeat(width.saturating_sub(sw)), s)
}
