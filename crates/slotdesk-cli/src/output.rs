use serde::Serialize;
use slotdesk_core::notify::Toast;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Column-aligned table. Widths are measured in characters so labels with
/// non-ASCII text stay aligned.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    println!("{}", format_row(headers.iter().copied(), &widths));
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));
    for row in rows {
        println!("{}", format_row(row.iter().map(String::as_str), &widths));
    }
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// First line of `text`, cut to `max` characters with an ellipsis.
pub fn preview(text: &str, max: usize) -> String {
    let first = text.lines().next().unwrap_or_default();
    let more_lines = text.lines().nth(1).is_some();
    if first.chars().count() > max {
        let cut: String = first.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    } else if more_lines {
        format!("{first} …")
    } else {
        first.to_string()
    }
}

/// Successes go to stdout, failures to stderr.
pub fn print_toasts(toasts: &[Toast]) {
    for toast in toasts {
        if toast.is_error() {
            eprintln!("{}: {}", toast.title, toast.description);
        } else {
            println!("{}: {}", toast.title, toast.description);
        }
    }
}
