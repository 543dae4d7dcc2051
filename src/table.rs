//! Elastic-width text tables for terminal output.

use std::fmt::Write as _;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count())
        .collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separators = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", separators.join("  "));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate().take(widths.len()) {
        let padding = widths[idx].saturating_sub(value.chars().count());
        let mut cell = value.replace('\n', " ");
        cell.push_str(&" ".repeat(padding));
        cells.push(cell);
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_the_widest_cell() {
        let headers = vec!["year".to_string(), "price".to_string()];
        let rows = vec![
            vec!["2020".to_string(), "150".to_string()],
            vec!["2021".to_string(), "12345.5".to_string()],
        ];
        let rendered = render_table(&headers, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "year  price");
        assert_eq!(lines[2], "2020  150");
        assert_eq!(lines[3], "2021  12345.5");
    }

    #[test]
    fn extra_cells_beyond_headers_are_ignored() {
        let headers = vec!["a".to_string()];
        let rows = vec![vec!["1".to_string(), "spill".to_string()]];
        let rendered = render_table(&headers, &rows);
        assert!(!rendered.contains("spill"));
    }
}
