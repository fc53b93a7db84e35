//! Fixed-width table output for `list` commands.

use std::io::{self, Write};

/// Rows of text under a header, printed in padded columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Writes the table padded to the widest cell of each column.
    ///
    /// When the result is wider than `width` the widest column is cut so the
    /// lines fit.
    pub fn print(&self, out: &mut dyn Write, width: usize) -> io::Result<()> {
        let mut widths = vec![0usize; self.columns.len()];
        for row in std::iter::once(&self.columns).chain(&self.rows) {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let total = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        if total > width {
            let mut widest = 0;
            for (i, w) in widths.iter().enumerate() {
                if *w > widths[widest] {
                    widest = i;
                }
            }
            if let Some(w) = widths.get_mut(widest) {
                *w = w.saturating_sub(total - width);
            }
        }

        write_row(out, &widths, &self.columns)?;
        let rule: Vec<String> = widths.iter().map(|&w| "=".repeat(w)).collect();
        writeln!(out, "{}", rule.join(" "))?;
        for row in &self.rows {
            write_row(out, &widths, row)?;
        }
        Ok(())
    }
}

fn write_row(out: &mut dyn Write, widths: &[usize], cells: &[String]) -> io::Result<()> {
    let line: Vec<String> = widths
        .iter()
        .zip(cells)
        .map(|(&w, cell)| {
            let cut: String = cell.chars().take(w).collect();
            format!("{cut:<w$}")
        })
        .collect();
    writeln!(out, "{}", line.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_truncates_widest_column() {
        let mut table = Table::new(&["Name", "Cost"]);
        table.push_row(vec!["This is a big name".into(), "$1000".into()]);
        table.push_row(vec!["name".into(), "$$$ very large value".into()]);

        let mut buf = Vec::new();
        table.print(&mut buf, 30).unwrap();

        let expected = "Name               Cost       \n\
                        ================== ===========\n\
                        This is a big name $1000      \n\
                        name               $$$ very la\n";
        assert_eq!(String::from_utf8(buf).unwrap(), expected);
    }

    #[test]
    fn test_print_fits_without_cut() {
        let mut table = Table::new(&["Domain", "Records"]);
        table.push_row(vec!["a.io".into(), "3".into()]);

        let mut buf = Vec::new();
        table.print(&mut buf, 80).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Domain Records\n====== =======\na.io   3      \n"
        );
    }

    #[test]
    fn test_empty_table_prints_header() {
        let table = Table::new(&["Name"]);
        let mut buf = Vec::new();
        table.print(&mut buf, 80).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Name\n====\n");
    }
}
