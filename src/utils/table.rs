
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Right,
}

/// A simple text-based table generator for Discord messages using code blocks
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    /// Create a new table with the given headers, every column left-aligned
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths = headers.iter().map(|h| h.chars().count()).collect();
        let aligns = vec![Align::Left; headers.len()];
        let headers = headers.iter().map(|h| h.to_string()).collect();
        Table {
            headers,
            aligns,
            rows: Vec::new(),
            col_widths,
        }
    }

    /// Change the alignment of one column (amounts read better right-aligned)
    pub fn align(mut self, column: usize, align: Align) -> Self {
        if let Some(slot) = self.aligns.get_mut(column) {
            *slot = align;
        }
        self
    }

    /// Add a row; extra cells beyond the header count are dropped
    pub fn add_row(&mut self, row: Vec<&str>) {
        let row: Vec<String> = row
            .iter()
            .take(self.headers.len())
            .map(|s| s.to_string())
            .collect();

        for (width, cell) in self.col_widths.iter_mut().zip(&row) {
            *width = (*width).max(cell.chars().count());
        }

        self.rows.push(row);
    }

    /// Render the table inside a code block
    pub fn render(&self) -> String {
        let mut lines = vec![self.render_row(&self.headers), self.render_separator()];
        lines.extend(self.rows.iter().map(|row| self.render_row(row)));
        format!("```\n{}\n```", lines.join("\n"))
    }

    fn render_row(&self, row: &[String]) -> String {
        row.iter()
            .zip(self.col_widths.iter().zip(&self.aligns))
            .map(|(cell, (&width, align))| match align {
                Align::Left => format!("{:<width$}", cell, width = width),
                Align::Right => format!("{:>width$}", cell, width = width),
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_aligned_column() {
        let mut table = Table::new(vec!["ID", "Balance"]).align(1, Align::Right);
        table.add_row(vec!["acc1", "15,000.00"]);
        table.add_row(vec!["acc2", "8,500.00"]);

        let rendered = table.render();
        assert!(rendered.starts_with("```\n"));
        assert!(rendered.contains("acc1 | 15,000.00"));
        assert!(rendered.contains("acc2 |  8,500.00"));
        assert!(rendered.contains("-----+-"));
    }

    #[test]
    fn test_width_counts_chars_not_bytes() {
        let mut table = Table::new(vec!["Name"]);
        table.add_row(vec!["Zoë"]);
        table.add_row(vec!["Jane"]);
        assert!(table.render().contains("\n----\n"));
    }
}
