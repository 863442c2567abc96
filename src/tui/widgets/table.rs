//! Result table widget for the TUI.
//!
//! Renders a tab's result with category glyphs and a sort arrow in the
//! header, per-tab column widths, right-aligned numeric columns and styled
//! NULL values. Error results are shown as red message lines instead.

use std::ops::Range;

use crate::result::{classify, Column, QueryResult, SortConfig, Value};
use crate::session::MIN_COLUMN_WIDTH;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Widest a column is auto-sized to; users can widen further.
const AUTO_MAX_WIDTH: u16 = 40;

/// Lines used by borders and the header row.
const CHROME_LINES: usize = 4;

/// Header text for a column: category glyph, name and sort arrow.
pub fn header_label(column: &Column, arrow: Option<&str>) -> String {
    let mut label = match classify(column.column_type) {
        Some(category) => format!("{} {}", category.glyph(), column.name),
        None => column.name.clone(),
    };
    if let Some(arrow) = arrow {
        label.push(' ');
        label.push_str(arrow);
    }
    label
}

/// Width a column gets when the user has not resized it.
pub fn auto_column_width(result: &QueryResult, column_index: usize) -> u16 {
    let Some(column) = result.columns.get(column_index) else {
        return MIN_COLUMN_WIDTH;
    };
    // Reserve room for the sort arrow so sorting does not shift the layout.
    let header = header_label(column, Some("▲")).chars().count();
    let cells = result
        .rows
        .iter()
        .filter_map(|row| row.get(column_index))
        .map(|value| cell_text(value).chars().count())
        .max()
        .unwrap_or(0);
    let width = u16::try_from(header.max(cells)).unwrap_or(u16::MAX);
    width.clamp(MIN_COLUMN_WIDTH, AUTO_MAX_WIDTH)
}

fn cell_text(value: &Value) -> String {
    value.to_display_string().replace(['\n', '\r', '\t'], " ")
}

/// Widget for rendering a query result as a table.
pub struct ResultTable<'a> {
    result: &'a QueryResult,
    widths: &'a [Option<u16>],
    sort: Option<SortConfig>,
    selected: Option<usize>,
    scroll: usize,
}

impl<'a> ResultTable<'a> {
    pub fn new(result: &'a QueryResult) -> Self {
        Self {
            result,
            widths: &[],
            sort: None,
            selected: None,
            scroll: 0,
        }
    }

    /// User-set widths, indexed by column.
    pub fn widths(mut self, widths: &'a [Option<u16>]) -> Self {
        self.widths = widths;
        self
    }

    pub fn sort(mut self, sort: Option<SortConfig>) -> Self {
        self.sort = sort;
        self
    }

    /// Highlights a column and keeps it in view.
    pub fn selected(mut self, column: Option<usize>) -> Self {
        self.selected = column;
        self
    }

    /// First data row to show.
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    fn column_widths(&self) -> Vec<usize> {
        (0..self.result.columns.len())
            .map(|i| {
                self.widths
                    .get(i)
                    .copied()
                    .flatten()
                    .unwrap_or_else(|| auto_column_width(self.result, i)) as usize
            })
            .collect()
    }

    /// Columns that fit in `available` cells, shifted right until the
    /// selected column is visible.
    fn visible_columns(&self, widths: &[usize], available: usize) -> Range<usize> {
        let span = |range: Range<usize>| widths[range].iter().map(|w| w + 3).sum::<usize>() + 1;

        let mut first = 0;
        if let Some(selected) = self.selected.filter(|&s| s < widths.len()) {
            while first < selected && span(first..selected + 1) > available {
                first += 1;
            }
        }

        let mut end = first + 1;
        while end < widths.len() && span(first..end + 1) <= available {
            end += 1;
        }
        first..end.min(widths.len())
    }

    /// Truncates to `max_width` chars, marking the cut with an ellipsis.
    fn truncate(s: &str, max_width: usize) -> String {
        let len = s.chars().count();
        if len <= max_width {
            s.to_string()
        } else if max_width <= 3 {
            s.chars().take(max_width).collect()
        } else {
            let kept: String = s.chars().take(max_width - 3).collect();
            format!("{kept}...")
        }
    }

    /// Renders the table to at most `max_lines` lines.
    pub fn render_to_lines(&self, available_width: usize, max_lines: usize) -> Vec<Line<'a>> {
        if self.result.is_error() {
            return self.render_error(max_lines);
        }

        let widths = self.column_widths();
        let visible = self.visible_columns(&widths, available_width);
        let shown = &widths[visible.clone()];

        let mut lines = vec![
            self.render_border(shown, '┌', '┬', '┐'),
            self.render_header_row(visible.clone(), shown),
            self.render_border(shown, '├', '┼', '┤'),
        ];

        let body = max_lines.saturating_sub(CHROME_LINES).max(1);
        for row in self.result.rows.iter().skip(self.scroll).take(body) {
            lines.push(self.render_data_row(row, visible.clone(), shown));
        }
        lines.push(self.render_border(shown, '└', '┴', '┘'));

        if self.result.rows.is_empty() {
            lines.push(Line::from(Span::styled(
                "(no rows)",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    }

    fn render_error(&self, max_lines: usize) -> Vec<Line<'a>> {
        let style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
        let mut lines = vec![Line::from(Span::styled("✗ Query failed", style))];
        lines.extend(
            self.result
                .rows
                .iter()
                .filter_map(|row| row.first())
                .map(|v| {
                    Line::from(Span::styled(
                        v.to_display_string(),
                        Style::default().fg(Color::Red),
                    ))
                })
                .take(max_lines.saturating_sub(1)),
        );
        lines
    }

    fn render_border(&self, widths: &[usize], left: char, mid: char, right: char) -> Line<'a> {
        let mut border = String::new();
        border.push(left);

        for (i, &width) in widths.iter().enumerate() {
            border.push_str(&"─".repeat(width + 2));
            if i + 1 < widths.len() {
                border.push(mid);
            }
        }

        border.push(right);

        Line::from(Span::styled(border, Style::default().fg(Color::DarkGray)))
    }

    fn render_header_row(&self, visible: Range<usize>, widths: &[usize]) -> Line<'a> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (col_index, &width) in visible.zip(widths) {
            let column = &self.result.columns[col_index];
            let arrow = self
                .sort
                .filter(|s| s.column_index == col_index)
                .map(|s| s.direction.arrow());
            let name = Self::truncate(&header_label(column, arrow), width);

            let mut style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
            if self.selected == Some(col_index) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!(" {name:width$} "), style));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }

    fn render_data_row(&self, row: &[Value], visible: Range<usize>, widths: &[usize]) -> Line<'a> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (col_index, &width) in visible.zip(widths) {
            let right = classify(self.result.columns[col_index].column_type)
                .is_some_and(|c| c.right_aligned());
            let (text, style) = match row.get(col_index) {
                Some(value) if value.is_null() => (
                    cell_text(value),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
                Some(value) => (cell_text(value), Style::default()),
                None => (String::new(), Style::default()),
            };
            let text = Self::truncate(&text, width);
            let padded = if right {
                format!(" {text:>width$} ")
            } else {
                format!(" {text:width$} ")
            };

            spans.push(Span::styled(padded, style));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }
}

impl Widget for ResultTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.render_to_lines(area.width as usize, area.height as usize);

        for (i, line) in lines.iter().enumerate() {
            if i >= area.height as usize {
                break;
            }
            let y = area.y + i as u16;
            buf.set_line(area.x, y, line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ColumnType, SortDirection};

    fn sample_result() -> QueryResult {
        QueryResult::with_data(
            vec![
                Column::new("id", ColumnType::Int),
                Column::untyped("name"),
                Column::untyped("email"),
            ],
            vec![
                vec![
                    Value::Int(1),
                    Value::String("Alice".to_string()),
                    Value::String("alice@test.com".to_string()),
                ],
                vec![Value::Int(22), Value::String("Bob".to_string()), Value::Null],
            ],
        )
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_auto_column_widths() {
        let result = sample_result();
        // "# id ▲" is 6 chars.
        assert_eq!(auto_column_width(&result, 0), 6);
        // "name ▲" (6) vs "Alice" (5).
        assert_eq!(auto_column_width(&result, 1), 6);
        assert_eq!(auto_column_width(&result, 2), 14);
        assert_eq!(auto_column_width(&result, 9), MIN_COLUMN_WIDTH);
    }

    #[test]
    fn test_auto_width_is_capped() {
        let result = QueryResult::with_data(
            vec![Column::untyped("x")],
            vec![vec![Value::String("y".repeat(200))]],
        );
        assert_eq!(auto_column_width(&result, 0), AUTO_MAX_WIDTH);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(ResultTable::truncate("hello", 10), "hello");
        assert_eq!(ResultTable::truncate("hello world", 8), "hello...");
        assert_eq!(ResultTable::truncate("hi", 2), "hi");
        assert_eq!(ResultTable::truncate("hello", 3), "hel");
        assert_eq!(ResultTable::truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_render_to_lines() {
        let result = sample_result();
        let lines = ResultTable::new(&result).render_to_lines(80, 20);
        // top border, header, separator, 2 data rows, bottom border
        assert_eq!(lines.len(), 6);
        assert!(text(&lines[1]).contains("# id"));
        assert!(text(&lines[4]).contains("NULL"));
    }

    #[test]
    fn test_numeric_columns_right_aligned() {
        let result = sample_result();
        let lines = ResultTable::new(&result).render_to_lines(80, 20);
        assert!(text(&lines[3]).starts_with("│      1 │ Alice "));
    }

    #[test]
    fn test_sort_arrow_on_sorted_column() {
        let result = sample_result();
        let lines = ResultTable::new(&result)
            .sort(Some(SortConfig::new(1, SortDirection::Descending)))
            .render_to_lines(80, 20);
        assert!(text(&lines[1]).contains("name ▼"));
        assert!(!text(&lines[1]).contains('▲'));
    }

    #[test]
    fn test_user_width_overrides_auto() {
        let result = sample_result();
        let widths = [None, None, Some(5)];
        let lines = ResultTable::new(&result).widths(&widths).render_to_lines(80, 20);
        assert!(text(&lines[3]).contains(" al... │"));
    }

    #[test]
    fn test_scroll_and_height_limit_rows() {
        let result = sample_result();
        let lines = ResultTable::new(&result).scroll(1).render_to_lines(80, 20);
        assert_eq!(lines.len(), 5);
        assert!(text(&lines[3]).contains("Bob"));

        let lines = ResultTable::new(&result).render_to_lines(80, 5);
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_selected_column_kept_in_view() {
        let result = sample_result();
        let lines = ResultTable::new(&result)
            .selected(Some(2))
            .render_to_lines(20, 20);
        let header = text(&lines[1]);
        assert!(header.contains("email"));
        assert!(!header.contains("# id"));
    }

    #[test]
    fn test_error_result_rendered_as_message() {
        let result = QueryResult::error("Transport error: connection refused");
        let lines = ResultTable::new(&result).render_to_lines(80, 20);
        assert_eq!(lines.len(), 2);
        assert!(text(&lines[0]).contains("Query failed"));
        assert_eq!(lines[1].spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_empty_results() {
        let result = QueryResult::new();
        assert_eq!(ResultTable::new(&result).render_to_lines(80, 20).len(), 1);

        let result = QueryResult::with_data(vec![Column::untyped("a")], vec![]);
        let lines = ResultTable::new(&result).render_to_lines(80, 20);
        assert!(text(lines.last().unwrap()).contains("(no rows)"));
    }
}
