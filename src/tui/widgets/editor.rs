//! Query editor widget.
//!
//! Multi-line text with keyword/operator highlighting, a visible selection
//! and scrolling that keeps the cursor in view.

use crate::highlight::{classify_line, SpanKind};
use crate::tui::text::{line_col, EditorState};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

fn span_style(kind: SpanKind) -> Style {
    match kind {
        SpanKind::Keyword => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        SpanKind::Operator => Style::default().fg(Color::Yellow),
        SpanKind::Plain => Style::default(),
    }
}

/// Highlighted lines of the query text.
pub fn highlighted_lines(text: &str) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|line| {
            Line::from(
                classify_line(line)
                    .into_iter()
                    .map(|span| Span::styled(span.text, span_style(span.kind)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

/// Editor panel widget.
pub struct QueryEditor<'a> {
    text: &'a str,
    state: &'a EditorState,
    focused: bool,
}

impl<'a> QueryEditor<'a> {
    pub fn new(text: &'a str, state: &'a EditorState, focused: bool) -> Self {
        Self {
            text,
            state,
            focused,
        }
    }

    fn block(&self) -> Block<'static> {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Query ")
    }

    /// (rows, cols) scrolled away so the cursor stays inside `inner`.
    fn scroll_offset(&self, inner: Rect) -> (u16, u16) {
        let (line, col) = line_col(self.text, self.state.cursor);
        let rows = line.saturating_sub(inner.height.saturating_sub(1) as usize);
        let cols = col.saturating_sub(inner.width.saturating_sub(1) as usize);
        (
            u16::try_from(rows).unwrap_or(u16::MAX),
            u16::try_from(cols).unwrap_or(u16::MAX),
        )
    }

    /// Terminal position of the cursor when the editor is drawn in `area`.
    pub fn cursor_position(&self, area: Rect) -> Position {
        let inner = self.block().inner(area);
        let (line, col) = line_col(self.text, self.state.cursor);
        let (rows, cols) = self.scroll_offset(inner);
        Position::new(
            inner.x + (col as u16).saturating_sub(cols),
            inner.y + (line as u16).saturating_sub(rows),
        )
    }

    fn render_selection(&self, inner: Rect, scroll: (u16, u16), buf: &mut Buffer) {
        let Some((start, end)) = self.state.selection_range() else {
            return;
        };
        let (mut line, mut col) = line_col(self.text, start);
        for c in self.text.chars().skip(start).take(end - start) {
            if c == '\n' {
                line += 1;
                col = 0;
                continue;
            }
            let y = (line as u16).checked_sub(scroll.0);
            let x = (col as u16).checked_sub(scroll.1);
            if let (Some(x), Some(y)) = (x, y) {
                if x < inner.width && y < inner.height {
                    let cell = &mut buf[(inner.x + x, inner.y + y)];
                    cell.set_style(cell.style().add_modifier(Modifier::REVERSED));
                }
            }
            col += 1;
        }
    }
}

impl Widget for QueryEditor<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = self.block();
        let inner = block.inner(area);
        let scroll = self.scroll_offset(inner);

        Paragraph::new(highlighted_lines(self.text))
            .block(block)
            .scroll(scroll)
            .render(area, buf);
        self.render_selection(inner, scroll, buf);
    }
}
