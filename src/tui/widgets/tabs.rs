//! Tab bar widget.

use crate::session::{Tab, TabId};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// One-line bar listing the open tabs.
pub struct TabBar<'a> {
    tabs: &'a [Tab],
    active: Option<TabId>,
    running: Option<TabId>,
    renaming: Option<(TabId, &'a str)>,
}

impl<'a> TabBar<'a> {
    pub fn new(tabs: &'a [Tab], active: Option<TabId>) -> Self {
        Self {
            tabs,
            active,
            running: None,
            renaming: None,
        }
    }

    /// Marks the tab whose query is executing.
    pub fn running(mut self, tab: Option<TabId>) -> Self {
        self.running = tab;
        self
    }

    /// Shows the in-progress name for a tab being renamed.
    pub fn renaming(mut self, rename: Option<(TabId, &'a str)>) -> Self {
        self.renaming = rename;
        self
    }

    fn label(&self, tab: &Tab) -> String {
        if let Some((id, text)) = self.renaming {
            if id == tab.id {
                return format!(" ✎ {text}▏ ");
            }
        }
        if self.running == Some(tab.id) {
            format!(" ● {} ", tab.name)
        } else {
            format!(" {} ", tab.name)
        }
    }

    pub fn to_line(&self) -> Line<'static> {
        if self.tabs.is_empty() {
            return Line::from(Span::styled(
                " No tabs open. Press Ctrl+T for a new query.",
                Style::default().fg(Color::DarkGray),
            ));
        }

        let separator = Style::default().fg(Color::DarkGray);
        let mut spans = Vec::with_capacity(self.tabs.len() * 2);
        for (i, tab) in self.tabs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("│", separator));
            }
            let style = if self.active == Some(tab.id) {
                Style::default()
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(self.label(tab), style));
        }
        Line::from(spans)
    }
}

impl Widget for TabBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_line(area.x, area.y, &self.to_line(), area.width);
    }
}
