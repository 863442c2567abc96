//! Header widget for the TUI.
//!
//! Displays the application name and version, the execution indicator and
//! the query service location.

use super::spinner::Spinner;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

/// Cells in the progress bar.
const BAR_WIDTH: usize = 10;

/// Header bar widget.
pub struct Header<'a> {
    service_info: &'a str,
    spinner: Option<&'a Spinner>,
    progress: u8,
}

impl<'a> Header<'a> {
    pub fn new(service_info: &'a str, spinner: Option<&'a Spinner>, progress: u8) -> Self {
        Self {
            service_info,
            spinner,
            progress,
        }
    }
}

/// Text progress bar, e.g. `[####      ] 42%`.
pub fn progress_bar(progress: u8) -> String {
    let progress = progress.min(100) as usize;
    let filled = progress * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        progress
    )
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left_text = format!(" Query Workbench v{}", env!("CARGO_PKG_VERSION"));
        let left_width = left_text.chars().count() as u16;
        buf.set_span(area.x, area.y, &Span::styled(left_text, style), area.width);

        let right_text = format!(" [service: {}] ", self.service_info);
        let right_width = right_text.chars().count() as u16;
        if left_width + right_width < area.width {
            let right_x = area.right().saturating_sub(right_width);
            buf.set_string(right_x, area.y, &right_text, style);
        }

        if let Some(spinner) = self.spinner {
            let text = format!(
                "{} {} {:.1}s",
                spinner.display(),
                progress_bar(self.progress),
                spinner.elapsed().as_secs_f64()
            );
            let spinner_style = Style::default()
                .bg(Color::Blue)
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD);
            let width = text.chars().count() as u16;
            let x = area.x + area.width.saturating_sub(width) / 2;
            if x > area.x + left_width {
                buf.set_string(x, area.y, &text, spinner_style);
            }
        }
    }
}
