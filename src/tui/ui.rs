//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use std::time::Duration;

use super::app::{App, Focus};
use super::widgets::{editor, header, table, tabs, toast};
use crate::session::ExecutionState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const KEY_HINTS: &str = "Ctrl+E run │ Tab focus │ Ctrl+T new │ F2 rename │ Ctrl+Q quit ";

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // Header
            Constraint::Length(1),      // Tab bar
            Constraint::Percentage(35), // Editor
            Constraint::Min(5),         // Results
            Constraint::Length(1),      // Status line
        ])
        .split(area);

    render_header(frame, main_layout[0], app);
    render_tabs(frame, main_layout[1], app);
    render_editor(frame, main_layout[2], app);
    render_results(frame, main_layout[3], app);
    render_status(frame, main_layout[4], app);

    if let Some(t) = &app.toast {
        frame.render_widget(
            toast::Toast::new(&t.message, t.is_error),
            toast::Toast::area(area),
        );
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let widget = header::Header::new(
        &app.service_info,
        app.spinner.as_ref(),
        app.workbench.progress(),
    );
    frame.render_widget(widget, area);
}

fn running_tab(app: &App) -> Option<crate::session::TabId> {
    match app.workbench.executor().state() {
        ExecutionState::Running(running) => Some(running.tab),
        ExecutionState::Idle => None,
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let tab_manager = app.workbench.tabs();
    let widget = tabs::TabBar::new(tab_manager.tabs(), tab_manager.active_id())
        .running(running_tab(app))
        .renaming(
            app.rename
                .as_ref()
                .map(|r| (r.tab, r.input.text.as_str())),
        );
    frame.render_widget(widget, area);
}

fn render_editor(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Editor;
    let widget = editor::QueryEditor::new(app.editor_text(), &app.editor, focused);
    let cursor = widget.cursor_position(area);
    frame.render_widget(widget, area);

    if focused && app.rename.is_none() && app.workbench.tabs().active().is_some() {
        frame.set_cursor_position(cursor);
    }
}

fn render_results(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Results;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Results ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(tab) = app.workbench.tabs().active() else {
        return;
    };

    match &tab.query_result {
        Some(result) => {
            let widget = table::ResultTable::new(result)
                .widths(&tab.column_widths)
                .sort(tab.sort)
                .selected(focused.then_some(app.selected_column))
                .scroll(app.scroll);
            frame.render_widget(widget, inner);
        }
        None => {
            let hint = if running_tab(app) == Some(tab.id) {
                "Running query..."
            } else {
                "Press Ctrl+E to run the query."
            };
            let text = Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            )));
            frame.render_widget(text, inner);
        }
    }
}

/// Formats an execution time for the status line.
pub fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_secs(1) {
        format!("{} ms", duration.as_millis())
    } else {
        format!("{:.2} s", duration.as_secs_f64())
    }
}

/// Left-hand status text for the active tab.
pub fn status_text(app: &App) -> String {
    let Some(tab) = app.workbench.tabs().active() else {
        return "No tab open".to_string();
    };

    if let Some(running) = running_tab(app) {
        if running == tab.id {
            return "Running...".to_string();
        }
    }

    let (Some(result), Some(elapsed)) = (&tab.query_result, tab.execution_time) else {
        return "Ready".to_string();
    };
    let time = format_duration(elapsed);
    if result.is_error() {
        return format!("Query failed · {time}");
    }

    let rows = result.row_count();
    let mut status = format!("{rows} row{} · {time}", if rows == 1 { "" } else { "s" });
    if let Some(sort) = tab.sort {
        if let Some(column) = result.columns.get(sort.column_index) {
            status.push_str(&format!(" · sorted by {} {}", column.name, sort.direction.arrow()));
        }
    }
    status
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let status = Span::styled(
        format!(" {}", status_text(app)),
        Style::default().add_modifier(Modifier::BOLD),
    );
    frame.render_widget(Paragraph::new(Line::from(status)), area);

    let hints_width = KEY_HINTS.chars().count() as u16;
    if area.width > hints_width + 30 {
        let hints_area = Rect::new(area.right() - hints_width, area.y, hints_width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray))),
            hints_area,
        );
    }
}
