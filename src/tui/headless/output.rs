//! Rendering of a headless run for stdout or an output file.
//!
//! Every format carries a summary of the active tab's result next to the
//! captured screen, so scripts can check rows or errors without scraping
//! the table.

use super::{Frame, HeadlessResult, HeadlessState};
use crate::cli::OutputFormat;
use crate::tui::app::App;
use ratatui::buffer::Buffer;
use serde::Serialize;

/// The active tab's query result as reported by headless output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub tab: String,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub execution_ms: Option<u64>,
    /// Message of a failed query; `None` for a successful result.
    pub error: Option<String>,
}

impl ResultSummary {
    pub fn from_app(app: &App) -> Option<Self> {
        let tab = app.workbench.tabs().active()?;
        let result = tab.query_result.as_ref()?;
        let error = result.error_message();
        Some(Self {
            tab: tab.name.clone(),
            columns: if error.is_some() {
                Vec::new()
            } else {
                result.columns.iter().map(|c| c.name.clone()).collect()
            },
            row_count: if error.is_some() { 0 } else { result.row_count() },
            execution_ms: tab.execution_time.map(|d| d.as_millis() as u64),
            error,
        })
    }

    /// One-line description, e.g. `3 rows x 2 columns in 12 ms`.
    fn describe(&self) -> String {
        let timing = self
            .execution_ms
            .map(|ms| format!(" in {ms} ms"))
            .unwrap_or_default();
        match &self.error {
            Some(message) => format!("failed{timing}: {message}"),
            None => format!(
                "{} rows x {} columns{timing}",
                self.row_count,
                self.columns.len()
            ),
        }
    }
}

/// Flattens a terminal buffer to text: trailing spaces and trailing blank
/// lines are dropped, the last line ends with a newline.
pub fn screen_text(buffer: &Buffer) -> String {
    let area = buffer.area;
    let lines: Vec<String> = (0..area.height)
        .map(|y| {
            let line: String = (0..area.width).map(|x| buffer[(x, y)].symbol()).collect();
            line.trim_end_matches(' ').to_string()
        })
        .collect();

    match lines.iter().rposition(|line| !line.is_empty()) {
        Some(last) => format!("{}\n", lines[..=last].join("\n")),
        None if lines.is_empty() => String::new(),
        None => "\n".to_string(),
    }
}

/// Renders `result` in the requested format.
pub fn render(format: OutputFormat, result: &HeadlessResult) -> String {
    match format {
        OutputFormat::Text => text(result),
        OutputFormat::Json => json(result),
        OutputFormat::Frames => frames(result),
    }
}

fn footer(result: &HeadlessResult) -> String {
    let mut out = format!(
        "Events: {} executed in {}ms\n",
        result.events_executed,
        result.duration.as_millis()
    );
    if let Some(summary) = &result.result {
        out.push_str(&format!("Result [{}]: {}\n", summary.tab, summary.describe()));
    }
    if result.assertions_passed + result.assertions_failed > 0 {
        out.push_str(&format!(
            "Assertions: {} passed, {} failed\n",
            result.assertions_passed, result.assertions_failed
        ));
    }
    out
}

fn text(result: &HeadlessResult) -> String {
    format!("{}\n{}", result.screen, footer(result))
}

#[derive(Serialize)]
struct Report<'a> {
    screen: &'a str,
    screen_lines: &'a [String],
    events_executed: usize,
    duration_ms: u64,
    assertions: Assertions,
    result: Option<&'a ResultSummary>,
    state: &'a HeadlessState,
}

#[derive(Serialize)]
struct Assertions {
    passed: usize,
    failed: usize,
}

fn json(result: &HeadlessResult) -> String {
    let report = Report {
        screen: &result.screen,
        screen_lines: &result.screen_lines,
        events_executed: result.events_executed,
        duration_ms: result.duration.as_millis() as u64,
        assertions: Assertions {
            passed: result.assertions_passed,
            failed: result.assertions_failed,
        },
        result: result.result.as_ref(),
        state: &result.state,
    };
    match serde_json::to_string_pretty(&report) {
        Ok(body) => format!("{body}\n"),
        Err(e) => format!("{{\"error\": \"Failed to serialize: {e}\"}}\n"),
    }
}

fn frame_block(frame: &Frame) -> String {
    format!(
        "=== FRAME {} ({}) ===\n{}\n",
        frame.number,
        frame.event.as_deref().unwrap_or("initial"),
        frame.screen
    )
}

fn frames(result: &HeadlessResult) -> String {
    let mut out: String = result.frames.iter().map(frame_block).collect();
    out.push_str(&format!("Total: {} frames\n", result.frames.len()));
    out.push_str(&footer(result));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgressConfig;
    use serde_json::json;
    use std::time::Duration;

    fn state() -> HeadlessState {
        HeadlessState {
            focus: "Editor".to_string(),
            tab_count: 1,
            active_tab: Some("New Query".to_string()),
            editor_text: "SELECT 1".to_string(),
            is_running: false,
            progress: 100,
            has_result: true,
            row_count: 3,
            column_count: 2,
            sort: None,
            selected_column: 0,
            scroll: 0,
            toast: None,
            running: true,
        }
    }

    fn run_result(summary: Option<ResultSummary>) -> HeadlessResult {
        HeadlessResult {
            screen: " Query Workbench\n".to_string(),
            screen_lines: vec![" Query Workbench".to_string()],
            events_executed: 3,
            duration: Duration::from_millis(150),
            assertions_passed: 2,
            assertions_failed: 0,
            state: state(),
            result: summary,
            frames: vec![
                Frame {
                    number: 0,
                    event: None,
                    screen: "Initial".to_string(),
                },
                Frame {
                    number: 1,
                    event: Some("key:ctrl+e".to_string()),
                    screen: "After running".to_string(),
                },
            ],
        }
    }

    fn rows_summary() -> ResultSummary {
        ResultSummary {
            tab: "New Query".to_string(),
            columns: vec!["id".to_string(), "name".to_string()],
            row_count: 3,
            execution_ms: Some(12),
            error: None,
        }
    }

    #[test]
    fn test_text_reports_result_and_assertions() {
        let text = render(OutputFormat::Text, &run_result(Some(rows_summary())));
        assert!(text.starts_with(" Query Workbench\n"));
        assert!(text.contains("Events: 3 executed in 150ms"));
        assert!(text.contains("Result [New Query]: 3 rows x 2 columns in 12 ms"));
        assert!(text.contains("Assertions: 2 passed, 0 failed"));
    }

    #[test]
    fn test_text_reports_failed_query() {
        let summary = ResultSummary {
            columns: Vec::new(),
            row_count: 0,
            error: Some("Failed to connect".to_string()),
            ..rows_summary()
        };
        let text = render(OutputFormat::Text, &run_result(Some(summary)));
        assert!(text.contains("Result [New Query]: failed in 12 ms: Failed to connect"));
    }

    #[test]
    fn test_json_includes_result_summary() {
        let body = render(OutputFormat::Json, &run_result(Some(rows_summary())));
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();

        assert_eq!(parsed["events_executed"], 3);
        assert_eq!(parsed["result"]["columns"], json!(["id", "name"]));
        assert_eq!(parsed["result"]["execution_ms"], 12);
        assert!(parsed["result"]["error"].is_null());
        assert_eq!(parsed["state"]["editor_text"], "SELECT 1");
        assert_eq!(parsed["assertions"]["passed"], 2);
    }

    #[test]
    fn test_json_without_result() {
        let body = render(OutputFormat::Json, &run_result(None));
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(parsed["result"].is_null());
    }

    #[test]
    fn test_frames_lists_each_capture() {
        let out = render(OutputFormat::Frames, &run_result(None));
        assert!(out.contains("=== FRAME 0 (initial) ===\nInitial\n"));
        assert!(out.contains("=== FRAME 1 (key:ctrl+e) ==="));
        assert!(out.contains("Total: 2 frames"));
        assert!(!out.contains("Result ["));
    }

    #[test]
    fn test_screen_text_trims_trailing_blank_lines() {
        let mut buffer = Buffer::empty(ratatui::layout::Rect::new(0, 0, 10, 4));
        buffer.set_string(0, 0, "alpha", ratatui::style::Style::default());
        buffer.set_string(2, 1, "beta", ratatui::style::Style::default());
        assert_eq!(screen_text(&buffer), "alpha\n  beta\n");
    }

    #[test]
    fn test_summary_from_app_without_result() {
        let app = App::new("mock".to_string(), &ProgressConfig::default());
        assert_eq!(ResultSummary::from_app(&app), None);
    }
}
