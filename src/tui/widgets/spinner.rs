//! Animated activity indicator shown while a query runs.

use std::time::{Duration, Instant};

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Animation speed in milliseconds per frame.
const FRAME_DURATION_MS: u128 = 100;

/// Spinner state.
#[derive(Debug, Clone)]
pub struct Spinner {
    start_time: Instant,
    label: String,
}

impl Spinner {
    /// Creates a spinner with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            label: label.into(),
        }
    }

    /// Spinner for a running execution.
    pub fn executing() -> Self {
        Self::new("Executing")
    }

    /// Returns the current frame of the animation.
    pub fn frame(&self) -> &'static str {
        let elapsed_ms = self.start_time.elapsed().as_millis();
        let frame_index = (elapsed_ms / FRAME_DURATION_MS) as usize;
        FRAMES[frame_index % FRAMES.len()]
    }

    /// Frame followed by the label.
    pub fn display(&self) -> String {
        format!("{} {}", self.frame(), self.label)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_executing() {
        let spinner = Spinner::executing();
        assert_eq!(spinner.label(), "Executing");
        assert!(FRAMES.contains(&spinner.frame()));
    }

    #[test]
    fn test_spinner_display() {
        let spinner = Spinner::new("Waiting");
        let display = spinner.display();
        assert!(display.ends_with(" Waiting"));
        assert!(FRAMES.iter().any(|f| display.starts_with(f)));
    }
}
