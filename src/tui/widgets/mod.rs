//! TUI widgets for the workbench.

pub mod editor;
pub mod header;
pub mod spinner;
pub mod table;
pub mod tabs;
pub mod toast;
