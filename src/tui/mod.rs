//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a medical-themed interface for:
//! - Entering the 30 tissue measurements
//! - Running a diagnostic and reading the result
//! - Reporting missing or unreadable model assets

mod app;
mod styles;
mod ui;

pub use app::{App, Availability};
pub use styles::MedicalTheme;
pub use ui::diagnosis::DiagnosisState;
pub use ui::form::MeasurementFormState;
pub use ui::sidebar::ModelSummary;
