//! Blocking screen shown when the model assets could not be loaded.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::adapters::AssetError;
use crate::tui::styles::MedicalTheme;

pub fn render_unavailable(
    f: &mut Frame,
    area: Rect,
    error: &AssetError,
    scaler_path: &str,
    model_path: &str,
) {
    let (heading, style) = match error {
        AssetError::NotFound { .. } => ("! Model assets not found", MedicalTheme::warning()),
        AssetError::Deserialization { .. } => {
            ("! Model assets could not be loaded", MedicalTheme::danger())
        }
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(heading, style)),
        Line::from(""),
        Line::from(Span::styled(error.to_string(), MedicalTheme::text())),
        Line::from(""),
        Line::from(Span::styled(
            "The diagnostic form is disabled. Expected artifacts:",
            MedicalTheme::text_secondary(),
        )),
        Line::from(Span::styled(format!("scaler     {scaler_path}"), MedicalTheme::info())),
        Line::from(Span::styled(format!("classifier {model_path}"), MedicalTheme::info())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let content = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(" Diagnostics Unavailable ", MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(style),
        );

    f.render_widget(content, area);
}
