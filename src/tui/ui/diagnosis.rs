//! Diagnosis result panel.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Diagnosis, DiagnosisLabel};
use crate::tui::styles::MedicalTheme;

/// Result of the last explicit trigger.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DiagnosisState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Pipeline returned a label
    Computed { diagnosis: Diagnosis },
    /// Pipeline failed; the form stays usable
    Failed { message: String },
}

/// Render the result panel
pub fn render_diagnosis(f: &mut Frame, area: Rect, state: &DiagnosisState) {
    match state {
        DiagnosisState::Idle => render_idle(f, area),
        DiagnosisState::Computed { diagnosis } => render_result(f, area, diagnosis),
        DiagnosisState::Failed { message } => render_error(f, area, message),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(Span::styled(
            "Ready for diagnostic",
            MedicalTheme::text_secondary(),
        )),
        Line::from(Span::styled(
            "Fill in the measurements and press Enter",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" Diagnosis ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_result(f: &mut Frame, area: Rect, diagnosis: &Diagnosis) {
    let label_style = MedicalTheme::diagnosis(diagnosis.label);
    let block = Block::default()
        .title(Span::styled(" Diagnosis Result ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(label_style);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(30)])
        .split(inner);

    let icon = match diagnosis.label {
        DiagnosisLabel::Malignant => "!",
        DiagnosisLabel::Benign => "OK",
    };

    let label_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{icon} {}", diagnosis.label),
            label_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(diagnosis.message(), MedicalTheme::text())),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(label_display, chunks[0]);

    if let Some(share) = diagnosis.vote_share {
        let share = share.clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(Span::styled(
                        " Neighbour Agreement ",
                        MedicalTheme::text_secondary(),
                    ))
                    .borders(Borders::ALL)
                    .border_style(MedicalTheme::border()),
            )
            .gauge_style(label_style)
            .ratio(share)
            .label(format!("{:.0}%", share * 100.0));
        f.render_widget(gauge, chunks[1]);
    }
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(Span::styled("! Diagnostic failed", MedicalTheme::danger())),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Diagnosis ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}
