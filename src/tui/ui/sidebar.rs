//! Model summary panel.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::adapters::knn::{Metric, Weights};
use crate::adapters::ModelAssets;
use crate::domain::DiagnosisLabel;
use crate::tui::styles::MedicalTheme;

/// What the side panel shows about the loaded models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    pub n_neighbors: usize,
    pub metric: String,
    pub weights: String,
    pub n_samples: usize,
    pub scaler_kind: String,
}

impl ModelSummary {
    #[must_use]
    pub fn from_assets(assets: &ModelAssets) -> Self {
        let classifier = &assets.classifier;
        Self {
            n_neighbors: classifier.n_neighbors(),
            metric: match classifier.metric() {
                Metric::Minkowski => format!("minkowski (p={})", classifier.p()),
                Metric::Euclidean => "euclidean".to_string(),
                Metric::Manhattan => "manhattan".to_string(),
                Metric::Chebyshev => "chebyshev".to_string(),
            },
            weights: match classifier.weights() {
                Weights::Uniform => "uniform".to_string(),
                Weights::Distance => "distance".to_string(),
            },
            n_samples: classifier.n_samples(),
            scaler_kind: assets.scaler.kind().to_string(),
        }
    }
}

pub fn render_sidebar(f: &mut Frame, area: Rect, summary: &ModelSummary) {
    let row = |key: &str, value: String| {
        Line::from(vec![
            Span::styled(format!(" {key:<10}"), MedicalTheme::text_secondary()),
            Span::styled(value, MedicalTheme::text()),
        ])
    };

    let lines = vec![
        Line::from(Span::styled(" Classifier", MedicalTheme::title())),
        row("Type", "k-NN".to_string()),
        row("k", summary.n_neighbors.to_string()),
        row("Metric", summary.metric.clone()),
        row("Weights", summary.weights.clone()),
        row("Samples", summary.n_samples.to_string()),
        Line::from(""),
        Line::from(Span::styled(" Scaler", MedicalTheme::title())),
        row("Kind", summary.scaler_kind.clone()),
        Line::from(""),
        Line::from(Span::styled(" Label Encoding", MedicalTheme::title())),
        Line::from(vec![
            Span::styled(
                format!(" {} ", DiagnosisLabel::MALIGNANT_CLASS),
                MedicalTheme::text_secondary(),
            ),
            Span::styled(
                DiagnosisLabel::Malignant.to_string(),
                MedicalTheme::diagnosis(DiagnosisLabel::Malignant),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!(" {} ", DiagnosisLabel::BENIGN_CLASS),
                MedicalTheme::text_secondary(),
            ),
            Span::styled(
                DiagnosisLabel::Benign.to_string(),
                MedicalTheme::diagnosis(DiagnosisLabel::Benign),
            ),
        ]),
    ];

    let panel = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(" Model ", MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(panel, area);
}
