//! Main TUI application state machine.
//!
//! Handles:
//! - Readiness (form offered only when the model assets loaded)
//! - Input event handling
//! - Synchronous diagnostic runs

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::artifacts::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use crate::adapters::knn::KnnClassifier;
use crate::adapters::scaler::FeatureScaler;
use crate::adapters::{AssetError, AssetLoader, ModelAssets};
use crate::application::InferenceService;
use crate::domain::TumorFeatures;
use crate::ports::{Classifier, Normalizer};

use super::ui::{
    diagnosis::{render_diagnosis, DiagnosisState},
    form::{render_form_footer, render_measurement_form, MeasurementFormState},
    render_disclaimer, render_header,
    sidebar::{render_sidebar, ModelSummary},
    unavailable::render_unavailable,
};

/// Whether the diagnostic form can be offered.
pub enum Availability<N, C>
where
    N: Normalizer,
    C: Classifier,
{
    Ready {
        service: InferenceService<N, C>,
        summary: ModelSummary,
    },
    Unavailable {
        error: AssetError,
    },
}

/// Main application state
pub struct App<N = FeatureScaler, C = KnnClassifier>
where
    N: Normalizer,
    C: Classifier,
{
    availability: Availability<N, C>,

    /// Whether the app should quit
    should_quit: bool,

    form_state: MeasurementFormState,

    diagnosis_state: DiagnosisState,

    /// Artifact paths named on the unavailable screen
    scaler_path: String,
    model_path: String,
}

impl App {
    /// Create the application from the process-wide asset loader.
    ///
    /// A failed load does not fail construction; the app starts in the
    /// unavailable state instead.
    #[must_use]
    pub fn new(loader: &AssetLoader) -> Self {
        Self::from_assets(loader.load()).with_expected_paths(
            loader.scaler_path().display().to_string(),
            loader.model_path().display().to_string(),
        )
    }

    /// Create the application from the outcome of an asset load.
    #[must_use]
    pub fn from_assets(assets: std::result::Result<Arc<ModelAssets>, AssetError>) -> Self {
        match assets {
            Ok(assets) => Self::ready(
                assets.inference_service(),
                ModelSummary::from_assets(&assets),
            ),
            Err(error) => {
                tracing::error!(error = %error, "Model assets unavailable; diagnostic form disabled");
                Self::unavailable(error)
            }
        }
    }
}

impl<N, C> App<N, C>
where
    N: Normalizer,
    C: Classifier,
{
    /// Create application with an injected pipeline.
    #[must_use]
    pub fn ready(service: InferenceService<N, C>, summary: ModelSummary) -> Self {
        Self::with_availability(Availability::Ready { service, summary })
    }

    /// Create application in the disabled state.
    #[must_use]
    pub fn unavailable(error: AssetError) -> Self {
        Self::with_availability(Availability::Unavailable { error })
    }

    fn with_availability(availability: Availability<N, C>) -> Self {
        Self {
            availability,
            should_quit: false,
            form_state: MeasurementFormState::default(),
            diagnosis_state: DiagnosisState::default(),
            scaler_path: DEFAULT_SCALER_PATH.to_string(),
            model_path: DEFAULT_MODEL_PATH.to_string(),
        }
    }

    #[must_use]
    pub fn with_expected_paths(mut self, scaler_path: String, model_path: String) -> Self {
        self.scaler_path = scaler_path;
        self.model_path = model_path;
        self
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.availability, Availability::Ready { .. })
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn form_state(&self) -> &MeasurementFormState {
        &self.form_state
    }

    #[must_use]
    pub fn diagnosis_state(&self) -> &DiagnosisState {
        &self.diagnosis_state
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Main loop
        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Draw the current state into a frame.
    pub fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(0),    // Content
                Constraint::Length(2), // Disclaimer
            ])
            .split(f.area());

        render_header(f, chunks[0]);

        match &self.availability {
            Availability::Unavailable { error } => {
                render_unavailable(f, chunks[1], error, &self.scaler_path, &self.model_path);
            }
            Availability::Ready { summary, .. } => {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Min(0), Constraint::Length(32)])
                    .split(chunks[1]);

                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(14), // Form
                        Constraint::Min(4),     // Result
                        Constraint::Length(2),  // Key hints
                    ])
                    .split(columns[0]);

                render_measurement_form(f, rows[0], &self.form_state);
                render_diagnosis(f, rows[1], &self.diagnosis_state);
                render_form_footer(f, rows[2], &self.form_state);
                render_sidebar(f, columns[1], summary);
            }
        }

        render_disclaimer(f, chunks[2]);
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        // Global quit handling
        if key == KeyCode::Esc || (ctrl && key == KeyCode::Char('q')) {
            self.should_quit = true;
            return;
        }

        if !self.is_ready() {
            return;
        }

        match key {
            KeyCode::Char('s') if ctrl => {
                self.form_state.load(&TumorFeatures::reference_sample());
            }
            KeyCode::Char('r') if ctrl => {
                self.form_state.reset();
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left => {
                self.form_state.prev_column();
            }
            KeyCode::Right => {
                self.form_state.next_column();
            }
            KeyCode::Char(c) if !ctrl => {
                self.form_state.input_char(c);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit();
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        let Availability::Ready { service, .. } = &self.availability else {
            return;
        };

        let features = match self.form_state.to_features() {
            Ok(features) => features,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };
        self.form_state.error_message = None;

        self.diagnosis_state = match service.diagnose(&features) {
            Ok(diagnosis) => {
                tracing::info!(label = %diagnosis.label, "Diagnostic completed");
                DiagnosisState::Computed { diagnosis }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Diagnostic failed");
                DiagnosisState::Failed {
                    message: e.to_string(),
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use ratatui::backend::TestBackend;

    use crate::adapters::knn::KnnArtifact;
    use crate::adapters::scaler::ScalerArtifact;
    use crate::domain::{DiagnosisLabel, FEATURE_COUNT};

    /// Identity scaler and a 1-NN model where the origin is benign and the
    /// reference sample is malignant.
    fn assets() -> Arc<ModelAssets> {
        let scaler: ScalerArtifact = serde_json::from_value(serde_json::json!({
            "format_version": 1,
            "kind": "standard",
            "mean": vec![0.0; FEATURE_COUNT],
            "scale": vec![1.0; FEATURE_COUNT],
        }))
        .expect("Valid scaler");
        let model: KnnArtifact = serde_json::from_value(serde_json::json!({
            "format_version": 1,
            "kind": "k_neighbors",
            "n_neighbors": 1,
            "classes": [0, 1],
            "fit_x": [
                vec![0.0; FEATURE_COUNT],
                TumorFeatures::reference_sample().to_array().to_vec(),
            ],
            "fit_y": [1, 0],
        }))
        .expect("Valid model");

        Arc::new(ModelAssets {
            scaler: Arc::new(FeatureScaler::from_artifact(scaler).expect("Valid scaler")),
            classifier: Arc::new(KnnClassifier::from_artifact(model).expect("Valid model")),
        })
    }

    fn ready_app() -> App {
        App::from_assets(Ok(assets()))
    }

    fn press(app: &mut App, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).expect("Test terminal");
        terminal.draw(|f| app.draw(f)).expect("Should draw");
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_starts_idle() {
        let app = ready_app();
        assert!(app.is_ready());
        assert_eq!(app.diagnosis_state(), &DiagnosisState::Idle);
    }

    #[test]
    fn test_empty_form_submits_zero_vector() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Enter);
        match app.diagnosis_state() {
            DiagnosisState::Computed { diagnosis } => {
                assert_eq!(diagnosis.label, DiagnosisLabel::Benign);
            }
            other => panic!("Expected a diagnosis, got {other:?}"),
        }
    }

    #[test]
    fn test_sample_shortcut_then_submit() {
        let mut app = ready_app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Enter);
        match app.diagnosis_state() {
            DiagnosisState::Computed { diagnosis } => {
                assert_eq!(diagnosis.label, DiagnosisLabel::Malignant);
                assert_eq!(diagnosis.vote_share, Some(1.0));
            }
            other => panic!("Expected a diagnosis, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_field_blocks_pipeline() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Enter);
        let previous = app.diagnosis_state().clone();

        type_text(&mut app, "1.2.3");
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.form_state().error_message.as_deref(),
            Some("Mean Radius: Invalid number")
        );
        // Last result is kept.
        assert_eq!(app.diagnosis_state(), &previous);
    }

    #[test]
    fn test_editing_does_not_clear_result() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "12");
        assert!(matches!(app.diagnosis_state(), DiagnosisState::Computed { .. }));
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Right);
        assert_eq!(app.form_state().selected_field, 10);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.form_state().selected_field, 11);
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.form_state().selected_field, 0);
    }

    #[test]
    fn test_reset_and_quit() {
        let mut app = ready_app();
        type_text(&mut app, "42");
        app.handle_key(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(app.form_state().fields[0].value.is_empty());

        assert!(!app.should_quit());
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit());
    }

    #[test]
    fn test_unavailable_ignores_form_keys() {
        let mut app: App = App::unavailable(AssetError::NotFound {
            path: PathBuf::from("scaler.json"),
        });
        assert!(!app.is_ready());
        type_text(&mut app, "5");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.diagnosis_state(), &DiagnosisState::Idle);

        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[test]
    fn test_loader_failure_starts_unavailable() {
        let dir = tempfile::tempdir().expect("Tempdir");
        let loader = AssetLoader::new(dir.path().join("scaler.json"), dir.path().join("knn_model.json"));
        let app = App::new(&loader);
        assert!(!app.is_ready());

        let screen = render(&app);
        assert!(screen.contains("Model assets not found"));
        assert!(screen.contains("knn_model.json"));
        assert!(!screen.contains("Tissue Sample Measurements"));
    }

    #[test]
    fn test_unreadable_artifact_renders_unavailable() {
        let app: App = App::unavailable(AssetError::Deserialization {
            path: PathBuf::from("knn_model.json"),
            reason: "expected value at line 1".into(),
        });
        assert!(!app.is_ready());

        let screen = render(&app);
        assert!(screen.contains("Model assets could not be loaded"));
        assert!(screen.contains("expected value at line 1"));
        assert!(!screen.contains("Tissue Sample Measurements"));
    }

    #[test]
    fn test_renders_form_and_result() {
        let mut app = ready_app();
        let screen = render(&app);
        assert!(screen.contains("Tissue Sample Measurements"));
        assert!(screen.contains("Worst Fractal Dimension"));
        assert!(screen.contains("Ready for diagnostic"));

        press(&mut app, KeyCode::Enter);
        let screen = render(&app);
        assert!(screen.contains("BENIGN"));
        assert!(screen.contains("Low-risk indicators."));
    }
}
