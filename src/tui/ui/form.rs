//! Measurement input form.
//!
//! Thirty fields laid out as three columns (mean, standard error, worst).
//! The columns are layout only; values are read back in vector order.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{FeatureGroup, FeatureId, TumorFeatures, MEASURES_PER_GROUP};
use crate::tui::styles::MedicalTheme;

/// Width reserved for field labels.
const LABEL_WIDTH: usize = 24;

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub id: FeatureId,
    pub value: String,
}

impl FormField {
    /// Parse the raw text. Empty means 0.0.
    ///
    /// # Errors
    /// Returns error if the text is not a number.
    pub fn parsed(&self) -> Result<f64, String> {
        let text = self.value.trim();
        if text.is_empty() {
            return Ok(0.0);
        }
        text.parse::<f64>()
            .map_err(|_| format!("{}: Invalid number", self.id.label()))
    }

    /// Text shown when the field is not being edited (4 decimal places).
    #[must_use]
    pub fn display_value(&self) -> String {
        match self.parsed() {
            Ok(v) => format!("{v:.4}"),
            Err(_) => self.value.clone(),
        }
    }
}

/// Measurement form state
pub struct MeasurementFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for MeasurementFormState {
    fn default() -> Self {
        Self {
            fields: FeatureId::all()
                .map(|id| FormField {
                    id,
                    value: String::new(),
                })
                .collect(),
            selected_field: 0,
            error_message: None,
        }
    }
}

impl MeasurementFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Same row, next column
    pub fn next_column(&mut self) {
        self.selected_field = (self.selected_field + MEASURES_PER_GROUP) % self.fields.len();
    }

    /// Same row, previous column
    pub fn prev_column(&mut self) {
        let n = self.fields.len();
        self.selected_field = (self.selected_field + n - MEASURES_PER_GROUP) % n;
    }

    /// Add a character to the current field
    pub fn input_char(&mut self, c: char) {
        if c.is_ascii_digit() || c == '.' || c == '-' {
            self.fields[self.selected_field].value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.zeroize();
    }

    /// Wipe every field.
    pub fn reset(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
        }
        self.error_message = None;
        self.selected_field = 0;
    }

    /// Fill the form from a feature vector.
    pub fn load(&mut self, features: &TumorFeatures) {
        for field in self.fields.iter_mut() {
            field.value = features.get(field.id).to_string();
        }
        self.error_message = None;
    }

    /// Coerce every field and assemble the feature vector.
    ///
    /// # Errors
    /// Returns the first field that is not a number.
    pub fn to_features(&self) -> Result<TumorFeatures, String> {
        let mut features = TumorFeatures::default();
        for field in &self.fields {
            features.set(field.id, field.parsed()?);
        }
        Ok(features)
    }
}

impl Drop for MeasurementFormState {
    fn drop(&mut self) {
        for field in self.fields.iter_mut() {
            field.value.zeroize();
        }
    }
}

/// Render the measurement form
pub fn render_measurement_form(f: &mut Frame, area: Rect, state: &MeasurementFormState) {
    let block = Block::default()
        .title(Span::styled(
            " Tissue Sample Measurements ",
            MedicalTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(inner);

    for (i, group) in FeatureGroup::ALL.into_iter().enumerate() {
        let offset = group.offset();
        render_field_column(
            f,
            columns[i],
            group,
            &state.fields[offset..offset + MEASURES_PER_GROUP],
            offset,
            state.selected_field,
        );
    }
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    group: FeatureGroup,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let has_focus = (offset..offset + fields.len()).contains(&selected);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", group.title()),
            if has_focus {
                MedicalTheme::focused()
            } else {
                MedicalTheme::text_secondary()
            },
        ))
        .borders(Borders::ALL)
        .border_style(if has_focus {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        });

    let lines: Vec<Line> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let is_selected = offset + i == selected;
            let label_style = if is_selected {
                MedicalTheme::focused()
            } else {
                MedicalTheme::text_secondary()
            };

            let value = if is_selected {
                Span::styled(field.value.clone(), MedicalTheme::text())
            } else if field.value.is_empty() {
                Span::styled(field.display_value(), MedicalTheme::text_muted())
            } else {
                Span::styled(field.display_value(), MedicalTheme::text())
            };

            Line::from(vec![
                Span::styled(
                    format!(" {:<width$}", field.id.label(), width = LABEL_WIDTH),
                    label_style,
                ),
                value,
                if is_selected {
                    Span::styled("▌", MedicalTheme::cursor())
                } else {
                    Span::raw("")
                },
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Key hints, or the pending input error.
pub fn render_form_footer(f: &mut Frame, area: Rect, state: &MeasurementFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓←→] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Execute Diagnostic ", MedicalTheme::key_desc()),
            Span::styled("[Ctrl-S] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[Ctrl-R] ", MedicalTheme::key_hint()),
            Span::styled("Reset ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
