//! Diagnosis result types.
//!
//! The classifier was trained with malignant encoded as class `0` and
//! benign as class `1`. That encoding is an external contract.

/// Binary diagnostic label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosisLabel {
    Malignant,
    Benign,
}

impl DiagnosisLabel {
    /// Classifier output that means malignant.
    pub const MALIGNANT_CLASS: i64 = 0;

    /// Classifier output that means benign.
    pub const BENIGN_CLASS: i64 = 1;

    /// Map a raw classifier output to a label.
    ///
    /// Returns `None` for anything outside `{0, 1}`.
    #[must_use]
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            Self::MALIGNANT_CLASS => Some(Self::Malignant),
            Self::BENIGN_CLASS => Some(Self::Benign),
            _ => None,
        }
    }

    #[must_use]
    pub fn class(self) -> i64 {
        match self {
            Self::Malignant => Self::MALIGNANT_CLASS,
            Self::Benign => Self::BENIGN_CLASS,
        }
    }

    /// Static advisory shown with the label.
    #[must_use]
    pub fn advisory(self) -> &'static str {
        match self {
            Self::Malignant => "High-risk indicators detected. Urgent clinical review recommended.",
            Self::Benign => "Low-risk indicators. Non-cancerous patterns detected.",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Self::Malignant => (244, 63, 94), // Rose (#F43F5E)
            Self::Benign => (16, 185, 129),   // Emerald (#10B981)
        }
    }
}

impl std::fmt::Display for DiagnosisLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malignant => write!(f, "MALIGNANT"),
            Self::Benign => write!(f, "BENIGN"),
        }
    }
}

/// Outcome of one pipeline run. Never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diagnosis {
    pub label: DiagnosisLabel,

    /// Fraction of the neighbour vote won by `label`, when the classifier reports it.
    pub vote_share: Option<f64>,
}

impl Diagnosis {
    #[must_use]
    pub fn new(label: DiagnosisLabel, vote_share: Option<f64>) -> Self {
        Self { label, vote_share }
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        self.label.advisory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_polarity() {
        assert_eq!(DiagnosisLabel::from_class(0), Some(DiagnosisLabel::Malignant));
        assert_eq!(DiagnosisLabel::from_class(1), Some(DiagnosisLabel::Benign));
        assert_eq!(DiagnosisLabel::from_class(0).map(|l| l.to_string()).as_deref(), Some("MALIGNANT"));
        assert_eq!(DiagnosisLabel::from_class(1).map(|l| l.to_string()).as_deref(), Some("BENIGN"));
    }

    #[test]
    fn test_unknown_class_has_no_label() {
        assert_eq!(DiagnosisLabel::from_class(2), None);
        assert_eq!(DiagnosisLabel::from_class(-1), None);
    }

    #[test]
    fn test_class_round_trip() {
        for label in [DiagnosisLabel::Malignant, DiagnosisLabel::Benign] {
            assert_eq!(DiagnosisLabel::from_class(label.class()), Some(label));
        }
    }

    #[test]
    fn test_diagnosis_message() {
        let d = Diagnosis::new(DiagnosisLabel::Malignant, Some(0.8));
        assert!(d.message().starts_with("High-risk"));
        let d = Diagnosis::new(DiagnosisLabel::Benign, None);
        assert!(d.message().starts_with("Low-risk"));
    }
}
