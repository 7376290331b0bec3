//! Clinical color palette and the text styles built from it.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::DiagnosisLabel;

/// Palette and preset styles for every view.
pub struct MedicalTheme;

impl MedicalTheme {
    /// Teal accent (#0D9488)
    pub const ACCENT: Color = Color::Rgb(13, 148, 136);
    /// Bright teal for focus and key hints (#2DD4BF)
    pub const ACCENT_BRIGHT: Color = Color::Rgb(45, 212, 191);
    /// Slate outline (#94A3B8)
    pub const OUTLINE: Color = Color::Rgb(148, 163, 184);

    pub const CAUTION: Color = Color::Rgb(251, 191, 36); // amber
    pub const ALERT: Color = Color::Rgb(244, 63, 94); // rose
    pub const NOTE: Color = Color::Rgb(59, 130, 246); // blue

    pub const INK: Color = Color::Rgb(248, 250, 252);
    pub const INK_DIM: Color = Color::Rgb(148, 163, 184);
    pub const INK_FAINT: Color = Color::Rgb(100, 116, 139);

    fn fg(color: Color) -> Style {
        Style::new().fg(color)
    }

    fn bold(color: Color) -> Style {
        Style::new().fg(color).add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn title() -> Style {
        Self::bold(Self::INK)
    }

    /// Panel titles
    #[must_use]
    pub fn subtitle() -> Style {
        Self::bold(Self::ACCENT_BRIGHT)
    }

    #[must_use]
    pub fn text() -> Style {
        Self::fg(Self::INK)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Self::fg(Self::INK_DIM)
    }

    /// Placeholder values and the disclaimer
    #[must_use]
    pub fn text_muted() -> Style {
        Self::fg(Self::INK_FAINT)
    }

    #[must_use]
    pub fn warning() -> Style {
        Self::fg(Self::CAUTION)
    }

    #[must_use]
    pub fn danger() -> Style {
        Self::fg(Self::ALERT)
    }

    #[must_use]
    pub fn info() -> Style {
        Self::fg(Self::NOTE)
    }

    /// Focused field label and column title
    #[must_use]
    pub fn focused() -> Style {
        Self::bold(Self::ACCENT_BRIGHT)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Self::fg(Self::ACCENT_BRIGHT)
    }

    #[must_use]
    pub fn border() -> Style {
        Self::fg(Self::OUTLINE)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Self::fg(Self::ACCENT)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Self::bold(Self::ACCENT_BRIGHT)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Self::fg(Self::INK_DIM)
    }

    /// Label color: rose for malignant, emerald for benign.
    #[must_use]
    pub fn diagnosis(label: DiagnosisLabel) -> Style {
        let (r, g, b) = label.color();
        Self::fg(Color::Rgb(r, g, b))
    }
}
