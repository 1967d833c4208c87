//! src/view/theme.rs
//! ============================================================================
//! # Theme Color Palettes
//!
//! The default palette follows Catppuccin Mocha, the light one Catppuccin
//! Latte: https://github.com/catppuccin/catppuccin

use ratatui::style::{Color, Modifier, Style};
use tracing::{debug, instrument};

use crate::config::Theme;

pub const BACKGROUND: Color = Color::Rgb(30, 30, 46); // Base
pub const CURRENT_LINE: Color = Color::Rgb(69, 71, 90); // Surface1
pub const FOREGROUND: Color = Color::Rgb(205, 214, 244); // Text
pub const COMMENT: Color = Color::Rgb(127, 132, 156); // Overlay1
pub const CYAN: Color = Color::Rgb(137, 220, 235); // Sky
pub const GREEN: Color = Color::Rgb(166, 227, 161); // Green
pub const ORANGE: Color = Color::Rgb(250, 179, 135); // Peach
pub const PINK: Color = Color::Rgb(245, 194, 231); // Pink
pub const PURPLE: Color = Color::Rgb(203, 166, 247); // Mauve
pub const RED: Color = Color::Rgb(243, 139, 168); // Red
pub const YELLOW: Color = Color::Rgb(249, 226, 175); // Yellow

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub current_line: Color,
    pub foreground: Color,
    pub comment: Color,
    pub accent: Color,
    pub heading: Color,
    pub link: Color,
    pub code: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

impl Palette {
    pub const MOCHA: Palette = Palette {
        background: BACKGROUND,
        current_line: CURRENT_LINE,
        foreground: FOREGROUND,
        comment: COMMENT,
        accent: PURPLE,
        heading: PINK,
        link: CYAN,
        code: ORANGE,
        success: GREEN,
        warning: YELLOW,
        error: RED,
        info: CYAN,
    };

    pub const LATTE: Palette = Palette {
        background: Color::Rgb(239, 241, 245),
        current_line: Color::Rgb(204, 208, 218),
        foreground: Color::Rgb(76, 79, 105),
        comment: Color::Rgb(140, 143, 161),
        accent: Color::Rgb(136, 57, 239),
        heading: Color::Rgb(234, 118, 203),
        link: Color::Rgb(4, 165, 229),
        code: Color::Rgb(254, 100, 11),
        success: Color::Rgb(64, 160, 43),
        warning: Color::Rgb(223, 142, 29),
        error: Color::Rgb(210, 15, 57),
        info: Color::Rgb(32, 159, 181),
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Default => Self::MOCHA,
            Theme::Light => Self::LATTE,
        }
    }

    pub fn base(&self) -> Style {
        Style::default().bg(self.background).fg(self.foreground)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.comment)
    }

    pub fn highlight(&self) -> Style {
        Style::default().bg(self.current_line).fg(self.foreground)
    }

    pub fn active(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.heading)
            .add_modifier(Modifier::BOLD)
    }
}

/// Logs the selected palette and returns it.
#[instrument(level = "debug")]
pub fn init_theme(theme: Theme) -> Palette {
    let palette = Palette::for_theme(theme);
    debug!("Background: {:?}", palette.background);
    debug!("Foreground: {:?}", palette.foreground);
    debug!("Accent: {:?}", palette.accent);
    palette
}
