use clap::ValueEnum;
use crossterm::style::Color;

/// Theme names accepted on the command line and by the `theme` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeName {
    Dark,
    Light,
    Contrast,
}

impl ThemeName {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(ThemeName::Dark),
            "light" => Some(ThemeName::Light),
            "contrast" | "high-contrast" => Some(ThemeName::Contrast),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            ThemeName::Dark => ThemeName::Light,
            ThemeName::Light => ThemeName::Contrast,
            ThemeName::Contrast => ThemeName::Dark,
        }
    }
}

impl std::fmt::Display for ThemeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeName::Dark => write!(f, "dark"),
            ThemeName::Light => write!(f, "light"),
            ThemeName::Contrast => write!(f, "contrast"),
        }
    }
}

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    /// Background color
    pub bg: Color,
    /// Default text color
    pub fg: Color,
    /// Matrix bracket and separator color
    pub border: Color,
    /// Cell already holding its identity value
    pub in_place: Color,
    /// Cell still to be reduced
    pub cell: Color,
    /// Augmented column
    pub augmented: Color,
    /// Prompt background
    pub prompt_bg: Color,
    /// Error color
    pub error: Color,
    /// Success/complete color
    pub success: Color,
    /// Timer/info text color
    pub info: Color,
    /// Key binding text color
    pub key: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self::dark(),
            ThemeName::Light => Self::light(),
            ThemeName::Contrast => Self::high_contrast(),
        }
    }

    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            name: ThemeName::Dark,
            bg: Color::Rgb { r: 20, g: 22, b: 30 },
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            border: Color::Rgb { r: 130, g: 140, b: 170 },
            in_place: Color::Rgb { r: 90, g: 255, b: 130 },
            cell: Color::Rgb { r: 80, g: 180, b: 255 },
            augmented: Color::Rgb { r: 255, g: 210, b: 100 },
            prompt_bg: Color::Rgb { r: 35, g: 40, b: 55 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            info: Color::Rgb { r: 160, g: 165, b: 185 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    pub fn light() -> Self {
        Self {
            name: ThemeName::Light,
            bg: Color::Rgb { r: 248, g: 248, b: 252 },
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            border: Color::Rgb { r: 60, g: 60, b: 80 },
            in_place: Color::Rgb { r: 40, g: 160, b: 60 },
            cell: Color::Rgb { r: 30, g: 100, b: 200 },
            augmented: Color::Rgb { r: 200, g: 120, b: 20 },
            prompt_bg: Color::Rgb { r: 230, g: 232, b: 242 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            info: Color::Rgb { r: 90, g: 90, b: 110 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            name: ThemeName::Contrast,
            bg: Color::Black,
            fg: Color::White,
            border: Color::White,
            in_place: Color::Green,
            cell: Color::Cyan,
            augmented: Color::Yellow,
            prompt_bg: Color::Rgb { r: 30, g: 30, b: 30 },
            error: Color::Red,
            success: Color::Green,
            info: Color::Grey,
            key: Color::Yellow,
        }
    }
}
