use crossterm::style::Color;

use leetcoach_core::Sender;

/// Light or dark terminal colors. Held by the REPL and passed to whatever draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub code_fg: Color,
    pub user_color: Color,
    pub assistant_color: Color,
    pub system_color: Color,
}

impl Theme {
    /// Unknown names fall back to light.
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn all_names() -> &'static [&'static str] {
        &["light", "dark"]
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                fg: Color::Black,
                accent: Color::Rgb { r: 37, g: 99, b: 235 },
                muted: Color::DarkGrey,
                error: Color::DarkRed,
                code_fg: Color::Rgb { r: 199, g: 37, b: 78 },
                user_color: Color::DarkBlue,
                assistant_color: Color::DarkGreen,
                system_color: Color::Rgb { r: 180, g: 120, b: 0 },
            },
            Theme::Dark => Palette {
                fg: Color::Rgb { r: 220, g: 220, b: 220 },
                accent: Color::Rgb { r: 122, g: 162, b: 247 },
                muted: Color::Rgb { r: 100, g: 100, b: 100 },
                error: Color::Rgb { r: 247, g: 118, b: 142 },
                code_fg: Color::Rgb { r: 224, g: 175, b: 104 },
                user_color: Color::Cyan,
                assistant_color: Color::Green,
                system_color: Color::Yellow,
            },
        }
    }
}

impl Palette {
    pub fn sender_color(&self, sender: Sender) -> Color {
        match sender {
            Sender::User => self.user_color,
            Sender::Assistant => self.assistant_color,
            Sender::System => self.system_color,
        }
    }
}
