use serde::{Deserialize, Serialize};

use crate::capabilities::ColorScheme;

/// App-scoped light/dark state. One instance lives in the `Model` and every
/// view projection reads it from there.
///
/// OS appearance changes are followed until the user makes an explicit
/// choice; after that they are only recorded, until [`ThemeState::follow_system`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ThemeState {
    is_dark_mode: bool,
    system: ColorScheme,
    explicit_override: bool,
}

impl ThemeState {
    #[must_use]
    pub const fn initialize(system: ColorScheme) -> Self {
        Self {
            is_dark_mode: system.is_dark(),
            system,
            explicit_override: false,
        }
    }

    #[must_use]
    pub const fn is_dark_mode(&self) -> bool {
        self.is_dark_mode
    }

    #[must_use]
    pub const fn system(&self) -> ColorScheme {
        self.system
    }

    #[must_use]
    pub const fn follows_system(&self) -> bool {
        !self.explicit_override
    }

    /// Returns whether `is_dark_mode` changed.
    pub fn on_system_change(&mut self, scheme: ColorScheme) -> bool {
        self.system = scheme;
        if self.explicit_override {
            return false;
        }
        let changed = self.is_dark_mode != scheme.is_dark();
        self.is_dark_mode = scheme.is_dark();
        changed
    }

    pub fn toggle(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.explicit_override = true;
    }

    pub fn set_explicit(&mut self, value: bool) {
        self.is_dark_mode = value;
        self.explicit_override = true;
    }

    pub fn follow_system(&mut self) {
        self.explicit_override = false;
        self.is_dark_mode = self.system.is_dark();
    }

    #[must_use]
    pub const fn scheme(&self) -> ColorScheme {
        ColorScheme::from_dark(self.is_dark_mode)
    }

    #[must_use]
    pub const fn palette(&self) -> &'static ThemePalette {
        if self.is_dark_mode {
            &DARK_PALETTE
        } else {
            &LIGHT_PALETTE
        }
    }

    #[must_use]
    pub const fn status_bar(&self) -> StatusBarStyle {
        if self.is_dark_mode {
            StatusBarStyle::LightContent
        } else {
            StatusBarStyle::DarkContent
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBarStyle {
    LightContent,
    DarkContent,
}

/// Hex or rgba() strings, handed to the shell verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemePalette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub text_disabled: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub error: &'static str,
    pub info: &'static str,
    pub gradient_start: &'static str,
    pub gradient_end: &'static str,
}

pub const DARK_PALETTE: ThemePalette = ThemePalette {
    primary: "#FFD700",
    secondary: "#9f7aea",
    background: "#121212",
    card: "#1e1e1e",
    text: "#ffffff",
    text_secondary: "rgba(255, 255, 255, 0.7)",
    text_disabled: "rgba(255, 255, 255, 0.5)",
    border: "rgba(255, 255, 255, 0.1)",
    accent: "#00d2d3",
    success: "#10b981",
    warning: "#f59e0b",
    error: "#ff4757",
    info: "#3b82f6",
    gradient_start: "#FFD700",
    gradient_end: "#9f7aea",
};

pub const LIGHT_PALETTE: ThemePalette = ThemePalette {
    primary: "#F7DC6F",
    secondary: "#8b5cf6",
    background: "#ffffff",
    card: "#f8fafc",
    text: "#0f172a",
    text_secondary: "#475569",
    text_disabled: "#94a3b8",
    border: "rgba(0, 0, 0, 0.05)",
    accent: "#06b6d4",
    success: "#34d399",
    warning: "#fbbf24",
    error: "#ef4444",
    info: "#60a5fa",
    gradient_start: "#6366f1",
    gradient_end: "#8b5cf6",
};
