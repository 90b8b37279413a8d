use serde_json::json;

/// Closed set of visual themes selectable via a free-text hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Modern,
    Minimalist,
    Colorful,
    Elegant,
    Dark,
}

/// Four-slot color palette carried by every theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
}

impl Palette {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "primary": self.primary,
            "secondary": self.secondary,
            "accent": self.accent,
            "bg": self.background,
        })
    }
}

impl Theme {
    /// Exact lowercase key lookup only; anything else falls back to Modern so
    /// the prompt content stays deterministic and auditable.
    pub fn resolve(hint: Option<&str>) -> Theme {
        match hint.map(|h| h.trim().to_lowercase()).as_deref() {
            Some("minimalist") => Theme::Minimalist,
            Some("colorful") => Theme::Colorful,
            Some("elegant") => Theme::Elegant,
            Some("dark") => Theme::Dark,
            _ => Theme::Modern,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Theme::Modern => "modern",
            Theme::Minimalist => "minimalist",
            Theme::Colorful => "colorful",
            Theme::Elegant => "elegant",
            Theme::Dark => "dark",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Theme::Modern => {
                "Clean, contemporary design with blue tones, card-based layouts, subtle shadows"
            }
            Theme::Minimalist => {
                "Minimal, monochrome palette, generous whitespace, simple typography, no decorations"
            }
            Theme::Colorful => {
                "Vibrant, playful colors (purple, pink, orange), gradients, bold typography"
            }
            Theme::Elegant => {
                "Sophisticated purple/lavender tones, serif fonts, refined spacing, luxury feel"
            }
            Theme::Dark => {
                "Dark backgrounds (#111827), neon green accents, high contrast, modern dark UI"
            }
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Modern => Palette {
                primary: "#3B82F6",
                secondary: "#1E40AF",
                accent: "#60A5FA",
                background: "#F9FAFB",
            },
            Theme::Minimalist => Palette {
                primary: "#1F2937",
                secondary: "#6B7280",
                accent: "#9CA3AF",
                background: "#FFFFFF",
            },
            Theme::Colorful => Palette {
                primary: "#8B5CF6",
                secondary: "#EC4899",
                accent: "#F59E0B",
                background: "#FEF3C7",
            },
            Theme::Elegant => Palette {
                primary: "#9333EA",
                secondary: "#C084FC",
                accent: "#D8B4FE",
                background: "#FAF5FF",
            },
            Theme::Dark => Palette {
                primary: "#10B981",
                secondary: "#059669",
                accent: "#34D399",
                background: "#111827",
            },
        }
    }
}
