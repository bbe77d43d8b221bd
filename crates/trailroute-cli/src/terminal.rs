//! Terminal capabilities and number formatting for text output.
//!
//! Renderers take a [`ColorPalette`] instead of probing the environment, so
//! they produce identical plain text under test.

use std::env;
use std::ffi::OsString;

/// SGR sequences for the roles text output distinguishes.
mod sgr {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD_WHITE: &str = "\x1b[1;97m";
    pub const DIM: &str = "\x1b[90m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const ORANGE: &str = "\x1b[38;5;208m";
}

/// Escape sequences per output role; every field is empty when color is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    /// Route and listing headlines.
    pub heading: &'static str,
    pub label: &'static str,
    pub coordinate: &'static str,
    /// Trail names.
    pub trail: &'static str,
    /// Climb figures.
    pub ascent: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: sgr::RESET,
            heading: sgr::BOLD_WHITE,
            label: sgr::DIM,
            coordinate: sgr::CYAN,
            trail: sgr::GREEN,
            ascent: sgr::ORANGE,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            heading: "",
            label: "",
            coordinate: "",
            trail: "",
            ascent: "",
        }
    }

    /// Palette for the current process environment.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether ANSI colors should be emitted, honouring `NO_COLOR` and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    color_allowed(env::var_os("NO_COLOR"), env::var_os("TERM"))
}

fn color_allowed(no_color: Option<OsString>, term: Option<OsString>) -> bool {
    if no_color.is_some() {
        return false;
    }
    !term.is_some_and(|term| term.eq_ignore_ascii_case("dumb"))
}

/// Whether `LC_ALL` or `LANG` names a UTF-8 locale.
#[must_use]
pub fn supports_unicode() -> bool {
    let lc_all = env::var_os("LC_ALL");
    let lang = env::var_os("LANG");
    // LC_ALL overrides LANG when set.
    locale_is_utf8(lc_all.or(lang))
}

fn locale_is_utf8(locale: Option<OsString>) -> bool {
    locale.is_some_and(|value| {
        let value = value.to_string_lossy().to_ascii_lowercase();
        value.contains("utf-8") || value.contains("utf8")
    })
}

/// Separator between consecutive trail names.
#[must_use]
pub fn arrow() -> &'static str {
    if supports_unicode() {
        " → "
    } else {
        " -> "
    }
}

/// Group digits in threes with commas.
///
/// ```
/// use trailroute_cli::terminal::format_with_separators;
///
/// assert_eq!(format_with_separators(950), "950");
/// assert_eq!(format_with_separators(2_350), "2,350");
/// assert_eq!(format_with_separators(4_808_000), "4,808,000");
/// ```
#[must_use]
pub fn format_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let lead = digits.len() % 3;
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.char_indices() {
        if index > 0 && index % 3 == lead % 3 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Metres rendered as `850 m` below a kilometre, `12.4 km` above.
#[must_use]
pub fn format_distance(metres: f64) -> String {
    let metres = metres.max(0.0);
    if metres.round() < 1_000.0 {
        format!("{} m", metres.round() as u64)
    } else {
        format!("{:.1} km", metres / 1_000.0)
    }
}
