//! Color palette for the panel, loaded from `theme.conf`.

use ratatui::style::Color;
use std::path::Path;

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub focus_border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

impl Theme {
    /// Plain ANSI palette for terminals without truecolor.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            focus_border: Color::Cyan,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            danger: Color::Red,
        }
    }

    /// Catppuccin Mocha.
    pub fn mocha() -> Self {
        // https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),
            muted: Color::Rgb(0x7f, 0x84, 0x9c),
            title: Color::Rgb(0xcb, 0xa6, 0xf7),
            border: Color::Rgb(0x58, 0x5b, 0x70),
            focus_border: Color::Rgb(0x89, 0xb4, 0xfa),
            header_bg: Color::Rgb(0x31, 0x32, 0x44),
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf),
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a),
            danger: Color::Rgb(0xf3, 0x8b, 0xa8),
        }
    }

    fn slots(&mut self) -> [(&'static str, &mut Color); 12] {
        [
            ("text", &mut self.text),
            ("muted", &mut self.muted),
            ("title", &mut self.title),
            ("border", &mut self.border),
            ("focus_border", &mut self.focus_border),
            ("header_bg", &mut self.header_bg),
            ("header_fg", &mut self.header_fg),
            ("status_bg", &mut self.status_bg),
            ("status_fg", &mut self.status_fg),
            ("highlight_fg", &mut self.highlight_fg),
            ("highlight_bg", &mut self.highlight_bg),
            ("danger", &mut self.danger),
        ]
    }

    /// Parse `key = value` lines on top of `mocha`. Unknown keys and
    /// unparsable colors are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut theme = Self::mocha();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let (key, val) = (key.trim(), val.trim());
            let Some(color) = parse_color(val) else {
                continue;
            };
            if let Some((_, slot)) = theme.slots().into_iter().find(|(k, _)| *k == key) {
                *slot = color;
            }
        }
        theme
    }

    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    /// Persist the theme in `key = value` form.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# user-panel theme\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");
        let mut copy = *self;
        for (key, color) in copy.slots() {
            let _ = writeln!(buf, "{key} = {}", color_to_str(*color));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, buf)
    }

    /// Load `path`, or write the default palette there and return it.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let theme = Self::default();
        if let Err(e) = theme.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default theme");
        }
        theme
    }
}

/// Hex (`#RRGGBB` or `RRGGBB`) or `reset`.
fn parse_color(s: &str) -> Option<Color> {
    let lower = s.trim().to_ascii_lowercase();
    if lower == "reset" {
        return Some(Color::Reset);
    }
    let hex = lower.strip_prefix('#').unwrap_or(&lower);
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn color_to_str(c: Color) -> String {
    match c {
        Color::Rgb(r, g, b) => format!("#{r:02X}{g:02X}{b:02X}"),
        Color::Black => "#000000".to_string(),
        Color::Red => "#FF0000".to_string(),
        Color::Yellow => "#FFFF00".to_string(),
        Color::Cyan => "#00FFFF".to_string(),
        Color::Gray => "#B3B3B3".to_string(),
        Color::DarkGray => "#4D4D4D".to_string(),
        Color::White => "#FFFFFF".to_string(),
        // named colors outside the built-in palettes
        _ => "reset".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_applies_known_keys_over_mocha() {
        let t = Theme::parse("# c\ntitle = #112233\ndanger=reset\nnope = #000000\nborder = zzz\n");
        assert_eq!(t.title, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(t.danger, Color::Reset);
        assert_eq!(t.border, Theme::mocha().border);
    }

    #[test]
    fn written_theme_reads_back() {
        let mut path = std::env::temp_dir();
        path.push(format!("upanel_theme_{}.conf", std::process::id()));
        let t = Theme::mocha();
        t.write_file(&path).unwrap();
        assert_eq!(Theme::from_file(&path).unwrap(), t);
        let _ = std::fs::remove_file(&path);
    }
}
