use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};

/// Named palettes selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dracula,
    Solarized,
    Gruvbox,
    EverforestLight,
}

impl Theme {
    pub fn config(self) -> ThemeConfig {
        match self {
            Theme::Dracula => dracula_theme(),
            Theme::Solarized => solarized_dark(),
            Theme::Gruvbox => gruvbox_theme(),
            Theme::EverforestLight => everforest_light_theme(),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dracula" => Ok(Theme::Dracula),
            "solarized" | "solarized_dark" => Ok(Theme::Solarized),
            "gruvbox" => Ok(Theme::Gruvbox),
            "everforest_light" | "everforest" => Ok(Theme::EverforestLight),
            other => Err(format!(
                "Unknown theme '{other}'. Expected one of: dracula, solarized, gruvbox, everforest_light"
            )),
        }
    }
}

/// Default colours and text styles the sheet falls back to when an option
/// does not override them.
#[derive(Debug, Clone)]
pub struct ThemeConfig {
    pub background: Color,
    pub list_normal: Style,
    pub list_selected: Style,
    pub border: Style,
    pub border_focused: Style,
    pub title: Style,
    pub text: Style,
    pub hint: Style,
    /// Checkbox marks, edit glyphs and the drag handle.
    pub accent: Style,
    pub danger: Style,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Theme::default().config()
    }
}

/// Returns a ThemeConfig based on the Solarized Dark color palette.
pub fn solarized_dark() -> ThemeConfig {
    let base03 = Color::Rgb(0, 43, 54);
    let base02 = Color::Rgb(7, 54, 66);
    let base01 = Color::Rgb(88, 110, 117);
    let base0 = Color::Rgb(131, 148, 150);
    let base3 = Color::Rgb(253, 246, 227);
    let red = Color::Rgb(220, 50, 47);
    let blue = Color::Rgb(38, 139, 210);
    let cyan = Color::Rgb(42, 161, 152);

    ThemeConfig {
        background: base03,
        list_normal: Style::default().fg(base0).bg(base02),
        list_selected: Style::default()
            .fg(base3)
            .bg(blue)
            .add_modifier(Modifier::BOLD),
        border: Style::default().fg(base01),
        border_focused: Style::default().fg(blue),
        title: Style::default().fg(blue).add_modifier(Modifier::BOLD),
        text: Style::default().fg(base0).bg(base02),
        hint: Style::default()
            .fg(base01)
            .add_modifier(Modifier::ITALIC),
        accent: Style::default().fg(cyan),
        danger: Style::default().fg(red),
    }
}

/// Returns a ThemeConfig based on the Dracula color palette.
pub fn dracula_theme() -> ThemeConfig {
    let bg = Color::Rgb(40, 42, 54);
    let selection = Color::Rgb(68, 71, 90);
    let fg = Color::Rgb(248, 248, 242);
    let comment = Color::Rgb(98, 114, 164);
    let purple = Color::Rgb(189, 147, 249);
    let red = Color::Rgb(255, 85, 85);
    let cyan = Color::Rgb(139, 233, 253);

    ThemeConfig {
        background: bg,
        list_normal: Style::default().fg(fg).bg(bg),
        list_selected: Style::default()
            .fg(fg)
            .bg(selection)
            .add_modifier(Modifier::BOLD),
        border: Style::default().fg(comment),
        border_focused: Style::default().fg(purple),
        title: Style::default().fg(purple).add_modifier(Modifier::BOLD),
        text: Style::default().fg(fg).bg(bg),
        hint: Style::default()
            .fg(comment)
            .add_modifier(Modifier::ITALIC),
        accent: Style::default().fg(cyan),
        danger: Style::default().fg(red),
    }
}

/// Returns a ThemeConfig based on the Gruvbox Dark color palette.
pub fn gruvbox_theme() -> ThemeConfig {
    let bg0 = Color::Rgb(40, 40, 40);
    let fg1 = Color::Rgb(235, 219, 178);
    let gray = Color::Rgb(146, 131, 116);
    let blue = Color::Rgb(69, 133, 136);
    let red = Color::Rgb(204, 36, 29);
    let orange = Color::Rgb(214, 93, 14);

    ThemeConfig {
        background: bg0,
        list_normal: Style::default().fg(fg1).bg(bg0),
        list_selected: Style::default()
            .fg(bg0)
            .bg(fg1)
            .add_modifier(Modifier::BOLD),
        border: Style::default().fg(gray),
        border_focused: Style::default().fg(orange),
        title: Style::default().fg(orange).add_modifier(Modifier::BOLD),
        text: Style::default().fg(fg1).bg(bg0),
        hint: Style::default().fg(gray).add_modifier(Modifier::ITALIC),
        accent: Style::default().fg(blue),
        danger: Style::default().fg(red),
    }
}

/// Returns a ThemeConfig based on the Everforest Light color palette.
pub fn everforest_light_theme() -> ThemeConfig {
    let bg = Color::Rgb(253, 246, 227);
    let bg_view = Color::Rgb(243, 234, 211);
    let fg = Color::Rgb(92, 106, 114);
    let gray = Color::Rgb(147, 159, 149);
    let yellow = Color::Rgb(223, 160, 0);
    let red = Color::Rgb(248, 85, 82);
    let blue = Color::Rgb(58, 148, 197);

    ThemeConfig {
        background: bg,
        list_normal: Style::default().fg(fg).bg(bg_view),
        list_selected: Style::default()
            .fg(bg)
            .bg(gray)
            .add_modifier(Modifier::BOLD),
        border: Style::default().fg(gray),
        border_focused: Style::default().fg(yellow),
        title: Style::default().fg(yellow).add_modifier(Modifier::BOLD),
        text: Style::default().fg(fg).bg(bg_view),
        hint: Style::default().fg(gray).add_modifier(Modifier::ITALIC),
        accent: Style::default().fg(blue),
        danger: Style::default().fg(red),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_str_accepts_aliases() {
        assert_eq!(Theme::from_str("Dracula"), Ok(Theme::Dracula));
        assert_eq!(Theme::from_str("solarized_dark"), Ok(Theme::Solarized));
        assert_eq!(Theme::from_str("everforest"), Ok(Theme::EverforestLight));
        assert!(Theme::from_str("neon").is_err());
    }
}
