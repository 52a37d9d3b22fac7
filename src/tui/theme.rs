use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(14, 18, 20);
pub const SURFACE: Color = Color::Rgb(22, 28, 31);
pub const BORDER: Color = Color::Rgb(44, 58, 62);
pub const TEXT: Color = Color::Rgb(214, 226, 224);
pub const TEXT_DIM: Color = Color::Rgb(112, 132, 134);
pub const TEAL: Color = Color::Rgb(72, 176, 160);
pub const GREEN: Color = Color::Rgb(104, 178, 96);
pub const AMBER: Color = Color::Rgb(222, 160, 70);
pub const RED: Color = Color::Rgb(196, 90, 78);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn accent() -> Style {
    Style::default().fg(TEAL)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}
