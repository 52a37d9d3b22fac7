use chrono::Local;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, name: Option<&str>) {
    let date_str = Local::now().format("%A, %b %d, %Y").to_string();

    let title_line = Line::from(vec![
        Span::styled("  unfed  ", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled("intermittent fasting", theme::dim()),
    ]);

    let mut date_spans = Vec::new();
    if let Some(name) = name {
        date_spans.push(Span::styled(name, theme::amber()));
        date_spans.push(Span::styled("  ·  ", theme::dim()));
    }
    date_spans.push(Span::styled(date_str, theme::dim()));

    let text = vec![title_line, Line::from(""), Line::from(date_spans)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
