use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{Mood, MoodCheckIn};
use crate::tui::theme;

pub fn mood_style(mood: Mood) -> ratatui::style::Style {
    match mood {
        Mood::Great | Mood::Good => theme::green(),
        Mood::Okay => theme::amber(),
        Mood::Low | Mood::Bad => theme::red(),
    }
}

pub fn render(frame: &mut Frame, area: Rect, today: Option<&MoodCheckIn>) {
    let block = Block::default()
        .title(Span::styled(" Check-in ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let content = match today {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  No check-in today", theme::dim())),
            Line::from(""),
            Line::from(Span::styled("  [c] how are you feeling?", theme::dim())),
        ],
        Some(c) => {
            let filled = c.energy.min(5) as usize;
            let energy = format!("{}{}", "▮".repeat(filled), "▯".repeat(5 - filled));
            let mut lines = vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled("  Mood    ", theme::dim()),
                    Span::styled(
                        c.mood.display_name(),
                        mood_style(c.mood).add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("  Energy  ", theme::dim()),
                    Span::styled(energy, theme::amber()),
                ]),
            ];
            if let Some(note) = &c.note {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(format!("  \"{}\"", note), theme::dim())));
            }
            lines
        }
    };

    frame.render_widget(Paragraph::new(content).block(block), area);
}
