use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{FastSession, SessionStatus};
use crate::tui::theme;
use crate::utils::format::{format_hours, format_timestamp};

pub fn render(frame: &mut Frame, area: Rect, sessions: &[FastSession]) {
    let block = Block::default()
        .title(Span::styled(" Recent ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut lines = vec![Line::from("")];
    if sessions.is_empty() {
        lines.push(Line::from(Span::styled("  No fasts yet", theme::dim())));
    }

    for s in sessions {
        let (icon, style) = match s.status {
            SessionStatus::Completed => ("✓", theme::green()),
            SessionStatus::Cancelled => ("✗", theme::red()),
            SessionStatus::Active => ("◑", theme::amber()),
        };
        let duration = s
            .duration_hours()
            .map(format_hours)
            .unwrap_or_else(|| "…".to_string());
        lines.push(Line::from(vec![
            Span::styled(format!("  {} ", icon), style),
            Span::styled(format!("{:<18}", format_timestamp(s.started_at)), theme::dim()),
            Span::styled(format!("{:<10}", s.protocol.display_name()), theme::bold()),
            Span::styled(duration, style),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
