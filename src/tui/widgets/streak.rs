use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::StatsOverview;
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(frame: &mut Frame, area: Rect, overview: &StatsOverview) {
    let streak = &overview.streak;

    let block = Block::default()
        .title(Span::styled(" Streak ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    // Bar fills over a 30 day run
    let bar = progress_bar(streak.current_streak as f64 / 30.0, 12);

    let streak_style = if streak.is_alive() {
        theme::green()
    } else {
        theme::dim()
    };

    let streak_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(bar, streak_style),
        Span::styled(
            format!("  {} days", streak.current_streak),
            streak_style.add_modifier(Modifier::BOLD),
        ),
    ]);

    let mut dot_spans = vec![Span::styled("  ", theme::dim())];
    for day in &overview.week {
        let (dot, style) = match day.completed {
            0 => ("○", theme::dim()),
            1 => ("●", theme::green()),
            _ => ("●", theme::green().add_modifier(Modifier::BOLD)),
        };
        dot_spans.push(Span::styled(dot, style));
        dot_spans.push(Span::styled(" ", theme::dim()));
    }

    let meta_line = Line::from(vec![Span::styled(
        format!(
            "  Longest: {}  ·  30d: {}%  ·  Total: {}",
            streak.longest_streak, streak.completion_rate, streak.total_completed
        ),
        theme::dim(),
    )]);

    let text = vec![
        Line::from(""),
        streak_line,
        Line::from(""),
        Line::from(dot_spans),
        Line::from(""),
        meta_line,
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
