use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{FastSession, Protocol};
use crate::timer::TimerSnapshot;
use crate::tui::theme;
use crate::utils::format::{format_clock, format_timestamp, progress_bar};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    active: Option<&(FastSession, TimerSnapshot)>,
    next_protocol: Protocol,
) {
    let block = Block::default()
        .title(Span::styled(" Timer ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let content = match active {
        None => idle_lines(next_protocol),
        Some((session, snap)) => active_lines(session, snap, area.width),
    };

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn idle_lines(next_protocol: Protocol) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled("  Not fasting", theme::dim())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Next: ", theme::dim()),
            Span::styled(
                next_protocol.display_name(),
                theme::accent().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  ({}h fast, {}h eat)",
                    next_protocol.fast_hours(),
                    next_protocol.eating_hours()
                ),
                theme::dim(),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled("  [f] start  ·  [p] change protocol", theme::dim())),
    ]
}

fn active_lines(session: &FastSession, snap: &TimerSnapshot, width: u16) -> Vec<Line<'static>> {
    let bar_width = (width.saturating_sub(12) as usize).min(32);

    let (label, clock, clock_style) = if snap.is_goal_reached {
        ("  overtime  ", format!("+{}", format_clock(snap.overtime_secs)), theme::green())
    } else {
        ("  remaining ", format_clock(snap.remaining_secs), theme::amber())
    };

    let bar_style = if snap.is_goal_reached {
        theme::green()
    } else {
        theme::accent()
    };

    vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", theme::dim()),
            Span::styled(
                session.protocol.display_name().to_uppercase(),
                theme::accent().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  elapsed {}", format_clock(snap.elapsed_secs)),
                theme::dim(),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(label, theme::dim()),
            Span::styled(clock, clock_style.add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", theme::dim()),
            Span::styled(progress_bar(snap.progress_ratio(), bar_width), bar_style),
            Span::styled(format!("  {:.0}%", snap.progress_percent), theme::bold()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("  goal at {}", format_timestamp(snap.ends_at)),
            theme::dim(),
        )),
    ]
}
