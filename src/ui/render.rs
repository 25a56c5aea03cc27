use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::app::{App, InputMode};
use super::commands;
use super::theme;
use crate::ui::util::format_amount;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(5),    // Limit table
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_title_bar(f, chunks[0], app);
    super::screens::limits::render(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area());
    } else if let Some(alert) = app.alerts.front() {
        render_alert_popup(f, f.area(), app, alert);
    }
}

fn render_title_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(
            " SpendGuard ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("│ ", Style::default().fg(theme::OVERLAY)),
        Span::styled(format!("profile: {}", app.profile_login), theme::dim_style()),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::HEADER_BG)),
        area,
    );
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_bg = match app.input_mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command => theme::GREEN,
        InputMode::Confirm => theme::RED,
    };
    let mode_style = Style::default()
        .fg(theme::HEADER_BG)
        .bg(mode_bg)
        .add_modifier(Modifier::BOLD);

    let exceeded = app
        .rows
        .iter()
        .filter(|r| r.tier == crate::limits::Tier::Exceeded)
        .count();
    let refreshing = if app.scheduler.is_pending() {
        " | refreshing…"
    } else {
        ""
    };
    let info = format!(
        " {} limits | {exceeded} exceeded | {} alerted{refreshing}",
        app.rows.len(),
        app.evaluator.state().len()
    );

    let right = " j/k move | d delete | r refresh | ? help ";

    let available = area.width as usize;
    let used = mode_label.len() + info.chars().count() + right.len();
    let pad = available.saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(&mode_label, mode_style),
        Span::styled(&info, theme::status_bar_style()),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(right, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Command => (
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(&app.command_input, theme::command_bar_style()),
            ]),
            Some(1 + app.command_input.chars().count() as u16),
        ),
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ]),
            None,
        ),
        InputMode::Normal => (
            if app.status_message.is_empty() {
                Line::from(Span::styled(
                    " Press : for commands, ? for help",
                    theme::dim_style(),
                ))
            } else {
                Line::from(Span::styled(
                    &app.status_message,
                    theme::command_bar_style(),
                ))
            },
            None,
        ),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

fn render_alert_popup(f: &mut Frame, area: Rect, app: &App, alert: &crate::limits::LimitAlert) {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} ({}) is over its limit", alert.category_name, alert.period.label()),
            Style::default().fg(theme::RED).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Remaining: ", theme::dim_style()),
            Span::styled(
                format_amount(alert.remaining),
                Style::default().fg(theme::RED),
            ),
        ]),
        Line::from(""),
    ];
    let more = app.alerts.len().saturating_sub(1);
    if more > 0 {
        lines.push(Line::from(Span::styled(
            format!("{more} more alert{}", if more == 1 { "" } else { "s" }),
            theme::dim_style(),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Press any key to dismiss",
        theme::dim_style(),
    )));

    let popup_area = centered(area, 52, lines.len() as u16 + 2);
    f.render_widget(Clear, popup_area);
    let popup = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::RED))
            .title(Span::styled(
                " Limit exceeded ",
                Style::default().fg(theme::RED).add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(popup, popup_area);
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme::YELLOW)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let mut help_text = vec![
        Line::from(Span::styled(
            " SpendGuard Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section(" Keys"),
        Line::from(Span::styled(
            "  j/k or Up/Down   Move cursor           g/G        Top/Bottom",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  d                Delete selected limit r          Refresh now",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  :                Command mode          Ctrl-q     Quit",
            theme::normal_style(),
        )),
        Line::from(""),
        section(" Tiers"),
        Line::from(vec![
            Span::styled("  OK", theme::tier_style(crate::limits::Tier::Normal)),
            Span::styled(" under 70%   ", theme::normal_style()),
            Span::styled("Warning", theme::tier_style(crate::limits::Tier::Warning)),
            Span::styled(" 70% to 99%   ", theme::normal_style()),
            Span::styled("Exceeded", theme::tier_style(crate::limits::Tier::Exceeded)),
            Span::styled(" 100% and up", theme::normal_style()),
        ]),
        Line::from(""),
        section(" Commands"),
    ];

    // Build command list dynamically from COMMANDS registry
    let mut seen = std::collections::HashSet::new();
    let mut cmd_lines: Vec<(&str, &str)> = Vec::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        if name.len() <= 2 {
            continue;
        }
        if seen.insert(cmd.description) {
            cmd_lines.push((name, cmd.description));
        }
    }
    cmd_lines.sort_by_key(|(name, _)| *name);
    for (name, desc) in &cmd_lines {
        help_text.push(Line::from(Span::styled(
            format!("  :{name:<14} {desc}"),
            theme::normal_style(),
        )));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        " Press any key to close ",
        theme::dim_style(),
    )));

    let popup_area = centered(area, 80, help_text.len() as u16 + 2);
    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup_area);
}

/// A `width` x `height` rect centered in `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
