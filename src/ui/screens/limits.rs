use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate, usage_bar};

const BAR_WIDTH: usize = 16;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.rows.is_empty() {
        render_empty(f, area, app);
        return;
    }

    let header = Row::new(
        ["Category", "Period", "Limit", "Spent", "Remaining", "Usage", "", "Status"]
            .into_iter()
            .map(Cell::from),
    )
    .style(theme::header_style());

    let rows: Vec<Row> = app
        .rows
        .iter()
        .enumerate()
        .skip(app.row_scroll)
        .take(app.visible_rows)
        .map(|(i, status)| {
            let base = if i == app.row_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let tier = theme::tier_style(status.tier);
            let remaining_style = if status.remaining < rust_decimal::Decimal::ZERO {
                Style::default().fg(theme::RED)
            } else {
                base
            };

            Row::new(vec![
                Cell::from(truncate(&status.category_name, 20)),
                Cell::from(status.period.label()),
                Cell::from(format_amount(status.limit_amount)),
                Cell::from(format_amount(status.spent)),
                Cell::from(format_amount(status.remaining)).style(remaining_style),
                Cell::from(usage_bar(status.usage_ratio, BAR_WIDTH)).style(tier),
                Cell::from(format!("{}%", status.usage_percent())).style(tier),
                Cell::from(status.tier.label()).style(tier),
            ])
            .style(base)
        })
        .collect();

    let widths = [
        Constraint::Min(14),
        Constraint::Length(6),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(BAR_WIDTH as u16 + 2),
        Constraint::Length(7),
        Constraint::Length(8),
    ];

    let title = table_title(app);
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(titled_block(&title));
    f.render_widget(table, area);
}

fn table_title(app: &App) -> String {
    match app.filter_name() {
        Some(name) => format!(" Limits: {name} "),
        None => " Limits ".to_string(),
    }
}

fn render_empty(f: &mut Frame, area: Rect, app: &App) {
    let hint = if app.category_filter.is_some() {
        "No limits for this category. :filter with no argument shows all"
    } else {
        "Use :limit <category> <amount> [week|month|year] to cap spending"
    };
    let title = table_title(app);
    let msg = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("No spending limits yet", theme::dim_style())),
        Line::from(""),
        Line::from(Span::styled(hint, theme::dim_style())),
    ])
    .centered()
    .block(titled_block(&title));
    f.render_widget(msg, area);
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme::TEXT_DIM)
                .add_modifier(Modifier::BOLD),
        ))
}
