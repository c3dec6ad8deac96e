use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, List, ListItem, Paragraph, Row, Table};

use crate::aggregate::ranked_rows;
use crate::output::{format_number, truncate_name};
use crate::scoring::Segment;
use crate::tui::app::{App, InputMode};
use crate::tui::theme::ThemeColors;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.height < 6 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Title(1) + Table(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_table(frame, chunks[1], app);
    render_status_bar(frame, chunks[2], app);

    match app.input_mode {
        InputMode::AddPicker => render_picker_popup(frame, app),
        InputMode::Help => render_help_popup(frame, &app.colors),
        InputMode::Breakdown => render_breakdown_popup(frame, app),
        InputMode::Normal | InputMode::Moving { .. } => {}
    }

    if app.is_loading {
        render_loading_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let title = "Coaster Book";
    let mut spans = vec![Span::styled(
        title,
        Style::default().fg(app.colors.title_color).bold(),
    )];

    let right = match (&app.saving, app.session.store().location()) {
        (Some(_), _) => format!("{} saving...", SPINNER[app.spinner_frame % SPINNER.len()]),
        (None, Some(location)) => format!("{} @ {}", location, app.session.revision()),
        (None, None) => format!("in memory @ {}", app.session.revision()),
    };
    let padding = (area.width as usize).saturating_sub(title.len() + right.chars().count());
    spans.push(Span::raw(" ".repeat(padding)));
    spans.push(Span::styled(right, Style::default().fg(app.colors.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let colors = &app.colors;
    let doc = app.document();
    let rows = ranked_rows(doc, &app.list_id, &app.scoring);

    if rows.is_empty() {
        let empty_msg = Paragraph::new("No coasters ranked yet. Press a to add one.")
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    }

    let max_points = rows.iter().map(|r| r.points).max().unwrap_or(0);
    let moving_to = match app.input_mode {
        InputMode::Moving { to, .. } => Some(to),
        _ => None,
    };

    let table_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let color = colors.points_color(row.points, max_points);
            let mut points_spans = vec![Span::styled(
                format!("{:>4} ", row.points),
                Style::default().fg(color),
            )];
            points_spans.extend(points_bar(row.points, max_points, 8, color, colors).spans);

            let context = [
                row.park.map(|p| p.name.as_str()),
                row.manufacturer.map(|m| m.name.as_str()),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ");

            let mut style = if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };
            if moving_to == Some(idx) {
                style = colors.row_moving;
            }

            Row::new(vec![
                Cell::from(format!("{}.", row.position))
                    .style(Style::default().fg(colors.index_color)),
                Cell::from(Line::from(points_spans)),
                Cell::from(truncate_name(&row.coaster.name, 40)),
                Cell::from(context).style(Style::default().fg(colors.muted)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(14),
        Constraint::Fill(2),
        Constraint::Fill(1),
    ];

    let highlight = if moving_to.is_some() {
        colors.row_moving
    } else {
        colors.row_selected
    };
    let table = Table::new(table_rows, widths)
        .header(
            Row::new(vec!["#", "Points", "Coaster", "Park · Manufacturer"])
                .style(colors.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(highlight);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn points_bar(
    points: u32,
    max_points: u32,
    width: usize,
    color: Color,
    colors: &ThemeColors,
) -> Line<'static> {
    let ratio = if max_points > 0 {
        (f64::from(points) / f64::from(max_points)).min(1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled("█".repeat(filled), Style::default().fg(color)));
    }
    if empty > 0 {
        spans.push(Span::styled(
            "░".repeat(empty),
            Style::default().fg(colors.bar_empty),
        ));
    }
    Line::from(spans)
}

fn flash_color(msg: &str, colors: &ThemeColors) -> Color {
    const ERRORS: [&str; 5] = ["Error", "Save failed", "Reload failed", "Conflict", "Failed"];
    if ERRORS.iter().any(|p| msg.starts_with(p)) {
        colors.flash_error
    } else if msg.starts_with("Saved:") || msg.starts_with("Reloaded") || msg.starts_with("Opened")
    {
        colors.flash_success
    } else {
        colors.muted
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.colors;
    let text = if let Some((ref msg, _)) = app.flash_message {
        Line::from(Span::styled(
            msg.clone(),
            Style::default().fg(flash_color(msg, colors)),
        ))
    } else {
        let count = format!("{} ranked", app.row_count());

        let hints: &[(&str, &str)] = match app.input_mode {
            InputMode::Moving { .. } => &[
                ("j/k", ":move "),
                ("Space", ":drop "),
                ("Esc", ":cancel"),
            ],
            _ => &[
                ("j/k", ":nav "),
                ("J/K", ":nudge "),
                ("Space", ":grab "),
                ("a", ":add "),
                ("d", ":remove "),
                ("r", ":reload "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
        };

        let mut spans = vec![
            Span::styled(count, Style::default().fg(colors.muted)),
            Span::raw("  "),
        ];
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(
                *key,
                Style::default().fg(colors.status_key_color),
            ));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(colors.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn popup_block<'a>(title: &'a str, colors: &ThemeColors) -> Block<'a> {
    Block::bordered()
        .title(Span::styled(title, colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border))
        .style(Style::default().bg(colors.popup_bg))
}

fn render_picker_popup(frame: &mut Frame, app: &mut App) {
    let popup_area = centered_rect_fixed(56, 18, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" Add to rankings ", &app.colors);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(format!("Filter: {}|", app.picker_filter)),
        chunks[0],
    );

    let doc = app.document();
    let items: Vec<ListItem> = app
        .picker_items()
        .iter()
        .map(|c| {
            let park = doc.park_of(c).map(|p| p.name.as_str()).unwrap_or("No Park");
            ListItem::new(Line::from(vec![
                Span::raw(truncate_name(&c.name, 32)),
                Span::styled(format!("  {}", park), Style::default().fg(app.colors.muted)),
            ]))
        })
        .collect();
    let empty = items.is_empty();
    let list = List::new(items).highlight_style(app.colors.row_selected);
    if empty {
        frame.render_widget(
            Paragraph::new("No matching coasters").style(Style::default().fg(app.colors.muted)),
            chunks[1],
        );
    } else {
        frame.render_stateful_widget(list, chunks[1], &mut app.picker_state);
    }

    frame.render_widget(
        Paragraph::new("Type to filter | Up/Down: select | Enter: add | Esc: cancel")
            .style(Style::default().fg(app.colors.muted)),
        chunks[2],
    );
}

fn render_breakdown_popup(frame: &mut Frame, app: &App) {
    let Some(b) = app.selected_breakdown() else {
        return;
    };
    let colors = &app.colors;
    let popup_area = centered_rect_fixed(48, 12, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" Points Breakdown ", colors);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let segment = match b.segment {
        Segment::Linear => "linear (at or below pivot)",
        Segment::Exponential => "exponential (above pivot)",
    };
    let label = Style::default().fg(colors.muted);
    let lines = vec![
        Line::from(vec![
            Span::styled("Position      ", label),
            Span::raw(format!("{} of {}", b.position, b.total)),
        ]),
        Line::from(vec![
            Span::styled("Index         ", label),
            Span::raw(format!("{} (1 = last place)", b.index)),
        ]),
        Line::from(vec![
            Span::styled("Pivot         ", label),
            Span::raw(b.pivot.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Segment       ", label),
            Span::raw(segment),
        ]),
        Line::from(vec![
            Span::styled("Raw           ", label),
            Span::raw(format_number(b.raw)),
        ]),
        Line::from(vec![
            Span::styled("Points        ", label),
            Span::styled(b.points.to_string(), Style::default().bold()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Esc / b to close", label)),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_help_popup(frame: &mut Frame, colors: &ThemeColors) {
    let popup_area = centered_rect_fixed(50, 18, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = popup_block(" Keyboard Shortcuts ", colors);
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key = Style::default().fg(colors.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Select next"),
        ("k / Up        ", "Select previous"),
        ("J / K         ", "Nudge down / up one slot"),
        ("Space / m     ", "Grab, then drop at a new slot"),
        ("Esc           ", "Cancel a move"),
        ("a             ", "Add an unranked coaster"),
        ("d / Delete    ", "Remove from rankings"),
        ("b             ", "Points breakdown"),
        ("r             ", "Reload from the store"),
        ("o             ", "Open data file on GitHub"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
    ];
    let mut lines: Vec<Line> = entries
        .iter()
        .map(|(k, desc)| Line::from(vec![Span::styled(*k, key), Span::raw(*desc)]))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(colors.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_loading_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
    let loading_text = Paragraph::new(format!("{} Reloading...", spinner))
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.colors.title_color));
    frame.render_widget(loading_text, inner);
}
