use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::models::ServiceStatus;
use crate::ui::styles;

/// Render the Dashboard tab: service health on the left, analytics summary
/// on the right.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_service_health(frame, app, chunks[0]);
    render_summary(frame, app, chunks[1]);
}

fn status_style(status: ServiceStatus) -> ratatui::style::Style {
    match status {
        ServiceStatus::Up => styles::success_style(),
        ServiceStatus::Down => styles::error_style(),
        ServiceStatus::Unknown => styles::muted_style(),
    }
}

fn render_service_health(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Service"),
        Cell::from("Port"),
        Cell::from("Type"),
        Cell::from("Status"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .services
        .iter()
        .map(|service| {
            Row::new(vec![
                Cell::from(service.name.clone()),
                Cell::from(format!("{:>5}", service.port)),
                Cell::from(service.kind.to_string()),
                Cell::from(Span::styled(
                    service.status.to_string(),
                    status_style(service.status),
                )),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(" Services ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(table, area);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary = &app.summary;

    let mut lines = vec![
        Line::from(Span::styled("Event activity", styles::title_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Total events:    ", styles::muted_style()),
            Span::raw(summary.total_events.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Unique patients: ", styles::muted_style()),
            Span::raw(summary.unique_patients.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Last hour:       ", styles::muted_style()),
            Span::raw(summary.events_last_hour.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Last 24 hours:   ", styles::muted_style()),
            Span::raw(summary.events_last_24_hours.to_string()),
        ]),
    ];

    let top_types = summary.top_event_types();
    if !top_types.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("By type", styles::highlight_style())));
        for (event_type, count) in top_types.iter().take(8) {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<20}", event_type), styles::muted_style()),
                Span::raw(count.to_string()),
            ]));
        }
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Analytics summary ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(paragraph, area);
}
