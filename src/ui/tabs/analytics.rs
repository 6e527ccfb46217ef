use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_date, truncate_string};

/// Render the Analytics tab: summary strip on top, event stream below.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(6)])
        .split(area);

    render_summary_strip(frame, app, chunks[0]);
    render_event_table(frame, app, chunks[1]);
}

fn render_summary_strip(frame: &mut Frame, app: &App, area: Rect) {
    let summary = &app.summary;
    let lines = vec![
        Line::from(vec![
            Span::styled("Events: ", styles::muted_style()),
            Span::raw(summary.total_events.to_string()),
            Span::styled("   Patients: ", styles::muted_style()),
            Span::raw(summary.unique_patients.to_string()),
            Span::styled("   Last hour: ", styles::muted_style()),
            Span::raw(summary.events_last_hour.to_string()),
            Span::styled("   Last 24h: ", styles::muted_style()),
            Span::raw(summary.events_last_24_hours.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Filter: ", styles::muted_style()),
            Span::styled(app.event_filter.label(), styles::highlight_style()),
            Span::styled("   [p] by patient  [t] by type  [a] all", styles::muted_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(paragraph, area);
}

fn render_event_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Time"),
        Cell::from("Type"),
        Cell::from("Patient"),
        Cell::from("Email"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .events
        .iter()
        .map(|event| {
            Row::new(vec![
                Cell::from(format_date(&event.timestamp)),
                Cell::from(event.event_type.clone()),
                Cell::from(truncate_string(&event.patient_name, 24)),
                Cell::from(truncate_string(&event.patient_email, 28)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(19),
        Constraint::Length(17),
        Constraint::Fill(2),
        Constraint::Fill(2),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Events ({}) ", app.events.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.event_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
