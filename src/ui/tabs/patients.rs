use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, AppState};
use crate::ui::styles;
use crate::utils::{format_date, truncate_string};

/// Render the Patients tab - table with a detail panel
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    render_patient_table(frame, app, chunks[0]);
    render_patient_detail(frame, app, chunks[1]);
}

fn render_patient_table(frame: &mut Frame, app: &App, area: Rect) {
    let patients = app.visible_patients();

    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("Email"),
        Cell::from("Born"),
        Cell::from("Age"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = patients
        .iter()
        .map(|patient| {
            let age = patient
                .age()
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(truncate_string(&patient.name, 28)),
                Cell::from(truncate_string(&patient.email, 30)),
                Cell::from(patient.date_of_birth.clone()),
                Cell::from(format!("{:>3}", age)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(34),
        Constraint::Fill(2),
        Constraint::Length(10),
        Constraint::Length(4),
    ];

    let title = if matches!(app.state, AppState::Searching) || !app.search_query.is_empty() {
        format!(
            " Patients ({}/{}) - search: {}_ ",
            patients.len(),
            app.patients.len(),
            app.search_query
        )
    } else {
        format!(" Patients ({}) ", app.patients.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.patient_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_patient_detail(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.selected_patient() {
        Some(patient) => {
            let age = patient
                .age()
                .map(|a| format!("{} years", a))
                .unwrap_or_else(|| "-".to_string());

            vec![
                Line::from(Span::styled(patient.name.clone(), styles::title_style())),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Email:    ", styles::muted_style()),
                    Span::raw(patient.email.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Address:  ", styles::muted_style()),
                    Span::raw(patient.address.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Born:     ", styles::muted_style()),
                    Span::raw(format_date(&patient.date_of_birth)),
                ]),
                Line::from(vec![
                    Span::styled("Age:      ", styles::muted_style()),
                    Span::raw(age),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("Id:       ", styles::muted_style()),
                    Span::raw(patient.id.clone()),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "[n]ew [e]dit [d]elete [v] events",
                    styles::muted_style(),
                )),
            ]
        }
        None => vec![
            Line::from(Span::styled("No patient selected", styles::muted_style())),
            Line::from(""),
            Line::from(Span::styled("[n] create a patient", styles::muted_style())),
        ],
    };

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title(" Details ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(paragraph, area);
}
