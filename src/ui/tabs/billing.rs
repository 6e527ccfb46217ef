use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_money, format_optional, truncate_string};

/// Render the Billing tab: pick a patient on the left, inspect the current
/// payment on the right.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_patient_picker(frame, app, chunks[0]);
    render_payment_panel(frame, app, chunks[1]);
}

fn render_patient_picker(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![Cell::from("Name"), Cell::from("Email")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .patients
        .iter()
        .map(|patient| {
            Row::new(vec![
                Cell::from(truncate_string(&patient.name, 26)),
                Cell::from(truncate_string(&patient.email, 30)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [Constraint::Percentage(45), Constraint::Fill(1)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Bill a patient ({}) ", app.patients.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.billing_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_payment_panel(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    match &app.last_intent {
        Some(intent) => {
            lines.push(Line::from(Span::styled(
                "Payment intent",
                styles::title_style(),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Intent:   ", styles::muted_style()),
                Span::raw(intent.payment_intent_id.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Amount:   ", styles::muted_style()),
                Span::raw(format_money(intent.amount, &intent.currency)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Status:   ", styles::muted_style()),
                Span::styled(intent.status.clone(), styles::highlight_style()),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No payment intent yet",
                styles::muted_style(),
            )));
        }
    }

    if let Some(payment) = &app.last_payment {
        let status_style = match payment.status.as_str() {
            "succeeded" => styles::success_style(),
            "canceled" | "failed" => styles::error_style(),
            _ => styles::highlight_style(),
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Latest status",
            styles::title_style(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Payment:  ", styles::muted_style()),
            Span::raw(payment.payment_id.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Patient:  ", styles::muted_style()),
            Span::raw(payment.patient_id.clone()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Amount:   ", styles::muted_style()),
            Span::raw(format_money(payment.amount, &payment.currency)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Status:   ", styles::muted_style()),
            Span::styled(payment.status.clone(), status_style),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Receipt:  ", styles::muted_style()),
            Span::raw(format_optional(&payment.receipt_url, "-")),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[p]ay selected [s]tatus [c]ancel",
        styles::muted_style(),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Payments ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(paragraph, area);
}
