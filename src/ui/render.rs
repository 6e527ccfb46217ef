use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab};

use super::styles;
use super::tabs::{analytics, billing, dashboard, patients};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::EditingPatient => render_patient_form_overlay(frame, app),
        AppState::EnteringPayment => render_payment_form_overlay(frame, app),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, _app: &App, area: Rect) {
    let title = "  careview";
    let help_hint = "[?] Help";
    let title_len = title.len();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [Tab::Dashboard, Tab::Patients, Tab::Billing, Tab::Analytics];

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Patients => patients::render(frame, app, area),
        Tab::Billing => billing::render(frame, app, area),
        Tab::Analytics => analytics::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [L]ogout | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.is_authenticated() {
        " Logged in ".to_string()
    } else {
        " Logged out ".to_string()
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Overlays
// ============================================================================

/// A centered rect of the given size, clamped to the frame
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    Rect::new(x, y, width, height)
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
    let cursor = if focused { "_" } else { "" };
    Line::from(vec![
        Span::styled(format!("{:<16}", label), styles::muted_style()),
        Span::raw(format!("{}{}", value, cursor)),
    ])
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(52, 12, frame.area());
    frame.render_widget(Clear, area);

    let masked: String = "*".repeat(app.login_password.len());

    let mut lines = vec![
        Line::from(""),
        field_line(
            "  Email",
            &app.login_email,
            app.login_focus == LoginFocus::Email,
        ),
        Line::from(""),
        field_line("  Password", &masked, app.login_focus == LoginFocus::Password),
        Line::from(""),
        Line::from(Span::styled(
            if app.login_focus == LoginFocus::Button {
                "  > [ Log in ] <"
            } else {
                "    [ Log in ]"
            },
            if app.login_focus == LoginFocus::Button {
                styles::title_style()
            } else {
                styles::muted_style()
            },
        )),
    ];

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab: next field | Enter: submit",
        styles::muted_style(),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Log in ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    frame.render_widget(paragraph, area);
}

fn render_patient_form_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 14, frame.area());
    frame.render_widget(Clear, area);

    let form = &app.patient_form;
    let focus = form.focus;

    let focused = |field| focus == Some(field);

    use crate::app::PatientField::*;
    let mut lines = vec![
        Line::from(""),
        field_line("  Name", &form.name, focused(Name)),
        Line::from(""),
        field_line("  Email", &form.email, focused(Email)),
        Line::from(""),
        field_line("  Address", &form.address, focused(Address)),
        Line::from(""),
        field_line("  Date of birth", &form.date_of_birth, focused(DateOfBirth)),
    ];

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab: next field | Enter: save | Esc: cancel",
        styles::muted_style(),
    )));

    let title = if form.editing_id.is_some() {
        " Edit patient "
    } else {
        " New patient "
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    frame.render_widget(paragraph, area);
}

fn render_payment_form_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 12, frame.area());
    frame.render_widget(Clear, area);

    let form = &app.payment_form;
    let focus = form.focus;

    use crate::app::PaymentField::*;
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Patient         ", styles::muted_style()),
            Span::raw(form.patient_name.clone()),
        ]),
        Line::from(""),
        field_line("  Amount (USD)", &form.amount, focus == Some(Amount)),
        Line::from(""),
        field_line("  Description", &form.description, focus == Some(Description)),
    ];

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab: next field | Enter: create intent | Esc: cancel",
        styles::muted_style(),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" New payment ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    frame.render_widget(paragraph, area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 7, frame.area());
    frame.render_widget(Clear, area);

    let name = app
        .pending_delete
        .as_ref()
        .map(|p| p.name.clone())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw(format!("  Delete patient {}?", name))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [y]es", styles::error_style()),
            Span::styled("  [n]o", styles::muted_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Confirm delete ")
            .title_style(styles::error_style())
            .borders(Borders::ALL)
            .border_style(styles::error_style()),
    );

    frame.render_widget(paragraph, area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect(40, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw("  Quit careview?")),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [y]es", styles::highlight_style()),
            Span::styled("  [n]o", styles::muted_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Quit ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(62, 20, frame.area());
    frame.render_widget(Clear, area);

    let entries: &[(&str, &str)] = &[
        ("1-4", "Switch tab"),
        ("Tab / Shift-Tab", "Next / previous tab"),
        ("j/k, arrows", "Move selection"),
        ("PgUp / PgDn", "Page selection"),
        ("u", "Refresh all data"),
        ("/", "Search patients"),
        ("n / e / d", "New / edit / delete patient"),
        ("v", "Events for selected patient"),
        ("p", "Pay selected patient (billing)"),
        ("s / c", "Payment status / cancel (billing)"),
        ("p / t / a", "Filter events (analytics)"),
        ("L", "Log out"),
        ("q", "Quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (key, description) in entries {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<16}", key), styles::help_key_style()),
            Span::styled(*description, styles::help_desc_style()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press any key to close",
        styles::muted_style(),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );

    frame.render_widget(paragraph, area);
}
