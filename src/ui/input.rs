use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, LoginFocus, Tab, PAGE_SCROLL_SIZE};

/// Handle a key event. Returns Ok(true) when the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => handle_login_input(app, key).await,
        AppState::Searching => handle_search_input(app, key),
        AppState::ShowingHelp => {
            app.state = AppState::Normal;
            Ok(false)
        }
        AppState::ConfirmingQuit => handle_quit_confirm(app, key),
        AppState::ConfirmingDelete => handle_delete_confirm(app, key),
        AppState::EditingPatient => handle_patient_form_input(app, key),
        AppState::EnteringPayment => handle_payment_form_input(app, key),
        AppState::Normal => handle_normal_input(app, key),
        AppState::Quitting => Ok(true),
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                // Errors surface through login_error on the overlay
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => {
            match app.login_focus {
                LoginFocus::Email => {
                    app.login_email.pop();
                }
                LoginFocus::Password => {
                    app.login_password.pop();
                }
                LoginFocus::Button => {}
            };
        }
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => App::push_input(&mut app.login_email, c),
            LoginFocus::Password => App::push_input(&mut app.login_password, c),
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.set_search_query(String::new());
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            let mut query = app.search_query.clone();
            query.pop();
            app.set_search_query(query);
        }
        KeyCode::Char(c) => {
            let mut query = app.search_query.clone();
            App::push_input(&mut query, c);
            app.set_search_query(query);
        }
        _ => {}
    }
    Ok(false)
}

fn handle_quit_confirm(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.state = AppState::Quitting;
            Ok(true)
        }
        _ => {
            // Back to login if there is no session to return to
            if app.is_authenticated() {
                app.state = AppState::Normal;
            } else {
                app.start_login();
            }
            Ok(false)
        }
    }
}

fn handle_delete_confirm(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete(),
        _ => {
            app.pending_delete = None;
            app.state = AppState::Normal;
        }
    }
    Ok(false)
}

fn handle_patient_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Tab | KeyCode::Down => {
            if let Some(field) = app.patient_form.focus {
                app.patient_form.focus = Some(field.next());
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(field) = app.patient_form.focus {
                app.patient_form.focus = Some(field.prev());
            }
        }
        KeyCode::Enter => {
            app.submit_patient_form();
        }
        KeyCode::Backspace => {
            if let Some(value) = app.patient_form.focused_value_mut() {
                value.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(value) = app.patient_form.focused_value_mut() {
                App::push_input(value, c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_payment_form_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => {
            if let Some(field) = app.payment_form.focus {
                app.payment_form.focus = Some(field.next());
            }
        }
        KeyCode::Enter => {
            app.submit_payment_form();
        }
        KeyCode::Backspace => {
            if let Some(value) = app.payment_form.focused_value_mut() {
                value.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(value) = app.payment_form.focused_value_mut() {
                App::push_input(value, c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_normal_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('L') => {
            app.logout();
        }
        KeyCode::Char('u') => {
            if app.guard() {
                app.refresh_all_background();
            }
        }

        // Tab navigation - every tab is a protected view
        KeyCode::Char('1') => switch_tab(app, Tab::Dashboard),
        KeyCode::Char('2') => switch_tab(app, Tab::Patients),
        KeyCode::Char('3') => switch_tab(app, Tab::Billing),
        KeyCode::Char('4') => switch_tab(app, Tab::Analytics),
        KeyCode::Tab => switch_tab(app, app.current_tab.next()),
        KeyCode::BackTab => switch_tab(app, app.current_tab.prev()),

        // Selection movement
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),

        // Per-tab actions
        KeyCode::Char('/') if app.current_tab == Tab::Patients => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('n') if app.current_tab == Tab::Patients => {
            if app.guard() {
                app.open_create_form();
            }
        }
        KeyCode::Char('e') | KeyCode::Enter if app.current_tab == Tab::Patients => {
            if app.guard() {
                app.open_edit_form();
            }
        }
        KeyCode::Char('d') if app.current_tab == Tab::Patients => {
            if app.guard() {
                app.request_delete_selected();
            }
        }
        KeyCode::Char('v') if app.current_tab == Tab::Patients => {
            if app.guard() {
                app.show_events_for_selected_patient();
            }
        }
        KeyCode::Char('p') | KeyCode::Enter if app.current_tab == Tab::Billing => {
            if app.guard() {
                app.open_payment_form();
            }
        }
        KeyCode::Char('s') if app.current_tab == Tab::Billing => {
            if app.guard() {
                app.refresh_payment_status();
            }
        }
        KeyCode::Char('c') if app.current_tab == Tab::Billing => {
            if app.guard() {
                app.cancel_last_payment();
            }
        }
        KeyCode::Char('p') if app.current_tab == Tab::Analytics => {
            if app.guard() {
                app.filter_events_by_selected_patient();
            }
        }
        KeyCode::Char('t') if app.current_tab == Tab::Analytics => {
            if app.guard() {
                app.filter_events_by_selected_type();
            }
        }
        KeyCode::Char('a') if app.current_tab == Tab::Analytics => {
            if app.guard() {
                app.reset_event_filter();
            }
        }
        _ => {}
    }
    Ok(false)
}

/// Auth guard on navigation: entering any view without a token routes to login
fn switch_tab(app: &mut App, tab: Tab) {
    if app.guard() {
        app.current_tab = tab;
    }
}
