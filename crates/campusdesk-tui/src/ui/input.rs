//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_email_char, can_add_message_char, can_add_password_char, App, AppState, Focus,
    LoginFocus, StudentSortColumn, Tab, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // Compose mode captures all typing on the Messages tab
    if app.current_tab == Tab::Messages && app.composing {
        return handle_compose_input(app, key);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => {
            app.current_tab = Tab::Students;
            app.focus = Focus::List;
            return Ok(false);
        }
        KeyCode::Char('2') => {
            app.current_tab = Tab::Messages;
            app.focus = Focus::List;
            app.ensure_messages_loaded();
            return Ok(false);
        }
        KeyCode::Left => {
            app.current_tab = app.current_tab.prev();
            app.focus = Focus::List;
            if app.current_tab == Tab::Messages {
                app.ensure_messages_loaded();
            }
            return Ok(false);
        }
        KeyCode::Right => {
            app.current_tab = app.current_tab.next();
            app.focus = Focus::List;
            if app.current_tab == Tab::Messages {
                app.ensure_messages_loaded();
            }
            return Ok(false);
        }
        KeyCode::Char('u') => {
            match app.current_tab {
                Tab::Students => app.refresh_students(),
                Tab::Messages => app.refresh_messages(),
            }
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.logout();
            return Ok(false);
        }
        KeyCode::Char('/') if app.current_tab == Tab::Students => {
            app.state = AppState::Searching;
            return Ok(false);
        }
        _ => {}
    }

    // Tab-specific keys
    match app.current_tab {
        Tab::Students => handle_students_input(app, key),
        Tab::Messages => handle_messages_input(app, key),
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            // Keep search query active
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            // Reset selection when search changes
            app.student_selection = 0;
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            // Move to next field
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            // Move to previous field
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => {
            match app.login_focus {
                LoginFocus::Email => {
                    app.login_focus = LoginFocus::Password;
                }
                LoginFocus::Password => {
                    app.login_focus = LoginFocus::Button;
                }
                LoginFocus::Button => {
                    // If successful, state returns to Normal; otherwise
                    // login_error is set for the overlay to display
                    let _ = app.attempt_login().await;
                    if app.state == AppState::Normal {
                        app.refresh_all();
                    }
                }
            }
        }
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.len(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {
                // Ignore character input on button
            }
        },
        _ => {}
    }
    Ok(false)
}

fn handle_compose_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Ignore edits while the send is in flight
    if app.sending {
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            app.composing = false;
        }
        KeyCode::Enter => {
            app.send_message();
        }
        KeyCode::Backspace => {
            app.compose_text.pop();
        }
        KeyCode::Char(c) => {
            if can_add_message_char(app.compose_text.len(), c) {
                app.compose_text.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_students_input(app: &mut App, key: KeyEvent) {
    let max_index = app.get_sorted_students().len().saturating_sub(1);

    match app.focus {
        Focus::List => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                app.student_selection = (app.student_selection + 1).min(max_index);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.student_selection = app.student_selection.saturating_sub(1);
            }
            KeyCode::PageDown => {
                app.student_selection = (app.student_selection + PAGE_SCROLL_SIZE).min(max_index);
            }
            KeyCode::PageUp => {
                app.student_selection = app.student_selection.saturating_sub(PAGE_SCROLL_SIZE);
            }
            KeyCode::Home => {
                app.student_selection = 0;
            }
            KeyCode::End => {
                app.student_selection = max_index;
            }
            KeyCode::Enter => {
                app.current_tab = Tab::Messages;
                app.focus = Focus::List;
                app.ensure_messages_loaded();
            }
            KeyCode::Tab => {
                app.focus = Focus::Detail;
            }
            KeyCode::Char('n') => app.toggle_student_sort(StudentSortColumn::Name),
            KeyCode::Char('e') => app.toggle_student_sort(StudentSortColumn::Email),
            KeyCode::Char('m') => app.toggle_student_sort(StudentSortColumn::Major),
            KeyCode::Char('y') => app.toggle_student_sort(StudentSortColumn::Year),
            _ => {}
        },
        Focus::Detail => match key.code {
            KeyCode::Esc | KeyCode::Tab => {
                app.focus = Focus::List;
            }
            KeyCode::Enter => {
                app.current_tab = Tab::Messages;
                app.focus = Focus::List;
                app.ensure_messages_loaded();
            }
            _ => {}
        },
    }
}

fn handle_messages_input(app: &mut App, key: KeyEvent) {
    let max_index = app.messages.len().saturating_sub(1);

    match key.code {
        KeyCode::Char('i') => {
            app.composing = true;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.message_selection = (app.message_selection + 1).min(max_index);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.message_selection = app.message_selection.saturating_sub(1);
        }
        KeyCode::PageDown => {
            app.message_selection = (app.message_selection + PAGE_SCROLL_SIZE).min(max_index);
        }
        KeyCode::PageUp => {
            app.message_selection = app.message_selection.saturating_sub(PAGE_SCROLL_SIZE);
        }
        KeyCode::Home => {
            app.message_selection = 0;
        }
        KeyCode::End => {
            app.message_selection = max_index;
        }
        KeyCode::Esc => {
            app.current_tab = Tab::Students;
        }
        _ => {}
    }
}
