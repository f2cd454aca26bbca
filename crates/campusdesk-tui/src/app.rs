//! Application state management for CampusDesk.
//!
//! This module contains the core `App` struct that manages all application
//! state: UI state, the session, fetched roster/message data, and
//! background task coordination.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use campusdesk_core::api::{ApiClient, ApiError};
use campusdesk_core::auth::{CredentialStore, Session};
use campusdesk_core::config::Config;
use campusdesk_core::models::{Message, SendMessageResponse, Student};

use crate::utils::{cmp_ignore_case, contains_ignore_case};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// At most a handful of fetches are ever in flight.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Maximum length for email input
const MAX_EMAIL_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a composed message
const MAX_MESSAGE_LENGTH: usize = 500;

/// Number of items to scroll on page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Delay before refetching messages after a send.
/// The backend delivers messages through a queue; an immediate refetch
/// usually misses the new row.
const SEND_REFETCH_DELAY_MS: u64 = 1000;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Students,
    Messages,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Students => "Students",
            Tab::Messages => "Messages",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Students => Tab::Messages,
            Tab::Messages => Tab::Students,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Students => Tab::Messages,
            Tab::Messages => Tab::Students,
        }
    }
}

/// Current UI focus area on the Students tab (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Sortable columns of the student roster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentSortColumn {
    Name,
    Email,
    Major,
    Year,
}

/// Severity of the status bar message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background fetch tasks, sent through an MPSC channel
/// back to the main application between input events.
enum FetchResult {
    /// Student roster fetched
    Students(Result<Vec<Student>>),
    /// Messages for the logged-in user fetched
    Messages(Result<Vec<Message>>),
    /// A composed message was submitted
    MessageSent(Result<SendMessageResponse>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Students tab
    pub students: Vec<Student>,
    pub students_loading: bool,
    pub student_selection: usize,
    pub student_sort_column: StudentSortColumn,
    pub student_sort_ascending: bool,

    // Messages tab
    pub messages: Vec<Message>,
    pub messages_loading: bool,
    pub message_selection: usize,
    pub compose_text: String,
    pub composing: bool,
    pub sending: bool,

    // Status line
    pub status_message: Option<StatusMessage>,

    // Background task channel
    fetch_rx: Option<mpsc::Receiver<FetchResult>>,
    fetch_tx: mpsc::Sender<FetchResult>,
}

impl App {
    /// Create a new application instance, hydrating any stored session
    pub fn new() -> Result<Self> {
        debug!("App::new() starting");
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let data_dir = Config::data_dir().unwrap_or_else(|_| PathBuf::from("./data"));
        let scheme = config.credential_scheme;
        debug!(?scheme, ?data_dir, "Config loaded");

        let mut session = Session::new(scheme, data_dir);
        let restored = session.initialize();
        debug!(restored, "Session initialized");

        let mut api = ApiClient::new(config.resolved_api_url(), scheme)?;
        if let Some(token) = session.access_token_for_request() {
            api.set_token(token.to_string());
        }

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill the login form from env vars or the config
        let login_email = std::env::var("CAMPUSDESK_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let login_password = std::env::var("CAMPUSDESK_PASSWORD").unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,

            state: AppState::Normal,
            current_tab: Tab::Students,
            focus: Focus::List,
            search_query: String::new(),

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            students: Vec::new(),
            students_loading: false,
            student_selection: 0,
            student_sort_column: StudentSortColumn::Name,
            student_sort_ascending: true,

            messages: Vec::new(),
            messages_loading: false,
            message_selection: 0,
            compose_text: String::new(),
            composing: false,
            sending: false,

            status_message: None,

            fetch_rx: Some(rx),
            fetch_tx: tx,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }
        if !is_valid_email(&email) {
            self.login_error = Some("Invalid email address".to_string());
            return Err(anyhow::anyhow!("Invalid email address"));
        }

        self.login_error = None;

        match self.api.login(&email, &password).await {
            Ok(resp) => {
                if let Err(e) = CredentialStore::store(&email, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.session
                    .login(resp.access_token, resp.refresh_token, resp.student);
                if let Some(token) = self.session.access_token_for_request() {
                    self.api.set_token(token.to_string());
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let chain = format!("{:#}", e).to_lowercase();
                let user_message = if e
                    .downcast_ref::<ApiError>()
                    .is_some_and(ApiError::is_unauthorized)
                {
                    "Invalid email or password".to_string()
                } else if chain.contains("connect") || chain.contains("send request") {
                    "Unable to connect to server. Check the API address.".to_string()
                } else if chain.contains("timed out") || chain.contains("timeout") {
                    "Connection timed out. Please try again.".to_string()
                } else {
                    format!("Login failed: {}", e)
                };
                self.login_error = Some(user_message);
                Err(e)
            }
        }
    }

    /// Log out locally and fire a best-effort server-side invalidation
    pub fn logout(&mut self) {
        if let Some(refresh_token) = self.session.refresh_token().map(str::to_string) {
            let api = self.api.clone();
            tokio::spawn(async move {
                // Client-side logout proceeds regardless of this outcome
                if let Err(e) = api.logout(&refresh_token).await {
                    warn!(error = %e, "Server-side logout failed");
                }
            });
        }

        self.session.logout();
        self.api.clear_token();

        self.students.clear();
        self.messages.clear();
        self.student_selection = 0;
        self.message_selection = 0;
        self.compose_text.clear();
        self.composing = false;
        self.sending = false;
        self.status_message = None;

        info!("Logged out");
        self.start_login();
    }

    // =========================================================================
    // Background Fetches
    // =========================================================================

    /// Kick off fetches for everything the UI shows
    pub fn refresh_all(&mut self) {
        self.refresh_students();
        self.refresh_messages();
    }

    pub fn refresh_students(&mut self) {
        if !self.session.is_authenticated() {
            return;
        }
        self.students_loading = true;

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_students().await;
            if tx.send(FetchResult::Students(result)).await.is_err() {
                warn!("Fetch channel closed before students result was delivered");
            }
        });
    }

    pub fn refresh_messages(&mut self) {
        let Some(email) = self.session.student().map(|s| s.email.clone()) else {
            return;
        };
        self.messages_loading = true;

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_messages(&email).await;
            if tx.send(FetchResult::Messages(result)).await.is_err() {
                warn!("Fetch channel closed before messages result was delivered");
            }
        });
    }

    /// Fetch messages when entering the tab with nothing loaded yet
    pub fn ensure_messages_loaded(&mut self) {
        if self.messages.is_empty() && !self.messages_loading {
            self.refresh_messages();
        }
    }

    /// Submit the composed message. Empty messages are rejected inline
    /// and never reach the network.
    pub fn send_message(&mut self) {
        let text = self.compose_text.trim().to_string();
        if text.is_empty() {
            self.set_error("Message cannot be empty");
            return;
        }

        self.sending = true;
        self.status_message = None;

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.send_message(&text).await;
            if tx.send(FetchResult::MessageSent(result)).await.is_err() {
                warn!("Fetch channel closed before send result was delivered");
            }
        });
    }

    fn refresh_messages_after_delay(&mut self) {
        let Some(email) = self.session.student().map(|s| s.email.clone()) else {
            return;
        };
        self.messages_loading = true;

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(SEND_REFETCH_DELAY_MS)).await;
            let result = api.fetch_messages(&email).await;
            let _ = tx.send(FetchResult::Messages(result)).await;
        });
    }

    /// Drain completed background tasks and apply their results
    pub fn check_background_tasks(&mut self) {
        let Some(mut rx) = self.fetch_rx.take() else {
            return;
        };
        while let Ok(result) = rx.try_recv() {
            self.process_fetch_result(result);
        }
        self.fetch_rx = Some(rx);
    }

    fn process_fetch_result(&mut self, result: FetchResult) {
        match result {
            FetchResult::Students(Ok(students)) => {
                debug!(count = students.len(), "Student roster updated");
                self.students = students;
                self.students_loading = false;
                self.student_selection = self
                    .student_selection
                    .min(self.students.len().saturating_sub(1));
            }
            FetchResult::Students(Err(e)) => {
                self.students_loading = false;
                self.handle_fetch_error("Failed to fetch students", e);
            }
            FetchResult::Messages(Ok(messages)) => {
                debug!(count = messages.len(), "Messages updated");
                self.messages = messages;
                self.messages_loading = false;
                self.message_selection = self
                    .message_selection
                    .min(self.messages.len().saturating_sub(1));
            }
            FetchResult::Messages(Err(e)) => {
                self.messages_loading = false;
                self.handle_fetch_error("Failed to fetch messages", e);
            }
            FetchResult::MessageSent(Ok(resp)) => {
                debug!(status = %resp.status, "Message accepted");
                self.sending = false;
                self.composing = false;
                self.compose_text.clear();
                self.set_success("Message sent successfully!");
                self.refresh_messages_after_delay();
            }
            FetchResult::MessageSent(Err(e)) => {
                self.sending = false;
                self.handle_fetch_error("Failed to send message", e);
            }
        }
    }

    /// A 401 on any authenticated call means the credential is no longer
    /// accepted; treat it as an implicit logout.
    fn handle_fetch_error(&mut self, what: &str, e: anyhow::Error) {
        if e.downcast_ref::<ApiError>()
            .is_some_and(ApiError::is_unauthorized)
        {
            warn!("Request rejected with 401, forcing logout");
            self.logout();
            self.login_error = Some("Session expired. Please log in again.".to_string());
        } else {
            error!(error = %e, "{}", what);
            self.set_error(format!("{}: {}", what, e));
        }
    }

    // =========================================================================
    // Roster Sorting & Search
    // =========================================================================

    fn student_matches_search(&self, student: &Student) -> bool {
        if self.search_query.is_empty() {
            return true;
        }
        contains_ignore_case(&student.first_name, &self.search_query)
            || contains_ignore_case(&student.last_name, &self.search_query)
            || contains_ignore_case(&student.email, &self.search_query)
    }

    /// The roster filtered by the search query and sorted by the active
    /// column
    pub fn get_sorted_students(&self) -> Vec<&Student> {
        let mut students: Vec<&Student> = self
            .students
            .iter()
            .filter(|s| self.student_matches_search(s))
            .collect();

        students.sort_by(|a, b| {
            let ord = match self.student_sort_column {
                StudentSortColumn::Name => cmp_ignore_case(&a.last_name, &b.last_name)
                    .then_with(|| cmp_ignore_case(&a.first_name, &b.first_name)),
                StudentSortColumn::Email => cmp_ignore_case(&a.email, &b.email),
                StudentSortColumn::Major => cmp_ignore_case(&a.major, &b.major),
                StudentSortColumn::Year => a
                    .year
                    .cmp(&b.year)
                    .then_with(|| cmp_ignore_case(&a.last_name, &b.last_name)),
            };
            if self.student_sort_ascending {
                ord
            } else {
                ord.reverse()
            }
        });

        students
    }

    pub fn toggle_student_sort(&mut self, column: StudentSortColumn) {
        if self.student_sort_column == column {
            self.student_sort_ascending = !self.student_sort_ascending;
        } else {
            self.student_sort_column = column;
            self.student_sort_ascending = true;
        }
        self.student_selection = 0;
    }

    pub fn selected_student(&self) -> Option<&Student> {
        self.get_sorted_students()
            .get(self.student_selection)
            .copied()
    }

    // =========================================================================
    // Status Messages
    // =========================================================================

    pub fn set_success(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Success,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Error,
        });
    }
}

// ============================================================================
// Input Validation Helpers
// ============================================================================

fn is_valid_input_char(c: char) -> bool {
    c.is_ascii_graphic() || c == ' '
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && c.is_ascii_graphic()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_message_char(current_len: usize, c: char) -> bool {
    current_len < MAX_MESSAGE_LENGTH && is_valid_input_char(c)
}

/// Validate that a string looks like an email address.
/// Checks for a single '@' with a dotted domain; full validation is the
/// server's job.
pub fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@campus.example.edu"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn test_email_input_rejects_spaces() {
        assert!(can_add_email_char(0, 'a'));
        assert!(!can_add_email_char(0, ' '));
        assert!(!can_add_email_char(MAX_EMAIL_LENGTH, 'a'));
    }

    #[test]
    fn test_password_input_allows_spaces() {
        assert!(can_add_password_char(0, ' '));
        assert!(!can_add_password_char(MAX_PASSWORD_LENGTH, 'x'));
    }

    #[test]
    fn test_message_input_limit() {
        assert!(can_add_message_char(MAX_MESSAGE_LENGTH - 1, '!'));
        assert!(!can_add_message_char(MAX_MESSAGE_LENGTH, '!'));
    }

    #[test]
    fn test_tab_cycling_wraps() {
        assert_eq!(Tab::Students.next(), Tab::Messages);
        assert_eq!(Tab::Messages.next(), Tab::Students);
        assert_eq!(Tab::Students.prev(), Tab::Messages);
    }
}
