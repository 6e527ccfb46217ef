//! Application state management for careview.
//!
//! This module contains the core `App` struct that manages all application
//! state: UI state, loaded backend data, the login form, and background task
//! coordination. It also implements the auth guard: every tab is a protected
//! view, and navigating anywhere without a token lands on the login overlay.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::{health, ApiClient, LoginRequest, DEFAULT_EVENT_LIMIT};
use crate::auth::{CredentialStore, SessionStore};
use crate::config::Config;
use crate::models::{
    AnalyticsEvent, AnalyticsSummary, CreatePaymentRequest, EventFilter, Patient, PatientRequest,
    PaymentIntentResponse, PaymentResponse, ServiceHealth,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// 32 is sufficient for a full refresh (~4 results) with plenty of headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for login form inputs.
const MAX_INPUT_LENGTH: usize = 128;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Currency used for payment intents created from the billing tab.
const DEFAULT_CURRENCY: &str = "usd";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs. All of them are protected views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Patients,
    Billing,
    Analytics,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Patients => "Patients",
            Tab::Billing => "Billing",
            Tab::Analytics => "Analytics",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Patients,
            Tab::Patients => Tab::Billing,
            Tab::Billing => Tab::Analytics,
            Tab::Analytics => Tab::Dashboard,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Analytics,
            Tab::Patients => Tab::Dashboard,
            Tab::Billing => Tab::Patients,
            Tab::Analytics => Tab::Billing,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    EditingPatient,
    EnteringPayment,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// Patient form field focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientField {
    Name,
    Email,
    Address,
    DateOfBirth,
}

impl PatientField {
    pub fn next(&self) -> Self {
        match self {
            PatientField::Name => PatientField::Email,
            PatientField::Email => PatientField::Address,
            PatientField::Address => PatientField::DateOfBirth,
            PatientField::DateOfBirth => PatientField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            PatientField::Name => PatientField::DateOfBirth,
            PatientField::Email => PatientField::Name,
            PatientField::Address => PatientField::Email,
            PatientField::DateOfBirth => PatientField::Address,
        }
    }
}

/// Create/edit patient form state
#[derive(Debug, Clone, Default)]
pub struct PatientForm {
    /// Patient id when editing, None when creating
    pub editing_id: Option<String>,
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: String,
    pub focus: Option<PatientField>,
    pub error: Option<String>,
}

impl PatientForm {
    pub fn blank() -> Self {
        Self {
            focus: Some(PatientField::Name),
            ..Self::default()
        }
    }

    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            editing_id: Some(patient.id.clone()),
            name: patient.name.clone(),
            email: patient.email.clone(),
            address: patient.address.clone(),
            date_of_birth: patient.date_of_birth.clone(),
            focus: Some(PatientField::Name),
            error: None,
        }
    }

    pub fn to_request(&self) -> PatientRequest {
        PatientRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
            date_of_birth: self.date_of_birth.trim().to_string(),
            registered_date: None,
        }
    }

    pub fn focused_value_mut(&mut self) -> Option<&mut String> {
        match self.focus? {
            PatientField::Name => Some(&mut self.name),
            PatientField::Email => Some(&mut self.email),
            PatientField::Address => Some(&mut self.address),
            PatientField::DateOfBirth => Some(&mut self.date_of_birth),
        }
    }
}

/// Payment form field focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    Amount,
    Description,
}

impl PaymentField {
    pub fn next(&self) -> Self {
        match self {
            PaymentField::Amount => PaymentField::Description,
            PaymentField::Description => PaymentField::Amount,
        }
    }
}

/// Payment creation form state, bound to one patient
#[derive(Debug, Clone, Default)]
pub struct PaymentForm {
    pub patient_id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub amount: String,
    pub description: String,
    pub focus: Option<PaymentField>,
    pub error: Option<String>,
}

impl PaymentForm {
    pub fn for_patient(patient: &Patient) -> Self {
        Self {
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            patient_email: patient.email.clone(),
            amount: String::new(),
            description: String::new(),
            focus: Some(PaymentField::Amount),
            error: None,
        }
    }

    pub fn to_request(&self) -> Result<CreatePaymentRequest, String> {
        let amount: f64 = self
            .amount
            .trim()
            .parse()
            .map_err(|_| "Amount must be a number".to_string())?;
        if amount <= 0.0 {
            return Err("Amount must be positive".to_string());
        }
        let description = self.description.trim();
        Ok(CreatePaymentRequest {
            patient_id: self.patient_id.clone(),
            patient_name: self.patient_name.clone(),
            patient_email: self.patient_email.clone(),
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        })
    }

    pub fn focused_value_mut(&mut self) -> Option<&mut String> {
        match self.focus? {
            PaymentField::Amount => Some(&mut self.amount),
            PaymentField::Description => Some(&mut self.description),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background tasks, sent through an MPSC channel back to
/// the main loop. Applied last-write-wins: two overlapping refreshes may
/// resolve in either order and the later one sticks.
enum TaskResult {
    /// Patient roster fetched
    Patients(Vec<Patient>),
    /// Analytics summary fetched
    Summary(AnalyticsSummary),
    /// Event stream fetched for the given filter
    Events(EventFilter, Vec<AnalyticsEvent>),
    /// Service health probes completed
    Health(Vec<ServiceHealth>),
    /// A patient was created or updated
    PatientSaved(Patient),
    /// A patient was deleted (id)
    PatientDeleted(String),
    /// A payment intent was created
    PaymentIntent(PaymentIntentResponse),
    /// Payment status fetched (or cancel confirmed)
    Payment(PaymentResponse),
    /// A request came back 401; the session is already cleared
    SessionExpired,
    /// A request failed with a displayable message
    Error(String),
    /// A full refresh finished
    RefreshComplete,
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub search_query: String,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Loaded data
    pub patients: Vec<Patient>,
    pub summary: AnalyticsSummary,
    pub events: Vec<AnalyticsEvent>,
    pub event_filter: EventFilter,
    pub services: Vec<ServiceHealth>,
    pub last_intent: Option<PaymentIntentResponse>,
    pub last_payment: Option<PaymentResponse>,

    // Selection indices
    pub patient_selection: usize,
    pub billing_selection: usize,
    pub event_selection: usize,

    // Forms
    pub patient_form: PatientForm,
    pub payment_form: PaymentForm,
    /// Patient staged for deletion while the confirm dialog is up
    pub pending_delete: Option<Patient>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config
            .cache_dir()
            .unwrap_or_else(|_| PathBuf::from("./cache"));

        // Session survives restarts; load the persisted token if present
        let session = Arc::new(SessionStore::new(cache_dir));
        match session.load() {
            Ok(found) => info!(found, "Session loaded"),
            Err(e) => warn!(error = %e, "Failed to load session"),
        }

        let base_url = config.gateway_url();
        info!(%base_url, "Gateway configured");
        let api = ApiClient::new(base_url, session.clone())?;

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill the login form from config and the OS keychain
        let login_email = std::env::var("CAREVIEW_EMAIL")
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let login_password = if login_email.is_empty() {
            String::new()
        } else {
            CredentialStore::get_password(&login_email).unwrap_or_default()
        };

        Ok(Self {
            config,
            session,
            api,

            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            search_query: String::new(),

            login_email,
            login_password,
            login_focus: LoginFocus::Email,
            login_error: None,

            patients: Vec::new(),
            summary: AnalyticsSummary::default(),
            events: Vec::new(),
            event_filter: EventFilter::Recent,
            services: health::placeholder(),
            last_intent: None,
            last_payment: None,

            patient_selection: 0,
            billing_selection: 0,
            event_selection: 0,

            patient_form: PatientForm::default(),
            payment_form: PaymentForm::default(),
            pending_delete: None,

            task_rx,
            task_tx,

            status_message: None,
        })
    }

    // =========================================================================
    // Authentication / auth guard
    // =========================================================================

    /// Whether a token is present. The server has the final word; a 401 on
    /// any call clears the session and routes back to login.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Route guard for protected views: true means proceed, false means the
    /// login overlay was raised instead.
    pub fn guard(&mut self) -> bool {
        if self.is_authenticated() {
            true
        } else {
            self.start_login();
            false
        }
    }

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Drop the session and return to the login overlay
    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.login_password.clear();
        info!("Logged out");
        self.start_login();
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow::anyhow!("Email and password required"));
        }

        self.login_error = None;

        match self
            .api
            .login(&LoginRequest {
                email: email.clone(),
                password: password.clone(),
            })
            .await
        {
            Ok(response) => {
                // The login call never stores the token itself; that decision
                // is made here.
                if let Err(e) = self.session.set_token(response.token) {
                    warn!(error = %e, "Failed to persist session");
                }

                if let Err(e) = CredentialStore::store(&email, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                info!("Login successful");
                self.refresh_all_background();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let user_message = match e.status() {
                    Some(401) => "Invalid email or password".to_string(),
                    Some(status) => format!("Login failed: status {}", status),
                    None => "Unable to connect to server. Is the gateway up?".to_string(),
                };
                self.login_error = Some(user_message);
                Err(e.into())
            }
        }
    }

    // =========================================================================
    // Background refresh
    // =========================================================================

    /// Verify a persisted token against the auth service. A rejected token
    /// comes back 401, which clears the session and routes to login.
    pub fn validate_session_background(&mut self) {
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = api.validate_token().await {
                Self::send_api_error(&tx, e, "token validation").await;
            }
        });
    }

    /// Spawn a background task to refresh patients, analytics, and health
    pub fn refresh_all_background(&mut self) {
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let filter = self.event_filter.clone();
        let authenticated = self.is_authenticated();

        tokio::spawn(async move {
            // Health probes are unauthenticated and always run
            let health_api = api.clone();
            let health_tx = tx.clone();
            let health_task = tokio::spawn(async move {
                let services = health::check_all(health_api.transport()).await;
                Self::send_result(&health_tx, TaskResult::Health(services)).await;
            });

            if authenticated {
                let (patients, summary, events) = tokio::join!(
                    api.patients(),
                    api.analytics_summary(),
                    Self::fetch_events(&api, &filter),
                );

                match patients {
                    Ok(list) => Self::send_result(&tx, TaskResult::Patients(list)).await,
                    Err(e) => Self::send_api_error(&tx, e, "patients").await,
                }
                match summary {
                    Ok(s) => Self::send_result(&tx, TaskResult::Summary(s)).await,
                    Err(e) => Self::send_api_error(&tx, e, "analytics summary").await,
                }
                match events {
                    Ok(list) => {
                        Self::send_result(&tx, TaskResult::Events(filter.clone(), list)).await
                    }
                    Err(e) => Self::send_api_error(&tx, e, "analytics events").await,
                }
            }

            let _ = health_task.await;
            Self::send_result(&tx, TaskResult::RefreshComplete).await;
        });

        self.status_message = Some("Refreshing data...".to_string());
    }

    async fn fetch_events(
        api: &ApiClient,
        filter: &EventFilter,
    ) -> Result<Vec<AnalyticsEvent>, crate::api::ApiError> {
        match filter {
            EventFilter::Recent => api.analytics_events(DEFAULT_EVENT_LIMIT).await,
            EventFilter::Patient(id) => api.events_by_patient(id).await,
            EventFilter::EventType(kind) => api.events_by_type(kind).await,
        }
    }

    /// Reload only the event stream, for filter changes
    fn reload_events_background(&mut self) {
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let filter = self.event_filter.clone();

        tokio::spawn(async move {
            match Self::fetch_events(&api, &filter).await {
                Ok(list) => Self::send_result(&tx, TaskResult::Events(filter, list)).await,
                Err(e) => Self::send_api_error(&tx, e, "analytics events").await,
            }
        });
    }

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Map an API error to a task result. 401 means the HTTP client already
    /// cleared the session; the main loop only has to route to login.
    async fn send_api_error(tx: &mpsc::Sender<TaskResult>, e: crate::api::ApiError, what: &str) {
        if e.status() == Some(401) {
            Self::send_result(tx, TaskResult::SessionExpired).await;
        } else {
            warn!(error = %e, what, "Request failed");
            Self::send_result(tx, TaskResult::Error(format!("Failed to load {}: {}", what, e)))
                .await;
        }
    }

    /// Drain completed background task results and fold them into state
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.task_rx.try_recv() {
            match result {
                TaskResult::Patients(mut list) => {
                    list.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                    self.patients = list;
                    self.clamp_selections();
                }
                TaskResult::Summary(summary) => {
                    self.summary = summary;
                }
                TaskResult::Events(filter, events) => {
                    // A stale result for an old filter would mislabel the view
                    if filter == self.event_filter {
                        self.events = events;
                        self.clamp_selections();
                    }
                }
                TaskResult::Health(services) => {
                    self.services = services;
                }
                TaskResult::PatientSaved(patient) => {
                    self.status_message = Some(format!("Saved {}", patient.name));
                    match self.patients.iter_mut().find(|p| p.id == patient.id) {
                        Some(existing) => *existing = patient,
                        None => self.patients.push(patient),
                    }
                    self.patients
                        .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                }
                TaskResult::PatientDeleted(id) => {
                    self.patients.retain(|p| p.id != id);
                    self.clamp_selections();
                    self.status_message = Some("Patient deleted".to_string());
                }
                TaskResult::PaymentIntent(intent) => {
                    self.status_message =
                        Some(format!("Payment intent {} created", intent.payment_intent_id));
                    self.last_intent = Some(intent);
                    self.last_payment = None;
                }
                TaskResult::Payment(payment) => {
                    self.status_message = Some(if payment.is_terminal() {
                        format!("Payment {} (final)", payment.status)
                    } else {
                        format!("Payment {}", payment.status)
                    });
                    self.last_payment = Some(payment);
                }
                TaskResult::SessionExpired => {
                    warn!("Session expired - routing to login");
                    self.status_message = Some("Session expired - please log in".to_string());
                    self.start_login();
                }
                TaskResult::Error(message) => {
                    self.status_message = Some(message);
                }
                TaskResult::RefreshComplete => {
                    if self.status_message.as_deref() == Some("Refreshing data...") {
                        self.status_message = None;
                    }
                }
            }
        }
    }

    // =========================================================================
    // Patients
    // =========================================================================

    /// Patients matching the current search query, in display order
    pub fn visible_patients(&self) -> Vec<&Patient> {
        if self.search_query.is_empty() {
            self.patients.iter().collect()
        } else {
            self.patients
                .iter()
                .filter(|p| p.matches(&self.search_query))
                .collect()
        }
    }

    pub fn selected_patient(&self) -> Option<&Patient> {
        self.visible_patients().get(self.patient_selection).copied()
    }

    pub fn billing_patient(&self) -> Option<&Patient> {
        self.patients.get(self.billing_selection)
    }

    pub fn selected_event(&self) -> Option<&AnalyticsEvent> {
        self.events.get(self.event_selection)
    }

    pub fn open_create_form(&mut self) {
        self.patient_form = PatientForm::blank();
        self.state = AppState::EditingPatient;
    }

    pub fn open_edit_form(&mut self) {
        if let Some(patient) = self.selected_patient() {
            self.patient_form = PatientForm::from_patient(patient);
            self.state = AppState::EditingPatient;
        }
    }

    /// Validate and submit the patient form in the background
    pub fn submit_patient_form(&mut self) {
        let request = self.patient_form.to_request();
        if let Err(message) = request.validate() {
            self.patient_form.error = Some(message);
            return;
        }

        let editing_id = self.patient_form.editing_id.clone();
        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            let result = match &editing_id {
                Some(id) => api.update_patient(id, &request).await,
                None => api.create_patient(&request).await,
            };
            match result {
                Ok(patient) => Self::send_result(&tx, TaskResult::PatientSaved(patient)).await,
                Err(e) => Self::send_api_error(&tx, e, "patient save").await,
            }
        });

        self.state = AppState::Normal;
        self.status_message = Some("Saving patient...".to_string());
    }

    /// Stage the selected patient for deletion behind a confirm dialog
    pub fn request_delete_selected(&mut self) {
        if let Some(patient) = self.selected_patient().cloned() {
            self.pending_delete = Some(patient);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some(patient) = self.pending_delete.take() else {
            self.state = AppState::Normal;
            return;
        };

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let id = patient.id.clone();

        tokio::spawn(async move {
            match api.delete_patient(&id).await {
                Ok(()) => Self::send_result(&tx, TaskResult::PatientDeleted(id)).await,
                Err(e) => Self::send_api_error(&tx, e, "patient delete").await,
            }
        });

        self.state = AppState::Normal;
        self.status_message = Some(format!("Deleting {}...", patient.name));
    }

    // =========================================================================
    // Billing
    // =========================================================================

    pub fn open_payment_form(&mut self) {
        if let Some(patient) = self.billing_patient() {
            self.payment_form = PaymentForm::for_patient(patient);
            self.state = AppState::EnteringPayment;
        }
    }

    pub fn submit_payment_form(&mut self) {
        let request = match self.payment_form.to_request() {
            Ok(request) => request,
            Err(message) => {
                self.payment_form.error = Some(message);
                return;
            }
        };

        let api = self.api.clone();
        let tx = self.task_tx.clone();

        tokio::spawn(async move {
            match api.create_payment_intent(&request).await {
                Ok(intent) => Self::send_result(&tx, TaskResult::PaymentIntent(intent)).await,
                Err(e) => Self::send_api_error(&tx, e, "payment intent").await,
            }
        });

        self.state = AppState::Normal;
        self.status_message = Some("Creating payment intent...".to_string());
    }

    /// Fetch the latest status of the last created payment intent
    pub fn refresh_payment_status(&mut self) {
        let Some(intent) = &self.last_intent else {
            self.status_message = Some("No payment intent yet".to_string());
            return;
        };

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let id = intent.payment_intent_id.clone();

        tokio::spawn(async move {
            match api.payment_status(&id).await {
                Ok(payment) => Self::send_result(&tx, TaskResult::Payment(payment)).await,
                Err(e) => Self::send_api_error(&tx, e, "payment status").await,
            }
        });

        self.status_message = Some("Checking payment status...".to_string());
    }

    pub fn cancel_last_payment(&mut self) {
        let Some(intent) = &self.last_intent else {
            self.status_message = Some("No payment intent yet".to_string());
            return;
        };

        let api = self.api.clone();
        let tx = self.task_tx.clone();
        let id = intent.payment_intent_id.clone();

        tokio::spawn(async move {
            match api.cancel_payment(&id).await {
                Ok(payment) => Self::send_result(&tx, TaskResult::Payment(payment)).await,
                Err(e) => Self::send_api_error(&tx, e, "payment cancel").await,
            }
        });

        self.status_message = Some("Canceling payment...".to_string());
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    pub fn filter_events_by_selected_patient(&mut self) {
        if let Some(event) = self.selected_event() {
            self.event_filter = EventFilter::Patient(event.patient_id.clone());
            self.event_selection = 0;
            self.reload_events_background();
        }
    }

    pub fn filter_events_by_selected_type(&mut self) {
        if let Some(event) = self.selected_event() {
            self.event_filter = EventFilter::EventType(event.event_type.clone());
            self.event_selection = 0;
            self.reload_events_background();
        }
    }

    pub fn reset_event_filter(&mut self) {
        self.event_filter = EventFilter::Recent;
        self.event_selection = 0;
        self.reload_events_background();
    }

    /// Jump to the analytics tab filtered to the selected patient's events
    pub fn show_events_for_selected_patient(&mut self) {
        if let Some(patient) = self.selected_patient() {
            self.event_filter = EventFilter::Patient(patient.id.clone());
            self.event_selection = 0;
            self.current_tab = Tab::Analytics;
            self.reload_events_background();
        }
    }

    // =========================================================================
    // Selection movement
    // =========================================================================

    /// Number of rows in the list the current tab scrolls through
    fn current_list_len(&self) -> usize {
        match self.current_tab {
            Tab::Dashboard => self.services.len(),
            Tab::Patients => self.visible_patients().len(),
            Tab::Billing => self.patients.len(),
            Tab::Analytics => self.events.len(),
        }
    }

    fn current_selection_mut(&mut self) -> Option<&mut usize> {
        match self.current_tab {
            Tab::Dashboard => None,
            Tab::Patients => Some(&mut self.patient_selection),
            Tab::Billing => Some(&mut self.billing_selection),
            Tab::Analytics => Some(&mut self.event_selection),
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.current_list_len();
        if len == 0 {
            return;
        }
        if let Some(selection) = self.current_selection_mut() {
            let current = *selection as isize;
            let next = (current + delta).clamp(0, len as isize - 1);
            *selection = next as usize;
        }
    }

    fn clamp_selections(&mut self) {
        let visible = self.visible_patients().len();
        self.patient_selection = self.patient_selection.min(visible.saturating_sub(1));
        self.billing_selection = self
            .billing_selection
            .min(self.patients.len().saturating_sub(1));
        self.event_selection = self.event_selection.min(self.events.len().saturating_sub(1));
    }

    // =========================================================================
    // Misc UI helpers
    // =========================================================================

    /// Append a character to a bounded text input
    pub fn push_input(value: &mut String, c: char) {
        if value.len() < MAX_INPUT_LENGTH {
            value.push(c);
        }
    }

    pub fn set_search_query(&mut self, query: String) {
        self.search_query = query;
        self.patient_selection = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: &str, name: &str) -> Patient {
        Patient {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", id),
            address: String::new(),
            date_of_birth: "1990-01-01".to_string(),
        }
    }

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Dashboard.next(), Tab::Patients);
        assert_eq!(Tab::Analytics.next(), Tab::Dashboard);
        assert_eq!(Tab::Dashboard.prev(), Tab::Analytics);
    }

    #[test]
    fn test_patient_form_round_trip() {
        let p = patient("p1", "Alice");
        let form = PatientForm::from_patient(&p);
        assert_eq!(form.editing_id.as_deref(), Some("p1"));
        let request = form.to_request();
        assert_eq!(request.name, "Alice");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_payment_form_rejects_bad_amount() {
        let p = patient("p1", "Alice");
        let mut form = PaymentForm::for_patient(&p);

        form.amount = "abc".to_string();
        assert!(form.to_request().is_err());

        form.amount = "-5".to_string();
        assert!(form.to_request().is_err());

        form.amount = "120.50".to_string();
        let request = form.to_request().expect("valid amount");
        assert_eq!(request.amount, 120.5);
        assert_eq!(request.currency, "usd");
        assert_eq!(request.description, None);
    }

    #[test]
    fn test_patient_field_cycle() {
        assert_eq!(PatientField::Name.next(), PatientField::Email);
        assert_eq!(PatientField::DateOfBirth.next(), PatientField::Name);
        assert_eq!(PatientField::Name.prev(), PatientField::DateOfBirth);
    }
}
