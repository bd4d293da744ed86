use crate::auth::{friendly_message, AuthAction, AuthError, AuthProvider, Session};
use crate::favorites::FavoritesSink;
use crate::feed::{FeedClient, FeedError, RideStatus};
use std::borrow::Cow;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

/// How long a status bar message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// Screens
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Rides,
}

/// Focusable elements of the login form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    SignIn,
    SignUp,
}

impl LoginField {
    pub fn next(self) -> Self {
        match self {
            Self::Email => Self::Password,
            Self::Password => Self::SignIn,
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Email => Self::SignUp,
            Self::Password => Self::Email,
            Self::SignIn => Self::Password,
            Self::SignUp => Self::SignIn,
        }
    }
}

/// Login screen state.
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    /// Request in flight, if any. Input is ignored meanwhile.
    pub pending: Option<AuthAction>,
    pub error: Option<&'static str>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            focus: LoginField::Email,
            pending: None,
            error: None,
        }
    }
}

impl LoginForm {
    /// Both buttons need a non-blank email and password.
    pub fn can_submit(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.trim().is_empty()
    }

    /// Text field under focus, if the focus is on a field.
    pub fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            LoginField::Email => Some(&mut self.email),
            LoginField::Password => Some(&mut self.password),
            LoginField::SignIn | LoginField::SignUp => None,
        }
    }
}

/// What the ride screen is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RideListState {
    Loading,
    /// Ranked rides; may be empty ("no rides found")
    Loaded(Vec<RideStatus>),
    /// Fetch or parse failed; no partial list is kept
    Failed,
}

// ============================================================================
// Events
// ============================================================================

/// Completion events from background tasks.
pub enum AppEvent {
    /// Ride feed fetch finished.
    ///
    /// `generation` is the value of `App::fetch_generation` when the fetch
    /// was spawned; results from older generations are discarded.
    RidesLoaded {
        generation: u64,
        result: Result<Vec<RideStatus>, FeedError>,
    },
    AuthCompleted {
        action: AuthAction,
        result: Result<Session, AuthError>,
    },
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub park_name: String,

    // Capabilities
    pub feed_client: FeedClient,
    /// `None` runs the app in guest-only mode.
    pub auth: Option<Arc<dyn AuthProvider>>,
    pub favorites: Arc<dyn FavoritesSink>,
    pub session: Option<Arc<Session>>,

    // UI State
    pub screen: Screen,
    pub login: LoginForm,
    pub rides: RideListState,
    pub selected_ride: usize,

    // Fetch tracking
    pub fetch_generation: u64,
    pub fetch_handle: Option<JoinHandle<()>>,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(
        park_name: impl Into<String>,
        feed_client: FeedClient,
        auth: Option<Arc<dyn AuthProvider>>,
        favorites: Arc<dyn FavoritesSink>,
    ) -> Self {
        let screen = if auth.is_some() {
            Screen::Login
        } else {
            Screen::Rides
        };

        Self {
            park_name: park_name.into(),
            feed_client,
            auth,
            favorites,
            session: None,
            screen,
            login: LoginForm::default(),
            rides: RideListState::Loading,
            selected_ride: 0,
            fetch_generation: 0,
            fetch_handle: None,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Status bar
    // ------------------------------------------------------------------------

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Drop the status message once it has expired. Returns true if cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        match &self.status_message {
            Some((_, set_at)) if set_at.elapsed() >= STATUS_TTL => {
                self.status_message = None;
                true
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------------
    // Ride list
    // ------------------------------------------------------------------------

    pub fn is_fetching(&self) -> bool {
        self.fetch_handle.is_some()
    }

    /// Reset the list for a new fetch and return its generation.
    ///
    /// Returns `None` when a fetch is already in flight.
    pub fn begin_fetch(&mut self) -> Option<u64> {
        if self.is_fetching() {
            return None;
        }
        self.fetch_generation = self.fetch_generation.wrapping_add(1);
        self.rides = RideListState::Loading;
        self.selected_ride = 0;
        Some(self.fetch_generation)
    }

    /// Apply a fetch result. Returns false when the result was stale.
    pub fn apply_rides_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<RideStatus>, FeedError>,
    ) -> bool {
        if generation != self.fetch_generation || self.screen != Screen::Rides {
            tracing::debug!(
                generation,
                current = self.fetch_generation,
                "Discarding stale ride feed result"
            );
            return false;
        }

        self.fetch_handle = None;
        self.rides = match result {
            Ok(rides) => RideListState::Loaded(rides),
            Err(_) => RideListState::Failed,
        };
        self.clamp_selection();
        true
    }

    pub fn ride_list(&self) -> &[RideStatus] {
        match &self.rides {
            RideListState::Loaded(rides) => rides,
            RideListState::Loading | RideListState::Failed => &[],
        }
    }

    pub fn selected_ride(&self) -> Option<&RideStatus> {
        self.ride_list().get(self.selected_ride)
    }

    pub fn nav_down(&mut self) {
        let len = self.ride_list().len();
        if len > 0 && self.selected_ride + 1 < len {
            self.selected_ride += 1;
        }
    }

    pub fn nav_up(&mut self) {
        self.selected_ride = self.selected_ride.saturating_sub(1);
    }

    pub fn nav_first(&mut self) {
        self.selected_ride = 0;
    }

    pub fn nav_last(&mut self) {
        self.selected_ride = self.ride_list().len().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.ride_list().len();
        if self.selected_ride >= len {
            self.selected_ride = len.saturating_sub(1);
        }
    }

    // ------------------------------------------------------------------------
    // Screens and session
    // ------------------------------------------------------------------------

    /// "Logged in as" label.
    pub fn user_label(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.email.as_str())
            .unwrap_or("Guest")
    }

    pub fn show_rides(&mut self) {
        self.screen = Screen::Rides;
        self.selected_ride = 0;
    }

    /// Tear down the ride screen and return to login.
    ///
    /// Any in-flight fetch is aborted and its result, should it still arrive,
    /// is ignored. Returns false in guest-only mode, which has no login screen.
    pub fn leave_rides(&mut self) -> bool {
        if self.auth.is_none() {
            return false;
        }
        if let Some(handle) = self.fetch_handle.take() {
            handle.abort();
        }
        self.fetch_generation = self.fetch_generation.wrapping_add(1);
        self.rides = RideListState::Loading;
        self.selected_ride = 0;
        self.session = None;
        self.login = LoginForm::default();
        self.screen = Screen::Login;
        true
    }

    /// Mark an auth request as started. Returns false if the form cannot be
    /// submitted (blank field or a request already pending).
    pub fn begin_auth(&mut self, action: AuthAction) -> bool {
        if self.auth.is_none() || self.login.pending.is_some() || !self.login.can_submit() {
            return false;
        }
        self.login.pending = Some(action);
        self.login.error = None;
        true
    }

    /// Apply an auth result. Returns true when the ride screen should open.
    pub fn apply_auth_result(
        &mut self,
        action: AuthAction,
        result: Result<Session, AuthError>,
    ) -> bool {
        self.login.pending = None;
        match (action, result) {
            (AuthAction::SignIn, Ok(session)) => {
                self.session = Some(Arc::new(session));
                self.login.password.clear();
                self.set_status("Login successful!");
                self.show_rides();
                true
            }
            (AuthAction::SignUp, Ok(_)) => {
                self.set_status("Account created!");
                false
            }
            (action, Err(e)) => {
                tracing::info!(?action, error = %e, "Authentication failed");
                self.login.error = Some(friendly_message(&e, action));
                false
            }
        }
    }
}
