//! Application event handling.
//!
//! Applies completed background work (feed fetches, auth calls) to `App`.

use crate::app::{App, AppEvent, RideListState};
use tokio::sync::mpsc;

use super::helpers::{start_ride_fetch, TASK_AUTH, TASK_RIDE_FEED};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::RidesLoaded { generation, result } => {
            if let Err(e) = &result {
                tracing::debug!(generation, error = %e, "Ride feed result is an error");
            }
            app.apply_rides_loaded(generation, result);
        }
        AppEvent::AuthCompleted { action, result } => {
            if app.apply_auth_result(action, result) {
                start_ride_fetch(app, event_tx);
            }
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            // The panicked task never reports a result, so free its slot
            match task {
                TASK_RIDE_FEED if app.is_fetching() => {
                    app.fetch_handle = None;
                    app.rides = RideListState::Failed;
                }
                TASK_AUTH => app.login.pending = None,
                _ => {}
            }
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Screen;
    use crate::auth::{AuthAction, Session};
    use crate::feed::{FeedError, FetchError, RideStatus};
    use crate::ui::test_support::test_app;
    use secrecy::SecretString;

    fn make_app() -> App {
        test_app(true)
    }

    fn session() -> Session {
        Session {
            uid: "u1".into(),
            email: "fan@example.com".into(),
            id_token: SecretString::from("t".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sign_in_starts_first_fetch() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = make_app();

        handle_app_event(
            &mut app,
            AppEvent::AuthCompleted {
                action: AuthAction::SignIn,
                result: Ok(session()),
            },
            &tx,
        );
        assert_eq!(app.screen, Screen::Rides);
        assert!(app.is_fetching());
        assert_eq!(app.rides, RideListState::Loading);
    }

    #[tokio::test]
    async fn test_timeout_shows_failure_state() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = make_app();
        app.show_rides();
        let generation = app.begin_fetch().unwrap();

        handle_app_event(
            &mut app,
            AppEvent::RidesLoaded {
                generation,
                result: Err(FeedError::Transport(FetchError::Timeout)),
            },
            &tx,
        );
        assert_eq!(app.rides, RideListState::Failed);
    }

    #[tokio::test]
    async fn test_empty_feed_loads_empty_list() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = make_app();
        app.show_rides();
        let generation = app.begin_fetch().unwrap();

        handle_app_event(
            &mut app,
            AppEvent::RidesLoaded {
                generation,
                result: Ok(Vec::<RideStatus>::new()),
            },
            &tx,
        );
        assert_eq!(app.rides, RideListState::Loaded(vec![]));
    }

    #[tokio::test]
    async fn test_panicked_auth_unfreezes_form() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = make_app();
        app.login.pending = Some(AuthAction::SignIn);

        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: TASK_AUTH,
                error: "boom".into(),
            },
            &tx,
        );
        assert!(app.login.pending.is_none());
        let status = app.status_message.as_ref().map(|(m, _)| m.as_ref());
        assert_eq!(status, Some("Internal error in authentication task"));
    }
}
