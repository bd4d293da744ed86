//! Background task spawning shared by input and event handling.

use crate::app::{App, AppEvent};
use crate::auth::AuthAction;
use crate::feed::load_rides;
use futures::FutureExt;
use secrecy::SecretString;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

pub(super) const MSG_GUEST_SAVE: &str = "Please log in to save favorites.";

/// Task names reported in `AppEvent::TaskPanicked`.
pub(super) const TASK_RIDE_FEED: &str = "ride feed";
pub(super) const TASK_AUTH: &str = "authentication";

/// Wraps a future to catch panics and convert them to errors.
///
/// A panicking background task would otherwise vanish silently inside the
/// runtime. The panic payload is turned into a message so the loop can log it
/// and tell the user.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Start fetching the ride feed unless a fetch is already running.
///
/// The result comes back as `AppEvent::RidesLoaded` tagged with the fetch
/// generation. Returns false when the request was ignored.
pub(super) fn start_ride_fetch(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) -> bool {
    let Some(generation) = app.begin_fetch() else {
        tracing::debug!("Fetch already in flight, ignoring reload");
        return false;
    };

    let client = app.feed_client.clone();
    let tx = event_tx.clone();
    tracing::debug!(generation, endpoint = %client.endpoint(), "Spawning ride feed fetch");

    app.fetch_handle = Some(tokio::spawn(async move {
        let event = match catch_task_panic(load_rides(&client)).await {
            Ok(result) => AppEvent::RidesLoaded { generation, result },
            Err(error) => AppEvent::TaskPanicked {
                task: TASK_RIDE_FEED,
                error,
            },
        };
        if tx.send(event).await.is_err() {
            tracing::warn!("Failed to send ride feed result (receiver dropped)");
        }
    }));
    app.needs_redraw = true;
    true
}

/// Submit the login form with the given action.
///
/// Does nothing when the form is incomplete or a request is pending.
pub(super) fn spawn_auth(app: &mut App, action: AuthAction, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(auth) = app.auth.clone() else {
        return;
    };
    if !app.begin_auth(action) {
        return;
    }

    let email = app.login.email.trim().to_string();
    let password = SecretString::from(app.login.password.clone());
    let tx = event_tx.clone();
    tracing::info!(?action, "Submitting credentials");

    tokio::spawn(async move {
        let call = async {
            match action {
                AuthAction::SignIn => auth.sign_in(&email, &password).await,
                AuthAction::SignUp => auth.sign_up(&email, &password).await,
            }
        };
        let event = match catch_task_panic(call).await {
            Ok(result) => AppEvent::AuthCompleted { action, result },
            Err(error) => AppEvent::TaskPanicked {
                task: TASK_AUTH,
                error,
            },
        };
        if tx.send(event).await.is_err() {
            tracing::warn!("Failed to send auth result (receiver dropped)");
        }
    });
}

/// Save the selected ride as a favorite for the signed-in user.
///
/// The confirmation is shown immediately; a failed write is only logged.
pub(super) fn spawn_favorite_save(app: &mut App) {
    let Some(session) = app.session.clone() else {
        app.set_status(MSG_GUEST_SAVE);
        return;
    };
    let Some(ride_name) = app.selected_ride().map(|r| r.name.clone()) else {
        return;
    };

    let sink = Arc::clone(&app.favorites);
    app.set_status(format!("Saved {} to favorites!", ride_name));

    tokio::spawn(async move {
        match catch_task_panic(sink.save_favorite(&session, &ride_name)).await {
            Ok(Ok(())) => tracing::info!(ride = %ride_name, "Favorite saved"),
            Ok(Err(e)) => tracing::warn!(ride = %ride_name, error = %e, "Failed to save favorite"),
            Err(panic) => tracing::error!(error = %panic, "Favorite save task panicked"),
        }
    });
}
