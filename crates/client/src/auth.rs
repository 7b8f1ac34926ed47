//! Cookie-based admin session.
//!
//! The identity provider owns login; this side only reads the profile,
//! keeps the session alive with periodic refresh calls, and logs out.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::ConfigError;
use crate::error::ClientError;
use crate::http::ApiClient;

const PROFILE_PATH: &str = "/api/auth/profile";
const REFRESH_PATH: &str = "/api/auth/refresh-token";
const LOGOUT_PATH: &str = "/api/auth/logout";
const LOGIN_PATH: &str = "/api/auth/login?redirectTo=admin";

/// Role granted to users the backend flags as admins.
pub const ADMIN_ROLE: &str = "admin";

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// User record as returned by `GET /api/auth/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendUser {
    pub google_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub role: Option<String>,
    pub display_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub email: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

impl From<BackendUser> for User {
    fn from(user: BackendUser) -> Self {
        Self {
            id: user.google_id,
            role: user.is_admin.then(|| ADMIN_ROLE.to_string()),
            display_name: user.name,
            photo_url: user.picture,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    /// No profile check has completed yet.
    Configuring,
    Authenticated(User),
    Unauthenticated,
}

// ---------------------------------------------------------------------------
// AuthSession
// ---------------------------------------------------------------------------

pub struct AuthSession {
    api: ApiClient,
    refresh_interval: Duration,
    status: watch::Sender<AuthStatus>,
}

impl AuthSession {
    /// A zero `refresh_interval` is rejected.
    pub fn new(api: ApiClient, refresh_interval: Duration) -> Result<Self, ConfigError> {
        if refresh_interval.is_zero() {
            return Err(ConfigError {
                var: "TOKEN_REFRESH_INTERVAL_SECS",
                value: format!("{refresh_interval:?}"),
                expected: "a non-zero duration",
            });
        }
        let (status, _) = watch::channel(AuthStatus::Configuring);
        Ok(Self {
            api,
            refresh_interval,
            status,
        })
    }

    /// Watch status changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        match &*self.status.borrow() {
            AuthStatus::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.status.borrow(), AuthStatus::Authenticated(_))
    }

    /// Where to send a browser to start the provider login.
    pub fn login_url(&self) -> String {
        self.api.url(LOGIN_PATH)
    }

    /// Restore a session from the cookie jar. Any failure, including a
    /// malformed profile, leaves the session unauthenticated.
    pub async fn attempt_auto_login(&self) -> Option<User> {
        match self.api.get_json::<BackendUser>(PROFILE_PATH, &[]).await {
            Ok(profile) => {
                let user = User::from(profile);
                tracing::info!(user_id = %user.id, admin = user.is_admin(), "Session restored");
                self.status.send_replace(AuthStatus::Authenticated(user.clone()));
                Some(user)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Auto login failed");
                self.status.send_replace(AuthStatus::Unauthenticated);
                None
            }
        }
    }

    /// Log out on the backend. The local session ends even when the call
    /// fails.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let result = self.api.post_empty(LOGOUT_PATH).await;
        self.status.send_replace(AuthStatus::Unauthenticated);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Logout request failed");
        }
        result
    }

    pub async fn refresh_token(&self) -> Result<(), ClientError> {
        self.api.post_empty(REFRESH_PATH).await
    }

    /// Refresh the session every interval while authenticated.
    ///
    /// A failed refresh signs the user out and ends the loop; there is no
    /// retry. The loop also exits when `cancel` fires.
    pub async fn run_refresh_loop(&self, cancel: CancellationToken) {
        let mut interval = interval_at(Instant::now() + self.refresh_interval, self.refresh_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Session refresh cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if !self.is_authenticated() {
                        continue;
                    }
                    if let Err(e) = self.refresh_token().await {
                        tracing::warn!(error = %e, "Session refresh failed, signing out");
                        // The loop ends whether or not the logout call succeeds.
                        if let Err(e) = self.sign_out().await {
                            tracing::debug!(error = %e, "Forced sign-out could not reach the backend");
                        }
                        break;
                    }
                    tracing::debug!("Session refreshed");
                }
            }
        }
    }
}
