use std::{
    env,
    fmt::{self, Debug, Formatter},
    time::Duration,
};

use bon::Builder;
use enumset::EnumSet;

use crate::{portal, prelude::*, reading::Category};

/// Opaque portal credentials, immutable for the client's lifetime.
#[derive(Clone)]
pub enum Credentials {
    /// Login form credentials.
    Form { username: String, password: String },

    /// Pre-captured session cookie pair, for deployments where the login form
    /// sits behind a bot wall and the session is opened in a real browser.
    Cookies { energize_id: String, session_id: String },
}

impl Credentials {
    pub fn form(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Form { username: username.into(), password: password.into() }
    }

    pub fn cookies(energize_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self::Cookies { energize_id: energize_id.into(), session_id: session_id.into() }
    }

    /// Reads `PSEG_USERNAME` and `PSEG_PASSWORD`, loading `.env` first.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let username = env::var("PSEG_USERNAME").context("`PSEG_USERNAME` is not set")?;
        let password = env::var("PSEG_PASSWORD").context("`PSEG_PASSWORD` is not set")?;
        Ok(Self::Form { username, password })
    }
}

/// Secrets stay out of the logs.
impl Debug for Credentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Form { username, .. } => formatter
                .debug_struct("Form")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Cookies { .. } => formatter
                .debug_struct("Cookies")
                .field("energize_id", &"<redacted>")
                .field("session_id", &"<redacted>")
                .finish(),
        }
    }
}

/// Client configuration; the defaults match the New Jersey portal.
#[derive(Builder, Clone, Debug)]
#[must_use]
pub struct Config {
    /// Portal base URL.
    #[builder(into, default = portal::DEFAULT_BASE_URL.to_owned())]
    pub base_url: String,

    /// Categories to track.
    #[builder(default = EnumSet::all())]
    pub categories: EnumSet<Category>,

    /// Fixed per-request timeout.
    #[builder(default = Duration::from_secs(30))]
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}
