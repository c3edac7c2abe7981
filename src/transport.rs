//! Session transports: how the client talks to the portal.

use std::time::Duration;

use http::StatusCode;
use ureq::Agent;

use crate::{config::Credentials, error::CredentialsRejected, portal, prelude::*};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";
const ACCEPT: &str = "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8";

/// Transport strategy behind [`crate::PortalClient`]: at most one live
/// session, strictly sequential requests. Browser-automation transports plug
/// in here as well; this crate ships the plain-HTTP one.
pub trait Transport {
    /// Opens a session and authenticates it against the portal.
    ///
    /// Credential rejections must carry [`CredentialsRejected`] in the error
    /// chain; any other login failure is treated as a connectivity problem.
    fn login(&mut self, credentials: &Credentials) -> Result;

    /// Fetches a page body over the live session.
    fn get(&mut self, url: &str) -> Result<String>;

    /// Navigates to the logout endpoint.
    fn logout(&mut self) -> Result;

    /// Releases the session resource; idempotent, never fails.
    fn quit(&mut self);
}

/// Plain-HTTP transport: a blocking [`ureq::Agent`] with a cookie jar and
/// browser-like headers. The agent (and its connection pool) is the session
/// resource; dropping it releases everything.
pub struct UreqTransport {
    base_url: String,
    timeout: Duration,
    session: Option<Session>,
}

struct Session {
    agent: Agent,

    /// Explicit `Cookie` header for pre-captured session cookies.
    cookie_header: Option<String>,
}

impl UreqTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self { base_url: base_url.into(), timeout, session: None }
    }

    fn open_session(&mut self, cookie_header: Option<String>) -> &mut Session {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .user_agent(USER_AGENT)
            .build()
            .into();
        self.session.insert(Session { agent, cookie_header })
    }

    fn session(&mut self) -> Result<&mut Session> {
        self.session.as_mut().context("no live session, call `login` first")
    }

    fn get_body(session: &mut Session, url: &str) -> Result<String> {
        let mut request = session.agent.get(url).header("Accept", ACCEPT);
        if let Some(cookie) = &session.cookie_header {
            request = request.header("Cookie", cookie);
        }
        let mut response =
            request.call().with_context(|| format!("failed to fetch `{url}`"))?;
        response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("failed to read the response from `{url}`"))
    }
}

impl Transport for UreqTransport {
    #[instrument(skip_all)]
    fn login(&mut self, credentials: &Credentials) -> Result {
        // A leftover session never survives a new login.
        self.quit();
        let base_url = self.base_url.clone();
        match credentials {
            Credentials::Form { username, password } => {
                let login_url = portal::login_url(&base_url);
                let session = self.open_session(None);
                // Prime the session cookies before posting the form.
                let _ = Self::get_body(session, &login_url)
                    .context("failed to open the login page")?;
                let mut response = session
                    .agent
                    .post(&login_url)
                    .header("Accept", ACCEPT)
                    .header("Referer", &login_url)
                    .send_form([
                        (portal::USERNAME_FIELD, username.as_str()),
                        (portal::PASSWORD_FIELD, password.as_str()),
                    ])
                    .map_err(|error| match error {
                        ureq::Error::StatusCode(code)
                            if StatusCode::from_u16(code).is_ok_and(|status| {
                                status == StatusCode::UNAUTHORIZED
                                    || status == StatusCode::FORBIDDEN
                            }) =>
                        {
                            Error::new(CredentialsRejected)
                                .context(format!("the login call returned HTTP {code}"))
                        }
                        ureq::Error::StatusCode(code) => {
                            anyhow!("the login call failed (HTTP {code})")
                        }
                        error => anyhow!(error).context("the login call failed"),
                    })?;
                let body = response
                    .body_mut()
                    .read_to_string()
                    .context("failed to read the login response")?;
                if body.contains(portal::LOGIN_ERROR_MARKER) {
                    return Err(Error::new(CredentialsRejected)
                        .context("the login page shows an error banner"));
                }
                if !body.contains(portal::LOGGED_IN_MARKER) {
                    return Err(Error::new(CredentialsRejected)
                        .context("no logged-in marker on the post-login page"));
                }
            }
            Credentials::Cookies { energize_id, session_id } => {
                let cookie_header = format!(
                    "{}={energize_id}; {}={session_id}",
                    portal::ENERGIZE_ID_COOKIE,
                    portal::SESSION_ID_COOKIE,
                );
                let session = self.open_session(Some(cookie_header));
                let body = Self::get_body(session, &portal::dashboard_url(&base_url))
                    .context("failed to open the dashboard with the session cookies")?;
                if !body.contains(portal::LOGGED_IN_MARKER) {
                    return Err(Error::new(CredentialsRejected)
                        .context("the portal did not accept the session cookies"));
                }
            }
        }
        info!("session established");
        Ok(())
    }

    #[instrument(skip_all, fields(url = url))]
    fn get(&mut self, url: &str) -> Result<String> {
        let session = self.session()?;
        Self::get_body(session, url)
    }

    #[instrument(skip_all)]
    fn logout(&mut self) -> Result {
        let logout_url = portal::logout_url(&self.base_url);
        let session = self.session()?;
        let _ = Self::get_body(session, &logout_url)?;
        Ok(())
    }

    fn quit(&mut self) {
        if self.session.take().is_some() {
            debug!("session released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_without_session_is_a_no_op() {
        let mut transport = UreqTransport::new(portal::DEFAULT_BASE_URL, Duration::from_secs(1));
        transport.quit();
        transport.quit();
        assert!(transport.session.is_none());
    }

    #[test]
    fn test_get_without_session_fails() {
        let mut transport = UreqTransport::new(portal::DEFAULT_BASE_URL, Duration::from_secs(1));
        assert!(transport.get("https://example.com").is_err());
    }
}
