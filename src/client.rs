//! The portal client: login, the fetch fallback chain, lazy getters.

use std::time::Duration;

use enumset::EnumSet;

use crate::{
    config::{Config, Credentials},
    error::{CredentialsRejected, Error},
    extract, normalize, portal,
    prelude::*,
    reading::{Category, Readings},
    transport::{Transport, UreqTransport},
};

/// Matches the portal's own data refresh cadence; polling faster only burns
/// sessions.
pub const SUGGESTED_REFRESH_INTERVAL: Duration = Duration::from_secs(3600);

/// Sequential, blocking client for the PSE&G My Account portal.
///
/// At most one live session; every fetch releases the session before
/// returning, so the host's scheduler can call [`PortalClient::fetch_data`]
/// on an interval without managing portal state. The client provides no
/// internal locking; calls must not overlap.
pub struct PortalClient<T = UreqTransport> {
    transport: T,
    credentials: Credentials,
    base_url: String,
    categories: EnumSet<Category>,
    readings: Readings,
    logged_in: bool,
}

impl PortalClient {
    pub fn new(credentials: Credentials, config: Config) -> Self {
        let transport = UreqTransport::new(config.base_url.clone(), config.timeout);
        Self::with_transport(transport, credentials, config)
    }
}

impl<T: Transport> PortalClient<T> {
    /// Wires an alternative transport strategy to the same contract.
    pub fn with_transport(transport: T, credentials: Credentials, config: Config) -> Self {
        Self {
            transport,
            credentials,
            base_url: config.base_url,
            categories: config.categories,
            readings: Readings::default(),
            logged_in: false,
        }
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Last known readings; updated by the fetch operations only.
    #[must_use]
    pub const fn readings(&self) -> &Readings {
        &self.readings
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Opens and authenticates a session.
    ///
    /// [`Error::Auth`] when the portal rejected the credentials,
    /// [`Error::Fetch`] when it could not be reached at all.
    #[instrument(skip_all)]
    pub fn login(&mut self) -> Result<(), Error> {
        info!("logging in…");
        match self.transport.login(&self.credentials) {
            Ok(()) => {
                self.logged_in = true;
                Ok(())
            }
            Err(cause) => {
                // A partially opened session never survives a failed login.
                self.quit();
                if cause.is::<CredentialsRejected>() {
                    Err(Error::Auth(cause))
                } else {
                    Err(Error::Fetch(cause))
                }
            }
        }
    }

    /// Fetches usage, cost, and next-meter-reading date for every tracked
    /// category, then releases the session whatever happened.
    ///
    /// The fallback chain: the aggregate dashboard first, then the dedicated
    /// category page for whatever fields the dashboard did not supply — the
    /// page only fills the gaps, it never overrides a dashboard value.
    /// Field-level extraction misses degrade the field to absent; only
    /// transport failures fail the fetch.
    #[instrument(skip_all)]
    pub fn fetch_data(&mut self) -> Result<Readings, Error> {
        if !self.logged_in {
            self.login()?;
        }
        let outcome = self.fetch_cycle();
        self.logout();
        match outcome {
            Ok(cycle) => {
                self.readings.absorb(cycle);
                Ok(self.readings.clone())
            }
            Err(cause) => Err(Error::Fetch(cause)),
        }
    }

    fn fetch_cycle(&mut self) -> Result<Readings> {
        let mut cycle = Readings::default();
        let dashboard = self.transport.get(&portal::dashboard_url(&self.base_url))?;
        for category in self.categories {
            extract::fill_reading(
                cycle.get_mut(category),
                &dashboard,
                &portal::dashboard_locators(category),
            );
        }
        for category in self.categories {
            if cycle.get(category).is_complete() {
                continue;
            }
            debug!(%category, "dashboard left gaps, trying the category page");
            let body = self.transport.get(&portal::category_url(&self.base_url, category))?;
            extract::fill_reading(cycle.get_mut(category), &body, &portal::category_locators());
        }
        info!(n_values = cycle.to_state_map().len(), "fetched");
        Ok(cycle)
    }

    /// Usage for the category, lazily fetching when unknown. Absent on a
    /// failed fetch or unparseable text, never an error.
    pub fn get_usage(&mut self, category: Category) -> Option<f64> {
        if self.readings.get(category).usage.is_none() {
            self.lazy_fetch();
        }
        self.readings.get(category).usage.as_deref().and_then(normalize::decimal)
    }

    /// Cost for the category, lazily fetching when unknown.
    pub fn get_cost(&mut self, category: Category) -> Option<f64> {
        if self.readings.get(category).cost.is_none() {
            self.lazy_fetch();
        }
        self.readings.get(category).cost.as_deref().and_then(normalize::decimal)
    }

    /// Next-meter-reading date for the category, lazily fetching when
    /// unknown.
    pub fn get_reading_date(&mut self, category: Category) -> Option<String> {
        if self.readings.get(category).reading_date.is_none() {
            self.lazy_fetch();
        }
        self.readings.get(category).reading_date.clone()
    }

    fn lazy_fetch(&mut self) {
        if let Err(error) = self.fetch_data() {
            warn!("background fetch failed: {error:#}");
        }
    }

    /// Best-effort logout: errors are logged and swallowed, the session
    /// resource is always released.
    #[instrument(skip_all)]
    pub fn logout(&mut self) {
        if self.logged_in
            && let Err(error) = self.transport.logout()
        {
            warn!("logout failed: {error:#}");
        }
        self.quit();
    }

    /// Releases the session resource; idempotent.
    pub fn quit(&mut self) {
        self.transport.quit();
        self.logged_in = false;
    }

    /// One login-and-release round trip, for a credential-capture flow to
    /// test credentials without fetching anything. [`Error::is_auth`]
    /// separates a rejection from a connectivity problem.
    #[instrument(skip_all)]
    pub fn validate(&mut self) -> Result<(), Error> {
        self.login()?;
        self.logout();
        Ok(())
    }
}
