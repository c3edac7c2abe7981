/// Client error, wrapping the underlying cause chain.
///
/// Field-level extraction misses are not errors: they degrade the affected
/// field to absent and the fetch carries on.
#[derive(Debug, derive_more::Display)]
#[must_use]
pub enum Error {
    /// The portal rejected the credentials (or the pre-captured cookie pair).
    #[display("authentication failed: {_0:#}")]
    Auth(anyhow::Error),

    /// Connectivity problem, or something went wrong while retrieving data
    /// over a live session.
    #[display("data retrieval failed: {_0:#}")]
    Fetch(anyhow::Error),
}

/// Marks a login failure caused by the credentials themselves.
///
/// A [`crate::Transport`] puts this into the error chain of a rejected login;
/// any login failure without it is treated as a connectivity problem, so a
/// credential-capture flow can tell "wrong password" from "portal down".
#[derive(Debug, derive_more::Display)]
#[display("the portal rejected the credentials")]
pub struct CredentialsRejected;

impl std::error::Error for CredentialsRejected {}

impl Error {
    pub fn auth(cause: impl Into<anyhow::Error>) -> Self {
        Self::Auth(cause.into())
    }

    pub fn fetch(cause: impl Into<anyhow::Error>) -> Self {
        Self::Fetch(cause.into())
    }

    /// `true` for a login rejection, as opposed to a connectivity problem.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Auth(cause) | Self::Fetch(cause) => {
                Some(AsRef::<dyn std::error::Error + 'static>::as_ref(cause))
            }
        }
    }
}
