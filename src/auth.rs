//! Admin login and the session-scoped write capability.
//!
//! Reading the collection is public. Every write takes a [`Session`] and
//! fails with [`AuthError::Unauthorized`] unless that session holds a
//! [`WriteCapability`]. The only way to obtain one is a successful
//! [`Session::login`] against the configured shared secret; it lasts as long
//! as the session value does.

use constant_time_eq::constant_time_eq;
use miette::Diagnostic;
use thiserror::Error;

/// Errors from admin authentication.
#[derive(Debug, Error, Diagnostic)]
pub enum AuthError {
    #[error("wrong password")]
    #[diagnostic(
        code(ledger::auth::wrong_password),
        help("The password does not match the configured admin secret. The session stays read-only.")
    )]
    WrongPassword,

    #[error("no admin password is configured")]
    #[diagnostic(
        code(ledger::auth::no_secret),
        help(
            "Set `admin_password` in the config file or the LEDGER_ADMIN_PASS \
             environment variable to enable admin mode."
        )
    )]
    NoSecretConfigured,

    #[error("write access requires admin login")]
    #[diagnostic(
        code(ledger::auth::unauthorized),
        help("Pass the admin password with --password (or LEDGER_PASSWORD) to make changes.")
    )]
    Unauthorized,
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Holder of the shared admin secret.
#[derive(Clone, Default)]
pub struct AdminGate {
    secret: Option<String>,
}

impl AdminGate {
    /// Gate for the given secret. An empty secret counts as unconfigured.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    fn check(&self, password: &str) -> AuthResult<()> {
        let secret = self.secret.as_deref().ok_or(AuthError::NoSecretConfigured)?;
        if !password.is_empty() && constant_time_eq(password.as_bytes(), secret.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::WrongPassword)
        }
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}

/// Proof that the holder logged in as admin. Cannot be built outside this module.
#[derive(Debug, Clone)]
pub struct WriteCapability {
    _sealed: (),
}

/// One interaction's authentication state. Starts read-only.
#[derive(Debug, Clone, Default)]
pub struct Session {
    capability: Option<WriteCapability>,
}

impl Session {
    /// A read-only session.
    pub fn viewer() -> Self {
        Self::default()
    }

    /// Try to elevate this session to admin.
    ///
    /// Any failure drops a previously granted capability, so a wrong
    /// password always leaves the session read-only.
    pub fn login(&mut self, gate: &AdminGate, password: &str) -> AuthResult<()> {
        match gate.check(password) {
            Ok(()) => {
                self.capability = Some(WriteCapability { _sealed: () });
                tracing::info!("admin mode enabled");
                Ok(())
            }
            Err(e) => {
                self.capability = None;
                Err(e)
            }
        }
    }

    /// Drop write access.
    pub fn logout(&mut self) {
        self.capability = None;
    }

    pub fn can_edit(&self) -> bool {
        self.capability.is_some()
    }

    /// The write capability, or [`AuthError::Unauthorized`].
    pub fn authorize(&self) -> AuthResult<&WriteCapability> {
        self.capability.as_ref().ok_or(AuthError::Unauthorized)
    }
}
