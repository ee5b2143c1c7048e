//! Sign-in, registration and sessions.
//!
//! Identity checks happen behind the `IdentityProvider` trait. Screens
//! only consume the resulting `Session` and its `Role`.

use framework::prelude::*;
use roster::{RosterContextExt, TrainerId};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

mod provider;
mod registration;

pub use provider::{Account, IdentityProvider, LocalIdentityProvider};
pub use registration::RegistrationForm;

/// Who is using the application.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    Trainer,
    Admin,
}

impl Role {
    /// The other role. Used by the sign-in toggle.
    pub fn toggled(self) -> Self {
        match self {
            Self::Trainer => Self::Admin,
            Self::Admin => Self::Trainer,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Trainer => "Trainer",
            Self::Admin => "Admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The destinations the sign-in flow can send a user to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    ProfileEditor,
    Dashboard,
}

impl Route {
    /// Where a freshly signed-in user lands.
    pub fn landing_for(role: Role) -> Self {
        match role {
            Role::Trainer => Self::ProfileEditor,
            Role::Admin => Self::Dashboard,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A verified identity handed out by an `IdentityProvider`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    email: String,
    role: Role,
    trainer: Option<TrainerId>,
    token: Uuid,
}

impl Session {
    /// Issues a session with a fresh token. For `IdentityProvider` implementations.
    pub fn new(email: String, role: Role, trainer: Option<TrainerId>) -> Self {
        Self {
            email,
            role,
            trainer,
            token: Uuid::new_v4(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The roster record this session may edit, for trainers.
    pub fn trainer(&self) -> Option<TrainerId> {
        self.trainer
    }

    pub fn token(&self) -> Uuid {
        self.token
    }
}

/// The identity provider in use.
pub struct Accounts(Box<dyn IdentityProvider>);

impl Accounts {
    pub fn new(provider: impl IdentityProvider + 'static) -> Self {
        Self(Box::new(provider))
    }
}

/// The signed-in session, if any.
#[derive(Default)]
pub struct ActiveSession(Option<Session>);

impl_resource!(Accounts, ActiveSession);

/// Adds the account resources. An `Accounts` resource added before
/// this plugin is kept.
#[derive(Clone)]
pub struct AccountsPlugin;

impl Plugin for AccountsPlugin {
    fn build(self, context: &mut Context) -> Result<()> {
        if !context.has_resource::<Accounts>() {
            context.add_resource(Accounts::new(LocalIdentityProvider::new()));
        }
        context.add_resource(ActiveSession::default());
        Ok(())
    }
}

/// Session handling on `Context`.
pub trait AccountsContextExt {
    fn identity(&mut self) -> Result<&mut dyn IdentityProvider>;

    /// The current session, if someone is signed in.
    fn session(&self) -> Option<&Session>;

    /// Verifies `credentials` and makes the result the active session.
    fn sign_in(&mut self, credentials: &Credentials, role: Role) -> Result<Session>;

    /// Registers a trainer: adds a roster record and an account, then
    /// signs the new trainer in.
    fn register_trainer(&mut self, form: &RegistrationForm) -> Result<Session>;

    fn sign_out(&mut self);
}

impl AccountsContextExt for Context {
    fn identity(&mut self) -> Result<&mut dyn IdentityProvider> {
        match self.get_resource_mut::<Accounts>() {
            Some(accounts) => Ok(accounts.0.as_mut()),
            None => Err(Error::new("accounts plugin not added")),
        }
    }

    fn session(&self) -> Option<&Session> {
        self.get_resource::<ActiveSession>().and_then(|s| s.0.as_ref())
    }

    fn sign_in(&mut self, credentials: &Credentials, role: Role) -> Result<Session> {
        let session = match self.identity()?.authenticate(credentials, role) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(email = %credentials.email, %role, "sign-in refused");
                return Err(e);
            }
        };
        tracing::info!(email = session.email(), %role, "signed in");
        self.add_resource(ActiveSession(Some(session.clone())));
        Ok(session)
    }

    fn register_trainer(&mut self, form: &RegistrationForm) -> Result<Session> {
        form.validate()?;
        let credentials = form.credentials();
        if self.identity()?.is_enrolled(&credentials.email) {
            return Err(Error::Validation(format!(
                "an account for {} already exists",
                credentials.email
            )));
        }
        // a rostered trainer without an account still owns their email
        if let Some(existing) = self.trainers()?.find_by_email(&credentials.email)? {
            tracing::warn!(trainer = %existing.id, email = %credentials.email, "registration refused");
            return Err(Error::Validation(format!(
                "{} already belongs to a trainer on the roster",
                credentials.email
            )));
        }

        let record = self.trainers()?.insert_new(form.to_record()?)?;
        self.identity()?.enroll(Account::trainer(
            credentials.email.clone(),
            credentials.password.clone(),
            record.id,
        ))?;
        tracing::info!(trainer = %record.id, email = %credentials.email, "registered trainer");

        self.sign_in(&credentials, Role::Trainer)
    }

    fn sign_out(&mut self) {
        self.add_resource(ActiveSession::default());
    }
}
