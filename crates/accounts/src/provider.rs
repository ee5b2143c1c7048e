use crate::{Credentials, Role, Session};
use framework::{Error, Result};
use roster::TrainerId;
use subtle::ConstantTimeEq;

/// The boundary to whatever verifies identities. The UI only ever
/// sees the `Session` a provider hands back.
pub trait IdentityProvider {
    /// Checks `credentials` for an account holding `role`.
    fn authenticate(&self, credentials: &Credentials, role: Role) -> Result<Session>;

    /// Creates a new account. Fails if the email is taken.
    fn enroll(&mut self, account: Account) -> Result<()>;

    fn is_enrolled(&self, email: &str) -> bool;
}

/// A known identity.
#[derive(Clone, Debug)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub role: Role,
    /// The roster record a trainer account edits.
    pub trainer: Option<TrainerId>,
}

impl Account {
    pub fn admin(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role: Role::Admin,
            trainer: None,
        }
    }

    pub fn trainer(email: impl Into<String>, password: impl Into<String>, trainer: TrainerId) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role: Role::Trainer,
            trainer: Some(trainer),
        }
    }
}

/// Holds accounts in process memory. Stands in for an external
/// identity service.
#[derive(Default)]
pub struct LocalIdentityProvider {
    accounts: Vec<Account>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: Account) -> Result<Self> {
        self.enroll(account)?;
        Ok(self)
    }

    fn find(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email.trim()))
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn authenticate(&self, credentials: &Credentials, role: Role) -> Result<Session> {
        let refused = || Error::Auth("invalid email or password".into());

        let account = self.find(&credentials.email).ok_or_else(refused)?;
        let matches: bool = account
            .password
            .as_bytes()
            .ct_eq(credentials.password.as_bytes())
            .into();
        if !matches {
            return Err(refused());
        }
        if account.role != role {
            return Err(Error::Auth(format!("account is not registered as {role}")));
        }

        Ok(Session::new(account.email.clone(), account.role, account.trainer))
    }

    fn enroll(&mut self, account: Account) -> Result<()> {
        if self.is_enrolled(&account.email) {
            return Err(Error::Validation(format!(
                "an account for {} already exists",
                account.email
            )));
        }
        self.accounts.push(account);
        Ok(())
    }

    fn is_enrolled(&self, email: &str) -> bool {
        self.find(email).is_some()
    }
}
