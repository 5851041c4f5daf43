/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! Logon credentials.

use std::fmt;

/// Username and password sent in the Logon message.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates new credentials.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the username (tag 553).
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password (tag 554).
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// Optional source of logon credentials.
///
/// Queried once per logon. Returning `None` sends the Logon without
/// Username and Password.
pub trait CredentialProvider: Send + Sync {
    /// Returns the credentials to attach, if any.
    fn credentials(&self) -> Option<Credentials>;
}

impl CredentialProvider for Credentials {
    fn credentials(&self) -> Option<Credentials> {
        Some(self.clone())
    }
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Option<Credentials> + Send + Sync,
{
    fn credentials(&self) -> Option<Credentials> {
        self()
    }
}
