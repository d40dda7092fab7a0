use std::fmt;

use crate::Error;

/// The credentials of a Search Ad API account.
///
/// All three values are issued by the provider, the `secret_key` is the
/// shared secret used as the HMAC key and is never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    customer_id: String,
    secret_key: String,
}

impl Credentials {
    /// # Errors
    ///
    /// A configuration [`Error`] when any of the values is empty.
    pub fn new(
        api_key: impl Into<String>,
        customer_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, Error> {
        let credentials = Self {
            api_key: api_key.into(),
            customer_id: customer_id.into(),
            secret_key: secret_key.into(),
        };

        for (name, value) in [
            ("api key", &credentials.api_key),
            ("customer id", &credentials.customer_id),
            ("secret key", &credentials.secret_key),
        ] {
            if value.trim().is_empty() {
                return Err(Error::configuration(format!("{name} is empty")));
            }
        }

        Ok(credentials)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub(crate) fn secret_key(&self) -> &[u8] {
        self.secret_key.as_bytes()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("customer_id", &self.customer_id)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
