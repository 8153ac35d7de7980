use std::fmt;

use serde::Serialize;

/// Service Layer login credentials. Immutable once the client is built.
#[derive(Clone)]
pub struct Credentials {
    company_db: String,
    user_name: String,
    password: String,
}

/// Body of `POST Login`. Property names are the Service Layer's own.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    #[serde(rename = "CompanyDB")]
    company_db: &'a str,
    #[serde(rename = "UserName")]
    user_name: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
}

impl Credentials {
    pub fn new(
        company_db: impl Into<String>,
        user_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            company_db: company_db.into(),
            user_name: user_name.into(),
            password: password.into(),
        }
    }

    pub fn company_db(&self) -> &str {
        &self.company_db
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub(crate) fn login_request(&self) -> LoginRequest<'_> {
        LoginRequest {
            company_db: &self.company_db,
            user_name: &self.user_name,
            password: &self.password,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("company_db", &self.company_db)
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}
