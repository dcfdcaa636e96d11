use std::fmt;

/// Marker persisted in place of known-bad credentials
pub const INVALID_TOKEN: &str = "INVALID";

/// Marketplace credentials issued by a login or a token refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub cookie: String,
}

/// State of a user's stored credentials
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CredentialState {
    /// Never logged in
    #[default]
    Absent,
    /// Rejected by the marketplace; an operator must force a new login
    Invalid,
    Valid(Credentials),
}

impl CredentialState {
    /// Decode the stored column values.
    ///
    /// An empty or missing access token means the user never logged in, the
    /// `INVALID` marker means the credentials were revoked.
    pub fn from_columns(
        access_token: Option<String>,
        refresh_token: Option<String>,
        user_id: Option<String>,
        cookie: Option<String>,
    ) -> Self {
        match access_token.filter(|t| !t.is_empty()) {
            None => Self::Absent,
            Some(token) if token == INVALID_TOKEN => Self::Invalid,
            Some(access_token) => Self::Valid(Credentials {
                access_token,
                refresh_token: refresh_token.unwrap_or_default(),
                user_id: user_id.unwrap_or_default(),
                cookie: cookie.unwrap_or_default(),
            }),
        }
    }

    /// Values for the (access_token, refresh_token, cookie) columns
    pub fn to_columns(&self) -> (Option<&str>, Option<&str>, Option<&str>) {
        match self {
            Self::Absent => (None, None, None),
            Self::Invalid => (Some(INVALID_TOKEN), Some(INVALID_TOKEN), Some(INVALID_TOKEN)),
            Self::Valid(c) => (
                Some(c.access_token.as_str()),
                Some(c.refresh_token.as_str()),
                Some(c.cookie.as_str()),
            ),
        }
    }
}

/// A registered user whose favorites are watched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub email: String,
    /// Marketplace user id, known once the user has logged in
    pub user_id: Option<String>,
    pub credentials: CredentialState,
    pub telegram_chat_id: Option<String>,
}

impl User {
    #[cfg(test)]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            user_id: None,
            credentials: CredentialState::Absent,
            telegram_chat_id: None,
        }
    }

    #[cfg(test)]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.user_id = Some(credentials.user_id.clone());
        self.credentials = CredentialState::Valid(credentials);
        self
    }

    #[cfg(test)]
    pub fn with_invalid_credentials(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.credentials = CredentialState::Invalid;
        self
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)
    }
}
