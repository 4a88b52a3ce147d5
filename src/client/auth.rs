pub enum Auth {
    /// Use a personal access token via a Bearer Authorization header
    Bearer(String),
    /// Don't use any authentication
    None,
}

impl Auth {
    /// Bearer auth from an access token, or `None` when the token is blank.
    pub fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.trim().is_empty() => Self::Bearer(token),
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => write!(f, "Bearer"),
            Self::None => write!(f, "None"),
        }
    }
}
