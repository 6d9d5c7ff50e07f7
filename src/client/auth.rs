use clap::ValueEnum;

#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    /// Send an API key with every request
    Apikey(String),
    /// Log in once with a username and password and reuse the session cookie
    Login(String, String),
    /// Don't use any authentication
    None,
}

impl Auth {
    pub fn new(
        r#type: &AuthType,
        username: Option<String>,
        password: Option<String>,
        apikey: Option<String>,
    ) -> Self {
        match (r#type, username, password, apikey) {
            (AuthType::Apikey, _, _, Some(apikey)) => Self::Apikey(apikey),
            (AuthType::Login, Some(username), Some(password), _) => Self::Login(username, password),
            (AuthType::None, _, _, _) | _ => Self::None,
        }
    }

    /// Pick the strongest method the supplied credentials allow.
    ///
    /// A username and password pair wins over an API key.
    pub fn detect(
        username: Option<String>,
        password: Option<String>,
        apikey: Option<String>,
    ) -> Self {
        let r#type = match (&username, &password, &apikey) {
            (Some(_), Some(_), _) => AuthType::Login,
            (_, _, Some(_)) => AuthType::Apikey,
            _ => AuthType::None,
        };
        Self::new(&r#type, username, password, apikey)
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Apikey(_) => write!(f, "Apikey"),
            Self::Login(username, _) => write!(f, "Login ({})", username),
            Self::None => write!(f, "None"),
        }
    }
}

// Credentials never show up in debug output
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum AuthType {
    Apikey,
    Login,
    None,
}
