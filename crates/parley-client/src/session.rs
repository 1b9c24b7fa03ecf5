/// Login state for one client. Created empty, populated on login or
/// registration, emptied on logout.
///
/// The username and token live together in one `Option`, so a reader can
/// never observe an authenticated flag without both values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current: Option<Authenticated>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Authenticated {
    username: String,
    token: String,
}

/// Point-in-time copy of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub username: String,
    pub is_authenticated: bool,
    pub token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous login.
    pub fn apply_login_result(&mut self, username: impl Into<String>, token: impl Into<String>) {
        self.current = Some(Authenticated {
            username: username.into(),
            token: token.into(),
        });
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.username.as_str())
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.token.as_str())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match &self.current {
            Some(auth) => SessionSnapshot {
                username: auth.username.clone(),
                is_authenticated: true,
                token: Some(auth.token.clone()),
            },
            None => SessionSnapshot::default(),
        }
    }
}
