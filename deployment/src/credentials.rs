use std::{collections::HashMap, fmt};

#[cfg(test)]
use mockall::automock;

use crate::Platform;

#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg_attr(test, automock)]
pub trait CredentialStore {
    fn active_token(&self, provider: &str) -> Option<String>;
}

pub struct InMemoryCredentialStore {
    tokens: HashMap<String, String>,
}

impl InMemoryCredentialStore {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        InMemoryCredentialStore { tokens }
    }

    pub fn empty() -> Self {
        InMemoryCredentialStore::new(HashMap::new())
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn active_token(&self, provider: &str) -> Option<String> {
        self.tokens
            .get(provider)
            .filter(|token| !token.trim().is_empty())
            .cloned()
    }
}

pub struct CredentialResolver {
    store: Box<dyn CredentialStore + Send + Sync>,
}

impl CredentialResolver {
    pub fn new(store: Box<dyn CredentialStore + Send + Sync>) -> Self {
        CredentialResolver { store }
    }

    pub fn has_token(&self, platform: Platform) -> bool {
        self.get_token(platform).is_some()
    }

    pub fn get_token(&self, platform: Platform) -> Option<Credential> {
        self.store
            .active_token(platform.credential_namespace())
            .map(Credential)
    }
}
