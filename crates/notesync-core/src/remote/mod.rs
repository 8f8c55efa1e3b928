//! Remote document store access.

mod firestore;

use std::fmt;

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub use firestore::FirestoreNoteNetwork;

pub const FIRESTORE_PROJECT_ENV: &str = "NOTESYNC_FIRESTORE_PROJECT";
pub const USER_ID_ENV: &str = "NOTESYNC_USER_ID";
pub const FIRESTORE_TOKEN_ENV: &str = "NOTESYNC_FIRESTORE_TOKEN";
pub const FIRESTORE_URL_ENV: &str = "NOTESYNC_FIRESTORE_URL";

const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

/// Connection settings for the hosted document store.
#[derive(Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    pub project_id: String,
    /// Namespace for this user's `notes` and `deletes` collections
    pub user_id: String,
    /// Bearer token; emulators accept unauthenticated requests
    pub token: Option<String>,
    pub base_url: String,
}

impl fmt::Debug for FirestoreConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FirestoreConfig")
            .field("project_id", &self.project_id)
            .field("user_id", &self.user_id)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            user_id: user_id.into(),
            token: None,
            base_url: DEFAULT_FIRESTORE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Read settings from the process environment.
    ///
    /// Returns `Ok(None)` when project or user is unset, meaning "run offline".
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let project = normalize_text_option(lookup(FIRESTORE_PROJECT_ENV));
        let user = normalize_text_option(lookup(USER_ID_ENV));
        let (Some(project), Some(user)) = (project, user) else {
            return Ok(None);
        };

        let mut config = Self::new(project, user);
        config.token = normalize_text_option(lookup(FIRESTORE_TOKEN_ENV));
        if let Some(url) = normalize_text_option(lookup(FIRESTORE_URL_ENV)) {
            if !is_http_url(&url) {
                return Err(Error::InvalidInput(format!(
                    "{FIRESTORE_URL_ENV} must start with http:// or https://"
                )));
            }
            config.base_url = url.trim_end_matches('/').to_string();
        }
        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_project_or_user_means_offline() {
        assert_eq!(FirestoreConfig::from_lookup(lookup(&[])).unwrap(), None);
        assert_eq!(
            FirestoreConfig::from_lookup(lookup(&[(FIRESTORE_PROJECT_ENV, "demo")])).unwrap(),
            None
        );
        assert_eq!(
            FirestoreConfig::from_lookup(lookup(&[
                (FIRESTORE_PROJECT_ENV, "demo"),
                (USER_ID_ENV, "   ")
            ]))
            .unwrap(),
            None
        );
    }

    #[test]
    fn values_are_trimmed_and_url_normalized() {
        let config = FirestoreConfig::from_lookup(lookup(&[
            (FIRESTORE_PROJECT_ENV, " demo "),
            (USER_ID_ENV, "user-1"),
            (FIRESTORE_TOKEN_ENV, ""),
            (FIRESTORE_URL_ENV, "http://localhost:8080/"),
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(config.project_id, "demo");
        assert_eq!(config.token, None);
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn non_http_url_is_rejected() {
        let result = FirestoreConfig::from_lookup(lookup(&[
            (FIRESTORE_PROJECT_ENV, "demo"),
            (USER_ID_ENV, "user-1"),
            (FIRESTORE_URL_ENV, "localhost:8080"),
        ]));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn debug_redacts_token() {
        let config = FirestoreConfig::new("demo", "user").with_token("secret-token");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
