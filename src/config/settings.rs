//! Admin instance settings, read from the environment (`.env` supported via dotenvy).

use crate::case::to_snake_case;
use crate::error::ConfigError;
use std::path::PathBuf;
use std::sync::Arc;

/// Maps struct/field names to table/column names.
pub type NameTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Transform selected by `ADMIN_NAME_TRANSFORM`.
pub fn name_transform_by_name(name: &str) -> Result<Option<NameTransform>, ConfigError> {
    match name.to_lowercase().as_str() {
        "" | "none" | "identity" => Ok(None),
        "snake_case" | "snake" => Ok(Some(Arc::new(to_snake_case))),
        other => Err(ConfigError::Settings(format!(
            "unknown name transform: {} (expected none or snake_case)",
            other
        ))),
    }
}

#[derive(Clone)]
pub struct AdminSettings {
    /// URL prefix the admin router is nested under, without trailing slash (e.g. "/admin").
    pub path: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub database_url: String,
    pub static_dir: PathBuf,
    pub name_transform: Option<NameTransform>,
}

impl std::fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSettings")
            .field("path", &self.path)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("database_url", &self.database_url)
            .field("static_dir", &self.static_dir)
            .field("name_transform", &self.name_transform.is_some())
            .finish()
    }
}

impl AdminSettings {
    /// Settings with defaults for everything but the credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, ConfigError> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(ConfigError::Settings("username and/or password is missing".into()));
        }
        Ok(AdminSettings {
            path: "/admin".into(),
            title: "Admin".into(),
            username,
            password,
            database_url: "sqlite://admin.db".into(),
            static_dir: PathBuf::from("static"),
            name_transform: None,
        })
    }

    /// ADMIN_PATH, ADMIN_TITLE, ADMIN_USERNAME, ADMIN_PASSWORD, DATABASE_URL, ADMIN_STATIC_DIR, ADMIN_NAME_TRANSFORM.
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
        let mut settings = AdminSettings::new(
            var("ADMIN_USERNAME").unwrap_or_default(),
            var("ADMIN_PASSWORD").unwrap_or_default(),
        )?;
        if let Some(path) = var("ADMIN_PATH") {
            settings = settings.with_path(&path);
        }
        if let Some(title) = var("ADMIN_TITLE") {
            settings.title = title;
        }
        if let Some(url) = var("DATABASE_URL") {
            settings.database_url = url;
        }
        if let Some(dir) = var("ADMIN_STATIC_DIR") {
            settings.static_dir = PathBuf::from(dir);
        }
        if let Some(name) = var("ADMIN_NAME_TRANSFORM") {
            settings.name_transform = name_transform_by_name(&name)?;
        }
        Ok(settings)
    }

    /// Load `.env` from the working directory (if present), then read the environment.
    pub fn from_dotenv() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::Settings(format!(".env: {}", e))),
        }
        Self::from_env()
    }

    /// Normalises to a leading slash and no trailing slash.
    pub fn with_path(mut self, path: &str) -> Self {
        let trimmed = path.trim().trim_end_matches('/');
        self.path = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        self
    }

    /// Admin URL for a path below the mount point, e.g. `url("/model/person/")`.
    pub fn url(&self, rest: &str) -> String {
        let prefix = if self.path == "/" { "" } else { self.path.as_str() };
        format!("{}{}", prefix, rest)
    }

    /// Where logins land and anonymous requests are sent.
    pub fn index_url(&self) -> String {
        self.url("/")
    }

}
