//! Repository factory for dependency injection.
//!
//! This module provides utilities for creating and configuring repository instances
//! based on runtime configuration.

use std::str::FromStr;
use std::sync::Arc;

#[cfg(feature = "local-repo")]
use super::repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
use super::repositories::{PostgresConfig, PostgresRepository};
use super::repository::{RepositoryError, RepositoryResult, TodoRepository};
use crate::config::Settings;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    /// Parse repository type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("postgres", "pg", "local")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Backend used when nothing is configured: Postgres when it is compiled
    /// in, otherwise the in-memory store.
    pub fn compiled_default() -> Self {
        if cfg!(feature = "postgres-repo") {
            Self::Postgres
        } else {
            Self::Local
        }
    }

    /// Resolve the repository type from settings (`REPOSITORY_TYPE`).
    ///
    /// Unknown values are an error rather than a silent fallback.
    pub fn from_settings(settings: &Settings) -> Result<Self, String> {
        match &settings.repository_type {
            Some(raw) => raw.parse(),
            None => Ok(Self::compiled_default()),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```ignore
/// use todo_backend::db::{RepositoryFactory, RepositoryType};
/// use todo_backend::Settings;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = Settings::from_env()?;
///     let repo = RepositoryFactory::from_settings(&settings).await?;
///     let local = RepositoryFactory::create_local();
///     Ok(())
/// }
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn TodoRepository>)` - Shared repository instance
    /// * `Err(RepositoryError)` - If creation fails
    pub async fn create(
        repo_type: RepositoryType,
        settings: &Settings,
    ) -> RepositoryResult<Arc<dyn TodoRepository>> {
        match repo_type {
            RepositoryType::Postgres => {
                #[cfg(feature = "postgres-repo")]
                {
                    let config = PostgresConfig::from_settings(settings);
                    let pg = Self::create_postgres(&config).await?;
                    Ok(pg as Arc<dyn TodoRepository>)
                }
                #[cfg(not(feature = "postgres-repo"))]
                {
                    let _ = settings;
                    Err(RepositoryError::configuration(
                        "Postgres repository feature not enabled",
                    ))
                }
            }
            RepositoryType::Local => {
                #[cfg(feature = "local-repo")]
                {
                    Ok(Self::create_local())
                }
                #[cfg(not(feature = "local-repo"))]
                {
                    Err(RepositoryError::configuration(
                        "Local repository feature not enabled",
                    ))
                }
            }
        }
    }

    /// Create a Postgres repository.
    ///
    /// Pool construction blocks while connections are established, so it
    /// runs on the blocking thread pool.
    #[cfg(feature = "postgres-repo")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> RepositoryResult<Arc<PostgresRepository>> {
        let config = config.clone();
        let repo = tokio::task::spawn_blocking(move || PostgresRepository::new(config))
            .await
            .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))??;
        Ok(Arc::new(repo))
    }

    /// Create an in-memory local repository.
    #[cfg(feature = "local-repo")]
    pub fn create_local() -> Arc<dyn TodoRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create the repository selected by the settings.
    pub async fn from_settings(settings: &Settings) -> RepositoryResult<Arc<dyn TodoRepository>> {
        let repo_type =
            RepositoryType::from_settings(settings).map_err(RepositoryError::configuration)?;
        Self::create(repo_type, settings).await
    }
}
