//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use todo_backend::config::Settings;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Variables are restored on unwind, and a global lock serializes access
/// since tests in one binary run on parallel threads.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Every variable `Settings::from_env` reads, so a test can start from a
/// clean slate regardless of the developer's shell.
pub const SETTINGS_KEYS: &[&str] = &[
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "POSTGRES_USERNAME",
    "POSTGRES_PASSWORD",
    "POSTGRES_HOSTNAME",
    "POSTGRES_PORT",
    "DATABASE_NAME",
    "DATABASE_URL",
    "SESSION_SECRET",
    "CORS_ALLOW_ORIGINS",
    "REPOSITORY_TYPE",
    "TODO_CONFIG",
    "PG_POOL_MAX",
    "PG_POOL_MIN",
    "PG_CONN_TIMEOUT_SEC",
    "PG_IDLE_TIMEOUT_SEC",
    "PG_MAX_RETRIES",
    "PG_RETRY_DELAY_MS",
];

/// Load settings from the environment with all known keys cleared except
/// the given overrides.
pub fn settings_with_env(overrides: &[(&str, &str)]) -> Settings {
    let mut changes: Vec<(&str, Option<&str>)> = SETTINGS_KEYS
        .iter()
        .filter(|k| !overrides.iter().any(|(o, _)| o == *k))
        .map(|k| (*k, None))
        .collect();
    changes.extend(overrides.iter().map(|(k, v)| (*k, Some(*v))));
    with_scoped_env(&changes, || Settings::from_env().expect("settings"))
}
