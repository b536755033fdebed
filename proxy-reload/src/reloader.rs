//! Reloader — owns the hot-reload timer loop. On a configurable interval it
//! checks the newest mtime across the four config files; if it hasn't moved
//! since the last published snapshot, nothing happens and nothing is
//! logged. If it has, the files are reparsed, revalidated, rebuilt into a
//! new `Snapshot`, and published by swapping the `SnapshotHandle` pointer.
//!
//! The very first load is synchronous and happens before the server starts
//! accepting connections; a failure there is fatal. A failure on any later
//! tick is logged and the prior snapshot is retained — the proxy keeps
//! serving the last-known-good configuration.

use crate::loader;
use arc_swap::ArcSwap;
use proxy_core::{validate, ProxyError, Snapshot, SnapshotHandle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct ReloadPaths {
    pub routes: PathBuf,
    pub tokens: PathBuf,
    pub users: PathBuf,
    pub roles: PathBuf,
}

/// Performs the initial load, failing the whole process if it can't
/// produce a first snapshot. Returns the handle future code can
/// clone and read from.
pub fn initial_load(paths: &ReloadPaths) -> Result<SnapshotHandle, ProxyError> {
    let snapshot = build_snapshot(paths)?;
    Ok(Arc::new(ArcSwap::from_pointee(snapshot)))
}

fn build_snapshot(paths: &ReloadPaths) -> Result<Snapshot, ProxyError> {
    let loaded = loader::load_all(&paths.routes, &paths.tokens, &paths.users, &paths.roles)?;

    validate::validate_routes(&loaded.routes)?;
    validate::validate_tokens(&loaded.tokens)?;
    validate::validate_users(&loaded.users)?;
    validate::validate_roles(&loaded.roles)?;

    Snapshot::build(
        loaded.routes,
        loaded.tokens,
        loaded.users,
        loaded.roles,
        loaded.mtime,
    )
}

/// Reloader owns the self-exclusion guard and the published handle.
/// `tick()` is meant to be driven by a timer loop (see `run`), but is
/// exposed standalone for tests.
pub struct Reloader {
    paths: ReloadPaths,
    handle: SnapshotHandle,
    is_reloading: AtomicBool,
}

impl Reloader {
    pub fn new(paths: ReloadPaths, handle: SnapshotHandle) -> Self {
        Self {
            paths,
            handle,
            is_reloading: AtomicBool::new(false),
        }
    }

    pub fn handle(&self) -> SnapshotHandle {
        self.handle.clone()
    }

    /// Runs one reload attempt. Returns `true` if a new snapshot was
    /// published, `false` if nothing changed or a reload was already in
    /// flight. Errors are logged here, never propagated — a later tick
    /// with restored files will recover.
    pub fn tick(&self) {
        if self
            .is_reloading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("reload already in progress, skipping tick");
            return;
        }

        let result = self.tick_inner();

        self.is_reloading.store(false, Ordering::SeqCst);

        if let Err(e) = result {
            tracing::warn!(error = %e, "config reload failed, retaining prior snapshot");
        }
    }

    fn tick_inner(&self) -> Result<(), ProxyError> {
        let latest_mtime = loader::max_mtime(
            &self.paths.routes,
            &self.paths.tokens,
            &self.paths.users,
            &self.paths.roles,
        )?;

        let current_mtime = self.handle.load().source_mtime();
        if latest_mtime <= current_mtime {
            return Ok(());
        }

        let snapshot = build_snapshot(&self.paths)?;
        self.handle.store(Arc::new(snapshot));
        tracing::info!(mtime = latest_mtime, "config reloaded");
        Ok(())
    }

    /// Drives `tick()` on `interval`. An interval of zero disables polling
    /// entirely — the initial synchronous load stands for the process
    /// lifetime.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        if interval.is_zero() {
            return;
        }
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn paths(dir: &tempfile::TempDir) -> ReloadPaths {
        ReloadPaths {
            routes: write_file(
                dir,
                "routes.yaml",
                "routes:\n  - path: \"^/api\"\n    proxy:\n      target: http://upstream\n    resource: api\n",
            ),
            tokens: write_file(dir, "tokens.yaml", "tokens:\n  - token: T1\n    user: john\n"),
            users: write_file(dir, "users.yaml", "users:\n  - name: john\n"),
            roles: write_file(dir, "roles.yaml", "roles: []\n"),
        }
    }

    #[test]
    fn test_initial_load_succeeds_on_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(&dir);
        let handle = initial_load(&p).unwrap();
        assert!(handle.load().user_by_token("T1").is_some());
    }

    #[test]
    fn test_initial_load_fails_on_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = paths(&dir);
        p.routes = write_file(&dir, "routes.yaml", "routes:\n  - path: \"\"\n    proxy:\n      target: http://upstream\n    resource: api\n");
        assert!(initial_load(&p).is_err());
    }

    #[test]
    fn test_tick_is_noop_when_mtime_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(&dir);
        let handle = initial_load(&p).unwrap();
        let before = handle.load().source_mtime();
        let reloader = Reloader::new(p, handle.clone());
        reloader.tick();
        assert_eq!(handle.load().source_mtime(), before);
    }

    #[test]
    fn test_tick_publishes_new_snapshot_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(&dir);
        let handle = initial_load(&p).unwrap();
        assert!(handle.load().user_by_token("T1").is_some());

        std::thread::sleep(std::time::Duration::from_millis(1100));
        write_file(&dir, "tokens.yaml", "tokens:\n  - token: T2\n    user: john\n");

        let reloader = Reloader::new(p, handle.clone());
        reloader.tick();
        assert!(handle.load().user_by_token("T2").is_some());
        assert!(handle.load().user_by_token("T1").is_none());
    }

    #[test]
    fn test_tick_retains_prior_snapshot_on_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(&dir);
        let handle = initial_load(&p).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));
        write_file(&dir, "tokens.yaml", "not valid yaml: [");

        let reloader = Reloader::new(p, handle.clone());
        reloader.tick();
        assert!(handle.load().user_by_token("T1").is_some());
    }
}
