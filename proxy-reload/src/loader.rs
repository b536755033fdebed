//! Document loader — opens and parses the four YAML config files. Each file
//! has its own schema and needs its own on-disk mtime, so these are read
//! directly with `std::fs` + `serde_yaml` rather than folded into a figment
//! profile.

use proxy_core::{ProxyError, Role, RolesDoc, Route, RoutesDoc, Token, TokensDoc, User, UsersDoc};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// The four documents loaded from disk plus the newest mtime among them, in
/// unix seconds.
pub struct LoadedConfig {
    pub routes: Vec<Route>,
    pub tokens: Vec<Token>,
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub mtime: u64,
}

fn file_mtime_secs(path: &Path) -> Result<u64, ProxyError> {
    let meta = std::fs::metadata(path)?;
    let mtime = meta.modified()?;
    Ok(mtime
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}

fn read_and_parse<T: serde::de::DeserializeOwned>(path: &Path) -> Result<(T, u64), ProxyError> {
    let mtime = file_mtime_secs(path)?;
    let contents = std::fs::read_to_string(path)?;
    let parsed: T = serde_yaml::from_str(&contents)
        .map_err(|e| ProxyError::config(format!("{}: {e}", path.display())))?;
    Ok((parsed, mtime))
}

/// Load all four documents and return them together with `max(mtime)`
/// across the four files.
pub fn load_all(
    routes_path: &Path,
    tokens_path: &Path,
    users_path: &Path,
    roles_path: &Path,
) -> Result<LoadedConfig, ProxyError> {
    let (routes_doc, m1): (RoutesDoc, u64) = read_and_parse(routes_path)?;
    let (tokens_doc, m2): (TokensDoc, u64) = read_and_parse(tokens_path)?;
    let (users_doc, m3): (UsersDoc, u64) = read_and_parse(users_path)?;
    let (roles_doc, m4): (RolesDoc, u64) = read_and_parse(roles_path)?;

    let mtime = m1.max(m2).max(m3).max(m4);

    Ok(LoadedConfig {
        routes: routes_doc.routes,
        tokens: tokens_doc.tokens,
        users: users_doc.users,
        roles: roles_doc.roles,
        mtime,
    })
}

/// Newest mtime across the four files, without reading or parsing their
/// contents. Used by the reloader to cheaply decide whether a reload is
/// even worth attempting.
pub fn max_mtime(
    routes_path: &Path,
    tokens_path: &Path,
    users_path: &Path,
    roles_path: &Path,
) -> Result<u64, ProxyError> {
    let m1 = file_mtime_secs(routes_path)?;
    let m2 = file_mtime_secs(tokens_path)?;
    let m3 = file_mtime_secs(users_path)?;
    let m4 = file_mtime_secs(roles_path)?;
    Ok(m1.max(m2).max(m3).max(m4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_all_parses_four_documents() {
        let dir = tempfile::tempdir().unwrap();
        let routes = write_file(
            &dir,
            "routes.yaml",
            "routes:\n  - path: \"^/api\"\n    proxy:\n      target: http://upstream\n    resource: api\n",
        );
        let tokens = write_file(&dir, "tokens.yaml", "tokens:\n  - token: T1\n    user: john\n");
        let users = write_file(&dir, "users.yaml", "users:\n  - name: john\n");
        let roles = write_file(&dir, "roles.yaml", "roles: []\n");

        let loaded = load_all(&routes, &tokens, &users, &roles).unwrap();
        assert_eq!(loaded.routes.len(), 1);
        assert_eq!(loaded.tokens.len(), 1);
        assert_eq!(loaded.users.len(), 1);
        assert_eq!(loaded.roles.len(), 0);
        assert!(loaded.mtime > 0);
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let routes = write_file(&dir, "routes.yaml", "not: [valid, yaml: structure");
        let tokens = write_file(&dir, "tokens.yaml", "tokens: []\n");
        let users = write_file(&dir, "users.yaml", "users: []\n");
        let roles = write_file(&dir, "roles.yaml", "roles: []\n");

        let err = load_all(&routes, &tokens, &users, &roles).unwrap_err();
        assert!(matches!(err, ProxyError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist.yaml");
        let tokens = write_file(&dir, "tokens.yaml", "tokens: []\n");
        let users = write_file(&dir, "users.yaml", "users: []\n");
        let roles = write_file(&dir, "roles.yaml", "roles: []\n");

        let err = load_all(&missing, &tokens, &users, &roles).unwrap_err();
        assert!(matches!(err, ProxyError::Io(_)));
    }

    #[test]
    fn test_max_mtime_matches_load_all() {
        let dir = tempfile::tempdir().unwrap();
        let routes = write_file(
            &dir,
            "routes.yaml",
            "routes:\n  - path: \"^/api\"\n    proxy:\n      target: http://upstream\n    resource: api\n",
        );
        let tokens = write_file(&dir, "tokens.yaml", "tokens: []\n");
        let users = write_file(&dir, "users.yaml", "users: []\n");
        let roles = write_file(&dir, "roles.yaml", "roles: []\n");

        let loaded = load_all(&routes, &tokens, &users, &roles).unwrap();
        let mtime = max_mtime(&routes, &tokens, &users, &roles).unwrap();
        assert_eq!(loaded.mtime, mtime);
    }
}
