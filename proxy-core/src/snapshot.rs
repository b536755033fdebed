//! Snapshot — the immutable, atomically-swapped bundle of compiled
//! configuration that serves every in-flight request. A `Snapshot` exposes
//! only read operations; nothing here ever mutates one after construction.

use crate::error::ProxyError;
use crate::index::{Allow, GrantIndex, RoleIndex, TokenIndex, UserIndex};
use crate::model::{Role, Route, Token, User};
use arc_swap::ArcSwap;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

/// The single reader-visible handle through which the reloader publishes a
/// new `Snapshot` and every request handler reads the current one. Published
/// by single-word atomic pointer replacement — never by field-by-field
/// mutation.
pub type SnapshotHandle = Arc<ArcSwap<Snapshot>>;

/// A route with its `path`/`hosts` regexes pre-compiled at index-build time
/// stored in declared order — first match wins.
pub struct CompiledRoute {
    pub path: Regex,
    pub methods: Option<HashSet<String>>,
    pub hosts: Option<Vec<Regex>>,
    pub target: String,
    pub resource: String,
    pub anonymous: bool,
}

impl CompiledRoute {
    fn compile(route: &Route) -> Result<Self, ProxyError> {
        let path = Regex::new(&route.path)
            .map_err(|e| ProxyError::Internal(format!("route path failed to recompile: {e}")))?;
        let hosts = match &route.hosts {
            None => None,
            Some(hs) => {
                let mut compiled = Vec::with_capacity(hs.len());
                for h in hs {
                    compiled.push(Regex::new(h).map_err(|e| {
                        ProxyError::Internal(format!("route host failed to recompile: {e}"))
                    })?);
                }
                Some(compiled)
            }
        };
        Ok(Self {
            path,
            methods: route
                .methods
                .as_ref()
                .map(|ms| ms.iter().cloned().collect()),
            hosts,
            target: route.proxy.target.clone(),
            resource: route.resource.clone(),
            anonymous: route.anonymous,
        })
    }
}

pub struct Snapshot {
    routes: Vec<CompiledRoute>,
    token_index: TokenIndex,
    user_index: UserIndex,
    role_index: RoleIndex,
    grant_index: GrantIndex,
    source_mtime: u64,
}

impl Snapshot {
    /// Build a snapshot from validated records. `source_mtime` is the
    /// `max(mtime)` across the four source files at the moment of this
    /// build.
    pub fn build(
        routes: Vec<Route>,
        tokens: Vec<Token>,
        users: Vec<User>,
        roles: Vec<Role>,
        source_mtime: u64,
    ) -> Result<Self, ProxyError> {
        let token_index = crate::index::build_token_index(&tokens)?;
        let user_index = crate::index::build_user_index(&users)?;
        let role_index = crate::index::build_role_index(&roles)?;
        let grant_index = crate::index::build_grant_index(&users, &role_index);

        let mut compiled_routes = Vec::with_capacity(routes.len());
        for route in &routes {
            compiled_routes.push(CompiledRoute::compile(route)?);
        }

        Ok(Self {
            routes: compiled_routes,
            token_index,
            user_index,
            role_index,
            grant_index,
            source_mtime,
        })
    }

    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn user_by_token(&self, token: &str) -> Option<&str> {
        self.token_index.get(token).map(|s| s.as_str())
    }

    pub fn user(&self, name: &str) -> Option<&User> {
        self.user_index.get(name)
    }

    pub fn role(&self, name: &str) -> Option<&Role> {
        self.role_index.get(name)
    }

    pub fn source_mtime(&self) -> u64 {
        self.source_mtime
    }

    /// Authorizer: decide allow/deny for (user, resource, method).
    pub fn allow(&self, user: &str, resource: &str, method: &str) -> bool {
        let Some(u) = self.user_index.get(user) else {
            return false;
        };
        if u.is_admin() {
            return true;
        }
        let Some(per_resource) = self.grant_index.get(user) else {
            return false;
        };
        let Some(allow) = per_resource.get(resource) else {
            return false;
        };
        allow_permits(allow, method)
    }
}

fn allow_permits(allow: &Allow, method: &str) -> bool {
    if allow.wildcard {
        return true;
    }
    allow.methods.contains(method)
}
