//! Index builder — folds validated records into the four derived
//! indices consulted on the serving path.
//!
//! `grantIndex` uses a tagged representation rather than the nested
//! map-of-maps-of-maps the original source models with an ad-hoc `'*'`
//! sentinel: per user, per resource, an `Allow` carrying a
//! `wildcard` flag and an explicit method set. The authorizer tests the
//! wildcard before falling back to method membership.

use crate::error::ProxyError;
use crate::model::{Role, Token, User};
use std::collections::{HashMap, HashSet};

pub type TokenIndex = HashMap<String, String>;
pub type UserIndex = HashMap<String, User>;
pub type RoleIndex = HashMap<String, Role>;
pub type GrantIndex = HashMap<String, HashMap<String, Allow>>;

/// What a user may do against one resource.
#[derive(Debug, Clone, Default)]
pub struct Allow {
    pub wildcard: bool,
    pub methods: HashSet<String>,
}

impl Allow {
    fn merge_grant_methods(&mut self, methods: &Option<Vec<String>>) {
        match methods {
            None => self.wildcard = true,
            Some(ms) => self.methods.extend(ms.iter().cloned()),
        }
    }
}

pub fn build_token_index(tokens: &[Token]) -> Result<TokenIndex, ProxyError> {
    let mut index = TokenIndex::with_capacity(tokens.len());
    for t in tokens {
        if index.insert(t.token.clone(), t.user.clone()).is_some() {
            return Err(ProxyError::config(format!("duplicate token: {}", t.token)));
        }
    }
    Ok(index)
}

pub fn build_user_index(users: &[User]) -> Result<UserIndex, ProxyError> {
    let mut index = UserIndex::with_capacity(users.len());
    for u in users {
        if index.insert(u.name.clone(), u.clone()).is_some() {
            return Err(ProxyError::config(format!("duplicate user name: {}", u.name)));
        }
    }
    Ok(index)
}

pub fn build_role_index(roles: &[Role]) -> Result<RoleIndex, ProxyError> {
    let mut index = RoleIndex::with_capacity(roles.len());
    for r in roles {
        if index.insert(r.name.clone(), r.clone()).is_some() {
            return Err(ProxyError::config(format!("duplicate role name: {}", r.name)));
        }
    }
    Ok(index)
}

/// Build the grant index. Skips admin users entirely — they're handled by
/// the authorizer's short-circuit instead. A user referencing an unknown
/// role silently contributes no grants from it.
pub fn build_grant_index(users: &[User], role_index: &RoleIndex) -> GrantIndex {
    let mut grants = GrantIndex::new();
    for u in users {
        if u.is_admin() {
            continue;
        }
        let mut per_resource: HashMap<String, Allow> = HashMap::new();
        for role_name in u.role_names() {
            let Some(role) = role_index.get(role_name) else {
                continue;
            };
            for grant in &role.grants {
                per_resource
                    .entry(grant.resource.clone())
                    .or_default()
                    .merge_grant_methods(&grant.methods);
            }
        }
        if !per_resource.is_empty() {
            grants.insert(u.name.clone(), per_resource);
        }
    }
    grants
}
