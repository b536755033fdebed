//! Shape and type validation for the four declarative documents.
//!
//! Each function walks its records in order and returns the first rule
//! violation it finds — a single reload attempt aborts on the first failure,
//! it does not collect and report every problem in the document.

use crate::error::ProxyError;
use crate::model::{Role, Route, Token, User};
use regex::Regex;

pub fn validate_routes(routes: &[Route]) -> Result<(), ProxyError> {
    for (i, route) in routes.iter().enumerate() {
        if route.path.is_empty() {
            return Err(ProxyError::config(format!("routes[{i}].path: must not be empty")));
        }
        Regex::new(&route.path)
            .map_err(|e| ProxyError::config(format!("routes[{i}].path: invalid regex: {e}")))?;

        if let Some(hosts) = &route.hosts {
            for (j, host) in hosts.iter().enumerate() {
                if host.is_empty() {
                    return Err(ProxyError::config(format!(
                        "routes[{i}].hosts[{j}]: must not be empty"
                    )));
                }
                Regex::new(host).map_err(|e| {
                    ProxyError::config(format!("routes[{i}].hosts[{j}]: invalid regex: {e}"))
                })?;
            }
        }

        if route.resource.is_empty() {
            return Err(ProxyError::config(format!(
                "routes[{i}].resource: must not be empty"
            )));
        }
        if route.proxy.target.is_empty() {
            return Err(ProxyError::config(format!(
                "routes[{i}].proxy.target: must not be empty"
            )));
        }
        if let Some(methods) = &route.methods {
            for (j, m) in methods.iter().enumerate() {
                if m.is_empty() {
                    return Err(ProxyError::config(format!(
                        "routes[{i}].methods[{j}]: must not be empty"
                    )));
                }
            }
        }
    }
    Ok(())
}

pub fn validate_tokens(tokens: &[Token]) -> Result<(), ProxyError> {
    for (i, t) in tokens.iter().enumerate() {
        if t.token.is_empty() {
            return Err(ProxyError::config(format!("tokens[{i}].token: must not be empty")));
        }
        if t.user.is_empty() {
            return Err(ProxyError::config(format!("tokens[{i}].user: must not be empty")));
        }
    }
    Ok(())
}

pub fn validate_users(users: &[User]) -> Result<(), ProxyError> {
    for (i, u) in users.iter().enumerate() {
        if u.name.is_empty() {
            return Err(ProxyError::config(format!("users[{i}].name: must not be empty")));
        }
    }
    Ok(())
}

pub fn validate_roles(roles: &[Role]) -> Result<(), ProxyError> {
    for (i, r) in roles.iter().enumerate() {
        if r.name.is_empty() {
            return Err(ProxyError::config(format!("roles[{i}].name: must not be empty")));
        }
        for (j, g) in r.grants.iter().enumerate() {
            if g.resource.is_empty() {
                return Err(ProxyError::config(format!(
                    "roles[{i}].grants[{j}].resource: must not be empty"
                )));
            }
        }
    }
    Ok(())
}
