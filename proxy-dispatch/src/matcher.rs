//! Route matcher — ordered scan over the compiled route list.

use proxy_core::{CompiledRoute, Snapshot};

/// Returns the first route whose method/host/path constraints all match,
/// in declared order. Order matters: a later route that would also match
/// is never considered once an earlier one wins.
pub fn match_route<'a>(
    snapshot: &'a Snapshot,
    method: &str,
    path: &str,
    host: &str,
) -> Option<&'a CompiledRoute> {
    snapshot.routes().iter().find(|route| route_matches(route, method, path, host))
}

fn route_matches(route: &CompiledRoute, method: &str, path: &str, host: &str) -> bool {
    if let Some(methods) = &route.methods {
        if !methods.contains(method) {
            return false;
        }
    }
    if let Some(hosts) = &route.hosts {
        if !hosts.iter().any(|h| h.is_match(host)) {
            return false;
        }
    }
    route.path.is_match(path)
}
