//! Authorizer — thin wrapper over `Snapshot::allow`, kept as its own
//! module since the dispatcher calls it as a distinct pipeline stage.

use proxy_core::Snapshot;

pub fn authorize(snapshot: &Snapshot, user: &str, resource: &str, method: &str) -> bool {
    snapshot.allow(user, resource, method)
}
