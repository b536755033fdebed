//! Authenticator — maps a request to a user name via a configured,
//! ordered list of auth headers and the token index.
//!
//! The first configured header present on the request is authoritative.
//! An empty value on that header short-circuits to "unauthenticated"
//! without consulting any later header, even one that would have matched
//! a deliberate behavioral contract, not an oversight.

use http::HeaderMap;
use proxy_core::Snapshot;

pub fn authenticate(snapshot: &Snapshot, headers: &HeaderMap, auth_headers: &[String]) -> Option<String> {
    for name in auth_headers {
        let Some(value) = headers.get(name.as_str()) else {
            continue;
        };
        let value = value.to_str().unwrap_or("");
        if value.is_empty() {
            return None;
        }
        return snapshot.user_by_token(value).map(String::from);
    }
    None
}
