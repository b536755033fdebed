//! Integration-level tests for the testable properties that
//! span model + validate + index + snapshot together.

use proxy_core::{validate, Grant, ProxyTarget, Role, Route, Snapshot, Token, User};

fn route(path: &str, resource: &str) -> Route {
    Route {
        path: path.to_string(),
        methods: None,
        hosts: None,
        proxy: ProxyTarget {
            target: "http://upstream".into(),
        },
        resource: resource.to_string(),
        anonymous: false,
    }
}

#[test]
fn test_admin_allowed_regardless_of_grant_index_contents() {
    let roles = vec![Role {
        name: "nothing".into(),
        grants: vec![],
    }];
    let users = vec![User {
        name: "alice".into(),
        roles: Some(vec!["nothing".into()]),
        admin: Some(true),
    }];
    let snap = Snapshot::build(vec![], vec![], users, roles, 1).unwrap();
    assert!(snap.allow("alice", "anything", "DELETE"));
}

#[test]
fn test_duplicate_token_name_or_role_is_rejected_before_index_build() {
    let tokens = vec![
        Token {
            token: "T1".into(),
            user: "a".into(),
        },
        Token {
            token: "T1".into(),
            user: "b".into(),
        },
    ];
    assert!(validate::validate_tokens(&tokens).is_ok());
    assert!(Snapshot::build(vec![], tokens, vec![], vec![], 1).is_err());
}

#[test]
fn test_invalid_regex_is_rejected_at_validation_not_silently_at_build() {
    let routes = vec![route("(unclosed", "api")];
    assert!(validate::validate_routes(&routes).is_err());
}

#[test]
fn test_successful_build_preserves_declared_route_order() {
    let routes = vec![route("^/a", "a"), route("^/b", "b"), route("^/c", "c")];
    let snap = Snapshot::build(routes, vec![], vec![], vec![], 7).unwrap();
    let resources: Vec<&str> = snap.routes().iter().map(|r| r.resource.as_str()).collect();
    assert_eq!(resources, vec!["a", "b", "c"]);
}

#[test]
fn test_source_mtime_matches_publication_time_input() {
    let snap = Snapshot::build(vec![], vec![], vec![], vec![], 12345).unwrap();
    assert_eq!(snap.source_mtime(), 12345);
}

#[test]
fn test_allow_is_pure_and_idempotent() {
    let roles = vec![Role {
        name: "reader".into(),
        grants: vec![Grant {
            resource: "api".into(),
            methods: Some(vec!["GET".into()]),
        }],
    }];
    let users = vec![User {
        name: "john".into(),
        roles: Some(vec!["reader".into()]),
        admin: None,
    }];
    let snap = Snapshot::build(vec![], vec![], users, roles, 1).unwrap();
    for _ in 0..5 {
        assert!(snap.allow("john", "api", "GET"));
        assert!(!snap.allow("john", "api", "DELETE"));
    }
}
