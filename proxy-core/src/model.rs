use serde::{Deserialize, Serialize};

/// A Route defines how incoming requests are matched and forwarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Regular-expression string matched against the request URL path
    /// (the full URL-line as received, including query).
    pub path: String,

    /// Allowed HTTP methods. Absent = any method matches.
    #[serde(default)]
    pub methods: Option<Vec<String>>,

    /// Ordered host-matching regex strings. Absent = any host matches;
    /// present = at least one must match the request's `Host` header.
    #[serde(default)]
    pub hosts: Option<Vec<String>>,

    /// Upstream proxy target.
    pub proxy: ProxyTarget,

    /// Opaque label naming this route for authorization and metrics.
    pub resource: String,

    /// When true, authentication and authorization are skipped.
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyTarget {
    pub target: String,
}

/// A Token maps an opaque bearer string to a user name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub token: String,
    pub user: String,
}

/// A User account, optionally tied to roles, optionally an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,

    #[serde(default)]
    pub roles: Option<Vec<String>>,

    #[serde(default)]
    pub admin: Option<bool>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.admin.unwrap_or(false)
    }

    pub fn role_names(&self) -> &[String] {
        self.roles.as_deref().unwrap_or(&[])
    }
}

/// A Role is a named bundle of grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub grants: Vec<Grant>,
}

/// A Grant permits a resource under zero or more methods.
/// `methods` absent means all methods for that resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    pub resource: String,

    #[serde(default)]
    pub methods: Option<Vec<String>>,
}

// ── Document wrappers (one per config file) ─────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutesDoc {
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersDoc {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesDoc {
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensDoc {
    pub tokens: Vec<Token>,
}
