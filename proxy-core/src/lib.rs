pub mod error;
pub mod index;
pub mod model;
pub mod snapshot;
pub mod validate;

pub use error::ProxyError;
pub use index::{Allow, GrantIndex, RoleIndex, TokenIndex, UserIndex};
pub use model::{Grant, ProxyTarget, Role, RolesDoc, Route, RoutesDoc, Token, TokensDoc, User, UsersDoc};
pub use snapshot::{CompiledRoute, Snapshot, SnapshotHandle};
