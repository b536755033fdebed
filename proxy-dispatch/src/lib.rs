pub mod authn;
pub mod authz;
pub mod dispatcher;
pub mod forwarder;
pub mod matcher;

pub use dispatcher::Dispatcher;
pub use forwarder::{Forwarder, ReqwestForwarder};
