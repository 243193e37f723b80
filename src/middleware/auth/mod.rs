pub mod access;

pub use access::{RequireAuthenticatedLayer, RequireRoleLayer, RoleCheckLayer, apply};
