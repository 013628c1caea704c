pub mod auth;

pub use auth::{AuthActor, auth_middleware};
