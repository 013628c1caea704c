pub mod access;
pub mod database;
pub mod jwt;
pub mod metrics;
pub mod numbering;
pub mod reporting;
pub mod totals;

pub use database::Database;
pub use jwt::{AccessTokenClaims, JwtService};
