pub mod auth;
pub mod check;
pub mod list;
pub mod record;
pub mod upload;
