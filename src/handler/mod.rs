pub mod auth;
pub mod inquiries;
pub mod properties;
pub mod users;
