pub mod conversation;
pub mod health;
pub mod query;
pub mod session;
