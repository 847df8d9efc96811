pub mod bridge;
pub mod catalog;
pub mod ledger;
pub mod stdio;
pub mod tooling;
