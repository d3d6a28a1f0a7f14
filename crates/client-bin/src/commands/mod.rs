//! CLI command handlers.

pub mod challenge;
pub mod login;
pub mod logout;
pub mod status;

mod flow;
