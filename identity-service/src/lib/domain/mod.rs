pub mod account;
pub mod credential;
pub mod policy;
pub mod reset;
pub mod session;
pub mod subject;
