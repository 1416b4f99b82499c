//! Accounts and credentials.

pub mod jwt;
mod password;
mod service;

pub use service::{AccountDetails, AccountService, NewAccount, Session, TokenSettings};
