pub mod activity;
pub mod balance;
pub mod token;
