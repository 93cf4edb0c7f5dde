pub mod activity;
pub mod conversations;
pub mod error;
pub mod messages;
pub mod register;
pub mod state;
