pub mod chat;
pub mod errors;
pub mod inventory;
pub mod order;
pub mod ports;
pub mod user;
