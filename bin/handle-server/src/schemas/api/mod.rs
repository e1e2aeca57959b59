pub mod messages;
pub mod questions;
pub mod rooms;
