pub mod client;
pub mod gate;
