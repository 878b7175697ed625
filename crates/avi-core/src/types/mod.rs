mod connection;
mod controller;
mod discovery;

pub use connection::*;
pub use controller::*;
pub use discovery::*;
