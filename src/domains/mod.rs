//! Feature domains of the server.

pub mod tools;
