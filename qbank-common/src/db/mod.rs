//! Database schema shared by question bank tools

pub mod init;

pub use init::*;
