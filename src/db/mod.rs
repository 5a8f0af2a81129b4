pub mod connection;
pub mod runs;
