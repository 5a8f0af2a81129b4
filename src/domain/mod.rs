pub mod logic;
pub mod property;
