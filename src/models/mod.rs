pub mod command;
pub mod result;
pub mod table;
