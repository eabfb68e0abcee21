pub mod command;
pub mod controller;
pub mod engine;
pub mod status;
