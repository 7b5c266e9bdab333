pub mod cli;
pub mod collab;
pub mod config;
pub mod pipeline;
pub mod rows;
