pub mod calc;
pub mod cli;
pub mod config;
pub mod data;
pub mod reference;
pub mod seed;
pub mod server;
