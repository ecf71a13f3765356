pub mod agent;
pub mod chem;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
