//! BizMart intake: a guided conversational agent that collects market
//! launch details one field at a time.

pub mod cli;
pub mod config;
pub mod error;
pub mod intake;
pub mod launch;
pub mod llm;
pub mod store;
