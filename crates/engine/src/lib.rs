pub mod cli;
pub mod command;
pub mod error;

pub use cli::GraphragCli;
pub use command::{EngineCommand, EngineOutput, QueryMethod};
pub use error::EngineError;
