pub mod error;
pub mod project;
pub mod session;
pub mod store;

pub use error::ProjectError;
pub use project::{Project, INPUT_DIR, OUTPUT_DIR};
pub use session::Session;
pub use store::ProjectStore;
