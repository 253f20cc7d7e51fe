mod entry;
mod project_name;
mod types;

pub use entry::*;
pub use project_name::*;
pub use types::*;
