//! Project-level driving: the file set and the parallel multi-file pass.

mod files;
mod workspace;

pub use files::FileSet;
pub use workspace::{SourceUnit, Workspace, WorkspaceResolution};
