//! Library side of `chainctl`.
//!
//! [`ChainHost`] activates every chain of a [`enhancer_chain::ChainsFile`]
//! against an in-memory resource tracker that a [`DataDirFeeder`] keeps in
//! sync with a directory of execution plan resources.

pub mod data_dir;
pub mod host;
pub mod render;

pub use data_dir::{DataDirFeeder, SyncReport};
pub use host::{ChainHost, ChainReport};
pub use render::{render_plan, OutputFormat};
