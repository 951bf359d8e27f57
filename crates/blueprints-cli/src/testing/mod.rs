//! Test mode: rerun compiled tests after every build and own the output
//! directory they live in.

mod engine;
mod lifecycle;
mod workspace;

pub use engine::{ArtifactCache, ProcessTestEngine, Reporter, TestEngine, TestSummary};
pub use lifecycle::{Discovered, LifecycleState, TestLifecycle, discover_artifacts};
pub use workspace::TransientWorkspace;
