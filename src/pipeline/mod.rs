// Pipeline orchestration - declarative stage chains and their executor
pub mod definitions;
pub mod executor;
pub mod stage;

pub use definitions::{PipelineDefinition, PipelineVariant};
pub use executor::{ExecutorConfig, PipelineExecutor, PipelineOutcome};
pub use stage::{StageKind, StageSpec};
