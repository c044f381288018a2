//! The two-stage media pipeline: SRT listener → container mux, piped into
//! an object-store upload sink.

mod factory;
mod plan;

pub use factory::{PipelineHandle, ProcessPipelineFactory};
pub use plan::{ContainerMuxOptions, ObjectStoreSinkOptions, PipelinePlan, SrtListenerOptions};

use async_trait::async_trait;

use crate::error::RecorderResult;

/// Materialises a [`PipelinePlan`] into a running, supervisable pipeline.
#[async_trait]
pub trait PipelineFactory: Send + Sync {
    /// Spawns both stages and wires stage A's stdout to stage B's stdin.
    ///
    /// Returns [`crate::error::RecorderError::PipelineLaunchFailed`] if
    /// either stage fails to start; no handle is produced in that case.
    async fn create(&self, plan: PipelinePlan) -> RecorderResult<PipelineHandle>;
}
