//! Process-backed [`PipelineFactory`]: spawns an SRT-listener helper piped
//! into ffmpeg's mux stage, then uploads the muxed result once the process
//! exits.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;

use crate::error::{RecorderError, RecorderResult};
use crate::objectstore::ObjectStoreClient;

use super::plan::PipelinePlan;
use super::PipelineFactory;

/// The `srt-live-transmit`-style binary used for stage A. Expected on `PATH`.
const SRT_LISTENER_BIN: &str = "srt-live-transmit";

/// The mux binary used for stage A's container stage and stage B's source.
const MUX_BIN: &str = "ffmpeg";

/// Handle to a launched, running pipeline.
///
/// Remains valid after the request that created it has departed; the only
/// operation is [`PipelineHandle::wait`].
pub struct PipelineHandle {
    join: JoinHandle<RecorderResult<()>>,
}

impl PipelineHandle {
    /// Wraps an already-spawned supervised task. Exposed for fakes in tests.
    #[must_use]
    pub fn from_join(join: JoinHandle<RecorderResult<()>>) -> Self {
        Self { join }
    }

    /// Awaits pipeline completion, including the terminal upload.
    ///
    /// Returns the pipeline's outcome. A panic in the supervised task is
    /// reported as a [`RecorderError::PipelineLaunchFailed`] rather than
    /// propagated, since by this point there is no request left to fail.
    pub async fn wait(self) -> RecorderResult<()> {
        match self.join.await {
            Ok(result) => result,
            Err(join_error) => Err(RecorderError::PipelineLaunchFailed(join_error.to_string())),
        }
    }
}

/// Spawns the SRT listener and mux as child processes, wires stdout to
/// stdin, and uploads the muxed output to the object store once both exit.
pub struct ProcessPipelineFactory {
    object_store: Arc<dyn ObjectStoreClient>,
}

impl ProcessPipelineFactory {
    /// Creates a factory that uploads finished recordings via `object_store`.
    #[must_use]
    pub fn new(object_store: Arc<dyn ObjectStoreClient>) -> Self {
        Self { object_store }
    }

    fn spawn_srt_listener(plan: &PipelinePlan) -> std::io::Result<Child> {
        Command::new(SRT_LISTENER_BIN)
            .arg(format!(
                "srt://{}:{}?mode={}&passphrase={}&listen_timeout={}",
                plan.srt.host,
                plan.srt.port,
                plan.srt.mode,
                plan.srt.passphrase,
                plan.srt.listen_timeout_us,
            ))
            .arg("file://con")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }

    fn spawn_mux(plan: &PipelinePlan, stdin: Stdio) -> std::io::Result<Child> {
        Command::new(MUX_BIN)
            .args(["-i", "pipe:0"])
            .args(["-c:a", plan.mux.audio_codec])
            .args(["-f", &plan.mux.format])
            .arg("pipe:1")
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }
}

#[async_trait]
impl PipelineFactory for ProcessPipelineFactory {
    async fn create(&self, plan: PipelinePlan) -> RecorderResult<PipelineHandle> {
        let mut listener = Self::spawn_srt_listener(&plan)
            .map_err(|e| RecorderError::PipelineLaunchFailed(e.to_string()))?;

        let listener_stdout = listener
            .stdout
            .take()
            .ok_or_else(|| RecorderError::PipelineLaunchFailed("listener stdout unavailable".into()))?;

        let mux = match Self::spawn_mux(&plan, listener_stdout.try_into().map_err(|_| {
            RecorderError::PipelineLaunchFailed("failed to hand off listener stdout".into())
        })?) {
            Ok(mux) => mux,
            Err(e) => {
                let _ = listener.start_kill();
                return Err(RecorderError::PipelineLaunchFailed(e.to_string()));
            }
        };

        let object_store = Arc::clone(&self.object_store);
        let join = tokio::spawn(run_pipeline(plan, listener, mux, object_store));

        Ok(PipelineHandle { join })
    }
}

/// Pipes the mux's stdout into the object-store sink as a live stream,
/// concurrently with waiting for both child processes to exit, rather than
/// buffering the muxed recording in memory before a single upload call —
/// a multi-hour recording must not be held whole in RAM.
async fn run_pipeline(
    plan: PipelinePlan,
    mut listener: Child,
    mut mux: Child,
    object_store: Arc<dyn ObjectStoreClient>,
) -> RecorderResult<()> {
    let mux_stdout = mux.stdout.take();

    let upload = async {
        let stdout = mux_stdout
            .ok_or_else(|| RecorderError::PipelineLaunchFailed("mux stdout unavailable".to_string()))?;
        let body = ReaderStream::new(stdout)
            .map(|chunk| chunk.map_err(|e| std::io::Error::new(e.kind(), e)))
            .boxed();
        object_store.put(&plan.sink.key, &plan.sink.content_type, body).await
    };

    let (listener_status, mux_status, upload_result) = tokio::join!(listener.wait(), mux.wait(), upload);

    if let Err(e) = listener_status {
        log::warn!("[Pipeline] srt listener exited abnormally: {e}");
    }
    match mux_status {
        Ok(status) if !status.success() => {
            return Err(RecorderError::PipelineLaunchFailed(format!(
                "mux exited with {status}"
            )));
        }
        Err(e) => {
            return Err(RecorderError::PipelineLaunchFailed(e.to_string()));
        }
        Ok(_) => {}
    }

    if let Err(e) = &upload_result {
        log::error!("[Pipeline] failed to upload recording for key {}: {e}", plan.sink.key);
    }
    upload_result
}
