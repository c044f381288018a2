//! Declarative description of a pipeline, built once per `record()` call and
//! handed to a [`super::PipelineFactory`] verbatim.

use crate::protocol_constants::{MUX_AUDIO_CODEC, SRT_MODE};

/// Stage A: the SRT listener the broadcast source connects to, combined
/// with the container mux that reads from it.
#[derive(Debug, Clone)]
pub struct SrtListenerOptions {
    /// Address to bind the listener on.
    pub host: String,
    /// Reserved port to listen on.
    pub port: u16,
    /// Microseconds to wait for the first client before giving up.
    /// `= ceil((expires_at - now_utc()).seconds * 1_000_000)`, clamped ≥ 0.
    pub listen_timeout_us: u64,
    /// The minted credential's token, used as the SRT passphrase.
    pub passphrase: String,
    /// SRT transport mode; always [`SRT_MODE`] ("listener") — the recorder
    /// never initiates the handshake.
    pub mode: &'static str,
    /// Whether to pace output at the input's original rate (`-re`). Two
    /// source iterations disagreed on this; default false.
    pub realtime: bool,
}

impl SrtListenerOptions {
    /// Builds listener options for `host:port`, given a credential's
    /// expiry and the reservation it's bound to.
    #[must_use]
    pub fn new(host: String, port: u16, listen_timeout_us: u64, passphrase: String) -> Self {
        Self {
            host,
            port,
            listen_timeout_us,
            passphrase,
            mode: SRT_MODE,
            realtime: false,
        }
    }
}

/// Options for the container mux stage reading the SRT listener's output.
#[derive(Debug, Clone)]
pub struct ContainerMuxOptions {
    /// Output container format (e.g. `ogg`).
    pub format: String,
    /// Audio codec handling; always [`MUX_AUDIO_CODEC`] ("copy") — the core
    /// never transcodes.
    pub audio_codec: &'static str,
}

impl ContainerMuxOptions {
    /// Builds mux options for the given output `format`.
    #[must_use]
    pub fn new(format: String) -> Self {
        Self {
            format,
            audio_codec: MUX_AUDIO_CODEC,
        }
    }
}

/// Stage B: where the muxed output is uploaded once the recording ends.
///
/// The bucket, endpoint, and credentials the upload goes through are owned
/// by the [`crate::objectstore::ObjectStoreClient`] injected into the
/// pipeline factory, not re-derived per plan; this only carries the
/// per-recording addressing the factory can't know in advance.
#[derive(Debug, Clone)]
pub struct ObjectStoreSinkOptions {
    /// Full object key: `"{event-id}/{isostringify(start)}.{format}"`.
    pub key: String,
    /// MIME type to store the object with.
    pub content_type: String,
}

/// A fully materialised plan for one recording, ready to hand to a
/// [`super::PipelineFactory`].
#[derive(Debug, Clone)]
pub struct PipelinePlan {
    /// Stage A options.
    pub srt: SrtListenerOptions,
    /// Container mux options, part of stage A.
    pub mux: ContainerMuxOptions,
    /// Stage B options.
    pub sink: ObjectStoreSinkOptions,
}

/// Derives the content type ffmpeg-muxed audio is stored with, from the
/// container format.
#[must_use]
pub fn content_type_for_format(format: &str) -> String {
    match format {
        "ogg" => "audio/ogg".to_string(),
        "mp3" => "audio/mpeg".to_string(),
        "wav" => "audio/wav".to_string(),
        other => format!("audio/{other}"),
    }
}
