//! Fixed protocol-level constants.
//!
//! These values are dictated by the wire contract the core speaks (HTTP API
//! shape, SRT/container defaults) rather than by operator preference.

/// Container format used for a recording when a request omits one.
pub const DEFAULT_FORMAT: &str = "ogg";

/// Closed set of container formats the pipeline accepts. A request naming
/// anything else is rejected before a port is ever reserved.
pub const SUPPORTED_FORMATS: [&str; 3] = ["ogg", "mp3", "wav"];

/// Audio codec handling passed to the container mux stage. The core never
/// transcodes audio itself; it always asks the mux to pass samples through.
pub const MUX_AUDIO_CODEC: &str = "copy";

/// SRT transport mode for the listener stage. The recorder is always the
/// listening side of the handshake; the broadcast source connects to it.
pub const SRT_MODE: &str = "listener";

/// Default page size for `GET /records/{event}` when `limit` is omitted.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Length, in hex characters, of a minted credential token (128 bits of entropy).
pub const TOKEN_HEX_LEN: usize = 32;

/// Environment variable prefix used for configuration overrides.
pub const ENV_PREFIX: &str = "EMIREC_";

/// Default HTTP listen port.
pub const DEFAULT_HTTP_PORT: u16 = 31000;

/// Default set of SRT listener ports.
pub const DEFAULT_SRT_PORTS: [u16; 1] = [31000];

/// Default credential lifetime / SRT listen timeout, in seconds.
pub const DEFAULT_RECORDER_TIMEOUT_SECS: u64 = 60;

/// Default symmetric search window around "now" for a matching instance, in seconds.
pub const DEFAULT_RECORDER_WINDOW_SECS: u64 = 3600;
