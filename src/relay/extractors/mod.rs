// Extractor module - everything that talks to yt-dlp
//
// One collaborator with two operations:
// - describe: `--dump-json` metadata, bounded by a timeout
// - open_stream: media bytes on stdout, bounded by the client connection
//
// The launcher (Python module or native binary) is resolved once at startup.

mod command;
mod diagnostics;
mod traits;
mod ytdlp;

pub use command::ExtractorCommand;
pub use diagnostics::{diagnose_failure, FailureReason};
pub use traits::{ExtractorConfig, ExtractorMode, MediaExtractor};
pub use ytdlp::{YtDlpExtractor, VIDEO_CHUNK_SIZE};
