// Error taxonomy for the builder: configuration (bad CLI arguments),
// import (a malformed or unreadable scene file), build invariant
// violations (something the algorithms assume can never happen did),
// and I/O errors writing the output chunks.
use std::io;

#[derive(thiserror::Error, Debug)]
pub enum BvhError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("import error: {0}")]
    Import(String),

    #[error("build invariant violated: {0}")]
    BuildInvariant(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, BvhError>;

impl BvhError {
    // The exit code the CLI contract assigns to each error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            BvhError::Config(_) => 1,
            BvhError::Import(_) => 3,
            BvhError::BuildInvariant(_) => 1,
            BvhError::Io(_) => 2,
        }
    }
}

// Logs and returns a BuildInvariant error. The library never aborts the
// process itself; callers at the binary boundary decide whether to
// panic (debug) or exit with a logged error (release).
pub fn build_invariant(msg: impl Into<String>) -> BvhError {
    let msg = msg.into();
    log::error!("build invariant violated: {}", msg);
    BvhError::BuildInvariant(msg)
}
