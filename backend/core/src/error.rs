use std::path::PathBuf;

use thiserror::Error;

/// Input problems detected before any probe touches the network.
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("mode `{mode}` needs an image path (--image)")]
    MissingImage { mode: String },

    #[error("token cannot be sent in an Authorization header: {reason}")]
    InvalidToken { reason: String },

    #[error("image file {} not found", .0.display())]
    ImageNotFound(PathBuf),

    #[error("could not read image file {}: {source}", path.display())]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
