// One error type for the whole app.
// Every variant states *where* things went wrong.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// An outfit or uploaded file could not be read/decoded
    #[error("could not decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Writing the JPEG export failed
    #[error("could not encode export {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The decoder thread could not be started
    #[error("could not start asset loader: {0}")]
    LoaderSpawn(#[source] std::io::Error),

    /// The decoder thread is gone; no further loads are possible
    #[error("asset loader has shut down")]
    LoaderClosed,
}
