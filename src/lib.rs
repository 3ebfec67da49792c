pub mod downloader;
pub mod estimator;
pub mod models;
pub mod render;

/// Convenient type alias exposing common structs.
pub mod prelude {
    pub use crate::downloader::{Downloader, FetchError, HttpSource, Source};
    pub use crate::estimator::{predict_next, Estimator};
    pub use crate::models::{FetchOptions, FetchReport, TransferReport, TransferStatus};
    pub use crate::render::Bar;
}
