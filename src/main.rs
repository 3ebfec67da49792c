// src/main.rs

use seqfetch::prelude::*;
use tracing::{debug, Level};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // stdout belongs to the bar. Transfer failures are logged below WARN, so
    // nothing reaches the terminal besides the bar itself.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::WARN)
        .init();

    let options = FetchOptions::default();
    let source = HttpSource::new(options.max_redirects);
    let downloader = Downloader::with_options(source, &options);

    let mut stdout = std::io::stdout();
    if let Err(e) = downloader.fetch_all(&options.urls, &mut stdout).await {
        debug!(error = %e, "could not draw progress");
    }
}
