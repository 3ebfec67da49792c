use std::io::Write;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::estimator::Estimator;
use crate::models::{FetchOptions, FetchReport, TransferReport, TransferStatus};
use crate::render::Bar;

/// Custom errors for fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Body chunks of one transfer, in arrival order.
pub type ChunkStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// Where transfers come from.
#[async_trait]
pub trait Source: Send + Sync {
    /// Starts a transfer. An error here means no byte of `url` was received.
    async fn open(&self, url: &str) -> Result<ChunkStream, FetchError>;
}

type BuildClient = Box<dyn Fn() -> ClientBuilder + Send + Sync>;

/// Plain HTTP(S) GET, following redirects.
///
/// The client is built on the first transfer. If building fails, that transfer
/// fails and the next one tries again.
pub struct HttpSource {
    build: BuildClient,
    client: OnceCell<Client>,
}

impl HttpSource {
    /// Create a source that follows up to `max_redirects` redirects.
    pub fn new(max_redirects: usize) -> Self {
        Self::from_builder(move || Client::builder().redirect(Policy::limited(max_redirects)))
    }

    /// Create a source whose client comes from `build`.
    pub fn from_builder<F>(build: F) -> Self
    where
        F: Fn() -> ClientBuilder + Send + Sync + 'static,
    {
        Self {
            build: Box::new(build),
            client: OnceCell::new(),
        }
    }

    /// Create a source around an already built client.
    pub fn with_client(client: Client) -> Self {
        Self {
            build: Box::new(Client::builder),
            client: OnceCell::new_with(Some(client)),
        }
    }

    async fn client(&self) -> Result<&Client, FetchError> {
        let client = self
            .client
            .get_or_try_init(|| async { (self.build)().build() })
            .await?;
        Ok(client)
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn open(&self, url: &str) -> Result<ChunkStream, FetchError> {
        let resp = self.client().await?.get(url).send().await?;
        // Error statuses are not special: their bodies count like any other.
        debug!(url, status = %resp.status(), final_url = %resp.url(), "response received");
        Ok(resp.bytes_stream().map(|chunk| chunk.map_err(FetchError::from)).boxed())
    }
}

/// Fetches a list of URLs one after another and draws the overall progress.
#[derive(Debug)]
pub struct Downloader<S> {
    source: S,
    bar: Bar,
    initial_bytes_per_url: f64,
}

impl<S: Source> Downloader<S> {
    /// Create a downloader with the default options.
    pub fn new(source: S) -> Self {
        Self::with_options(source, &FetchOptions::default())
    }

    /// Create a downloader with provided options.
    pub fn with_options(source: S, options: &FetchOptions) -> Self {
        Self {
            source,
            bar: Bar::new(options.bar_width),
            initial_bytes_per_url: options.initial_bytes_per_url,
        }
    }

    /// Fetches every URL in order, rendering to `out` after each chunk.
    ///
    /// Failed transfers are logged at debug level and recorded in the report;
    /// they never stop the run. Only a failure to write to `out` is returned
    /// as an error.
    pub async fn fetch_all<T, W>(&self, urls: &[T], out: &mut W) -> Result<FetchReport, FetchError>
    where
        T: AsRef<str>,
        W: Write,
    {
        let mut estimator =
            Estimator::with_initial_prediction(urls.len(), self.initial_bytes_per_url);
        let mut report = FetchReport::default();

        self.bar.render(out, 0, estimator.total_bytes())?;
        for url in urls {
            let transfer = self.fetch_one(url.as_ref(), &mut estimator, out).await?;
            report.transfers.push(transfer);
        }
        self.bar.finish(out, estimator.total_bytes())?;

        info!(
            urls = urls.len(),
            failed = report.failed(),
            bytes = estimator.total_bytes(),
            "all transfers finished"
        );
        Ok(report)
    }

    async fn fetch_one<W: Write>(
        &self,
        url: &str,
        estimator: &mut Estimator,
        out: &mut W,
    ) -> Result<TransferReport, FetchError> {
        estimator.begin_transfer();

        let status = match self.source.open(url).await {
            Ok(mut stream) => {
                let mut status = TransferStatus::Completed;
                while let Some(chunk) = stream.next().await {
                    match chunk {
                        Ok(bytes) => {
                            let percent = estimator.on_chunk_received(bytes.len() as u64);
                            self.bar.render(out, percent, estimator.total_bytes())?;
                        }
                        Err(e) => {
                            debug!(url, error = %e, "transfer interrupted");
                            status = TransferStatus::Failed(e.to_string());
                            break;
                        }
                    }
                }
                status
            }
            Err(e) => {
                debug!(url, error = %e, "request failed");
                TransferStatus::Failed(e.to_string())
            }
        };

        let bytes = estimator.current_bytes();
        estimator.on_url_completed();
        debug!(
            url,
            bytes,
            expected_bytes_per_url = estimator.expected_bytes_per_url(),
            "transfer done"
        );

        Ok(TransferReport {
            url: url.to_string(),
            bytes,
            status,
        })
    }
}
