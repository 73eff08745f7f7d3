use std::{
    io::Write,
    path::PathBuf,
};

use color_eyre::eyre::WrapErr;
use reqwest::Client;
use tokio::{
    fs::File,
    io::{
        AsyncWrite,
        AsyncWriteExt,
        BufWriter,
    },
};

use crate::{
    args::SearchConfig,
    auth::Credentials,
    progress::ProgressSink,
    search::{
        build_download_url,
        build_search_url,
        search,
        ProductRecord,
    },
    Error,
};

/// Archives are written to disk in chunks of this size.
pub const CHUNK_SIZE: usize = 10_000;

/// Runs the whole pipeline: search, filter, then print and download every
/// selected product in catalog order. Returns the paths of the written
/// archives.
///
/// The first failure aborts the run. Files already written are kept and a
/// failed download leaves its partial archive behind.
pub async fn search_and_download<W: Write, P: ProgressSink>(
    client: &Client,
    config: &SearchConfig,
    out: &mut W,
    progress: &mut P,
) -> Result<Vec<PathBuf>, Error> {
    let url = build_search_url(config);
    tracing::info!(%url, "searching catalog");

    let credentials = Credentials::load(&config.credentials_path).await?;
    let records = search(client, &url, &credentials).await?;
    let selected = config.filters.select(records);
    tracing::debug!(selected = selected.len());

    let mut written = vec![];

    for record in &selected {
        writeln!(out, "{}", record.product_identifier())?;
        out.flush()?;

        if !config.dry_run {
            written.push(fetch(client, config, record, progress).await?);
        }
    }

    Ok(written)
}

/// Downloads a single product to `<output_directory>/<productIdentifier>.zip`,
/// overwriting any existing file.
pub async fn fetch<P: ProgressSink>(
    client: &Client,
    config: &SearchConfig,
    record: &ProductRecord,
    progress: &mut P,
) -> Result<PathBuf, Error> {
    let product = record.product_identifier();
    let path = config.output_directory.join(format!("{product}.zip"));

    let file = File::create(&path)
        .await
        .wrap_err_with(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    tracing::info!(product, "downloading Sentinel product");

    let credentials = Credentials::load(&config.credentials_path).await?;
    let mut response = client
        .get(build_download_url(config, &record.id))
        .basic_auth(&credentials.username, Some(&credentials.password))
        .send()
        .await?
        .error_for_status()?;

    match response.content_length() {
        None => {
            let body = response.bytes().await?;
            writer.write_all(&body).await?;
        }
        Some(total) => {
            let mut chunks = ChunkWriter::new(&mut writer, total, progress);
            while let Some(bytes) = response.chunk().await? {
                chunks.push(&bytes).await?;
            }
            let received = chunks.finish().await?;
            tracing::debug!(product, received, total);
        }
    }

    writer.flush().await?;

    Ok(path)
}

/// Regroups network chunks into [`CHUNK_SIZE`] writes and reports the
/// running byte count after each one.
pub struct ChunkWriter<'a, W, P> {
    writer: &'a mut W,
    progress: &'a mut P,
    pending: Vec<u8>,
    received: u64,
}

impl<'a, W: AsyncWrite + Unpin, P: ProgressSink> ChunkWriter<'a, W, P> {
    pub fn new(writer: &'a mut W, total: u64, progress: &'a mut P) -> Self {
        progress.start(total);
        Self {
            writer,
            progress,
            pending: Vec::with_capacity(CHUNK_SIZE),
            received: 0,
        }
    }

    pub async fn push(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.pending.extend_from_slice(bytes);
        while self.pending.len() >= CHUNK_SIZE {
            self.write_chunk(CHUNK_SIZE).await?;
        }
        Ok(())
    }

    async fn write_chunk(&mut self, len: usize) -> std::io::Result<()> {
        self.writer.write_all(&self.pending[..len]).await?;
        self.pending.drain(..len);
        self.received += len as u64;
        self.progress.update(self.received);
        Ok(())
    }

    /// Writes the remaining tail and returns the total number of bytes.
    pub async fn finish(mut self) -> std::io::Result<u64> {
        if !self.pending.is_empty() {
            self.write_chunk(self.pending.len()).await?;
        }
        self.progress.finish();
        Ok(self.received)
    }
}
