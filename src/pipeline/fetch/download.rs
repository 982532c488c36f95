use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use base64::Engine;
use sha2::{Digest, Sha256};

use super::FetchError;

/// Connection timeout; the archives themselves can take a long while.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// A completed download.
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub url: String,
    pub bytes: u64,
    /// Base64 SHA-256 of the archive as received.
    pub sha256: String,
}

pub fn build_client() -> Result<reqwest::blocking::Client, FetchError> {
    reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(None)
        .user_agent(concat!("cui2qid/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::HttpClient(e.to_string()))
}

/// Stream `url` into `dest`, hashing on the way through.
pub fn download_to(
    client: &reqwest::blocking::Client,
    url: &str,
    dest: &Path,
) -> Result<Downloaded, FetchError> {
    tracing::info!(url, "Downloading");

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::HttpClient(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.into(),
            status: status.as_u16(),
        });
    }

    let file = std::fs::File::create(dest)?;
    let mut writer = HashingWriter::new(BufWriter::new(file));
    let bytes = response
        .copy_to(&mut writer)
        .map_err(|e| FetchError::HttpClient(e.to_string()))?;
    let sha256 = writer.finish()?;

    Ok(Downloaded {
        url: url.into(),
        bytes,
        sha256,
    })
}

/// Writer adapter that feeds every byte into a SHA-256 digest.
struct HashingWriter<W: Write> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    fn finish(mut self) -> std::io::Result<String> {
        self.inner.flush()?;
        let digest = self.hasher.finalize();
        Ok(base64::engine::general_purpose::STANDARD.encode(digest))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
