//! Asset fetcher: pretrained linker model + entity database.
//!
//! Downloads two tar.gz archives and unpacks them into fixed local
//! directories. The downloads are independent and run on scoped threads.

pub mod archive;
pub mod download;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use archive::unpack_tar_gz;
pub use download::{download_to, Downloaded};

use crate::config;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model variant: {0:?}")]
    InvalidVariant(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Download of {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Could not extract {archive}: {reason}")]
    Extraction { archive: PathBuf, reason: String },

    #[error("Download worker panicked: {0}")]
    Worker(String),
}

impl FetchError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidVariant(_))
    }
}

/// Where the assets come from and where they land.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub variant: String,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub model_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            variant: config::DEFAULT_MODEL_VARIANT.into(),
            base_url: config::DEFAULT_ASSET_BASE_URL.into(),
            data_dir: config::data_dir(),
            model_dir: config::models_dir(),
        }
    }
}

/// A single archive to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    pub url: String,
    pub target_dir: PathBuf,
}

/// Outcome of a completed setup run.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub assets: Vec<Downloaded>,
}

impl FetchConfig {
    /// The model archive and the entity database archive, in that order.
    pub fn assets(&self) -> Result<[AssetSpec; 2], FetchError> {
        validate_variant(&self.variant)?;
        let base = self.base_url.trim_end_matches('/');
        Ok([
            AssetSpec {
                url: format!("{base}/models/latest/bootleg_{}.tar.gz", self.variant),
                target_dir: self.model_dir.clone(),
            },
            AssetSpec {
                url: format!("{base}/data/latest/entity_db.tar.gz"),
                target_dir: self.data_dir.clone(),
            },
        ])
    }
}

/// Variant names end up in a URL path; keep them to a plain token.
pub fn validate_variant(variant: &str) -> Result<(), FetchError> {
    let ok = !variant.is_empty()
        && variant
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(FetchError::InvalidVariant(variant.into()))
    }
}

/// Download and unpack both archives. Any failure aborts the whole run.
pub fn fetch_assets(config: &FetchConfig) -> Result<FetchReport, FetchError> {
    let assets = config.assets()?;
    let client = download::build_client()?;

    tracing::info!(variant = %config.variant, "Fetching linker assets");

    let results: Vec<Result<Downloaded, FetchError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = assets
            .iter()
            .map(|asset| {
                let client = &client;
                scope.spawn(move || fetch_one(client, asset))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(FetchError::Worker("download thread".into())))
            })
            .collect()
    });

    let assets = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(FetchReport { assets })
}

fn fetch_one(
    client: &reqwest::blocking::Client,
    asset: &AssetSpec,
) -> Result<Downloaded, FetchError> {
    std::fs::create_dir_all(&asset.target_dir)?;

    // Stage inside the target directory so the unpack never crosses filesystems.
    let staged = tempfile::Builder::new()
        .prefix(".download-")
        .suffix(".tar.gz")
        .tempfile_in(&asset.target_dir)?;

    let downloaded = download_to(client, &asset.url, staged.path())?;
    unpack_tar_gz(staged.path(), &asset.target_dir)?;
    extracted_log(&asset.target_dir, &downloaded);

    Ok(downloaded)
}

fn extracted_log(target_dir: &Path, downloaded: &Downloaded) {
    tracing::info!(
        url = %downloaded.url,
        bytes = downloaded.bytes,
        sha256 = %downloaded.sha256,
        target = %target_dir.display(),
        "Asset extracted"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    fn tar_gz(entries: &[(&str, &str)]) -> Vec<u8> {
        let gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut tar = tar::Builder::new(gz);
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        tar.into_inner().unwrap().finish().unwrap()
    }

    /// Local HTTP server answering `requests` requests with the same response.
    fn serve(
        requests: usize,
        status: &'static str,
        body: Vec<u8>,
    ) -> (String, std::thread::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let mut paths = Vec::new();
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                paths.push(request_line.split_whitespace().nth(1).unwrap_or("").to_string());
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).unwrap() == 0 || header == "\r\n" {
                        break;
                    }
                }

                write!(
                    stream,
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                )
                .unwrap();
                stream.write_all(&body).unwrap();
                stream.flush().unwrap();
            }
            paths.sort();
            paths
        });

        (base_url, handle)
    }

    fn leftover_downloads(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".download-"))
            .collect()
    }

    fn local_config(base_url: String, root: &Path) -> FetchConfig {
        FetchConfig {
            variant: "uncased".into(),
            base_url,
            data_dir: root.join("data"),
            model_dir: root.join("models"),
        }
    }

    #[test]
    fn default_variant_is_uncased() {
        let config = FetchConfig::default();
        let [model, entity_db] = config.assets().unwrap();
        assert!(model.url.ends_with("/models/latest/bootleg_uncased.tar.gz"));
        assert!(entity_db.url.ends_with("/data/latest/entity_db.tar.gz"));
        assert_eq!(model.target_dir, config::models_dir());
        assert_eq!(entity_db.target_dir, config::data_dir());
    }

    #[test]
    fn base_url_trailing_slash_ignored() {
        let config = FetchConfig {
            base_url: "http://mirror.local/".into(),
            variant: "cased".into(),
            ..FetchConfig::default()
        };
        let [model, _] = config.assets().unwrap();
        assert_eq!(model.url, "http://mirror.local/models/latest/bootleg_cased.tar.gz");
    }

    #[test]
    fn variant_with_path_separator_rejected() {
        let err = validate_variant("../etc").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn empty_variant_rejected() {
        assert!(matches!(
            validate_variant(""),
            Err(FetchError::InvalidVariant(_))
        ));
    }

    #[test]
    fn plain_variants_accepted() {
        for variant in ["uncased", "cased", "bootleg-mini_2"] {
            assert!(validate_variant(variant).is_ok(), "{variant}");
        }
    }

    #[test]
    fn unreachable_host_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            variant: "uncased".into(),
            // Port 9 (discard) on localhost: connection refused.
            base_url: "http://127.0.0.1:9".into(),
            data_dir: dir.path().join("data"),
            model_dir: dir.path().join("models"),
        };
        let result = fetch_assets(&config);
        assert!(matches!(result, Err(FetchError::HttpClient(_))));
    }

    #[test]
    fn archives_unpacked_and_staging_removed() {
        let body = tar_gz(&[
            ("entity_db/entity_mappings/alias2qids.json", "{}"),
            ("entity_db/entity_mappings/qid2title.json", "{}"),
        ]);
        let (base_url, server) = serve(2, "200 OK", body.clone());
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(base_url, dir.path());

        let report = fetch_assets(&config).unwrap();
        assert_eq!(report.assets.len(), 2);
        assert!(report.assets.iter().all(|a| a.bytes == body.len() as u64));

        for target in [&config.data_dir, &config.model_dir] {
            assert!(target.join("entity_db/entity_mappings/alias2qids.json").is_file());
            assert!(leftover_downloads(target).is_empty());
        }

        let paths = server.join().unwrap();
        assert_eq!(
            paths,
            vec![
                "/data/latest/entity_db.tar.gz".to_string(),
                "/models/latest/bootleg_uncased.tar.gz".to_string(),
            ]
        );
    }

    #[test]
    fn http_error_status_aborts() {
        let (base_url, server) = serve(2, "404 Not Found", b"missing".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let config = local_config(base_url, dir.path());

        match fetch_assets(&config).unwrap_err() {
            FetchError::HttpStatus { status, url } => {
                assert_eq!(status, 404);
                assert!(url.ends_with(".tar.gz"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!FetchError::HttpStatus { url: String::new(), status: 404 }.is_configuration());

        server.join().unwrap();
        for target in [&config.data_dir, &config.model_dir] {
            assert!(leftover_downloads(target).is_empty());
            assert_eq!(std::fs::read_dir(target).unwrap().count(), 0);
        }
    }
}
