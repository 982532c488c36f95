use std::path::Path;

use flate2::read::GzDecoder;

use super::FetchError;

/// Unpack a gzip-compressed tarball into `target_dir`.
pub fn unpack_tar_gz(archive_path: &Path, target_dir: &Path) -> Result<(), FetchError> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .unpack(target_dir)
        .map_err(|e| FetchError::Extraction {
            archive: archive_path.to_path_buf(),
            reason: e.to_string(),
        })
}
