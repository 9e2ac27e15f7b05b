use std::{
    fs::{self, File},
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use flate2::read::GzDecoder;
use walkdir::WalkDir;

use crate::error::{ConstructError, Result};

/// Create the directory if it doesn't exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(ConstructError::io(path, std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            )));
        }
    } else {
        fs::create_dir_all(path).map_err(|e| ConstructError::io(path, e))?;
    }
    Ok(())
}

/// Read a whole text file, transparently inflating it if it starts with the gzip magic.
pub(crate) fn read_maybe_gz(path: &Path) -> Result<String> {
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|file| BufReader::new(file).read_to_end(&mut bytes))
        .map_err(|e| ConstructError::io(path, e))?;

    if bytes.starts_with(&[0x1f, 0x8b]) {
        let mut text = String::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_string(&mut text)
            .map_err(|e| ConstructError::io(path, e))?;
        Ok(text)
    } else {
        String::from_utf8(bytes).map_err(|_| ConstructError::format(Some(path), "file is not valid UTF-8 text"))
    }
}

/// List the files in `dir` whose name starts with `<stem>.`, sorted by name.
/// A missing directory yields an empty list.
pub(crate) fn files_with_stem(dir: &Path, stem: &str) -> Vec<PathBuf> {
    if !dir.is_dir() { return Vec::new() }

    let prefix = format!("{stem}.");
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};

    #[test]
    fn reads_plain_and_gzip_text() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("a.txt");
        fs::write(&plain, "1 2 3").unwrap();
        assert_eq!(read_maybe_gz(&plain).unwrap(), "1 2 3");

        let gz = dir.path().join("b.txt.gz");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        enc.write_all(b"4 5 6").unwrap();
        enc.finish().unwrap();
        assert_eq!(read_maybe_gz(&gz).unwrap(), "4 5 6");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_maybe_gz(Path::new("/definitely/not/here")).unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn stem_filter_is_exact_prefix() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["123.apt", "123.lake", "1234.apt", "other"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let names: Vec<_> = files_with_stem(dir.path(), "123").iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["123.apt", "123.lake"]);
        assert!(files_with_stem(&dir.path().join("nope"), "123").is_empty());
    }
}
