//! Unpacking an AOT file.
//!
//! An AOT is a zip archive. It's extracted into a temporary directory that
//! disappears when the returned handle is dropped; the archive itself is only
//! ever read.

use std::{fs::File, path::Path};

use log::debug;
use tempfile::TempDir;
use zip::ZipArchive;

use crate::AotError;

/// Unpack `aot` into a fresh temporary directory.
pub fn unpack_aot(aot: &Path) -> Result<TempDir, AotError> {
    let file = File::open(aot).map_err(|source| AotError::Io {
        file: aot.to_path_buf(),
        source,
    })?;
    let unzip_err = |source: zip::result::ZipError| AotError::Unzip {
        archive: aot.to_path_buf(),
        source,
    };
    let mut archive = ZipArchive::new(file).map_err(unzip_err)?;

    let dir = tempfile::Builder::new()
        .prefix("aot_summary")
        .tempdir()
        .map_err(|source| AotError::Io {
            file: std::env::temp_dir(),
            source,
        })?;
    debug!(
        "Unpacking {} ({} entries) into {}",
        aot.display(),
        archive.len(),
        dir.path().display()
    );
    archive.extract(dir.path()).map_err(unzip_err)?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::{write::FileOptions, ZipWriter};

    use super::*;
    use crate::{read::obs_project::OBS_PROJECT_FILE, read_aot_dir, test_common::*};

    fn write_aot(path: &Path, entries: &[(&str, String)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, contents) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_unpack_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let aot = dir.path().join("project.aot");
        write_aot(
            &aot,
            &[
                (OBS_PROJECT_FILE, obs_project_xml("2013.1.00114.S")),
                ("SchedBlock0.xml", SchedBlockXml::default().to_xml()),
            ],
        );

        let unpacked = unpack_aot(&aot).unwrap();
        assert!(unpacked.path().join("SchedBlock0.xml").is_file());
        let report = read_aot_dir(unpacked.path()).unwrap();
        assert_eq!(report.project.code, "2013.1.00114.S");
        assert_eq!(report.project.blocks[0].name, "Target_TE");

        let unpacked_path = unpacked.path().to_path_buf();
        drop(unpacked);
        assert!(!unpacked_path.exists());
        assert!(aot.is_file());
    }

    #[test]
    fn test_not_an_archive() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.aot");
        std::fs::write(&bogus, "definitely not a zip").unwrap();
        assert!(matches!(
            unpack_aot(&bogus),
            Err(AotError::Unzip { .. })
        ));
    }

    #[test]
    fn test_missing_archive() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            unpack_aot(&dir.path().join("nope.aot")),
            Err(AotError::Io { .. })
        ));
    }
}
