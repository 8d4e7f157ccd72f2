//! The ObsProject document and the discovery of SchedBlock files.

use std::path::{Path, PathBuf};

use log::{debug, trace};
use roxmltree::Document;

use super::{element_text, read_xml};
use crate::AotError;

pub const OBS_PROJECT_FILE: &str = "ObsProject.xml";

const SCHED_BLOCK_STEM: &str = "SchedBlock";

/// The project code is the text of the first root child whose tag contains
/// "code".
pub fn read_project_code(file: &Path) -> Result<String, AotError> {
    debug!("Reading project code from {}", file.display());
    let xml = read_xml(file)?;
    let doc = Document::parse(&xml).map_err(|source| AotError::Xml {
        file: file.to_path_buf(),
        source,
    })?;
    doc.root_element()
        .children()
        .filter(|c| c.is_element())
        .find(|c| c.tag_name().name().contains("code"))
        .map(|c| element_text(c).to_string())
        .ok_or_else(|| AotError::MissingProjectCode(file.to_path_buf()))
}

/// The index embedded in a SchedBlock file name, i.e. the digits between
/// "SchedBlock" and the next '.', without leading zeros. "SchedBlock012.xml"
/// gives "12". The index may be wider than any integer type.
pub fn sched_block_index(file_name: &str) -> Option<&str> {
    let (_, rest) = file_name.split_once(SCHED_BLOCK_STEM)?;
    let (index, _) = rest.split_once('.')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match index.trim_start_matches('0') {
        "" => Some("0"),
        index => Some(index),
    }
}

/// Sort key comparing indices numerically: with no leading zeros, a shorter
/// index is smaller, and equal-length ones compare digit by digit.
fn index_key(index: &str) -> (usize, String) {
    (index.len(), index.to_string())
}

/// Sort SchedBlock files by their embedded index, numerically.
pub fn order_sched_blocks(files: Vec<PathBuf>) -> Result<Vec<PathBuf>, AotError> {
    let mut indexed = files
        .into_iter()
        .map(|file| {
            let index = file
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(sched_block_index)
                .map(index_key)
                .ok_or_else(|| AotError::BadSchedBlockFilename(file.clone()))?;
            Ok::<_, AotError>((index, file))
        })
        .collect::<Result<Vec<_>, _>>()?;
    indexed.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(indexed.into_iter().map(|(_, file)| file).collect())
}

/// Find every `SchedBlock*.xml` in `dir` and return them in presentation
/// order.
pub fn discover_sched_blocks(dir: &Path) -> Result<Vec<PathBuf>, AotError> {
    let io_err = |source: std::io::Error| AotError::Io {
        file: dir.to_path_buf(),
        source,
    };
    let mut files = vec![];
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_sched_block = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(SCHED_BLOCK_STEM) && n.ends_with(".xml"))
            .unwrap_or(false);
        if is_sched_block && path.is_file() {
            trace!("Found {}", path.display());
            files.push(path);
        }
    }
    let files = order_sched_blocks(files)?;
    debug!("{} SchedBlock files in {}", files.len(), dir.display());
    Ok(files)
}
