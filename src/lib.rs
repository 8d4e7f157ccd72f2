//! Summarise the scheduling blocks of an ALMA AOT archive: source positions,
//! spectral setups and on-source times, as observers check them before
//! submission.

pub mod archive;
pub mod coords;
pub mod model;
pub mod read;
pub mod write;

mod error;
#[cfg(test)]
mod test_common;

pub use error::*;
pub use model::*;

use std::path::Path;

use log::debug;
use rayon::prelude::*;

use read::{
    obs_project::{discover_sched_blocks, read_project_code, OBS_PROJECT_FILE},
    sched_block::read_sched_block,
};

/// Read an unpacked AOT archive. `dir` must hold an `ObsProject.xml` and any
/// number of `SchedBlock<N>.xml` files.
///
/// Each SchedBlock is read independently (and in parallel); the blocks of the
/// returned [`Report`] are in order of `N`. Any fatal problem with any file
/// fails the whole archive.
pub fn read_aot_dir(dir: &Path) -> Result<Report, AotError> {
    let obs_project = dir.join(OBS_PROJECT_FILE);
    if !obs_project.is_file() {
        return Err(AotError::MissingObsProject(dir.to_path_buf()));
    }
    let code = read_project_code(&obs_project)?;
    debug!("Project code: {code}");

    let files = discover_sched_blocks(dir)?;
    let extracted = files
        .par_iter()
        .map(|file| read_sched_block(file))
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder = ProjectBuilder::new(code);
    for (file, (block, diagnostics)) in files.iter().zip(extracted) {
        builder.push_block(file, block, diagnostics)?;
    }
    let report = builder.build();
    debug!(
        "Read {} blocks with {} diagnostics",
        report.project.blocks.len(),
        report.diagnostics.len()
    );
    Ok(report)
}
