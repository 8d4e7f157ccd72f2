//! Errors that stop an archive from being summarised.
//!
//! Anything that can be worked around (odd units, unexpected polarisation
//! products) is not an error; it becomes a [`crate::Diagnostic`] instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NamespaceError {
    #[error("namespace prefix '{prefix}' is bound to both '{first}' and '{second}'")]
    Duplicate {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("no namespace is declared for prefix '{prefix}'")]
    Missing { prefix: String },

    #[error("the document has no root element")]
    NoRootElement,

    #[error("couldn't scan the document for namespace declarations: {0}")]
    Scan(#[from] quick_xml::Error),
}

/// Problems with the contents of a single SchedBlock document. Everything other
/// than [`SchedBlockError::MissingName`] means the block is malformed.
#[derive(Error, Debug)]
pub enum SchedBlockError {
    #[error("the SchedBlock has no name element")]
    MissingName,

    #[error("<{parent}> has no <{element}> element")]
    MissingElement {
        parent: String,
        element: String,
    },

    #[error("<{element}> has no '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    #[error("no SpectralSpec is named as a 'Science setup'")]
    NoScienceSetup,

    #[error("the science SpectralSpec has neither a BL nor an ACA correlator configuration")]
    NoCorrelatorConfiguration,

    #[error("baseband {index} has no spectral windows")]
    EmptyBaseband { index: usize },

    #[error("spectral window {window} of baseband {baseband} has an averaging factor of 0")]
    ZeroAveragingFactor { baseband: usize, window: usize },

    #[error("couldn't parse '{text}' in <{element}> as a number")]
    BadNumber { element: String, text: String },

    #[error(transparent)]
    Namespace(#[from] NamespaceError),
}

#[derive(Error, Debug)]
pub enum AotError {
    #[error("Couldn't find ObsProject.xml in {}", .0.display())]
    MissingObsProject(PathBuf),

    #[error("{}: no project code element under the root", .0.display())]
    MissingProjectCode(PathBuf),

    #[error("{}: couldn't get a SchedBlock index out of the file name", .0.display())]
    BadSchedBlockFilename(PathBuf),

    #[error("{}: a scheduling block named '{name}' was already read", .file.display())]
    DuplicateBlockName { file: PathBuf, name: String },

    #[error("{}: {source}", .file.display())]
    Namespace {
        file: PathBuf,
        source: NamespaceError,
    },

    #[error("{}: {source}", .file.display())]
    SchedBlock {
        file: PathBuf,
        source: SchedBlockError,
    },

    #[error("{}: {source}", .file.display())]
    Xml {
        file: PathBuf,
        source: roxmltree::Error,
    },

    #[error("{}: {source}", .file.display())]
    Io {
        file: PathBuf,
        source: std::io::Error,
    },

    #[error("Couldn't unpack {}: {source}", .archive.display())]
    Unzip {
        archive: PathBuf,
        source: zip::result::ZipError,
    },
}
