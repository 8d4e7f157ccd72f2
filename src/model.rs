//! The in-memory summary of an AOT archive.
//!
//! Everything here is built once from the archive's XML and never changed
//! afterwards; [`ProjectBuilder`] is the only way to put a [`Project`]
//! together.

use std::{collections::HashSet, fmt, path::Path};

use hifitime::Duration;
use log::debug;
use vec1::Vec1;

use crate::AotError;

/// Stored as a window's effective bandwidth when its unit isn't understood.
pub const UNHANDLED_BANDWIDTH_MHZ: f64 = -9999.999;

/// Effective channel counts that only the TDM correlator modes produce.
const TDM_CHANNEL_COUNTS: [&str; 2] = ["128", "124"];

#[derive(Debug, Clone)]
pub struct Project {
    pub code: String,

    /// Ordered by the index embedded in each SchedBlock file name.
    pub blocks: Vec<ScheduleBlock>,
}

/// Everything the renderer needs: the project plus any anomalies found while
/// reading it.
#[derive(Debug, Clone)]
pub struct Report {
    pub project: Project,
    pub diagnostics: Vec<Diagnostic>,
}

/// A recoverable anomaly. The affected value has been replaced with a sentinel
/// and the user needs to check it by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The name of the scheduling block this came from.
    pub block: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.block, self.message)
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleBlock {
    /// Unique within a project. The trailing characters also say which array
    /// and correlator the block is for; see [`ArrayConfig`].
    pub name: String,

    /// In document order.
    pub sources: Vec<Source>,

    /// The receiver band, e.g. "3" for "ALMA_RB_03".
    pub band: String,

    pub correlator: CorrelatorFamily,

    /// Taken from the first spectral window of the first baseband.
    pub polarization: PolarizationState,

    /// In document order; baseband `i` here has index `i + 1`.
    pub basebands: Vec<Baseband>,

    /// The integration time per source.
    pub integration_time: Duration,

    pub execution_count: f64,

    /// Integration time multiplied by the number of sources \[minutes\].
    pub time_per_execution_minutes: f64,

    /// Time per execution multiplied by the execution count \[minutes\].
    pub time_on_source_total_minutes: f64,
}

impl ScheduleBlock {
    pub fn array_config(&self) -> ArrayConfig {
        ArrayConfig::from_block_name(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,

    /// Sexagesimal, or [`crate::coords::UNHANDLED_COORDINATE`].
    pub ra: String,

    /// Sexagesimal, or [`crate::coords::UNHANDLED_COORDINATE`].
    pub dec: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelatorFamily {
    /// The 64-input baseline correlator used by the 12m array.
    Baseline,

    /// The ACA correlator used by the 7m array.
    Aca,
}

impl CorrelatorFamily {
    /// The prefix the SchedBlock schema puts on this correlator's element
    /// names.
    pub fn element_prefix(self) -> &'static str {
        match self {
            CorrelatorFamily::Baseline => "BL",
            CorrelatorFamily::Aca => "ACA",
        }
    }

    /// e.g. "SpectralWindow" -> "BLSpectralWindow".
    pub fn qualify(self, element: &str) -> String {
        format!("{}{element}", self.element_prefix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarizationState {
    Single,
    Double,
    Full,
    Unknown,
}

impl PolarizationState {
    /// Map a spectral window's `polnProducts` attribute. Anything unexpected is
    /// `None`.
    pub fn from_poln_products(products: &str) -> Option<PolarizationState> {
        match products {
            "XX" => Some(PolarizationState::Single),
            "XX,YY" => Some(PolarizationState::Double),
            "XX,YY,XY,YX" => Some(PolarizationState::Full),
            _ => None,
        }
    }
}

impl fmt::Display for PolarizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PolarizationState::Single => "Single",
            PolarizationState::Double => "Double",
            PolarizationState::Full => "Full",
            PolarizationState::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisionMode {
    Tdm,
    Fdm,
}

impl DivisionMode {
    /// TDM and FDM are told apart by the literal effective channel count.
    pub fn classify(effective_num_channels: &str) -> DivisionMode {
        if TDM_CHANNEL_COUNTS.contains(&effective_num_channels) {
            DivisionMode::Tdm
        } else {
            DivisionMode::Fdm
        }
    }
}

impl fmt::Display for DivisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivisionMode::Tdm => write!(f, "TDM"),
            DivisionMode::Fdm => write!(f, "FDM"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectralWindow {
    pub division_mode: DivisionMode,

    /// \[MHz\]. [`UNHANDLED_BANDWIDTH_MHZ`] if the unit wasn't understood.
    pub bandwidth_mhz: f64,

    /// \[GHz\]. Only present if the window has a spectral line.
    pub rest_frequency_ghz: Option<f64>,

    pub num_channels: u32,

    /// Never 0.
    pub averaging_factor: u32,
}

impl SpectralWindow {
    /// The number of channels left after spectral averaging.
    pub fn averaged_channels(&self) -> u32 {
        self.num_channels / self.averaging_factor
    }
}

/// One baseband and its spectral windows. Keeping each window's values together
/// means the per-window sequences can't drift out of alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseband {
    /// 1-based, in document order.
    pub index: usize,

    pub windows: Vec1<SpectralWindow>,
}

impl Baseband {
    pub fn division_modes(&self) -> impl Iterator<Item = DivisionMode> + '_ {
        self.windows.iter().map(|w| w.division_mode)
    }

    pub fn bandwidths_mhz(&self) -> impl Iterator<Item = f64> + '_ {
        self.windows.iter().map(|w| w.bandwidth_mhz)
    }

    pub fn rest_frequencies_ghz(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.windows.iter().map(|w| w.rest_frequency_ghz)
    }

    pub fn channel_counts(&self) -> impl Iterator<Item = u32> + '_ {
        self.windows.iter().map(|w| w.num_channels)
    }

    pub fn averaging_factors(&self) -> impl Iterator<Item = u32> + '_ {
        self.windows.iter().map(|w| w.averaging_factor)
    }
}

/// The array and correlator a block targets, read off the end of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayConfig {
    /// 12m array, baseline correlator, extended configuration ("...TE").
    TwelveMetreExtended,

    /// 12m array, baseline correlator, compact configuration ("...TC").
    TwelveMetreCompact,

    /// 7m array, ACA correlator ("...7M").
    SevenMetre,

    Unrecognised,
}

impl ArrayConfig {
    pub fn from_block_name(name: &str) -> ArrayConfig {
        if name.ends_with("TE") {
            ArrayConfig::TwelveMetreExtended
        } else if name.ends_with("TC") {
            ArrayConfig::TwelveMetreCompact
        } else if name.ends_with("7M") {
            ArrayConfig::SevenMetre
        } else {
            ArrayConfig::Unrecognised
        }
    }
}

/// Folds per-block results into a [`Report`], keeping them in the order they
/// are pushed and refusing a second block with the same name.
#[derive(Debug)]
pub struct ProjectBuilder {
    code: String,
    blocks: Vec<ScheduleBlock>,
    names: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl ProjectBuilder {
    pub fn new(code: String) -> ProjectBuilder {
        ProjectBuilder {
            code,
            blocks: vec![],
            names: HashSet::new(),
            diagnostics: vec![],
        }
    }

    /// Add the next block. `file` is only used to say where a duplicate came
    /// from.
    pub fn push_block(
        &mut self,
        file: &Path,
        block: ScheduleBlock,
        diagnostics: Vec<Diagnostic>,
    ) -> Result<(), AotError> {
        if !self.names.insert(block.name.clone()) {
            return Err(AotError::DuplicateBlockName {
                file: file.to_path_buf(),
                name: block.name,
            });
        }
        debug!(
            "Adding block {} ({} diagnostics)",
            block.name,
            diagnostics.len()
        );
        self.blocks.push(block);
        self.diagnostics.extend(diagnostics);
        Ok(())
    }

    pub fn build(self) -> Report {
        Report {
            project: Project {
                code: self.code,
                blocks: self.blocks,
            },
            diagnostics: self.diagnostics,
        }
    }
}
