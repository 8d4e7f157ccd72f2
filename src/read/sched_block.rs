//! Pull a [`ScheduleBlock`] out of a SchedBlock document.
//!
//! Missing structure (no name, no science setup, no correlator configuration)
//! fails the whole block. Values we can't interpret are swapped for a sentinel
//! and reported as [`Diagnostic`]s so the rest of the summary is still useful.

use std::path::Path;

use hifitime::{Duration, TimeUnits};
use log::{debug, trace, warn};
use roxmltree::{Document, Node};
use vec1::Vec1;

use super::{
    child_elements, element_text, first_child,
    namespaces::{Namespaces, SchedBlockNamespaces},
    parse_element, read_xml, required_attribute, required_child,
};
use crate::{
    coords::{dec_to_sexagesimal, UNHANDLED_COORDINATE},
    model::{
        Baseband, CorrelatorFamily, Diagnostic, DivisionMode, PolarizationState, ScheduleBlock,
        Source, SpectralWindow, UNHANDLED_BANDWIDTH_MHZ,
    },
    AotError, SchedBlockError,
};

/// `sourceName` entries with this text are template placeholders.
const QUERY_SOURCE_NAME: &str = "query";

/// Only the spectral spec whose name contains this is summarised; the others
/// are calibration setups.
const SCIENCE_SETUP_NAME: &str = "Science setup";

/// Read, namespace-scan, parse and extract one SchedBlock file.
pub fn read_sched_block(file: &Path) -> Result<(ScheduleBlock, Vec<Diagnostic>), AotError> {
    debug!("Reading SchedBlock {}", file.display());
    let xml = read_xml(file)?;
    let namespaces = Namespaces::scan(&xml).map_err(|source| AotError::Namespace {
        file: file.to_path_buf(),
        source,
    })?;
    let doc = Document::parse(&xml).map_err(|source| AotError::Xml {
        file: file.to_path_buf(),
        source,
    })?;
    extract_sched_block(doc.root_element(), &namespaces).map_err(|source| AotError::SchedBlock {
        file: file.to_path_buf(),
        source,
    })
}

/// Collects the diagnostics of one block. They reach the user through the
/// rendered summary, so they're only logged at debug level here.
struct DiagnosticLog<'a> {
    block: &'a str,
    entries: Vec<Diagnostic>,
}

impl<'a> DiagnosticLog<'a> {
    fn new(block: &'a str) -> DiagnosticLog<'a> {
        DiagnosticLog {
            block,
            entries: vec![],
        }
    }

    fn push(&mut self, message: String) {
        debug!("{}: {message}", self.block);
        self.entries.push(Diagnostic {
            block: self.block.to_string(),
            message,
        });
    }
}

/// Extract a block from the root element of a parsed SchedBlock document.
/// `namespaces` must be the root's declarations, as found by
/// [`Namespaces::scan`].
pub fn extract_sched_block(
    root: Node,
    namespaces: &Namespaces,
) -> Result<(ScheduleBlock, Vec<Diagnostic>), SchedBlockError> {
    let ns = namespaces.sched_block()?;

    let name = first_child(root, ns.prj, "name")
        .map(|n| element_text(n).to_string())
        .ok_or(SchedBlockError::MissingName)?;
    debug!("SchedBlock name: {name}");
    let mut diagnostics = DiagnosticLog::new(&name);

    let sources = read_sources(root, &ns, &mut diagnostics)?;
    let setup = read_spectral_setup(root, &ns, &mut diagnostics)?;
    let timing = read_timing(root, &ns, sources.len(), &mut diagnostics)?;

    let diagnostics = diagnostics.entries;
    let block = ScheduleBlock {
        name,
        sources,
        band: setup.band,
        correlator: setup.correlator,
        polarization: setup.polarization,
        basebands: setup.basebands,
        integration_time: timing.integration_time,
        execution_count: timing.execution_count,
        time_per_execution_minutes: timing.time_per_execution_minutes,
        time_on_source_total_minutes: timing.time_on_source_total_minutes,
    };
    Ok((block, diagnostics))
}

fn read_sources(
    root: Node,
    ns: &SchedBlockNamespaces,
    diagnostics: &mut DiagnosticLog,
) -> Result<Vec<Source>, SchedBlockError> {
    let mut sources = vec![];
    for field in child_elements(root, ns.sbl, "FieldSource") {
        for source_name in child_elements(field, ns.sbl, "sourceName") {
            let source_name = element_text(source_name);
            if source_name == QUERY_SOURCE_NAME {
                continue;
            }
            // Not filtered on, but handy when reading trace output.
            let field_name = first_child(field, ns.sbl, "name").map(element_text);
            trace!("Source {source_name} (field {field_name:?})");

            let coords = required_child(field, ns.sbl, "sourceCoordinates")?;
            let longitude = required_child(coords, ns.val, "longitude")?;
            let latitude = required_child(coords, ns.val, "latitude")?;
            let lng_unit = required_attribute(longitude, "unit")?;
            let lat_unit = required_attribute(latitude, "unit")?;

            let (ra, dec) = if lng_unit == "deg" && lat_unit == "deg" {
                dec_to_sexagesimal(parse_element(longitude)?, parse_element(latitude)?)
            } else {
                diagnostics.push(format!(
                    "don't know how to handle '{lng_unit}' or '{lat_unit}' as a unit for the coordinates of source '{source_name}'; look for RA={UNHANDLED_COORDINATE} Dec={UNHANDLED_COORDINATE}"
                ));
                (
                    UNHANDLED_COORDINATE.to_string(),
                    UNHANDLED_COORDINATE.to_string(),
                )
            };
            sources.push(Source {
                name: source_name.to_string(),
                ra,
                dec,
            });
        }
    }
    Ok(sources)
}

struct SpectralSetup {
    band: String,
    correlator: CorrelatorFamily,
    polarization: PolarizationState,
    basebands: Vec<Baseband>,
}

fn read_spectral_setup(
    root: Node,
    ns: &SchedBlockNamespaces,
    diagnostics: &mut DiagnosticLog,
) -> Result<SpectralSetup, SchedBlockError> {
    let mut science_specs = child_elements(root, ns.sbl, "SpectralSpec")
        .into_iter()
        .filter(|spec| {
            child_elements(*spec, ns.sbl, "name")
                .into_iter()
                .any(|n| element_text(n).contains(SCIENCE_SETUP_NAME))
        });
    let spec = science_specs
        .next()
        .ok_or(SchedBlockError::NoScienceSetup)?;
    if science_specs.next().is_some() {
        warn!(
            "{}: more than one science SpectralSpec; only the first is used",
            diagnostics.block
        );
    }

    let frequency_setup = required_child(spec, ns.sbl, "FrequencySetup")?;
    let receiver_band = required_attribute(frequency_setup, "receiverBand")?;
    // "ALMA_RB_03" -> "03"
    let band = receiver_band
        .rsplit('_')
        .next()
        .unwrap_or(receiver_band)
        .to_string();

    let (correlator, config) = [CorrelatorFamily::Baseline, CorrelatorFamily::Aca]
        .into_iter()
        .find_map(|family| {
            first_child(spec, ns.sbl, &family.qualify("CorrelatorConfiguration"))
                .map(|config| (family, config))
        })
        .ok_or(SchedBlockError::NoCorrelatorConfiguration)?;
    debug!("Band {band}, {correlator:?} correlator");

    let mut polarization = None;
    let mut basebands = vec![];
    for (i, bb) in child_elements(config, ns.sbl, &correlator.qualify("BaseBandConfig"))
        .into_iter()
        .enumerate()
    {
        let index = i + 1;
        let spws = child_elements(bb, ns.sbl, &correlator.qualify("SpectralWindow"));
        let first_spw = spws
            .first()
            .ok_or(SchedBlockError::EmptyBaseband { index })?;

        // Assumed to be the same across all basebands.
        if polarization.is_none() {
            let products = required_attribute(*first_spw, "polnProducts")?;
            polarization = Some(
                PolarizationState::from_poln_products(products).unwrap_or_else(|| {
                    diagnostics.push(format!(
                        "unrecognised polarisation products '{products}' in baseband {index}; this needs a closer look"
                    ));
                    PolarizationState::Unknown
                }),
            );
        }

        let windows = spws
            .iter()
            .enumerate()
            .map(|(j, spw)| read_spectral_window(*spw, ns, index, j + 1, diagnostics))
            .collect::<Result<Vec<_>, _>>()?;
        let windows = Vec1::try_from_vec(windows)
            .map_err(|_| SchedBlockError::EmptyBaseband { index })?;
        basebands.push(Baseband { index, windows });
    }

    let polarization = polarization.unwrap_or_else(|| {
        diagnostics.push(format!(
            "the {} correlator configuration has no basebands",
            correlator.element_prefix()
        ));
        PolarizationState::Unknown
    });

    Ok(SpectralSetup {
        band,
        correlator,
        polarization,
        basebands,
    })
}

fn read_spectral_window(
    spw: Node,
    ns: &SchedBlockNamespaces,
    baseband: usize,
    window: usize,
    diagnostics: &mut DiagnosticLog,
) -> Result<SpectralWindow, SchedBlockError> {
    let bandwidth = required_child(spw, ns.sbl, "effectiveBandwidth")?;
    let bandwidth_mhz = match required_attribute(bandwidth, "unit")? {
        "GHz" => parse_element::<f64>(bandwidth)? * 1e3,
        "MHz" => parse_element(bandwidth)?,
        unit => {
            diagnostics.push(format!(
                "don't know how to handle '{unit}' as a unit for the effective bandwidth of SPW {window} in baseband {baseband}; look for a bandwidth of {UNHANDLED_BANDWIDTH_MHZ:.3}"
            ));
            UNHANDLED_BANDWIDTH_MHZ
        }
    };

    let num_channels_elem = required_child(spw, ns.sbl, "effectiveNumberOfChannels")?;
    let division_mode = DivisionMode::classify(element_text(num_channels_elem));
    let num_channels = parse_element(num_channels_elem)?;

    let averaging_factor: u32 =
        parse_element(required_child(spw, ns.sbl, "spectralAveragingFactor")?)?;
    if averaging_factor == 0 {
        return Err(SchedBlockError::ZeroAveragingFactor { baseband, window });
    }

    // Windows without a spectral line simply have no rest frequency.
    let rest_frequency_ghz = match first_child(spw, ns.sbl, "SpectralLine") {
        None => None,
        Some(line) => {
            let rest_frequency = required_child(line, ns.sbl, "restFrequency")?;
            match rest_frequency.attribute("unit") {
                None | Some("GHz") => Some(parse_element(rest_frequency)?),
                Some("MHz") => Some(parse_element::<f64>(rest_frequency)? / 1e3),
                Some(unit) => {
                    diagnostics.push(format!(
                        "don't know how to handle '{unit}' as a unit for the rest frequency of SPW {window} in baseband {baseband}"
                    ));
                    None
                }
            }
        }
    };
    trace!(
        "BB {baseband} SPW {window}: {division_mode}, {bandwidth_mhz} MHz, {num_channels} chans / {averaging_factor}, rest {rest_frequency_ghz:?} GHz"
    );

    Ok(SpectralWindow {
        division_mode,
        bandwidth_mhz,
        rest_frequency_ghz,
        num_channels,
        averaging_factor,
    })
}

struct Timing {
    integration_time: Duration,
    execution_count: f64,
    time_per_execution_minutes: f64,
    time_on_source_total_minutes: f64,
}

fn read_timing(
    root: Node,
    ns: &SchedBlockNamespaces,
    num_sources: usize,
    diagnostics: &mut DiagnosticLog,
) -> Result<Timing, SchedBlockError> {
    let params = required_child(root, ns.sbl, "ScienceParameters")?;
    let integration = required_child(params, ns.sbl, "integrationTime")?;
    let value: f64 = parse_element(integration)?;
    let integration_time = match required_attribute(integration, "unit")? {
        "s" => value.seconds(),
        "min" => value.minutes(),
        "h" => value.hours(),
        unit => {
            diagnostics.push(format!(
                "don't know how to handle '{unit}' as a unit for the integration time; assuming minutes"
            ));
            value.minutes()
        }
    };

    let control = required_child(root, ns.sbl, "SchedBlockControl")?;
    let execution_count: f64 = parse_element(required_child(control, ns.sbl, "executionCount")?)?;

    let time_per_execution_minutes = integration_time.to_seconds() / 60.0 * num_sources as f64;
    let time_on_source_total_minutes = execution_count * time_per_execution_minutes;
    debug!(
        "{num_sources} sources x {integration_time} x {execution_count} executions = {time_on_source_total_minutes} min"
    );

    Ok(Timing {
        integration_time,
        execution_count,
        time_per_execution_minutes,
        time_on_source_total_minutes,
    })
}
