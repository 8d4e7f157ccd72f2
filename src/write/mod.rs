//! Turn a [`Report`] into the plain-text summary observers compare against the
//! Observing Tool.

use std::fmt::{self, Write};

use itertools::Itertools;

use crate::{ArrayConfig, Report, ScheduleBlock};

/// Render the whole summary. Diagnostics, if any, are listed at the end so
/// they can be matched against sentinel values in the table.
pub fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    // Writing into a String can't fail.
    let _ = write_summary(&mut out, report);
    out
}

fn write_summary(out: &mut String, report: &Report) -> fmt::Result {
    let project = &report.project;
    writeln!(out, "Scheduling Block Info for {}", project.code)?;
    if project.blocks.len() > 1 {
        writeln!(
            out,
            "Includes SBs: {}",
            project.blocks.iter().map(|b| b.name.as_str()).join(", ")
        )?;
    }
    writeln!(out)?;

    let mixed = mixed_configurations(&project.blocks);
    for block in &project.blocks {
        write_block(out, block, mixed)?;
    }

    if !report.diagnostics.is_empty() {
        writeln!(out, "Warnings:")?;
        for diagnostic in &report.diagnostics {
            writeln!(out, "  {diagnostic}")?;
        }
    }
    Ok(())
}

/// Do the 12m blocks use both extended and compact configurations?
fn mixed_configurations(blocks: &[ScheduleBlock]) -> bool {
    let any = |config: ArrayConfig| blocks.iter().any(|b| b.array_config() == config);
    any(ArrayConfig::TwelveMetreExtended) && any(ArrayConfig::TwelveMetreCompact)
}

/// The "Array and Correlator" line for a block.
fn array_line(config: ArrayConfig, mixed: bool) -> &'static str {
    match (config, mixed) {
        (ArrayConfig::TwelveMetreExtended, false) | (ArrayConfig::TwelveMetreCompact, false) => {
            "Array and Correlator: 12m, Baseline Correlator"
        }
        (ArrayConfig::TwelveMetreExtended, true) => {
            "Array and Correlator: 12m extended, Baseline Correlator"
        }
        (ArrayConfig::TwelveMetreCompact, true) => {
            "Array and Correlator: 12m compact, Baseline Correlator"
        }
        (ArrayConfig::SevenMetre, _) => "Array and Correlator: 7m, ACA Correlator",
        (ArrayConfig::Unrecognised, _) => {
            "WARNING: could not determine array and correlator from SB name."
        }
    }
}

fn write_block(out: &mut String, block: &ScheduleBlock, mixed: bool) -> fmt::Result {
    writeln!(out, "SB name: {}", block.name)?;
    writeln!(out, "{}", array_line(block.array_config(), mixed))?;

    match block.sources.as_slice() {
        [source] => {
            writeln!(out, "Source: {}", source.name)?;
            writeln!(out, "Position: RA={} Dec={}", source.ra, source.dec)?;
        }
        sources => {
            writeln!(out, "Sources:")?;
            for source in sources {
                writeln!(out, "  {}, RA={} Dec={}", source.name, source.ra, source.dec)?;
            }
        }
    }

    writeln!(
        out,
        "Correlator modes for Band {} basebands: {}, {} pol.",
        block.band,
        block
            .basebands
            .iter()
            .map(|bb| bb.windows.first().division_mode)
            .join("/"),
        block.polarization
    )?;

    // With one SPW per baseband the SPWs are numbered straight through;
    // otherwise they're grouped under their baseband.
    let one_spw_each = block.basebands.iter().all(|bb| bb.windows.len() == 1);
    let mut spw_num = 0;
    for bb in &block.basebands {
        let indent = if one_spw_each {
            ""
        } else {
            writeln!(out, "BB_{}:", bb.index)?;
            "  "
        };
        for (j, spw) in bb.windows.iter().enumerate() {
            let num = if one_spw_each {
                spw_num += 1;
                spw_num
            } else {
                j + 1
            };
            let rest = match spw.rest_frequency_ghz {
                Some(f) => format!("{f:.2} GHz"),
                None => "n/a".to_string(),
            };
            writeln!(
                out,
                "{indent}SPW{num}: rest freq: {rest}, effective bandwidth: {:.3} MHz, {} channels",
                spw.bandwidth_mhz,
                spw.averaged_channels()
            )?;
        }
    }

    writeln!(
        out,
        "{:.1} mins on source per execution, {:.1} mins on source total",
        round_to_tenth(block.time_per_execution_minutes),
        round_to_tenth(block.time_on_source_total_minutes)
    )?;
    writeln!(out)
}

/// Round to one decimal place with halves going away from zero (0.25 -> 0.3);
/// `{:.1}` alone would give 0.2.
fn round_to_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
