//! XML fixtures shaped like the documents the Observing Tool writes into an AOT
//! archive.

use std::{fs, path::Path};

pub(crate) const SB_NAMESPACES: &str = r#"xmlns:sbl="Alma/ObsPrep/SchedBlock" xmlns:prj="Alma/ObsPrep/ObsProject" xmlns:val="Alma/ValueTypes" xmlns:ent="Alma/CommonEntity""#;

pub(crate) fn field_source(name: &str, longitude: f64, latitude: f64, unit: &str) -> String {
    format!(
        r#"  <sbl:FieldSource entityPartId="X1" solarSystemObject="Unspecified">
    <sbl:sourceCoordinates system="J2000">
      <val:longitude unit="{unit}">{longitude}</val:longitude>
      <val:latitude unit="{unit}">{latitude}</val:latitude>
    </sbl:sourceCoordinates>
    <sbl:sourceName>{name}</sbl:sourceName>
    <sbl:sourceVelocity referenceSystem="lsrk" dopplerCalcType="RADIO">
      <val:centerVelocity unit="km/s">0.0</val:centerVelocity>
    </sbl:sourceVelocity>
    <sbl:name>Primary:</sbl:name>
  </sbl:FieldSource>
"#
    )
}

#[derive(Debug, Clone)]
pub(crate) struct SpwXml {
    pub(crate) poln_products: &'static str,
    pub(crate) bandwidth: &'static str,
    pub(crate) bandwidth_unit: &'static str,
    pub(crate) channels: &'static str,
    pub(crate) averaging: &'static str,
    pub(crate) rest_frequency: Option<(&'static str, &'static str)>,
}

impl Default for SpwXml {
    fn default() -> Self {
        SpwXml {
            poln_products: "XX,YY",
            bandwidth: "2",
            bandwidth_unit: "GHz",
            channels: "3840",
            averaging: "2",
            rest_frequency: Some(("115.271", "GHz")),
        }
    }
}

impl SpwXml {
    fn to_xml(&self, correlator: &str) -> String {
        let line = match self.rest_frequency {
            Some((value, unit)) => format!(
                r#"
          <sbl:SpectralLine>
            <sbl:restFrequency unit="{unit}">{value}</sbl:restFrequency>
            <sbl:transition>CO v=0 1-0</sbl:transition>
          </sbl:SpectralLine>"#
            ),
            None => String::new(),
        };
        format!(
            r#"        <sbl:{correlator}SpectralWindow polnProducts="{}" sideBandPreference="NoPreference">
          <sbl:effectiveBandwidth unit="{}">{}</sbl:effectiveBandwidth>
          <sbl:effectiveNumberOfChannels>{}</sbl:effectiveNumberOfChannels>
          <sbl:spectralAveragingFactor>{}</sbl:spectralAveragingFactor>{line}
        </sbl:{correlator}SpectralWindow>
"#,
            self.poln_products, self.bandwidth_unit, self.bandwidth, self.channels, self.averaging
        )
    }
}

pub(crate) fn science_spectral_spec(
    name: &str,
    receiver_band: &str,
    correlator: &str,
    basebands: &[Vec<SpwXml>],
) -> String {
    let mut basebands_xml = String::new();
    for (i, spws) in basebands.iter().enumerate() {
        basebands_xml.push_str(&format!(
            "      <sbl:{correlator}BaseBandConfig>\n        <sbl:BaseBandSpecificationRef entityId=\"X1\" partId=\"BB_{}\"/>\n",
            i + 1
        ));
        for spw in spws {
            basebands_xml.push_str(&spw.to_xml(correlator));
        }
        basebands_xml.push_str(&format!("      </sbl:{correlator}BaseBandConfig>\n"));
    }
    format!(
        r#"  <sbl:SpectralSpec entityPartId="X2">
    <sbl:name>{name}</sbl:name>
    <sbl:FrequencySetup receiverBand="{receiver_band}" dopplerReference="lsrk">
      <sbl:restFrequency unit="GHz">100.0</sbl:restFrequency>
    </sbl:FrequencySetup>
    <sbl:{correlator}CorrelatorConfiguration>
      <sbl:integrationDuration unit="s">6.048</sbl:integrationDuration>
{basebands_xml}    </sbl:{correlator}CorrelatorConfiguration>
  </sbl:SpectralSpec>
"#
    )
}

/// A SchedBlock document. The default is a single-source 12m extended block
/// with one FDM window, integrating 120 s per source and executing twice.
#[derive(Debug, Clone)]
pub(crate) struct SchedBlockXml {
    pub(crate) name: &'static str,
    pub(crate) field_sources: Vec<String>,
    pub(crate) spectral_spec_name: &'static str,
    pub(crate) receiver_band: &'static str,
    pub(crate) correlator: &'static str,
    pub(crate) basebands: Vec<Vec<SpwXml>>,
    pub(crate) extra_spectral_specs: Vec<String>,
    pub(crate) integration_time: (&'static str, &'static str),
    pub(crate) execution_count: &'static str,
}

impl Default for SchedBlockXml {
    fn default() -> Self {
        SchedBlockXml {
            name: "Target_TE",
            field_sources: vec![field_source("NGC1234", 180.0, -30.0, "deg")],
            spectral_spec_name: "Science setup",
            receiver_band: "ALMA_RB_03",
            correlator: "BL",
            basebands: vec![vec![SpwXml::default()]],
            extra_spectral_specs: vec![],
            integration_time: ("120", "s"),
            execution_count: "2",
        }
    }
}

impl SchedBlockXml {
    pub(crate) fn to_xml(&self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sbl:SchedBlock {SB_NAMESPACES} schemaVersion=\"13\">\n"
        );
        xml.push_str(&format!("  <prj:name>{}</prj:name>\n", self.name));
        xml.push_str("  <prj:note></prj:note>\n");
        for field in &self.field_sources {
            xml.push_str(field);
        }
        xml.push_str(&science_spectral_spec(
            self.spectral_spec_name,
            self.receiver_band,
            self.correlator,
            &self.basebands,
        ));
        for spec in &self.extra_spectral_specs {
            xml.push_str(spec);
        }
        let (value, unit) = self.integration_time;
        xml.push_str(&format!(
            r#"  <sbl:ScienceParameters entityPartId="X3">
    <sbl:name>Science Parameters</sbl:name>
    <sbl:representativeBandwidth unit="GHz">2.0</sbl:representativeBandwidth>
    <sbl:integrationTime unit="{unit}">{value}</sbl:integrationTime>
  </sbl:ScienceParameters>
  <sbl:SchedBlockControl>
    <sbl:sBMaximumTime unit="h">1.5</sbl:sBMaximumTime>
    <sbl:executionCount>{}</sbl:executionCount>
  </sbl:SchedBlockControl>
</sbl:SchedBlock>
"#,
            self.execution_count
        ));
        xml
    }
}

pub(crate) fn obs_project_xml(code: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<prj:ObsProject xmlns:prj="Alma/ObsPrep/ObsProject" xmlns:val="Alma/ValueTypes" schemaVersion="13">
  <prj:projectName>Molecular gas in NGC1234</prj:projectName>
  <prj:pI>someone</prj:pI>
  <prj:code>{code}</prj:code>
  <prj:version>1</prj:version>
</prj:ObsProject>
"#
    )
}

/// Write an unpacked archive: an ObsProject plus one SchedBlock per entry.
pub(crate) fn write_aot_dir(dir: &Path, code: &str, blocks: &[(&str, String)]) {
    fs::write(dir.join("ObsProject.xml"), obs_project_xml(code)).unwrap();
    for (file_name, xml) in blocks {
        fs::write(dir.join(file_name), xml).unwrap();
    }
}
