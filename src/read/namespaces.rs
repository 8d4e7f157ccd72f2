//! Root-level namespace declarations.
//!
//! The SchedBlock schema spreads its elements over several namespaces, and the
//! URIs change between Observing Tool releases. Rather than hard-coding them we
//! read whatever the document's root element declares and build qualified names
//! from that.

use std::collections::BTreeMap;

use log::trace;
use quick_xml::{events::Event, name::PrefixDeclaration, Reader};

use crate::NamespaceError;

/// The prefix of the SchedBlock schema, which holds nearly everything we read.
pub const SCHED_BLOCK_PREFIX: &str = "sbl";

/// The prefix of the ObsProject schema; the block's name lives here.
pub const PROJECT_PREFIX: &str = "prj";

/// The prefix of the value-types schema; coordinates live here.
pub const VALUE_PREFIX: &str = "val";

/// Prefix -> URI bindings declared on a document's root element. The default
/// namespace, if declared, has the empty prefix.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Namespaces {
    bindings: BTreeMap<String, String>,
}

impl Namespaces {
    /// Scan `xml` up to and including the first element start tag, collecting
    /// its namespace declarations. Declarations further down the document are
    /// not looked at.
    pub fn scan(xml: &str) -> Result<Namespaces, NamespaceError> {
        let mut reader = Reader::from_str(xml);
        let mut namespaces = Namespaces::default();
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => {
                    // The same attribute twice is tolerated here; only a
                    // conflicting rebinding matters.
                    for attr in e.attributes().with_checks(false) {
                        let attr = attr.map_err(quick_xml::Error::from)?;
                        let prefix = match attr.key.as_namespace_binding() {
                            Some(PrefixDeclaration::Default) => String::new(),
                            Some(PrefixDeclaration::Named(p)) => {
                                String::from_utf8_lossy(p).into_owned()
                            }
                            None => continue,
                        };
                        let uri = attr.unescape_value()?.into_owned();
                        namespaces.bind(prefix, uri)?;
                    }
                    return Ok(namespaces);
                }
                Event::Eof => return Err(NamespaceError::NoRootElement),
                _ => (),
            }
        }
    }

    fn bind(&mut self, prefix: String, uri: String) -> Result<(), NamespaceError> {
        match self.bindings.get(&prefix) {
            Some(existing) if *existing != uri => Err(NamespaceError::Duplicate {
                prefix,
                first: existing.clone(),
                second: uri,
            }),
            Some(_) => Ok(()),
            None => {
                trace!("xmlns:{prefix} = {uri}");
                self.bindings.insert(prefix, uri);
                Ok(())
            }
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(|s| s.as_str())
    }

    /// Like [`Namespaces::get`], but a missing prefix is an error.
    pub fn uri(&self, prefix: &str) -> Result<&str, NamespaceError> {
        self.get(prefix).ok_or_else(|| NamespaceError::Missing {
            prefix: prefix.to_string(),
        })
    }

    /// Resolve the three namespaces a SchedBlock document needs.
    pub fn sched_block(&self) -> Result<SchedBlockNamespaces<'_>, NamespaceError> {
        Ok(SchedBlockNamespaces {
            sbl: self.uri(SCHED_BLOCK_PREFIX)?,
            prj: self.uri(PROJECT_PREFIX)?,
            val: self.uri(VALUE_PREFIX)?,
        })
    }
}

/// The URIs that qualify SchedBlock element names. Pair one of these with a
/// local name to get the `(namespace, name)` a `roxmltree` node is matched
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedBlockNamespaces<'a> {
    /// The primary, working namespace.
    pub sbl: &'a str,
    pub prj: &'a str,
    pub val: &'a str,
}
