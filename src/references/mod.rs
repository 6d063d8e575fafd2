// Reference extraction: which classes does the compiled output use?

mod bytecode;
mod dot;

pub use bytecode::{extract, extract_api, BytecodeReferences};
pub use dot::{clean_node_name, find_detailed_report, DotGraph, DotReferences};

use std::collections::BTreeSet;

/// Classes referenced by a project's compiled output, in full and
/// restricted to its public API surface
pub trait ReferenceSource {
    fn used_classes(&self) -> &BTreeSet<String>;
    fn api_classes(&self) -> &BTreeSet<String>;
}

/// Reference sets that are already known, e.g. computed elsewhere
#[derive(Debug, Clone, Default)]
pub struct ClassReferences {
    pub used: BTreeSet<String>,
    pub api: BTreeSet<String>,
}

impl ClassReferences {
    pub fn new<I, J, S, T>(used: I, api: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            used: used.into_iter().map(Into::into).collect(),
            api: api.into_iter().map(Into::into).collect(),
        }
    }
}

impl ReferenceSource for ClassReferences {
    fn used_classes(&self) -> &BTreeSet<String> {
        &self.used
    }

    fn api_classes(&self) -> &BTreeSet<String> {
        &self.api
    }
}
