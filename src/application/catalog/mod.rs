//! Tool catalog and the schema adapter that turns it into function declarations.

mod adapter;
mod fallback;

pub use adapter::{SchemaAdapter, sanitize_schema};
pub use fallback::{FallbackTable, ParameterKind, ParameterShape, ParameterSpec};

use crate::types::ToolDescriptor;

/// The tools a session currently exposes, in provider order with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Builds a catalog; a repeated name replaces the earlier entry in place.
    pub fn new(descriptors: Vec<ToolDescriptor>) -> Self {
        let mut tools: Vec<ToolDescriptor> = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            match tools.iter_mut().find(|tool| tool.name == descriptor.name) {
                Some(existing) => *existing = descriptor,
                None => tools.push(descriptor),
            }
        }
        Self { tools }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name.as_str()).collect()
    }

    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
