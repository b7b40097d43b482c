use serde::{Deserialize, Serialize};

/// Index of a [`Frame`] in a profile's frame table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub usize);

/// Frame attributes a lookup can match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameField {
    Name,
    File,
    Package,
    Module,
}

/// A single call-stack location.
///
/// Frames are stored once in the profile's frame table and shared by every
/// call tree node and flamegraph frame that refers to the same location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub name: String,
    pub file: Option<String>,
    pub package: Option<String>,
    pub module: Option<String>,
    /// Marks the synthetic root sentinel.
    pub is_root: bool,
    /// Cumulative weight attributed to this frame. Only the root sentinel
    /// accumulates, during flamegraph finalization.
    pub total_weight: f64,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            package: None,
            module: None,
            is_root: false,
            total_weight: 0.0,
        }
    }

    /// The sentinel frame placed at the top of every call tree.
    pub fn root() -> Self {
        Self {
            is_root: true,
            ..Self::new("root")
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Read one of the matchable attributes. Absent optional attributes
    /// read as `None` and never match a query.
    pub fn field(&self, field: FrameField) -> Option<&str> {
        match field {
            FrameField::Name => Some(&self.name),
            FrameField::File => self.file.as_deref(),
            FrameField::Package => self.package.as_deref(),
            FrameField::Module => self.module.as_deref(),
        }
    }
}
