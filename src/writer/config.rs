//! Writer configuration
//!
//! Controls allocation, nesting limits, default elision and how strictly the writer reacts to
//! leaked scratch memory. None of the options change the format itself; every configuration
//! produces bytes any conformant reader accepts.

/// Configuration for a [`crate::FlatWriter`] encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterConfig {
    /// Initial capacity in bytes for buffers created by the convenience entry points
    pub initial_capacity: usize,

    /// Maximum number of simultaneously open table/vector scopes (default: 64)
    pub max_depth: usize,

    /// Write scalars even when they equal their schema default (default: true)
    /// When disabled, such scalars are left absent and readers fall back to the default
    pub force_defaults: bool,

    /// Return [`crate::Error::ScratchLeak`] instead of only logging when the front extent
    /// size differs before and after a top-level encode
    pub fail_on_scratch_leak: bool,

    /// Optional 4-byte file identifier stored right after the root reference
    pub file_identifier: Option<[u8; 4]>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            max_depth: 64,
            force_defaults: true,
            fail_on_scratch_leak: false,
            file_identifier: None,
        }
    }
}

impl WriterConfig {
    /// Creates a configuration that turns every diagnostic into an error
    #[must_use]
    pub fn strict() -> Self {
        Self {
            fail_on_scratch_leak: true,
            ..Self::default()
        }
    }

    /// Creates a configuration producing the smallest output: default-valued scalars are
    /// omitted from their tables
    #[must_use]
    pub fn compact() -> Self {
        Self {
            force_defaults: false,
            ..Self::default()
        }
    }

    /// Returns this configuration with `identifier` as file identifier
    #[must_use]
    pub fn with_identifier(mut self, identifier: [u8; 4]) -> Self {
        self.file_identifier = Some(identifier);
        self
    }
}
