//! Shared helpers used across the buffer and writer modules.

pub(crate) mod math;

pub(crate) use math::{padding_for, to_u16, to_u32};
