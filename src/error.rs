use thiserror::Error;

macro_rules! contract_error {
    // Single literal version, may capture identifiers inline
    ($msg:literal) => {
        crate::Error::ContractViolation {
            message: format!($msg),
            file: file!(),
            line: line!(),
        }
    };

    // Single message version
    ($msg:expr) => {
        crate::Error::ContractViolation {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::ContractViolation {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Encoding is deterministic and performs no I/O, so every variant describes a logical defect:
/// either in the per-type serialization code driving the [`crate::FlatWriter`], or in the
/// caller's use of the scope API. None of them are transient and none should be retried.
///
/// # Error Categories
///
/// ## Buffer Access Errors
/// - [`Error::OutOfBounds`] - Attempted to read or write beyond a buffer extent
/// - [`Error::ReferenceOutOfBounds`] - A reference target lies beyond the finished region
///
/// ## Contract Errors
/// - [`Error::ContractViolation`] - The writer was driven in a way the format cannot express
/// - [`Error::DepthLimit`] - Nested tables/vectors exceeded the configured depth
/// - [`Error::ScratchLeak`] - Temporary ledger memory survived a top-level encode
///
/// # Examples
///
/// ```rust
/// use flatscope::{Error, InwardBuffer};
///
/// let mut buffer = InwardBuffer::new();
/// match buffer.erase_front(4) {
///     Err(Error::OutOfBounds) => println!("nothing to erase"),
///     Err(e) => println!("Other error: {}", e),
///     Ok(()) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An out of bound access was attempted on one of the buffer extents.
    ///
    /// This is the bounds-check failure of the primitive I/O helpers and of the
    /// [`crate::InwardBuffer`] position accessors.
    #[error("Out of Bound access would have occurred!")]
    OutOfBounds,

    /// The writer was used in a way that breaks the format's layout rules.
    ///
    /// Covers unbalanced or crossed `start_*`/`end_*` scopes, invalid field offsets,
    /// values that do not fit the format's 16/32-bit fields and fields written twice.
    /// The error includes the source location where the violation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated rule
    /// * `file` - Source file where the violation was detected
    /// * `line` - Source line where the violation was detected
    #[error("Contract violation - {file}:{line}: {message}")]
    ContractViolation {
        /// The message to be printed for the violation
        message: String,
        /// The source file in which this violation was detected
        file: &'static str,
        /// The source line in which this violation was detected
        line: u32,
    },

    /// A reference points outside of the already finalized back extent.
    ///
    /// References can only target objects that are completely written; a position
    /// larger than the current back size can never be such an object.
    #[error("Reference to back position {reference} exceeds the finished region of {back_size} bytes")]
    ReferenceOutOfBounds {
        /// The offending back position
        reference: u32,
        /// The back extent size at the time of the check
        back_size: usize,
    },

    /// Scratch memory was left behind in the front extent after a top-level encode.
    ///
    /// Only returned when [`crate::WriterConfig::fail_on_scratch_leak`] is set; otherwise the
    /// leak is logged and the (still well-formed) output is returned.
    #[error("Scratch memory leaked - front extent was {before} bytes before encoding, {after} after")]
    ScratchLeak {
        /// Front extent size before the encode started
        before: usize,
        /// Front extent size after the encode finished
        after: usize,
    },

    /// Nesting limit reached.
    ///
    /// The associated value shows the depth limit that was reached.
    #[error("Reach the maximum nesting depth allowed - {0}")]
    DepthLimit(usize),
}
