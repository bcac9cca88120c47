//! Unifying radio protocol: frame buffer, checksum, report types and the
//! frame classifier.

pub mod checksum;
pub mod classify;
pub mod frame;
pub mod report;

pub use checksum::{checksum, update_checksum, validate_checksum};
pub use classify::{classify, Classification};
pub use frame::{Frame, FrameError, MAX_PAYLOAD_LEN};
pub use report::ReportType;
