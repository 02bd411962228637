//! JPEG output: encoding plus byte-level metadata injection.
//!
//! - [`encoder`] turns the composited canvas into JPEG bytes
//! - [`segment`] splices a marker segment right after SOI
//! - [`metadata`] builds the copyright/keyword comment and embeds it

pub mod encoder;
pub mod metadata;
pub mod segment;

pub use encoder::{encode_jpeg, EncodedImage};
pub use metadata::{build_comment, inject_metadata, is_branded};
pub use segment::{inject_comment, insert_segment_after_soi, leading_comment, COM_MARKER, SOI};
