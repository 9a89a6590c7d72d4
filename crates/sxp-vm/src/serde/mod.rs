mod de;
mod ser;

pub use de::{node_from_bytes, node_from_stream};
pub use ser::node_to_bytes;

/// Marker byte introducing a pair: the encodings of `first` and `rest`
/// follow.
pub const CONS_MARKER: u8 = 0xFF;
