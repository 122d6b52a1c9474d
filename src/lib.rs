/// Bit-granular reader/writer and the variable-length integer coding.
pub mod bitstream;
/// Data model: Bundle, Value, Date.
pub mod bundle;
/// Binary marshal/unmarshal with per-call key dictionary.
pub mod codec;
/// Decoder resource limits.
pub mod config;
/// Value kinds and their prefix-code type tags.
pub mod field_type;
/// `tracing` subscriber setup (filters, formats).
pub mod logging;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Errors and result type shared by every codec call.
pub use bitbundle_error::{CodecError, CodecResult, StackError, StatusCode};
/// Bit-level primitives.
pub use bitstream::{BitReader, BitWriter, VarInt};
/// Bundle and its values.
pub use bundle::{Bundle, Date, FieldValue, Value};
/// Encode / decode entry points.
pub use codec::{marshal, unmarshal, Marshaller, Unmarshaller};
/// Codec limits.
pub use config::CodecConfig;
/// Type taxonomy.
pub use field_type::{FieldType, Shape, FIELD_TYPES};
/// Logging setup.
pub use logging::{init_logging, LogFormat, LoggingConfig};
