mod macros;

pub mod error;
pub mod cursor;
pub mod compact;
pub mod traits;
pub mod value;
pub mod codec;
pub mod registry;

pub use error::Result;
pub use error::Error;

pub use cursor::Cursor;
pub use cursor::MAX_DEPTH;

pub use compact::Compact;
pub use compact::CompactInt;

pub use traits::Encode;
pub use traits::Decode;
pub use traits::decode_all;

pub use value::Value;

pub use codec::Codec;
pub use codec::Int;
pub use codec::Variant;
pub use codec::MAX_DYNAMIC_DEPTH;

pub use registry::Registry;
pub use registry::RegistryBuilder;
pub use registry::TypeExpr;
pub use registry::Param;
pub use registry::DEFAULT_CYCLE_BREAKER;
