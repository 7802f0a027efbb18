//! Wire format serialization/deserialization
//!
//! All integers are little-endian. Byte strings carry a VarInt length prefix.

pub mod block;
pub mod transaction;
pub mod varint;

pub use block::{
    deserialize_block, deserialize_block_header, serialize_block, serialize_block_header,
    BlockParseError, BLOCK_HEADER_SIZE,
};
pub use transaction::{
    deserialize_transaction, serialize_transaction, serialized_output_size,
    serialized_transaction_size, TransactionParseError,
};
pub use varint::{decode_varint, encode_varint, varint_size, write_varint, VarIntError};
