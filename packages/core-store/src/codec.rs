//! The serialization seam between typed records and repository blobs.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::CodecError;

/// Converts records to and from the byte encoding a repository stores.
///
/// The trait is object-safe so engines can hold `Box<dyn Codec>` and callers
/// can swap the encoding per store instance. The decode side hands back an
/// erased deserializer rather than a concrete type; pair it with
/// [`decode_with`] for typed reads.
pub trait Codec: Send + Sync {
    /// Encode a record into bytes.
    fn encode(&self, record: &dyn erased_serde::Serialize) -> Result<Bytes, CodecError>;

    /// Build a deserializer over a stored blob.
    fn decoder(
        &self,
        bytes: &[u8],
    ) -> Result<Box<dyn erased_serde::Deserializer<'static>>, CodecError>;
}

/// Decode a blob into a concrete record type through a codec.
pub fn decode_with<T: DeserializeOwned>(codec: &dyn Codec, bytes: &[u8]) -> Result<T, CodecError> {
    let mut deserializer = codec.decoder(bytes)?;
    erased_serde::deserialize(&mut *deserializer).map_err(|e| CodecError::Decode {
        message: e.to_string(),
    })
}

/// The default codec: self-describing JSON via `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode(&self, record: &dyn erased_serde::Serialize) -> Result<Bytes, CodecError> {
        serde_json::to_vec(record)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode {
                message: e.to_string(),
            })
    }

    fn decoder(
        &self,
        bytes: &[u8],
    ) -> Result<Box<dyn erased_serde::Deserializer<'static>>, CodecError> {
        // Parse to an owned value first so the deserializer borrows nothing.
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
                message: e.to_string(),
            })?;
        Ok(Box::new(<dyn erased_serde::Deserializer>::erase(value)))
    }
}

impl<T: Codec + ?Sized> Codec for Box<T> {
    fn encode(&self, record: &dyn erased_serde::Serialize) -> Result<Bytes, CodecError> {
        self.as_ref().encode(record)
    }

    fn decoder(
        &self,
        bytes: &[u8],
    ) -> Result<Box<dyn erased_serde::Deserializer<'static>>, CodecError> {
        self.as_ref().decoder(bytes)
    }
}
