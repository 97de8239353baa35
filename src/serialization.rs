//! Persistence of fitted parameters.
//!
//! Fitted blueprints and models expose a plain parameter representation
//! (numbers, names, levels) that is encoded with bincode. Nothing
//! workflow-specific is stored; a trained workflow is reassembled from its
//! loaded parts with [`Workflow::from_fitted`](crate::workflow::Workflow::from_fitted).

use crate::error::SerializationError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// A parameter representation that can be encoded to and decoded from bytes.
///
/// Implementors should contain only plain data (vectors, scalars, strings).
pub trait SerializableParams: Sized {
    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, SerializationError>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError>;
}

impl<T> SerializableParams for T
where
    T: Serialize + DeserializeOwned,
{
    fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        Ok(bincode::serialize(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// A fitted object that can be saved and restored through its parameters.
///
/// # Guarantees
/// - `extract_params()` followed by `from_params()` reproduces an equivalent object.
pub trait Persistable: Sized {
    /// Serializable representation of the fitted state.
    type Params: SerializableParams;

    /// Extract fitted state as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Rebuild from parameters, validating their consistency.
    fn from_params(params: Self::Params) -> Result<Self, SerializationError>;

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SerializationError> {
        let bytes = self.extract_params().to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SerializationError> {
        let bytes = std::fs::read(path)?;
        Self::from_params(Self::Params::from_bytes(&bytes)?)
    }
}
