//! Codec registry: one shared codec per record type.
//!
//! Built once at startup, then handed around behind `Arc` and read from any
//! thread without locking. Registration after that point is a programming
//! error the builder pattern makes unrepresentable.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::{Codec, Schema};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// `get` for a type no one registered. Startup wiring bug, not a data
    /// problem; callers should fail loudly.
    #[error("no codec registered for type '{type_name}'")]
    Unregistered { type_name: &'static str },
}

/// Accumulates codecs during startup.
#[derive(Default)]
pub struct CodecRegistryBuilder {
    codecs: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl CodecRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and register the codec for `T`. Registering the same type
    /// twice replaces the first entry with an identical codec.
    pub fn register<T: Schema>(mut self) -> Self {
        self.codecs
            .insert(TypeId::of::<T>(), Arc::new(Codec::<T>::new()));
        self
    }

    pub fn build(self) -> CodecRegistry {
        CodecRegistry {
            codecs: self.codecs,
        }
    }
}

/// Immutable map from record type to its codec.
pub struct CodecRegistry {
    codecs: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl CodecRegistry {
    pub fn builder() -> CodecRegistryBuilder {
        CodecRegistryBuilder::new()
    }

    pub fn get<T: Schema>(&self) -> Result<Arc<Codec<T>>, RegistryError> {
        self.codecs
            .get(&TypeId::of::<T>())
            .and_then(|codec| Arc::clone(codec).downcast::<Codec<T>>().ok())
            .ok_or(RegistryError::Unregistered {
                type_name: T::TYPE_NAME,
            })
    }

    pub fn contains<T: Schema>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}
