//! Asset handles - copyable references to entries in a [`Content`](crate::Content) cache.
//!
//! Handles use generational slots, so a handle to a destroyed entry never
//! resolves to whatever reuses its storage.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use strata_core::alloc::sparse_set::IndexSlot;

use crate::asset::{AssetKind, AssetType};

/// A typed handle to a cached asset.
pub struct Handle<T: AssetKind> {
    slot: IndexSlot,
    _marker: PhantomData<fn() -> T>,
}

impl<T: AssetKind> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("type", &T::TYPE)
            .field("index", &self.slot.index())
            .field("generation", &self.slot.generation())
            .finish()
    }
}

impl<T: AssetKind> Handle<T> {
    pub(crate) fn new(slot: IndexSlot) -> Self {
        Self {
            slot,
            _marker: PhantomData,
        }
    }

    pub(crate) fn slot(&self) -> IndexSlot {
        self.slot
    }

    pub fn untyped(self) -> UntypedHandle {
        UntypedHandle::new(self.slot, T::TYPE)
    }
}

impl<T: AssetKind> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: AssetKind> Copy for Handle<T> {}

impl<T: AssetKind> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl<T: AssetKind> Eq for Handle<T> {}

impl<T: AssetKind> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
    }
}

/// A handle whose kind is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UntypedHandle {
    slot: IndexSlot,
    kind: AssetType,
}

impl UntypedHandle {
    pub(crate) fn new(slot: IndexSlot, kind: AssetType) -> Self {
        Self { slot, kind }
    }

    pub(crate) fn slot(&self) -> IndexSlot {
        self.slot
    }

    pub fn kind(&self) -> AssetType {
        self.kind
    }

    /// Convert to a typed handle if the kind matches.
    pub fn typed<T: AssetKind>(self) -> Option<Handle<T>> {
        (self.kind == T::TYPE).then(|| Handle::new(self.slot))
    }
}

impl<T: AssetKind> From<Handle<T>> for UntypedHandle {
    fn from(handle: Handle<T>) -> Self {
        handle.untyped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::Shader;
    use crate::texture::Texture;

    #[test]
    fn test_typed_conversion() {
        let untyped = UntypedHandle::new(IndexSlot::new(0, 3), AssetType::Texture);
        let typed = untyped.typed::<Texture>().unwrap();
        assert_eq!(typed.untyped(), untyped);
        assert!(untyped.typed::<Shader>().is_none());
    }

    #[test]
    fn test_handle_equality_includes_generation() {
        let a = Handle::<Texture>::new(IndexSlot::new(0, 1));
        let b = Handle::<Texture>::new(IndexSlot::new(1, 1));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
