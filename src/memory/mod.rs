//! Index-addressed storage shared by the forest and the constructor.
//!
//! Values are addressed by small copyable newtype indices instead of
//! references, so that parent and child links never form ownership cycles.
pub mod arena;
pub mod map;

pub use arena::Arena;
pub use map::SecondaryMap;

/// A copyable index into one of the containers in this module.
pub trait EntityIndex: Copy + Eq + Ord + Default {
    /// Creates an index from a `usize`.
    ///
    /// # Panics
    ///
    /// Panics when `index` does not fit into the backing integer type.
    fn new(index: usize) -> Self {
        match Self::try_new(index) {
            Some(index) => index,
            None => panic!("entity index {index} out of range"),
        }
    }

    fn try_new(index: usize) -> Option<Self>;
    fn index(self) -> usize;
}

/// Macro which provides the [`EntityIndex`] implementation of a newtype index.
///
/// Based on [`cranelift_entity`'s `entity_impl!`](https://docs.rs/cranelift-entity/0.89.2/cranelift_entity/macro.entity_impl.html)
#[macro_export]
macro_rules! entity_impl {
    ($entity:ident, $backing:ty) => {
        impl $crate::memory::EntityIndex for $entity {
            #[inline(always)]
            fn try_new(ix: usize) -> Option<Self> {
                if ix <= (<$backing>::MAX as usize) || (<$backing>::BITS) > usize::BITS {
                    Some($entity(ix as $backing))
                } else {
                    None
                }
            }

            #[inline(always)]
            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

impl EntityIndex for u32 {
    #[inline(always)]
    fn try_new(ix: usize) -> Option<Self> {
        u32::try_from(ix).ok()
    }

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}
