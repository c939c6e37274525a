//! Typed identifiers for model graph entities.
//!
//! Every entity in the model graph lives in an arena owned by
//! [`Model`](crate::model::Model) and is referenced by one of these
//! handles. Cross references (supertypes, classifications, association
//! ends, instance links) are ids, never owning pointers, so the graph
//! can contain cycles without cyclic ownership.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an id from a raw arena index.
            #[inline]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw arena index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

arena_id!(
    /// Handle to a [`Package`](crate::model::Package).
    PackageId
);
arena_id!(
    /// Handle to a [`Class`](crate::model::Class).
    ClassId
);
arena_id!(
    /// Handle to an [`Enumeration`](crate::model::Enumeration).
    EnumId
);
arena_id!(
    /// Handle to an [`Association`](crate::model::Association).
    AssociationId
);
arena_id!(
    /// Handle to a [`TestCase`](crate::model::TestCase) instance.
    InstanceId
);
