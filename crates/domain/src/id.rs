//! Typed identifier newtypes backed by the platform's string ids.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Access the inner identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Domain-qualified identifier of an [`Entity`](crate::entity::Entity),
    /// e.g. `light.kitchen_main`.
    EntityId
);

define_id!(
    /// Identifier of a [`Device`](crate::device::Device).
    DeviceId
);

define_id!(
    /// Identifier of an [`Area`](crate::area::Area).
    AreaId
);

define_id!(
    /// Identifier of a [`Floor`](crate::area::Floor).
    FloorId
);

impl EntityId {
    /// The domain prefix (`light` in `light.kitchen_main`).
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.0.split_once('.').map(|(domain, _)| domain)
    }

    /// The object id (`kitchen_main` in `light.kitchen_main`).
    ///
    /// Falls back to the whole identifier when it is not domain-qualified.
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map_or(&self.0, |(_, object)| object)
    }
}
