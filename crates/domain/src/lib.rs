#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

macro_rules! uuid_id {
    ($name: ident) => {
        #[derive(
            derive_more::Deref, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord,
        )]
        pub struct $name(uuid::Uuid);

        impl $name {
            #[must_use]
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            #[must_use]
            pub fn nil() -> Self {
                Self(uuid::Uuid::nil())
            }

            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<u128> for $name {
            fn from(value: u128) -> Self {
                Self(uuid::Uuid::from_bytes(value.to_be_bytes()))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

mod error;
mod exercise;
pub mod statistics;
mod training_log;
mod training_session;

pub use error::*;
pub use exercise::*;
pub use training_log::*;
pub use training_session::*;
