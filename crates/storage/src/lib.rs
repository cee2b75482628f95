#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod key_value;
mod memory;
mod sqlite;

pub use key_value::{Key, KeyValueError, KeyValueStore, Log};
pub use memory::MemoryRepository;
pub use sqlite::{SqliteError, SqliteRepository};

#[cfg(test)]
mod tests {
    pub mod data;
}
