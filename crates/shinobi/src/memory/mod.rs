pub mod layout;
mod process;
mod reader;

#[cfg(test)]
pub mod mock;

pub use process::*;
pub use reader::{ProcessBinding, ProcessProvider, ReadMemory, WriteMemory};

#[cfg(test)]
pub use mock::{MockMemory, MockMemoryBuilder, MockProvider};
