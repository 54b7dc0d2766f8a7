mod chain;
mod dump;
mod table;
mod version;

pub use chain::PointerChain;
pub use dump::{EntryDump, OffsetDump};
pub use table::{Field, OffsetTable, Target};
pub use version::*;
