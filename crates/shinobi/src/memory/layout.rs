//! Memory layout constants for Sekiro data structures
//!
//! Widths and field positions shared by the toggle and position code.

/// Size of a pointer in the 64-bit target process
pub const POINTER_SIZE: usize = 8;

/// Preferred image base of sekiro.exe; the historical absolute addresses
/// (e.g. `0x1439007C8`) are relative to this
pub const DEFAULT_IMAGE_BASE: u64 = 0x1_4000_0000;

/// Flag words
pub mod flag {
    /// Flags live in 32-bit words
    pub const WORD: usize = 4;

    /// Only the least significant bit carries the toggle
    pub const BIT: u32 = 0b1;
}

/// Player position (three consecutive f32 values at the end of the chain)
pub mod position {
    pub const COMPONENT: u64 = 4;

    pub const X: u64 = 0;
    pub const Y: u64 = COMPONENT;
    pub const Z: u64 = COMPONENT * 2;
}

/// Quitout trigger
pub mod quitout {
    /// Writing this byte requests a return to the title screen
    pub const TRIGGER: u8 = 1;
}
