//! Memory access traits.
//!
//! The core never touches a process directly; it goes through these traits so
//! the live Win32 handle and the test mock are interchangeable.

use crate::error::{Error, Result};
use crate::memory::layout::POINTER_SIZE;

/// Read access to a target address space
pub trait ReadMemory {
    /// Read `size` bytes starting at `address`
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Read exactly `N` bytes into a fixed array
    fn read_array<const N: usize>(&self, address: u64) -> Result<[u8; N]> {
        let bytes = self.read_bytes(address, N)?;
        bytes.try_into().map_err(|b: Vec<u8>| Error::MemoryReadFailed {
            address,
            message: format!("short read: expected {} bytes, got {}", N, b.len()),
        })
    }

    fn read_u8(&self, address: u64) -> Result<u8> {
        Ok(self.read_array::<1>(address)?[0])
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array(address)?))
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array(address)?))
    }

    fn read_f32(&self, address: u64) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array(address)?))
    }

    /// Read a pointer-sized value (the target is always 64-bit)
    fn read_pointer(&self, address: u64) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array::<POINTER_SIZE>(address)?))
    }
}

/// Write access to a target address space
pub trait WriteMemory {
    /// Write all of `data` starting at `address`
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()>;

    fn write_u8(&self, address: u64, value: u8) -> Result<()> {
        self.write_bytes(address, &[value])
    }

    fn write_u32(&self, address: u64, value: u32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }

    fn write_f32(&self, address: u64, value: f32) -> Result<()> {
        self.write_bytes(address, &value.to_le_bytes())
    }
}

/// A live attachment to the target process
pub trait ProcessBinding: ReadMemory + WriteMemory {
    fn pid(&self) -> u32;

    /// Load address of the main module
    fn base_address(&self) -> u64;

    /// Cheap liveness check, called before every dispatched command
    fn is_alive(&self) -> bool;

    /// `(major, minor, patch)` from the executable's version resource
    fn file_version(&self) -> Result<(u32, u32, u32)>;
}

/// Something that can attach to a process by image name
pub trait ProcessProvider {
    type Binding: ProcessBinding;

    fn attach(&self, process_name: &str) -> Result<Self::Binding>;
}
