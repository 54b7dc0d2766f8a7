//! Mock process memory for tests.
//!
//! Sparse byte map with read/write accounting, a liveness switch and
//! injectable write failures. Clones share state, so a test can keep a handle
//! to memory that the modifier owns.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::memory::reader::{ProcessBinding, ProcessProvider, ReadMemory, WriteMemory};

#[derive(Debug, Default)]
struct MockState {
    bytes: HashMap<u64, u8>,
    reads: usize,
    writes: Vec<(u64, Vec<u8>)>,
    failing_writes: HashSet<u64>,
    alive: bool,
}

#[derive(Debug, Clone)]
pub struct MockMemory {
    state: Rc<RefCell<MockState>>,
    base_address: u64,
    version: (u32, u32, u32),
}

impl MockMemory {
    pub fn builder() -> MockMemoryBuilder {
        MockMemoryBuilder::default()
    }

    pub fn reads(&self) -> usize {
        self.state.borrow().reads
    }

    pub fn writes(&self) -> usize {
        self.state.borrow().writes.len()
    }

    /// Addresses written, in order
    pub fn written_addresses(&self) -> Vec<u64> {
        self.state.borrow().writes.iter().map(|(a, _)| *a).collect()
    }

    pub fn reset_counters(&self) {
        let mut state = self.state.borrow_mut();
        state.reads = 0;
        state.writes.clear();
    }

    pub fn set_alive(&self, alive: bool) {
        self.state.borrow_mut().alive = alive;
    }

    /// Make every write that starts at `address` fail
    pub fn fail_writes_at(&self, address: u64) {
        self.state.borrow_mut().failing_writes.insert(address);
    }

    /// Poke a value without counting it as a write
    pub fn set_u32(&self, address: u64, value: u32) {
        self.poke(address, &value.to_le_bytes());
    }

    pub fn set_u64(&self, address: u64, value: u64) {
        self.poke(address, &value.to_le_bytes());
    }

    pub fn set_f32(&self, address: u64, value: f32) {
        self.poke(address, &value.to_le_bytes());
    }

    /// Peek a value without counting it as a read
    pub fn get_u32(&self, address: u64) -> u32 {
        u32::from_le_bytes(self.peek(address))
    }

    pub fn get_u8(&self, address: u64) -> u8 {
        self.peek::<1>(address)[0]
    }

    pub fn get_f32(&self, address: u64) -> f32 {
        f32::from_le_bytes(self.peek(address))
    }

    fn poke(&self, address: u64, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        for (i, b) in data.iter().enumerate() {
            state.bytes.insert(address + i as u64, *b);
        }
    }

    fn peek<const N: usize>(&self, address: u64) -> [u8; N] {
        let state = self.state.borrow();
        let mut out = [0u8; N];
        for (i, b) in out.iter_mut().enumerate() {
            *b = state.bytes.get(&(address + i as u64)).copied().unwrap_or(0);
        }
        out
    }
}

impl ReadMemory for MockMemory {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.reads += 1;
        (0..size as u64)
            .map(|i| {
                state
                    .bytes
                    .get(&(address + i))
                    .copied()
                    .ok_or_else(|| Error::MemoryReadFailed {
                        address,
                        message: format!("unmapped byte at {:#x}", address + i),
                    })
            })
            .collect()
    }
}

impl WriteMemory for MockMemory {
    fn write_bytes(&self, address: u64, data: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.failing_writes.contains(&address) {
            return Err(Error::MemoryWriteFailed {
                address,
                message: "injected failure".to_string(),
            });
        }
        for (i, b) in data.iter().enumerate() {
            state.bytes.insert(address + i as u64, *b);
        }
        state.writes.push((address, data.to_vec()));
        Ok(())
    }
}

impl ProcessBinding for MockMemory {
    fn pid(&self) -> u32 {
        4242
    }

    fn base_address(&self) -> u64 {
        self.base_address
    }

    fn is_alive(&self) -> bool {
        self.state.borrow().alive
    }

    fn file_version(&self) -> Result<(u32, u32, u32)> {
        Ok(self.version)
    }
}

/// Builder for MockMemory
#[derive(Debug)]
pub struct MockMemoryBuilder {
    bytes: HashMap<u64, u8>,
    base_address: u64,
    version: (u32, u32, u32),
}

impl Default for MockMemoryBuilder {
    fn default() -> Self {
        Self {
            bytes: HashMap::new(),
            base_address: crate::memory::layout::DEFAULT_IMAGE_BASE,
            version: (1, 2, 0),
        }
    }
}

impl MockMemoryBuilder {
    pub fn base_address(mut self, base: u64) -> Self {
        self.base_address = base;
        self
    }

    pub fn version(mut self, version: (u32, u32, u32)) -> Self {
        self.version = version;
        self
    }

    pub fn u32_at(mut self, address: u64, value: u32) -> Self {
        self.put(address, &value.to_le_bytes());
        self
    }

    pub fn u64_at(mut self, address: u64, value: u64) -> Self {
        self.put(address, &value.to_le_bytes());
        self
    }

    pub fn f32_at(mut self, address: u64, value: f32) -> Self {
        self.put(address, &value.to_le_bytes());
        self
    }

    fn put(&mut self, address: u64, data: &[u8]) {
        for (i, b) in data.iter().enumerate() {
            self.bytes.insert(address + i as u64, *b);
        }
    }

    pub fn build(self) -> MockMemory {
        MockMemory {
            state: Rc::new(RefCell::new(MockState {
                bytes: self.bytes,
                alive: true,
                ..Default::default()
            })),
            base_address: self.base_address,
            version: self.version,
        }
    }
}

/// Provider handing out bindings that share one MockMemory, unless a
/// replacement binding has been queued for the next attach
#[derive(Debug)]
pub struct MockProvider {
    memory: MockMemory,
    queued: RefCell<VecDeque<MockMemory>>,
    available: Cell<bool>,
    attach_attempts: Cell<usize>,
}

impl MockProvider {
    pub fn new(memory: MockMemory) -> Self {
        Self {
            memory,
            queued: RefCell::new(VecDeque::new()),
            available: Cell::new(true),
            attach_attempts: Cell::new(0),
        }
    }

    pub fn memory(&self) -> &MockMemory {
        &self.memory
    }

    /// Hand out `memory` on the next successful attach, as if the game had
    /// been restarted (possibly at another base or on another build)
    pub fn queue_binding(&self, memory: MockMemory) {
        self.queued.borrow_mut().push_back(memory);
    }

    /// Whether `attach` finds the process
    pub fn set_available(&self, available: bool) {
        self.available.set(available);
    }

    pub fn attach_attempts(&self) -> usize {
        self.attach_attempts.get()
    }
}

impl ProcessProvider for MockProvider {
    type Binding = MockMemory;

    fn attach(&self, process_name: &str) -> Result<MockMemory> {
        self.attach_attempts.set(self.attach_attempts.get() + 1);
        if !self.available.get() {
            return Err(Error::ProcessNotFound(process_name.to_string()));
        }
        if let Some(next) = self.queued.borrow_mut().pop_front() {
            next.set_alive(true);
            return Ok(next);
        }
        self.memory.set_alive(true);
        Ok(self.memory.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_read_typed_values() {
        let memory = MockMemory::builder()
            .u32_at(0x1000, 0x0403_0201)
            .u64_at(0x2000, 0x1_4000_0000)
            .f32_at(0x3000, 12.5)
            .build();

        assert_eq!(memory.read_u32(0x1000).unwrap(), 0x0403_0201);
        assert_eq!(memory.read_u8(0x1001).unwrap(), 0x02);
        assert_eq!(memory.read_pointer(0x2000).unwrap(), 0x1_4000_0000);
        assert_eq!(memory.read_f32(0x3000).unwrap(), 12.5);
        assert_eq!(memory.reads(), 4);
    }

    #[test]
    fn test_mock_unmapped_read_fails() {
        let memory = MockMemory::builder().u32_at(0x1000, 1).build();
        assert!(memory.read_u32(0x1002).is_err());
        assert!(memory.read_u32(0x5000).is_err());
    }

    #[test]
    fn test_mock_write_accounting_and_failure() {
        let memory = MockMemory::builder().build();
        memory.write_u32(0x1000, 7).unwrap();
        assert_eq!(memory.get_u32(0x1000), 7);
        assert_eq!(memory.written_addresses(), vec![0x1000]);

        memory.fail_writes_at(0x2000);
        assert!(memory.write_u32(0x2000, 1).is_err());
        assert_eq!(memory.writes(), 1);
    }

    #[test]
    fn test_mock_provider_counts_attempts() {
        let provider = MockProvider::new(MockMemory::builder().build());
        assert!(provider.attach("sekiro.exe").is_ok());

        provider.set_available(false);
        let err = provider.attach("sekiro.exe").unwrap_err();
        assert!(matches!(err, Error::ProcessNotFound(_)));
        assert_eq!(provider.attach_attempts(), 2);
    }

    #[test]
    fn test_mock_provider_hands_out_queued_binding_once() {
        let provider = MockProvider::new(MockMemory::builder().build());
        provider.queue_binding(
            MockMemory::builder()
                .base_address(0x2_0000_0000)
                .version((1, 6, 0))
                .build(),
        );

        let next = provider.attach("sekiro.exe").unwrap();
        assert_eq!(next.base_address(), 0x2_0000_0000);
        assert_eq!(next.file_version().unwrap(), (1, 6, 0));

        let again = provider.attach("sekiro.exe").unwrap();
        assert_eq!(again.base_address(), provider.memory().base_address());
    }
}
