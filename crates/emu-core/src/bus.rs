//! Machine bus contract.

/// Memory, I/O and contention interface between a CPU core and the machine
/// it runs in.
///
/// The CPU never touches memory directly. Every access goes through this
/// trait, which is where all the machine-specific behaviour lives: ROM
/// protection, RAM mirroring, display-file opcode fetches, keyboard ports
/// and wait states. One CPU core serves every hardware variant that
/// implements it.
///
/// The trait is object safe; cores accept `B: Bus + ?Sized` so machines can
/// hand over either a concrete bus or a `&mut dyn Bus`.
pub trait Bus {
    /// Plain memory read.
    fn read_byte(&mut self, address: u16) -> u8;

    /// Plain memory write. Writes into protected ROM are dropped.
    fn write_byte(&mut self, address: u16, value: u8);

    /// Instruction fetch (M1 cycle).
    ///
    /// `refresh` is the `I`/`R` pair the CPU drives onto the address bus
    /// during the refresh half of the same cycle. Defaults to a plain read.
    /// Machines whose video hardware snoops the opcode bus override this and
    /// may return a different byte from the one stored in memory.
    fn opcode_fetch(&mut self, address: u16, refresh: u16) -> u8 {
        let _ = refresh;
        self.read_byte(address)
    }

    /// Read from the I/O space.
    fn read_port(&mut self, port: u16) -> u8;

    /// Write to the I/O space.
    fn write_port(&mut self, port: u16, value: u8);

    /// Extra wait states for a memory cycle of `requested` T-states at
    /// `address`, `elapsed` T-states into the current instruction.
    fn contend_mem(&mut self, address: u16, elapsed: u32, requested: u32) -> u32 {
        let _ = (address, elapsed, requested);
        0
    }

    /// Extra wait states for an I/O cycle of `requested` T-states.
    fn contend_io(&mut self, port: u16, elapsed: u32, requested: u32) -> u32 {
        let _ = (port, elapsed, requested);
        0
    }
}

/// Flat 64 KiB RAM bus with no contention, for tests and tooling.
///
/// Port reads return the scripted value for the port (or `0xFF`), port
/// writes are recorded in order.
pub struct SimpleBus {
    memory: Vec<u8>,
    port_values: Vec<(u16, u8)>,
    port_writes: Vec<(u16, u8)>,
    wait_states: u32,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x1_0000],
            port_values: Vec::new(),
            port_writes: Vec::new(),
            wait_states: 0,
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at 64 KiB.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        for (offset, &byte) in data.iter().enumerate() {
            let addr = address.wrapping_add(offset as u16);
            self.memory[addr as usize] = byte;
        }
    }

    /// Read memory without side effects.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    /// Value returned by subsequent reads of `port`.
    pub fn set_port_value(&mut self, port: u16, value: u8) {
        self.port_values.retain(|&(p, _)| p != port);
        self.port_values.push((port, value));
    }

    /// Port writes seen so far, oldest first.
    #[must_use]
    pub fn port_writes(&self) -> &[(u16, u8)] {
        &self.port_writes
    }

    /// Make every memory cycle cost `wait_states` extra T-states.
    pub fn set_wait_states(&mut self, wait_states: u32) {
        self.wait_states = wait_states;
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read_byte(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }

    fn read_port(&mut self, port: u16) -> u8 {
        self.port_values
            .iter()
            .find(|&&(p, _)| p == port)
            .map_or(0xFF, |&(_, v)| v)
    }

    fn write_port(&mut self, port: u16, value: u8) {
        self.port_writes.push((port, value));
    }

    fn contend_mem(&mut self, _address: u16, _elapsed: u32, _requested: u32) -> u32 {
        self.wait_states
    }
}
