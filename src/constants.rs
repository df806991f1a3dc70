/// Number of addressable memory cells; each cell holds one instruction word.
pub const MEM_SIZE: usize = 4096;

/// Cells reserved for the I/O scratch buffer placed right after the code
/// section. Cell 0 of the buffer holds a length, the rest hold characters.
pub const IO_BUFFER_SIZE: usize = 32;

/// Size of the register file, including `pc`, `dr` and `sp`.
pub const REGISTER_COUNT: usize = 16;

/// Default instruction-count limit for a simulation run.
pub const DEFAULT_LIMIT: u64 = 100_000;
