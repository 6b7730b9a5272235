/// Log level used when RUST_LOG is unset
pub const LOG_LEVEL: &str = "info";

// ============================================================================
// Scheme defaults
// ============================================================================

/// Samples per symbol interval
pub const DEFAULT_SAMPLE_COUNT: usize = 100;

/// Upper bound on samples per symbol interval
pub const MAX_SAMPLE_COUNT: usize = 1 << 16;

pub const DEFAULT_AMPLITUDE: f64 = 1.0;

/// Carrier frequency, in cycles per symbol interval
pub const DEFAULT_FREQUENCY: f64 = 1.0;

pub const DEFAULT_PHASE: f64 = 0.0;

/// ASK amplitude for a logical 0
pub const DEFAULT_AMP_ZERO: f64 = 0.0;

/// ASK amplitude for a logical 1
pub const DEFAULT_AMP_ONE: f64 = 1.0;

/// FSK frequency for a logical 0
pub const DEFAULT_FREQ_ZERO: f64 = 1.0;

/// FSK frequency for a logical 1
pub const DEFAULT_FREQ_ONE: f64 = 2.0;

// ============================================================================
// Link layer
// ============================================================================

/// Payload bytes per frame
pub const DEFAULT_MAX_FRAME_SIZE: usize = 4;

/// Character-count header is one byte
pub const MAX_FRAME_SIZE_LIMIT: usize = 255;

/// Byte-stuffing frame delimiter
pub const FLAG: u8 = 0x16;

/// Byte-stuffing escape
pub const ESC: u8 = 0x1B;

/// CRC-32 generator polynomial, x^32 term implicit
pub const CRC32_POLY: u32 = 0x04C11DB7;

// ============================================================================
// Wire format
// ============================================================================

pub const END_OF_SEQUENCE: &str = "END_OF_SEQUENCE";

pub const FIELD_SEPARATOR: &str = "|";

/// Largest transport chunk, in characters
pub const WIRE_CHUNK_SIZE: usize = 1024;

// ============================================================================
// Simulation
// ============================================================================

/// Nominal sample rate written into WAV exports
pub const WAV_SAMPLE_RATE: u32 = 8000;

pub const DEFAULT_SIMULATION_WORKERS: usize = 4;
