// Physical layer: digital line coding and carrier modulation

pub mod line_coding;
pub mod modem;

pub use line_coding::LineCoder;
pub use modem::CarrierModem;

/// Symbol levels in {-1, 0, 1}
pub type DigitalSignal = Vec<i8>;

/// Carrier samples, `sample_count` per symbol interval
pub type AnalogSignal = Vec<f64>;
