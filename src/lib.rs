pub mod bits;
pub mod channel;
pub mod config;
pub mod error;
pub mod link;
pub mod phy;
pub mod pipeline;
pub mod simulate;
pub mod transmission;
pub mod utils;

pub use config::{CarrierScheme, ErrorControl, FramingMethod, LineCode, SchemeConfig};
pub use error::{LinkSimError, Result};
pub use pipeline::{Decoded, Transmission, decode_message, encode_message, transmit};
