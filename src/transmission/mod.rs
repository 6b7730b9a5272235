/// Wire boundary between the two endpoints
pub mod compare;
pub mod receiver;
pub mod sender;
pub mod wire;

pub use compare::*;
pub use receiver::*;
pub use sender::*;
pub use wire::*;
