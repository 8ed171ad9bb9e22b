pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding at the requested position")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParsePieceSeedError {
    #[display("expected 32 hex digits, got {len}")]
    InvalidLength { len: usize },
    #[display("invalid hex seed ({source})")]
    InvalidDigit { source: std::num::ParseIntError },
}
