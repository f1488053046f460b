//! ポート（usecase と外界の境界となる trait）

pub mod inbound;
pub mod outbound;
