//! 지갑 모니터링을 위한 도메인 모델.

mod holding;
mod position;
mod summary;

pub use holding::*;
pub use position::*;
pub use summary::*;
