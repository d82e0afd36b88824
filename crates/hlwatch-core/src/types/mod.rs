//! 시스템 전반에서 사용되는 공통 타입.

mod decimal;
mod numeric;

pub use decimal::*;
pub use numeric::*;
