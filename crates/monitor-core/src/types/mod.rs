//! 모니터링 시스템 전반에서 사용되는 공통 타입.

mod run_id;
mod series;

pub use run_id::*;
pub use series::*;
