//! 모니터링 운영을 위한 도메인 모델.

mod series_source;

pub use series_source::*;
