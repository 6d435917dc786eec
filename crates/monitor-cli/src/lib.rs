//! 전략 모니터링 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - JSON 파일 기반 시계열 제공자 (`JsonDirSeriesSource`)
//! - 호출자 측 지표 캐시 (`MetricCache`)
//! - 심층 분석, 비교, 검증 명령어

pub mod cache;
pub mod commands;
pub mod source;

pub use cache::{CacheStats, MetricCache, MetricKey, MetricKind};
pub use source::{parse_run_document, JsonDirSeriesSource};
