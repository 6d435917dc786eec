//! 시계열 준비 모듈
//!
//! 원시 실행 시계열을 분석 가능한 형태로 만드는 단계입니다.
//!
//! # 모듈 구성
//!
//! - [`sanitize`]: 재정렬, 중복 날짜 및 비유한 값 제거 (품질 카운트)
//! - [`returns`]: 일간 수익률 도출 및 실행별 준비 결과(`PreparedRun`)
//! - [`alignment`]: 여러 실행의 날짜 합집합 프레임 (100 기준 리베이스 지원)
//!
//! 실행마다 수익률은 정확히 한 번 도출되며, `PreparedRun`을 통해
//! 낙폭/롤링/월별/상관/분포 계산이 공유합니다.

pub mod alignment;
pub mod returns;
pub mod sanitize;

pub use alignment::*;
pub use returns::*;
pub use sanitize::*;
