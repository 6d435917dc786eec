//! 시계열 로더 trait 및 관련 타입.
//!
//! 원시 시계열을 가져오는 일은 분석 엔진 바깥의 비동기 관심사입니다.
//! 이 모듈은 저장 계층에서 실행 시계열을 조회하기 위한 추상화 계층을 제공하며,
//! 엔진은 이미 구체화된 `RunSeries`만 입력으로 받습니다.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{MonitorError, MonitorResult};
use crate::types::{RunId, RunSeries};

/// 실행별 로딩 결과.
///
/// 한 실행의 로딩 실패가 전체 비교를 실패시키지 않도록
/// 성공한 시계열과 실패 목록을 함께 반환합니다.
#[derive(Debug, Default)]
pub struct LoadedRuns {
    /// 로딩에 성공한 시계열 (요청 순서 유지)
    pub runs: Vec<RunSeries>,
    /// 로딩에 실패한 실행과 사유
    pub failures: Vec<(RunId, MonitorError)>,
}

impl LoadedRuns {
    /// 실패한 실행이 있는지 확인합니다.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// 백테스트 실행 시계열 제공자.
///
/// 저장/조회 계층 구현체(파일, DB 등)가 이 trait을 구현합니다.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// 조회 가능한 실행 식별자 목록을 반환합니다.
    async fn list_runs(&self) -> MonitorResult<Vec<RunId>>;

    /// 단일 실행의 시계열을 로드합니다.
    ///
    /// 시계열 문서로 해석할 수 없는 입력은 `InvalidInput` 또는
    /// `Serialization` 에러를 반환합니다.
    async fn load_run(&self, run_id: &RunId) -> MonitorResult<RunSeries>;

    /// 여러 실행의 시계열을 로드합니다.
    ///
    /// 기본 구현은 순차적으로 `load_run`을 호출하고, 실행 단위 에러는
    /// `failures`에 모아 나머지 실행을 계속 로드합니다.
    async fn load_runs(&self, run_ids: &[RunId]) -> MonitorResult<LoadedRuns> {
        let mut loaded = LoadedRuns::default();

        for run_id in run_ids {
            match self.load_run(run_id).await {
                Ok(series) => loaded.runs.push(series),
                Err(e) if e.is_run_local() => {
                    warn!(run_id = %run_id, error = %e, "Skipping run that failed to load");
                    loaded.failures.push((run_id.clone(), e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(loaded)
    }
}

/// 메모리 기반 시계열 제공자.
///
/// 테스트 및 이미 로드된 데이터를 재사용할 때 사용합니다.
#[derive(Debug, Clone, Default)]
pub struct InMemorySeriesSource {
    runs: BTreeMap<RunId, RunSeries>,
}

impl InMemorySeriesSource {
    /// 빈 제공자를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 시계열을 추가합니다. 같은 식별자가 있으면 교체합니다.
    pub fn insert(&mut self, series: RunSeries) {
        self.runs.insert(series.run_id.clone(), series);
    }
}

impl FromIterator<RunSeries> for InMemorySeriesSource {
    fn from_iter<I: IntoIterator<Item = RunSeries>>(iter: I) -> Self {
        let mut source = Self::new();
        for series in iter {
            source.insert(series);
        }
        source
    }
}

#[async_trait]
impl SeriesSource for InMemorySeriesSource {
    async fn list_runs(&self) -> MonitorResult<Vec<RunId>> {
        Ok(self.runs.keys().cloned().collect())
    }

    async fn load_run(&self, run_id: &RunId) -> MonitorResult<RunSeries> {
        self.runs
            .get(run_id)
            .cloned()
            .ok_or_else(|| MonitorError::NotFound(format!("run {run_id}")))
    }
}
