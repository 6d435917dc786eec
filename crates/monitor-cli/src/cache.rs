//! 호출자 측 지표 캐시.
//!
//! 같은 실행 집합에 같은 지표를 여러 번 요청할 때 재계산을 피합니다.
//! 분석 엔진은 이 캐시를 알지 못하며 항상 상태 없이 동작합니다.
//!
//! 바이너리에서는 한 명령 안에서만 재사용됩니다 (`deep-dive`에 같은 실행이
//! 여러 번 선택된 경우). 여러 명령을 연달아 호출하는 임베딩 측은 하나의
//! `MetricCache`를 공유하여 명령 간에도 결과를 재사용할 수 있습니다.

use monitor_core::RunId;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// 캐시 대상 지표 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    DeepDive,
    Comparison,
    Correlation,
    Rolling,
    Monthly,
    Drawdown,
}

/// 캐시 키: (실행 집합, 지표 종류, 파라미터).
///
/// 실행 집합은 정렬된 집합이므로 선택 순서와 무관합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricKey {
    pub runs: BTreeSet<RunId>,
    pub kind: MetricKind,
    /// 파라미터를 직렬화한 문자열
    pub params: String,
}

impl MetricKey {
    pub fn new<'a>(
        runs: impl IntoIterator<Item = &'a RunId>,
        kind: MetricKind,
        params: impl Into<String>,
    ) -> Self {
        Self {
            runs: runs.into_iter().cloned().collect(),
            kind,
            params: params.into(),
        }
    }
}

/// 캐시 적중 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// 지표 결과 캐시.
#[derive(Debug, Default)]
pub struct MetricCache {
    entries: RwLock<HashMap<MetricKey, Arc<serde_json::Value>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MetricCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 캐시된 값을 조회합니다.
    pub fn get(&self, key: &MetricKey) -> Option<Arc<serde_json::Value>> {
        let found = self
            .entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned());

        match &found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// 값을 저장합니다.
    pub fn insert(&self, key: MetricKey, value: serde_json::Value) -> Arc<serde_json::Value> {
        let value = Arc::new(value);
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, Arc::clone(&value));
        }
        value
    }

    /// 캐시에 없으면 계산하여 저장하고, 있으면 캐시된 값을 반환합니다.
    pub fn get_or_compute<T, F>(
        &self,
        key: MetricKey,
        compute: F,
    ) -> Result<Arc<serde_json::Value>, serde_json::Error>
    where
        T: Serialize,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(&key) {
            debug!(kind = ?key.kind, runs = key.runs.len(), "Metric cache hit");
            return Ok(value);
        }

        let value = serde_json::to_value(compute())?;
        Ok(self.insert(key, value))
    }

    /// 모든 항목을 제거합니다. 통계는 유지됩니다.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().map(|e| e.len()).unwrap_or(0),
        }
    }
}
