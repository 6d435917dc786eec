//! 실행 파일 검증 명령어.
//!
//! 각 실행을 로드하고 정제 결과(데이터 품질 카운트)를 보고합니다.
//! 분석은 수행하지 않습니다.

use anyhow::Result;
use monitor_analytics::{DataQuality, PreparedRun};
use monitor_core::{RunId, SeriesSource};
use serde::Serialize;
use tracing::warn;

/// 검증 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// 보정 없이 사용 가능
    Clean,
    /// 정제 후 사용 가능
    Repaired,
    /// 로드 실패
    Failed,
}

/// 실행별 검증 결과
#[derive(Debug, Clone, Serialize)]
pub struct ValidationEntry {
    pub run_id: RunId,
    pub status: ValidationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<DataQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 검증 보고서
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub entries: Vec<ValidationEntry>,
}

impl ValidationReport {
    /// 로드에 실패한 실행 수
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == ValidationStatus::Failed)
            .count()
    }
}

/// 선택된 실행(비어있으면 전체)을 검증합니다.
pub async fn run_validate(source: &dyn SeriesSource, run_ids: &[RunId]) -> Result<ValidationReport> {
    let selection = if run_ids.is_empty() {
        source.list_runs().await?
    } else {
        run_ids.to_vec()
    };

    let loaded = source.load_runs(&selection).await?;

    let mut entries: Vec<ValidationEntry> = loaded
        .runs
        .iter()
        .map(|series| {
            let prepared = PreparedRun::new(series);
            let status = if prepared.quality.is_clean() {
                ValidationStatus::Clean
            } else {
                ValidationStatus::Repaired
            };
            ValidationEntry {
                run_id: series.run_id.clone(),
                status,
                quality: Some(prepared.quality),
                error: None,
            }
        })
        .collect();

    for (run_id, e) in &loaded.failures {
        warn!(run_id = %run_id, error = %e, "Run failed validation");
        entries.push(ValidationEntry {
            run_id: run_id.clone(),
            status: ValidationStatus::Failed,
            quality: None,
            error: Some(e.to_string()),
        });
    }

    // 요청 순서로 정렬
    entries.sort_by_key(|e| selection.iter().position(|id| id == &e.run_id));

    Ok(ValidationReport { entries })
}
