//! JSON 파일 기반 시계열 제공자.
//!
//! 디렉토리의 `<run_id>.json` 파일 하나가 실행 하나입니다.
//!
//! ```json
//! {"run_id": "momentum-v2", "points": [
//!   {"date": "2024-01-02", "portfolio_value": 100.0, "daily_return": null}
//! ]}
//! ```
//!
//! 파일 이름(확장자 제외)이 실행 식별자이며, 문서의 `run_id`와 다르면
//! 경고 후 파일 이름을 사용합니다.

use async_trait::async_trait;
use futures::future::join_all;
use monitor_core::{
    LoadedRuns, MonitorError, MonitorResult, RunId, RunSeries, SeriesSource, TimeSeriesPoint,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const RUN_FILE_EXTENSION: &str = "json";

/// 실행 파일 문서
#[derive(Debug, Deserialize)]
struct RunDocument {
    #[serde(default)]
    run_id: Option<RunId>,
    points: Vec<TimeSeriesPoint>,
}

/// 디렉토리에서 실행 JSON 파일을 읽는 제공자.
#[derive(Debug, Clone)]
pub struct JsonDirSeriesSource {
    dir: PathBuf,
}

impl JsonDirSeriesSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 데이터 디렉토리 경로.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 실행 식별자에 해당하는 파일 경로.
    pub fn path_for(&self, run_id: &RunId) -> PathBuf {
        self.dir
            .join(format!("{}.{}", run_id.as_str(), RUN_FILE_EXTENSION))
    }
}

/// JSON 문서를 실행 시계열로 해석합니다.
pub fn parse_run_document(run_id: &RunId, content: &str) -> MonitorResult<RunSeries> {
    let document: RunDocument = serde_json::from_str(content)?;

    if let Some(declared) = &document.run_id {
        if declared != run_id {
            warn!(
                run_id = %run_id,
                declared = %declared,
                "Run id in document differs from file name; using file name"
            );
        }
    }

    Ok(RunSeries::new(run_id.clone(), document.points))
}

#[async_trait]
impl SeriesSource for JsonDirSeriesSource {
    async fn list_runs(&self) -> MonitorResult<Vec<RunId>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut run_ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RUN_FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                run_ids.push(RunId::new(stem));
            }
        }

        run_ids.sort();
        debug!(dir = %self.dir.display(), count = run_ids.len(), "Listed run files");
        Ok(run_ids)
    }

    async fn load_run(&self, run_id: &RunId) -> MonitorResult<RunSeries> {
        let path = self.path_for(run_id);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                MonitorError::NotFound(format!("run file {}", path.display()))
            }
            _ => MonitorError::Io(format!("{}: {e}", path.display())),
        })?;

        let series = parse_run_document(run_id, &content)?;
        debug!(run_id = %run_id, points = series.len(), "Loaded run file");
        Ok(series)
    }

    /// 모든 파일을 동시에 읽습니다. 결과는 요청 순서를 유지합니다.
    async fn load_runs(&self, run_ids: &[RunId]) -> MonitorResult<LoadedRuns> {
        let results = join_all(run_ids.iter().map(|id| self.load_run(id))).await;

        let mut loaded = LoadedRuns::default();
        for (run_id, result) in run_ids.iter().zip(results) {
            match result {
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
