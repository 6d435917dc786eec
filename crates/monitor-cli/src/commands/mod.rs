//! CLI 명령어 구현 모듈.

pub mod compare;
pub mod deep_dive;
pub mod validate;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// 결과를 JSON으로 출력합니다. 경로가 없으면 stdout에 씁니다.
pub async fn write_output<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Report saved to: {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
