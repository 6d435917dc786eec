//! 상관계수 계산 모듈.
//!
//! 실행 간 일간 수익률의 상관관계를 계산합니다.
//! 전략 간 분산 효과를 비교할 때 사용됩니다.
//!
//! # 주요 기능
//!
//! - **Pearson 상관계수**: 두 실행 모두에 존재하는 날짜만 사용
//! - **상관행렬**: N개 실행 간 상관관계를 N×N 행렬로 표현
//!
//! # 예시
//!
//! ```rust,ignore
//! use monitor_analytics::correlation::CorrelationMatrix;
//!
//! let matrix = CorrelationMatrix::from_runs(&prepared);
//! println!("상관계수: {:.4}", matrix.get(&a, &b).unwrap_or(0.0));
//! ```
//!
//! 겹치는 날짜가 2개 미만이거나 어느 한쪽 분산이 0이면 상관계수는 0입니다.

use monitor_core::RunId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::series::{DailyReturn, PreparedRun};

/// 상관계수 계산에 필요한 최소 공통 날짜 수
pub const MIN_OVERLAP: usize = 2;

/// 상관행렬 결과.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// 실행 목록 (행/열 순서)
    pub run_ids: Vec<RunId>,
    /// 상관계수 행렬 (N×N, -1.0 ~ 1.0, 대각선은 1.0)
    pub matrix: Vec<Vec<f64>>,
    /// 쌍별 공통 날짜 수 (대각선은 해당 실행의 수익률 수)
    pub overlaps: Vec<Vec<usize>>,
}

/// Pearson 상관계수 계산.
///
/// # 인자
///
/// * `x` - 첫 번째 수익률 시계열
/// * `y` - 두 번째 수익률 시계열 (같은 날짜 순서)
///
/// # 반환
///
/// 상관계수 (-1.0 ~ 1.0), 길이 불일치/데이터 부족/분산 0이면 None
pub fn calculate_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < MIN_OVERLAP {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // 변동 없음
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let corr = cov / (var_x.sqrt() * var_y.sqrt());
    corr.is_finite().then(|| corr.clamp(-1.0, 1.0))
}

/// 두 수익률 시계열의 공통 날짜 값을 병합 순회로 추출합니다.
pub fn intersect_returns(a: &[DailyReturn], b: &[DailyReturn]) -> (Vec<f64>, Vec<f64>) {
    let (mut xs, mut ys) = (Vec::new(), Vec::new());
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                xs.push(a[i].value);
                ys.push(b[j].value);
                i += 1;
                j += 1;
            }
        }
    }

    (xs, ys)
}

/// 두 실행의 상관계수와 공통 날짜 수.
///
/// 공통 날짜가 부족하거나 분산이 0이면 상관계수는 0입니다.
pub fn pairwise_correlation(a: &[DailyReturn], b: &[DailyReturn]) -> (f64, usize) {
    let (xs, ys) = intersect_returns(a, b);
    let corr = calculate_correlation(&xs, &ys).unwrap_or(0.0);
    (corr, xs.len())
}

impl CorrelationMatrix {
    /// 준비된 실행들로 상관행렬을 계산합니다.
    ///
    /// 각 쌍은 실행 식별자 정렬 순서로 한 번만 계산하여 대칭 위치에 복사합니다.
    /// 같은 식별자가 반복되면 첫 번째만 사용합니다.
    pub fn from_runs(runs: &[PreparedRun]) -> Self {
        let mut seen = HashSet::new();
        let runs: Vec<&PreparedRun> = runs.iter().filter(|r| seen.insert(&r.run_id)).collect();

        let n = runs.len();
        let mut matrix = vec![vec![0.0; n]; n];
        let mut overlaps = vec![vec![0usize; n]; n];

        for i in 0..n {
            matrix[i][i] = 1.0;
            overlaps[i][i] = runs[i].returns.len();

            for j in (i + 1)..n {
                // 실행 순서와 무관한 결과를 위해 정렬된 방향으로 계산
                let (first, second) = if runs[i].run_id <= runs[j].run_id {
                    (runs[i], runs[j])
                } else {
                    (runs[j], runs[i])
                };
                let (corr, overlap) = pairwise_correlation(&first.returns, &second.returns);

                matrix[i][j] = corr;
                matrix[j][i] = corr;
                overlaps[i][j] = overlap;
                overlaps[j][i] = overlap;
            }
        }

        Self {
            run_ids: runs.iter().map(|r| r.run_id.clone()).collect(),
            matrix,
            overlaps,
        }
    }

    fn index_of(&self, run_id: &RunId) -> Option<usize> {
        self.run_ids.iter().position(|id| id == run_id)
    }

    /// 두 실행 간 상관계수.
    pub fn get(&self, a: &RunId, b: &RunId) -> Option<f64> {
        Some(self.matrix[self.index_of(a)?][self.index_of(b)?])
    }

    /// 두 실행 간 공통 날짜 수.
    pub fn overlap(&self, a: &RunId, b: &RunId) -> Option<usize> {
        Some(self.overlaps[self.index_of(a)?][self.index_of(b)?])
    }

    pub fn len(&self) -> usize {
        self.run_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.run_ids.is_empty()
    }
}
