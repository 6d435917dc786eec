//! 수익률 분포 통계.
//!
//! # 주요 기능
//!
//! - **왜도**: g1 = m3 / m2^(3/2)
//! - **초과 첨도**: g2 = m4 / m2² - 3
//! - **히스토그램**: 고정 폭 구간, 범위 밖 값은 잘라내지 않고 개수만 기록
//!
//! 중심 적률은 모집단 추정량 `mₖ = Σ(x - x̄)ᵏ / n`을 사용합니다.
//! 표본이 3개 미만이거나 분산이 0이면 왜도와 첨도는 모두 null입니다.

use monitor_core::{histogram_bins, MAX_HISTOGRAM_BINS};
use serde::{Deserialize, Serialize};

use super::{mean, sample_std, MIN_VOLATILITY};
use crate::error::{AnalyticsError, AnalyticsResult};

/// 왜도/첨도 계산에 필요한 최소 표본 수
pub const MIN_MOMENT_SAMPLES: usize = 3;

/// 일간 수익률 분포 요약.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: Option<f64>,
    /// 표본 표준편차 (n - 1)
    pub std_dev: Option<f64>,
    pub skewness: Option<f64>,
    pub excess_kurtosis: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DistributionStats {
    pub fn compute(values: &[f64]) -> Self {
        let (skewness, excess_kurtosis) = match shape_moments(values) {
            Some((g1, g2)) => (Some(g1), Some(g2)),
            None => (None, None),
        };

        Self {
            count: values.len(),
            mean: mean(values),
            std_dev: sample_std(values),
            skewness,
            excess_kurtosis,
            min: values.iter().copied().reduce(f64::min),
            max: values.iter().copied().reduce(f64::max),
        }
    }
}

/// (왜도, 초과 첨도). 표본 부족 또는 분산 0이면 None.
fn shape_moments(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < MIN_MOMENT_SAMPLES {
        return None;
    }

    let n = values.len() as f64;
    let m = mean(values)?;

    let (mut m2, mut m3, mut m4) = (0.0_f64, 0.0_f64, 0.0_f64);
    for x in values {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    m2 /= n;
    m3 /= n;
    m4 /= n;

    if m2.sqrt() < MIN_VOLATILITY {
        return None;
    }

    let skew = m3 / m2.powf(1.5);
    let kurt = m4 / (m2 * m2) - 3.0;
    (skew.is_finite() && kurt.is_finite()).then_some((skew, kurt))
}

/// 히스토그램 구간 설정.
///
/// `new`로만 만들 수 있으므로 구간 수는 항상 `1..=MAX_HISTOGRAM_BINS` 범위입니다.
/// 역직렬화도 같은 검증을 거칩니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistogramBounds")]
pub struct HistogramSpec {
    lower: f64,
    upper: f64,
    bin_width: f64,
}

/// 검증 전 히스토그램 설정 (역직렬화용)
#[derive(Deserialize)]
struct HistogramBounds {
    lower: f64,
    upper: f64,
    bin_width: f64,
}

impl TryFrom<HistogramBounds> for HistogramSpec {
    type Error = AnalyticsError;

    fn try_from(raw: HistogramBounds) -> AnalyticsResult<Self> {
        Self::new(raw.lower, raw.upper, raw.bin_width)
    }
}

impl Default for HistogramSpec {
    /// -5% ~ +5%, 0.5% 간격 (20개 구간)
    fn default() -> Self {
        Self {
            lower: -0.05,
            upper: 0.05,
            bin_width: 0.005,
        }
    }
}

impl HistogramSpec {
    /// 구간 설정을 검증하여 생성합니다.
    ///
    /// # Errors
    ///
    /// 경계가 유한하지 않거나, 폭이 0 이하이거나, 범위가 비었거나,
    /// 구간 수가 `MAX_HISTOGRAM_BINS`를 넘으면 `InvalidParameter`
    pub fn new(lower: f64, upper: f64, bin_width: f64) -> AnalyticsResult<Self> {
        if !(lower.is_finite() && upper.is_finite() && bin_width.is_finite()) {
            return Err(AnalyticsError::InvalidParameter(
                "histogram bounds must be finite".to_string(),
            ));
        }
        if bin_width <= 0.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "bin_width must be positive, got {bin_width}"
            )));
        }
        if upper <= lower {
            return Err(AnalyticsError::InvalidParameter(format!(
                "empty histogram range [{lower}, {upper}]"
            )));
        }
        let bins = histogram_bins(lower, upper, bin_width);
        if !(bins <= MAX_HISTOGRAM_BINS as f64) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "histogram needs {bins} bins, at most {MAX_HISTOGRAM_BINS} allowed"
            )));
        }

        Ok(Self {
            lower,
            upper,
            bin_width,
        })
    }

    /// `[-half_range, +half_range]` 대칭 범위.
    pub fn symmetric(half_range: f64, bin_width: f64) -> AnalyticsResult<Self> {
        Self::new(-half_range, half_range, bin_width)
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// 구간 수 (부동소수점 오차를 감안해 올림).
    pub fn bin_count(&self) -> usize {
        let bins = histogram_bins(self.lower, self.upper, self.bin_width);
        (bins as usize).clamp(1, MAX_HISTOGRAM_BINS)
    }

    /// 구간 경계 (마지막 경계는 정확히 `upper`).
    fn edges(&self) -> Vec<f64> {
        let n = self.bin_count();
        (0..=n)
            .map(|i| {
                if i == n {
                    self.upper
                } else {
                    self.lower + i as f64 * self.bin_width
                }
            })
            .collect()
    }
}

/// 히스토그램 구간.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// 수익률 히스토그램.
///
/// 구간은 `[lower, upper)`이며 마지막 구간만 양끝을 포함합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnHistogram {
    pub bins: Vec<HistogramBin>,
    /// 범위 하한 미만 값 수
    pub below: usize,
    /// 범위 상한 초과 값 수
    pub above: usize,
    /// 입력 값 수 (비유한 값 제외)
    pub total: usize,
}

impl ReturnHistogram {
    pub fn build(values: &[f64], spec: &HistogramSpec) -> Self {
        let edges = spec.edges();
        let mut bins: Vec<HistogramBin> = edges
            .windows(2)
            .map(|w| HistogramBin {
                lower: w[0],
                upper: w[1],
                count: 0,
            })
            .collect();

        let (mut below, mut above, mut total) = (0, 0, 0);
        let last = bins.len() - 1;

        for &v in values.iter().filter(|v| v.is_finite()) {
            total += 1;
            if v < spec.lower {
                below += 1;
            } else if v > spec.upper {
                above += 1;
            } else {
                let idx = edges.partition_point(|e| *e <= v).saturating_sub(1);
                bins[idx.min(last)].count += 1;
            }
        }

        Self {
            bins,
            below,
            above,
            total,
        }
    }

    /// 범위 안에 들어간 값 수.
    pub fn in_range(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_sample_has_zero_skew() {
        let stats = DistributionStats::compute(&[-0.02, -0.01, 0.0, 0.01, 0.02]);

        assert!(stats.skewness.unwrap().abs() < 1e-12);
        // 균등 5점: m2 = 0.0002, m4 = 0.000000068 → 1.7 - 3
        assert!((stats.excess_kurtosis.unwrap() + 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_right_tail_gives_positive_skew() {
        let stats = DistributionStats::compute(&[0.0, 0.0, 0.0, 0.0, 0.1]);
        assert!(stats.skewness.unwrap() > 0.0);
    }

    #[test]
    fn test_moments_null_for_small_or_flat_samples() {
        let short = DistributionStats::compute(&[0.01, 0.02]);
        assert_eq!(short.skewness, None);
        assert_eq!(short.excess_kurtosis, None);
        assert!(short.std_dev.is_some());

        let flat = DistributionStats::compute(&[0.01; 6]);
        assert_eq!(flat.skewness, None);
        assert_eq!(flat.excess_kurtosis, None);

        let empty = DistributionStats::compute(&[]);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, None);
    }

    #[test]
    fn test_overflowing_sample_has_null_dispersion() {
        let stats = DistributionStats::compute(&[1e308, -1e308, 1e308]);
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.skewness, None);
        assert_eq!(stats.max, Some(1e308));
    }

    #[test]
    fn test_default_spec_has_twenty_bins() {
        let spec = HistogramSpec::default();
        assert_eq!(spec.bin_count(), 20);

        let hist = ReturnHistogram::build(&[], &spec);
        assert_eq!(hist.bins.len(), 20);
        assert_eq!(hist.bins[0].lower, -0.05);
        assert_eq!(hist.bins[19].upper, 0.05);
    }

    #[test]
    fn test_out_of_range_values_are_counted_not_clipped() {
        let values = [-0.2, -0.05, -0.049, 0.0, 0.05, 0.051, f64::NAN];
        let hist = ReturnHistogram::build(&values, &HistogramSpec::default());

        assert_eq!(hist.below, 1);
        assert_eq!(hist.above, 1);
        assert_eq!(hist.total, 6);
        assert_eq!(hist.in_range(), 4);
        assert_eq!(hist.bins[0].count, 2);
        assert_eq!(hist.bins[10].count, 1);
        // 상한은 마지막 구간에 포함
        assert_eq!(hist.bins[19].count, 1);
    }

    #[test]
    fn test_invalid_spec_is_rejected() {
        assert!(HistogramSpec::new(-0.05, 0.05, 0.0).is_err());
        assert!(HistogramSpec::new(-0.05, 0.05, -0.01).is_err());
        assert!(HistogramSpec::new(0.05, -0.05, 0.005).is_err());
        assert!(HistogramSpec::new(f64::NAN, 0.05, 0.005).is_err());
        assert!(HistogramSpec::symmetric(0.0, 0.005).is_err());
        assert!(HistogramSpec::symmetric(0.1, 0.01).is_ok());
    }

    #[test]
    fn test_tiny_bin_width_is_rejected() {
        assert!(matches!(
            HistogramSpec::new(-1.0, 1.0, 1e-300),
            Err(AnalyticsError::InvalidParameter(_))
        ));
        assert!(HistogramSpec::new(-1.0, 1.0, 1e-12).is_err());
        assert!(HistogramSpec::new(-1e300, 1e300, 1.0).is_err());

        let widest = HistogramSpec::new(-1.0, 1.0, 0.0002).unwrap();
        assert_eq!(widest.bin_count(), MAX_HISTOGRAM_BINS);
        let hist = ReturnHistogram::build(&[0.01], &widest);
        assert_eq!(hist.bins.len(), MAX_HISTOGRAM_BINS);
        assert_eq!(hist.in_range(), 1);
    }

    #[test]
    fn test_deserialized_spec_is_validated() {
        let zero_width = r#"{"lower": -0.05, "upper": 0.05, "bin_width": 0.0}"#;
        assert!(serde_json::from_str::<HistogramSpec>(zero_width).is_err());

        let tiny_width = r#"{"lower": -1.0, "upper": 1.0, "bin_width": 1e-300}"#;
        assert!(serde_json::from_str::<HistogramSpec>(tiny_width).is_err());

        let spec: HistogramSpec =
            serde_json::from_str(r#"{"lower": -0.1, "upper": 0.1, "bin_width": 0.01}"#).unwrap();
        assert_eq!(spec.bin_count(), 20);
        assert_eq!(spec.lower(), -0.1);
    }
}
