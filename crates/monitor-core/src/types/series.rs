//! 백테스트 자산 가치 시계열 정의.
//!
//! 이 모듈은 외부 백테스트 엔진이 생성하고 저장 계층이 전달하는
//! 원시 시계열 타입을 정의합니다:
//! - `TimeSeriesPoint` - 하루치 포트폴리오 가치 (선택적 일간 수익률 포함)
//! - `RunSeries` - 한 실행(run)의 시계열 전체
//!
//! 역직렬화는 관대하게 동작합니다. `null` 또는 `"NaN"`, `"inf"` 같은 문자열은
//! 비유한(non-finite) 값으로 읽히고, 이후 분석 엔진의 정제 단계에서 걸러집니다.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::RunId;

/// 시계열의 단일 데이터 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// 날짜 (UTC 기준 달력일)
    pub date: NaiveDate,

    /// 포트폴리오 평가 가치
    #[serde(deserialize_with = "deserialize_lenient_value")]
    pub portfolio_value: f64,

    /// 명시적 일간 수익률 (비율, 0.01 = 1%)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_lenient_return"
    )]
    pub daily_return: Option<f64>,
}

impl TimeSeriesPoint {
    /// 일간 수익률 없이 새 포인트를 생성합니다.
    pub fn new(date: NaiveDate, portfolio_value: f64) -> Self {
        Self {
            date,
            portfolio_value,
            daily_return: None,
        }
    }

    /// 명시적 일간 수익률을 지정합니다.
    pub fn with_return(mut self, daily_return: f64) -> Self {
        self.daily_return = Some(daily_return);
        self
    }

    /// 명시적 일간 수익률이 유한한 값일 때만 반환합니다.
    pub fn explicit_return(&self) -> Option<f64> {
        self.daily_return.filter(|r| r.is_finite())
    }
}

/// 한 백테스트 실행의 자산 가치 시계열.
///
/// 외부에서 생성되며 분석 엔진에서는 읽기 전용으로 취급됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSeries {
    /// 실행 식별자
    pub run_id: RunId,

    /// 날짜순 데이터 포인트
    pub points: Vec<TimeSeriesPoint>,
}

impl RunSeries {
    /// 새 실행 시계열을 생성합니다.
    pub fn new(run_id: impl Into<RunId>, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            run_id: run_id.into(),
            points,
        }
    }

    /// (날짜, 가치) 쌍으로부터 시계열을 생성합니다.
    pub fn from_values<I>(run_id: impl Into<RunId>, values: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            run_id,
            values
                .into_iter()
                .map(|(date, value)| TimeSeriesPoint::new(date, value))
                .collect(),
        )
    }

    /// 데이터 포인트 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 데이터가 비어있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 가장 이른 날짜를 반환합니다.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).min()
    }

    /// 가장 늦은 날짜를 반환합니다.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).max()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

impl LenientNumber {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            LenientNumber::Number(v) => Ok(v),
            LenientNumber::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("숫자가 아닌 값: {s:?}"))),
        }
    }
}

fn deserialize_lenient_value<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LenientNumber>::deserialize(deserializer)? {
        Some(n) => n.into_f64(),
        None => Ok(f64::NAN),
    }
}

fn deserialize_lenient_return<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<LenientNumber>::deserialize(deserializer)?
        .map(|n| n.into_f64::<D::Error>())
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_explicit_return_filters_non_finite() {
        let p = TimeSeriesPoint::new(date(2), 100.0).with_return(f64::NAN);
        assert_eq!(p.explicit_return(), None);

        let p = TimeSeriesPoint::new(date(2), 100.0).with_return(0.01);
        assert_eq!(p.explicit_return(), Some(0.01));
    }

    #[test]
    fn test_run_series_date_bounds() {
        let run = RunSeries::from_values(
            "run-a",
            vec![(date(3), 101.0), (date(2), 100.0), (date(5), 99.0)],
        );

        assert_eq!(run.len(), 3);
        assert_eq!(run.first_date(), Some(date(2)));
        assert_eq!(run.last_date(), Some(date(5)));
    }

    #[test]
    fn test_lenient_deserialization() {
        let json = r#"{
            "run_id": "run-a",
            "points": [
                {"date": "2024-01-02", "portfolio_value": 100.0},
                {"date": "2024-01-03", "portfolio_value": null},
                {"date": "2024-01-04", "portfolio_value": "NaN", "daily_return": "inf"},
                {"date": "2024-01-05", "portfolio_value": "101.5", "daily_return": null}
            ]
        }"#;

        let run: RunSeries = serde_json::from_str(json).unwrap();
        assert_eq!(run.run_id, RunId::new("run-a"));
        assert!(run.points[1].portfolio_value.is_nan());
        assert!(run.points[2].portfolio_value.is_nan());
        assert_eq!(run.points[2].daily_return, Some(f64::INFINITY));
        assert_eq!(run.points[3].portfolio_value, 101.5);
        assert_eq!(run.points[3].daily_return, None);
    }

    #[test]
    fn test_points_must_be_sequence() {
        let json = r#"{"run_id": "run-a", "points": {"date": "2024-01-02"}}"#;
        assert!(serde_json::from_str::<RunSeries>(json).is_err());
    }

    #[test]
    fn test_garbage_text_value_rejected() {
        let json = r#"{"run_id": "x", "points": [{"date": "2024-01-02", "portfolio_value": "abc"}]}"#;
        assert!(serde_json::from_str::<RunSeries>(json).is_err());
    }
}
