//! 백테스트 실행 식별자.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 백테스트 실행(run)의 불투명 식별자.
///
/// 엔진은 식별자의 내부 형식을 해석하지 않고 비교/정렬에만 사용합니다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// 새 실행 식별자를 생성합니다.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 문자열 표현을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_display_and_order() {
        let a = RunId::new("opt-2024-001");
        let b = RunId::from("opt-2024-002");

        assert_eq!(a.to_string(), "opt-2024-001");
        assert!(a < b);
    }

    #[test]
    fn test_run_id_serializes_as_plain_string() {
        let id = RunId::new("wfo-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"wfo-7\"");

        let parsed: RunId = serde_json::from_str("\"wfo-7\"").unwrap();
        assert_eq!(parsed, id);
    }
}
