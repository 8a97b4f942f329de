//! Metrics Snapshot Provider
//!
//! 배지 평가에 쓰이는 사용자 지표 스냅샷을 외부 협력자(모임/리뷰/게시판
//! 서브시스템의 집계 API)에서 가져옴. 엔진은 이 지표의 계산 방식을
//! 정의하지 않고 소비만 함.
//!
//! # Design Decision
//!
//! trait으로 추상화한 이유:
//! - 오케스트레이터가 HTTP 의존 없이 단위 테스트 가능 (Mock 주입)
//! - 지표 공급자 교체(집계 API → 이벤트 스트림 등) 시 영향 최소화
//!
//! 공급자 장애 시 MetricsSnapshotUnavailable로 즉시 중단 (fail closed):
//! 데이터 없이 배지를 평가하면 잘못 보류하거나 잘못 수여할 위험이 있음

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// 사용자 지표 스냅샷
///
/// 외부 유래 필드(참석률, 호스팅 수, 평점 등)와 엔진 소유 필드
/// (growth_points, streak_days, participation_count)가 섞여 있음.
/// 엔진 소유 필드는 오케스트레이터가 단계 적용 후 갱신값으로 덮어씀.
///
/// 누락 필드 처리 방향이 비교 방향에 따라 다름:
/// - "이상" 지표는 0으로 기본값 처리 (0은 어떤 임계값도 못 넘으므로 안전)
/// - "이하" 지표(late_count, signup_rank)는 None: 0으로 기본값 처리하면
///   누락만으로 조건을 충족해 버림. None은 평가에서 불충족으로 본다
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsSnapshot {
    /// 참석률 (0.0 ~ 1.0)
    pub attendance_rate: f64,
    /// 호스팅한 모임 수
    pub hosting_count: i64,
    /// 전체 모임 참여 수
    pub participation_count: i64,
    /// 작성한 리뷰 수
    pub review_count: i64,
    /// 받은 평점 평균 (0.0 ~ 5.0)
    pub rating_avg: f64,
    /// 지각 횟수. 미보고면 None (충족으로 치지 않음)
    pub late_count: Option<i64>,
    /// 가입 순번 (얼리어답터 판정용). 미보고면 None
    pub signup_rank: Option<i64>,
    /// 현재 스트릭 일수 (엔진 소유, 적용 후 갱신됨)
    pub streak_days: i64,
    /// 누적 성장 포인트 (엔진 소유, 적용 후 갱신됨)
    pub growth_points: i64,
}

/// 지표 스냅샷 공급자 인터페이스
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn snapshot(&self, user_id: Uuid) -> Result<MetricsSnapshot, ApiError>;
}

/// HTTP 기반 공급자 (프로덕션)
///
/// GET {base_url}/users/:user_id 형태의 집계 API를 호출
pub struct HttpMetricsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMetricsProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MetricsProvider for HttpMetricsProvider {
    async fn snapshot(&self, user_id: Uuid) -> Result<MetricsSnapshot, ApiError> {
        let url = format!("{}/users/{}", self.base_url, user_id);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::MetricsSnapshotUnavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ApiError::MetricsSnapshotUnavailable(format!(
                "provider returned {}",
                resp.status()
            )));
        }

        resp.json::<MetricsSnapshot>()
            .await
            .map_err(|e| ApiError::MetricsSnapshotUnavailable(e.to_string()))
    }
}

/// 테스트/개발용 Mock 공급자
///
/// 사용자별 고정 스냅샷을 반환. 등록되지 않은 사용자는 기본값(0) 반환
pub struct MockMetricsProvider {
    snapshots: std::sync::RwLock<std::collections::HashMap<Uuid, MetricsSnapshot>>,
    /// true면 항상 장애를 시뮬레이션 (fail-closed 경로 테스트용)
    fail: bool,
}

impl MockMetricsProvider {
    pub fn new() -> Self {
        Self {
            snapshots: std::sync::RwLock::new(std::collections::HashMap::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            snapshots: std::sync::RwLock::new(std::collections::HashMap::new()),
            fail: true,
        }
    }

    pub fn set(&self, user_id: Uuid, snapshot: MetricsSnapshot) {
        self.snapshots.write().unwrap().insert(user_id, snapshot);
    }
}

impl Default for MockMetricsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsProvider for MockMetricsProvider {
    async fn snapshot(&self, user_id: Uuid) -> Result<MetricsSnapshot, ApiError> {
        if self.fail {
            return Err(ApiError::MetricsSnapshotUnavailable(
                "mock provider down".to_string(),
            ));
        }
        let snapshots = self.snapshots.read().unwrap();
        Ok(snapshots.get(&user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_registered_snapshot() {
        let provider = MockMetricsProvider::new();
        let user = Uuid::new_v4();
        provider.set(
            user,
            MetricsSnapshot {
                hosting_count: 3,
                rating_avg: 4.8,
                ..Default::default()
            },
        );

        let snap = provider.snapshot(user).await.unwrap();
        assert_eq!(snap.hosting_count, 3);
        assert!((snap.rating_avg - 4.8).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_mock_unknown_user_defaults_to_zero() {
        let provider = MockMetricsProvider::new();
        let snap = provider.snapshot(Uuid::new_v4()).await.unwrap();
        assert_eq!(snap.participation_count, 0);
        // "이하" 지표는 기본값이 0이 아니라 미보고(None)여야 함
        assert_eq!(snap.late_count, None);
        assert_eq!(snap.signup_rank, None);
    }

    #[test]
    fn test_partial_response_leaves_lte_metrics_unreported() {
        // 공급자가 일부 필드만 내려주는 경우: "이상" 지표는 0,
        // "이하" 지표는 None으로 들어와야 함
        let snap: MetricsSnapshot =
            serde_json::from_str(r#"{"participation_count": 4}"#).unwrap();
        assert_eq!(snap.participation_count, 4);
        assert_eq!(snap.hosting_count, 0);
        assert_eq!(snap.late_count, None);
        assert_eq!(snap.signup_rank, None);
    }

    #[tokio::test]
    async fn test_failing_mock_is_unavailable() {
        let provider = MockMetricsProvider::failing();
        let err = provider.snapshot(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::MetricsSnapshotUnavailable(_)));
    }
}
