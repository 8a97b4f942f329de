//! Progression Event Endpoints
//!
//! 외부 협력자(모임/리뷰/게시판 서브시스템)가 호출하는 쓰기 경로.
//! 이벤트 자격 판단은 호출 측 책임이고, 여기서는 페이로드 검증 후
//! 오케스트레이터로 위임만 함.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::{ledger, orchestrator};
use crate::types::{EventType, MomentPayload, ProgressionEvent, ProgressionResult};
use crate::AppState;

// ============ Request/Response Types ============

/// 진급 이벤트 요청
///
/// event_type은 문자열로 받아 EventType::parse로 검증.
/// 핸들러 없는 신규 타입은 400 UNKNOWN_EVENT_TYPE으로 거부
#[derive(Debug, Deserialize)]
pub struct ApplyEventRequest {
    pub user_id: Uuid,
    pub event_type: String,
    /// 활동 날짜 (YYYY-MM-DD, 호출 측이 KST 기준으로 결정)
    pub activity_date: chrono::NaiveDate,
    pub category_id: Option<i64>,
    pub moment: Option<MomentPayload>,
}

/// 포인트 사용 요청
#[derive(Debug, Deserialize)]
pub struct SpendRequest {
    pub user_id: Uuid,
    /// 사용할 포인트 (양수)
    pub amount: i64,
    /// 사용처 (상점 주문 번호 등)
    pub source: String,
    pub description: Option<String>,
}

/// 포인트 사용 응답
#[derive(Debug, serde::Serialize)]
pub struct SpendResponse {
    pub entry_id: i64,
    pub amount: i64,
    /// 차감 후 잔액
    pub balance: i64,
}

// ============ Handlers ============

/// POST /api/trust/events
///
/// applyEvent: 자격 이벤트 1건을 받아 포인트/레벨/스트릭/배지/숲/모먼트로
/// 팬아웃하고 전체 델타를 반환
///
/// # Response
///
/// ```json
/// {
///   "user_id": "...",
///   "points_earned": 10,
///   "bonus_points": 0,
///   "level": { "level": 2, "name": "새싹", "growth_points": 60, "leveled_up": true },
///   "streak": { "current_streak": 3, "longest_streak": 5, "milestone_reached": 3 },
///   "new_badges": ["first-step"],
///   "forest": { "category_id": 7, "participation_count": 1, "tree_level": 1, ... },
///   "moment_recorded": null
/// }
/// ```
pub async fn apply_event(
    State(state): State<AppState>,
    Json(req): Json<ApplyEventRequest>,
) -> Result<Json<ProgressionResult>, ApiError> {
    let event_type = EventType::parse(&req.event_type)?;

    // 카테고리는 모임 계열 이벤트에만 의미가 있음
    if req.category_id.is_some() && !orchestrator::carries_category(event_type) {
        return Err(ApiError::ValidationError(format!(
            "{} events cannot carry a category",
            req.event_type
        )));
    }

    let event = ProgressionEvent {
        user_id: req.user_id,
        event_type,
        activity_date: req.activity_date,
        category_id: req.category_id,
        moment: req.moment,
    };

    let result =
        orchestrator::apply_event(&state.db, state.metrics.as_ref(), &state.config, event).await?;

    Ok(Json(result))
}

/// POST /api/trust/points/spend
///
/// 포인트 사용. 잔액(미만료 EARN - SPEND)을 초과하면 422 INSUFFICIENT_BALANCE
pub async fn spend_points(
    State(state): State<AppState>,
    Json(req): Json<SpendRequest>,
) -> Result<Json<SpendResponse>, ApiError> {
    if req.source.trim().is_empty() {
        return Err(ApiError::ValidationError(
            "source must not be empty".to_string(),
        ));
    }

    let entry = ledger::spend(
        &state.db,
        req.user_id,
        req.amount,
        req.source.trim(),
        req.description.as_deref(),
    )
    .await?;

    let balance = ledger::balance(&state.db, req.user_id).await?;

    Ok(Json(SpendResponse {
        entry_id: entry.id,
        amount: entry.amount,
        balance,
    }))
}
