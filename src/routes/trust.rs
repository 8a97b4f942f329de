//! Trust Read Endpoints
//!
//! 프로필 UI가 소비하는 읽기 경로. 아직 진급 이벤트가 없는 사용자는
//! 404 대신 0 상태 기본값을 반환함 (신규 사용자도 프로필은 렌더링되어야 함).

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::{forest, ledger, level};
use crate::types::Pagination;
use crate::AppState;

// ============ Response Types ============

/// 레벨 조회 응답
#[derive(Debug, Serialize)]
pub struct LevelResponse {
    pub user_id: Uuid,
    pub level: i32,
    pub name: String,
    pub growth_points: i64,
    /// 다음 등급 이름 (최상위면 null)
    pub next_level_name: Option<String>,
    /// 다음 등급까지 남은 포인트 (최상위면 null)
    pub points_to_next: Option<i64>,
}

/// 잔액 조회 응답
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user_id: Uuid,
    /// 미만료 EARN 합 - 전체 SPEND 합
    pub balance: i64,
}

/// 원장 히스토리 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// 페이지 (0부터 시작)
    pub page: Option<u32>,
    /// 페이지 크기 (기본 20, 최대 100)
    pub limit: Option<u32>,
}

/// 원장 히스토리 응답
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: Uuid,
    pub entries: Vec<LedgerEntryView>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryView {
    pub id: i64,
    pub amount: i64,
    pub kind: String, // EARN | SPEND
    pub source: String,
    pub description: Option<String>,
    pub created_at: String,
    pub expires_at: Option<String>,
}

/// 배지 목록 응답 (earned + not-earned 전체)
#[derive(Debug, Serialize)]
pub struct BadgeListResponse {
    pub user_id: Uuid,
    pub badges: Vec<BadgeView>,
    pub earned_count: usize,
}

#[derive(Debug, Serialize)]
pub struct BadgeView {
    pub code: String,
    pub name: String,
    pub condition_type: String,
    pub condition_value: f64,
    pub earned: bool,
    pub earned_at: Option<String>,
}

/// 스트릭 조회 응답
#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub user_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<String>,
}

/// 모먼트 목록 응답
#[derive(Debug, Serialize)]
pub struct MomentListResponse {
    pub user_id: Uuid,
    pub moments: Vec<MomentView>,
}

#[derive(Debug, Serialize)]
pub struct MomentView {
    pub moment_code: String,
    pub is_rare: bool,
    pub earned_at: String,
}

/// 관심사 숲 응답
#[derive(Debug, Serialize)]
pub struct ForestResponse {
    pub user_id: Uuid,
    pub trees: Vec<TreeView>,
}

#[derive(Debug, Serialize)]
pub struct TreeView {
    pub category_id: i64,
    pub participation_count: i32,
    /// 읽기 시점 파생값 (저장 안 함)
    pub tree_level: i32,
    pub tree_name: String,
}

// ============ Handlers ============

/// GET /api/trust/levels/:user_id
pub async fn get_level(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<LevelResponse>, ApiError> {
    let growth_points = state
        .db
        .get_user_level(user_id)
        .await?
        .map(|row| row.growth_points)
        .unwrap_or(0);

    // 저장된 level 컬럼이 아니라 항상 원본(포인트)에서 재계산해 응답
    let tier = level::level_for(growth_points);
    let next = level::next_level_for(tier.level);

    Ok(Json(LevelResponse {
        user_id,
        level: tier.level,
        name: tier.name.to_string(),
        growth_points,
        next_level_name: next.map(|t| t.name.to_string()),
        points_to_next: level::points_to_next(growth_points),
    }))
}

/// GET /api/trust/points/:user_id/balance
pub async fn get_balance(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = ledger::balance(&state.db, user_id).await?;
    Ok(Json(BalanceResponse { user_id, balance }))
}

/// GET /api/trust/points/:user_id/history
///
/// 원장 히스토리 (페이지네이션)
pub async fn get_point_history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let page = query.page.unwrap_or(0);
    let limit = query.limit.unwrap_or(20).min(100); // 최대 100개

    let (entries, total) = state.db.ledger_history(user_id, page, limit).await?;

    let has_next = has_next_page(page, limit, total);

    Ok(Json(HistoryResponse {
        user_id,
        entries: entries
            .into_iter()
            .map(|e| LedgerEntryView {
                id: e.id,
                amount: e.amount,
                kind: e.kind,
                source: e.source,
                description: e.description,
                created_at: e.created_at.to_rfc3339(),
                expires_at: e.expires_at.map(|t| t.to_rfc3339()),
            })
            .collect(),
        pagination: Pagination {
            page,
            limit,
            total: total as u64,
            has_next,
        },
    }))
}

/// GET /api/trust/badges/:user_id/all
///
/// 프로필 페이지 계약: 획득/미획득 배지를 한 번에 반환
pub async fn list_badges(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<BadgeListResponse>, ApiError> {
    let rows = state.db.list_badge_statuses(user_id).await?;

    let badges: Vec<BadgeView> = rows
        .into_iter()
        .map(|row| BadgeView {
            code: row.code,
            name: row.name,
            condition_type: row.condition_type,
            condition_value: row.condition_value,
            earned: row.earned_at.is_some(),
            earned_at: row.earned_at.map(|t| t.to_rfc3339()),
        })
        .collect();

    let earned_count = badges.iter().filter(|b| b.earned).count();

    Ok(Json(BadgeListResponse {
        user_id,
        badges,
        earned_count,
    }))
}

/// GET /api/trust/streaks/:user_id
pub async fn get_streak(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<StreakResponse>, ApiError> {
    match state.db.get_streak(user_id).await? {
        Some(s) => Ok(Json(StreakResponse {
            user_id,
            current_streak: s.current_streak,
            longest_streak: s.longest_streak,
            last_activity_date: s.last_activity_date.map(|d| d.to_string()),
        })),
        None => Ok(Json(StreakResponse {
            user_id,
            current_streak: 0,
            longest_streak: 0,
            last_activity_date: None,
        })),
    }
}

/// GET /api/trust/moments/:user_id
pub async fn list_moments(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<MomentListResponse>, ApiError> {
    let moments = state.db.list_moments(user_id).await?;

    Ok(Json(MomentListResponse {
        user_id,
        moments: moments
            .into_iter()
            .map(|m| MomentView {
                moment_code: m.moment_code,
                is_rare: m.is_rare,
                earned_at: m.earned_at.to_rfc3339(),
            })
            .collect(),
    }))
}

/// GET /api/trust/forest/:user_id
pub async fn list_forest(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ForestResponse>, ApiError> {
    let entries = state.db.list_forest(user_id).await?;

    Ok(Json(ForestResponse {
        user_id,
        trees: entries
            .into_iter()
            .map(|e| {
                let tier = forest::tree_level_for(e.participation_count);
                TreeView {
                    category_id: e.category_id,
                    participation_count: e.participation_count,
                    tree_level: tier.level,
                    tree_name: tier.name.to_string(),
                }
            })
            .collect(),
    }))
}

/// 다음 페이지 존재 여부. 호출자 제공 page가 커도 u32 곱셈이
/// 넘치지 않도록 i64로 승격해 계산
fn has_next_page(page: u32, limit: u32, total: i64) -> bool {
    (i64::from(page) + 1) * i64::from(limit) < total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_next_page() {
        // 총 45건, 페이지당 20건 → 0, 1페이지 뒤에 잔여 있음
        assert!(has_next_page(0, 20, 45));
        assert!(has_next_page(1, 20, 45));
        assert!(!has_next_page(2, 20, 45));
        assert!(!has_next_page(0, 20, 0));
    }

    #[test]
    fn test_has_next_page_huge_page_does_not_overflow() {
        // page=u32::MAX 같은 악의적 입력도 패닉/랩어라운드 없이 false
        assert!(!has_next_page(u32::MAX, 100, 45));
    }
}
