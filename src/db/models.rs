//! Database Models
//!
//! Trust & Progression 엔진이 소유하는 7개 엔티티의 row 매핑.
//! 모든 엔티티는 참조하는 사용자 소유이며 사용자 간 공유/변경되지 않음.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// 사용자 레벨
///
/// growth_points가 원본값. level은 level_for(growth_points)의 캐시로
/// 포인트를 변경하는 트랜잭션 안에서만 함께 갱신됨
#[derive(Debug, Clone, FromRow)]
pub struct UserLevel {
    pub user_id: Uuid,
    pub level: i32,
    /// 누적 성장 포인트 (EARN 합계, SPEND/만료의 영향 없음)
    pub growth_points: i64,
    pub updated_at: DateTime<Utc>,
}

/// 포인트 원장 엔트리 (append-only)
#[derive(Debug, Clone, FromRow)]
pub struct PointLedgerEntry {
    pub id: i64,
    pub user_id: Uuid,
    /// 항상 양수. 부호는 kind로 구분
    pub amount: i64,
    /// EARN | SPEND
    pub kind: String,
    /// 적립/차감 출처 (이벤트 타입, STREAK_MILESTONE, 상점 주문 번호 등)
    pub source: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// EARN 유효기간. 만료되어도 row는 감사 기록으로 보존
    pub expires_at: Option<DateTime<Utc>>,
}

/// 배지 마스터 (참조 데이터, 엔진은 읽기 전용)
#[derive(Debug, Clone, FromRow)]
pub struct Badge {
    pub id: i64,
    pub code: String,
    pub name: String,
    /// Condition Catalog의 태그 (ATTENDANCE_RATE, HOSTING_COUNT, ...)
    pub condition_type: String,
    pub condition_value: f64,
    pub is_active: bool,
}

/// 사용자가 획득한 배지
///
/// (user_id, badge_id) 유니크: 수여는 멱등이며 이 코어에서 회수되지 않음
#[derive(Debug, Clone, FromRow)]
pub struct UserBadge {
    pub id: i64,
    pub user_id: Uuid,
    pub badge_id: i64,
    pub earned_at: DateTime<Utc>,
}

/// 활동 스트릭
#[derive(Debug, Clone, FromRow)]
pub struct UserStreak {
    pub user_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: Option<NaiveDate>,
}

/// 모먼트 컬렉션 (append-only, 다른 상태로부터 재유도 불가)
#[derive(Debug, Clone, FromRow)]
pub struct MomentCollection {
    pub id: i64,
    pub user_id: Uuid,
    pub moment_code: String,
    pub is_rare: bool,
    pub earned_at: DateTime<Utc>,
}

/// 배지 보유 현황 행 (/badges/:user_id/all 조회 전용)
///
/// badges LEFT JOIN user_badges 결과: earned_at이 None이면 미획득
#[derive(Debug, Clone, FromRow)]
pub struct BadgeStatusRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub condition_type: String,
    pub condition_value: f64,
    pub earned_at: Option<DateTime<Utc>>,
}

/// 관심사 숲 엔트리 (user_id, category_id당 1행)
///
/// 트리 등급은 participation_count의 읽기 시점 파생값: 저장하지 않음
#[derive(Debug, Clone, FromRow)]
pub struct InterestForestEntry {
    pub id: i64,
    pub user_id: Uuid,
    pub category_id: i64,
    pub participation_count: i32,
}
