//! Database Module
//!
//! # Interview Q&A
//!
//! Q: 동시성 제어를 어디서 하는가?
//! A: 쓰기 패턴별로 다르게
//!
//!    1. 원장/모먼트: append-only라 제어 불필요
//!       잔액은 읽기 시점 집계: 저장된 balance 필드에 대한
//!       read-modify-write 자체가 없으므로 동시 적립이 유실되지 않음
//!    2. 배지: (user_id, badge_id) 유니크 제약 + ON CONFLICT DO NOTHING
//!       경쟁에서 진 INSERT는 무해한 no-op
//!    3. 관심사 숲: 단일 UPDATE 문 안에서 증가 (원자적)
//!    4. 스트릭: 전이가 읽은 값에 의존하므로 SELECT ... FOR UPDATE로
//!       행 잠금: 이 코어에서 진짜 상호배제가 필요한 유일한 지점
//!    5. SPEND: 잔액 확인과 INSERT 사이의 race를
//!       pg_advisory_xact_lock(사용자 키)으로 직렬화
//!
//! Q: 왜 사용자 간 잠금은 없는가?
//! A: 모든 상태가 user_id로 파티셔닝되어 있어 서로 다른 사용자의
//!    이벤트는 완전히 독립: 병렬 처리에 제약이 없음

pub mod models;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use models::{
    Badge, BadgeStatusRow, InterestForestEntry, MomentCollection, PointLedgerEntry, UserLevel,
    UserStreak,
};

use crate::services::level::level_for;
use crate::services::streak::{apply_activity, StreakState};

/// SPEND 시도 결과
///
/// 잔액 부족은 DB 계층에서는 에러가 아니라 정상 분기.
/// HTTP 에러 매핑은 서비스 계층(ledger)이 담당
#[derive(Debug)]
pub enum SpendResult {
    Applied(PointLedgerEntry),
    Insufficient { balance: i64 },
}

/// 데이터베이스 연결 및 쿼리 담당
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10 (트래픽에 따라 조정)
    /// - min_connections: 1 (idle 시 최소 유지)
    /// - acquire_timeout: 3초 (커넥션 획득 대기)
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ============ Point Ledger ============

    /// 원장 엔트리 추가 (EARN/SPEND 공용 append)
    pub async fn insert_ledger_entry(
        &self,
        user_id: Uuid,
        amount: i64,
        kind: &str,
        source: &str,
        description: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<PointLedgerEntry> {
        let entry = sqlx::query_as::<_, PointLedgerEntry>(
            r#"
            INSERT INTO point_ledger (user_id, amount, kind, source, description, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, amount, kind, source, description, created_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(kind)
        .bind(source)
        .bind(description)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// 시점 잔액 조회: 미만료 EARN 합 - 전체 SPEND 합 (단일 집계 읽기)
    pub async fn balance_of(&self, user_id: Uuid, at: DateTime<Utc>) -> Result<i64> {
        let (balance,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(
                CASE
                    WHEN kind = 'EARN' AND (expires_at IS NULL OR expires_at > $2) THEN amount
                    WHEN kind = 'SPEND' THEN -amount
                    ELSE 0
                END
            ), 0)::BIGINT
            FROM point_ledger
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// SPEND 시도 (잔액 확인 + INSERT를 단일 트랜잭션으로)
    ///
    /// 사용자 키 advisory lock으로 동시 SPEND를 직렬화하여
    /// 확인과 기록 사이에 다른 SPEND가 끼어들어 잔액이 음수가 되는 것을 방지.
    /// 잔액 부족이면 아무것도 기록하지 않고 Insufficient 반환
    pub async fn try_spend(
        &self,
        user_id: Uuid,
        amount: i64,
        source: &str,
        description: Option<&str>,
    ) -> Result<SpendResult> {
        let mut tx = self.pool.begin().await?;

        // 트랜잭션 종료 시 자동 해제되는 사용자 단위 잠금
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        let (balance,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(
                CASE
                    WHEN kind = 'EARN' AND (expires_at IS NULL OR expires_at > NOW()) THEN amount
                    WHEN kind = 'SPEND' THEN -amount
                    ELSE 0
                END
            ), 0)::BIGINT
            FROM point_ledger
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if balance < amount {
            // 상태 변경 없이 거부
            return Ok(SpendResult::Insufficient { balance });
        }

        let entry = sqlx::query_as::<_, PointLedgerEntry>(
            r#"
            INSERT INTO point_ledger (user_id, amount, kind, source, description)
            VALUES ($1, $2, 'SPEND', $3, $4)
            RETURNING id, user_id, amount, kind, source, description, created_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(source)
        .bind(description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SpendResult::Applied(entry))
    }

    /// 원장 히스토리 조회 (페이지네이션)
    pub async fn ledger_history(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<PointLedgerEntry>, i64)> {
        // 호출자 제공 page가 커도 오버플로 없이 계산 (i64로 승격)
        let offset = i64::from(page) * i64::from(limit);

        let entries = sqlx::query_as::<_, PointLedgerEntry>(
            r#"
            SELECT id, user_id, amount, kind, source, description, created_at, expires_at
            FROM point_ledger
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM point_ledger WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((entries, count.0))
    }

    // ============ User Level ============

    /// 사용자 레벨 조회
    pub async fn get_user_level(&self, user_id: Uuid) -> Result<Option<UserLevel>> {
        let level = sqlx::query_as::<_, UserLevel>(
            "SELECT user_id, level, growth_points, updated_at FROM user_levels WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(level)
    }

    /// 성장 포인트 증가 + 레벨 재계산 (단일 트랜잭션)
    ///
    /// level == level_for(growth_points) 불변식은 포인트를 바꾸는
    /// 이 트랜잭션 안에서만 level을 다시 쓰는 것으로 보장됨.
    /// 증가 자체는 단일 UPDATE 문이라 동시 적립에도 유실 없음
    pub async fn add_growth_points(&self, user_id: Uuid, delta: i64) -> Result<UserLevel> {
        let mut tx = self.pool.begin().await?;

        let (growth_points,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO user_levels (user_id, level, growth_points, updated_at)
            VALUES ($1, 1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET growth_points = user_levels.growth_points + EXCLUDED.growth_points,
                updated_at = NOW()
            RETURNING growth_points
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        let tier = level_for(growth_points);

        let level = sqlx::query_as::<_, UserLevel>(
            r#"
            UPDATE user_levels
            SET level = $2
            WHERE user_id = $1
            RETURNING user_id, level, growth_points, updated_at
            "#,
        )
        .bind(user_id)
        .bind(tier.level)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(level)
    }

    // ============ Streak ============

    /// 스트릭 조회
    pub async fn get_streak(&self, user_id: Uuid) -> Result<Option<UserStreak>> {
        let streak = sqlx::query_as::<_, UserStreak>(
            r#"
            SELECT user_id, current_streak, longest_streak, last_activity_date
            FROM user_streaks
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(streak)
    }

    /// 활동 기록: FOR UPDATE 행 잠금 아래에서 순수 전이 적용 후 upsert
    ///
    /// 반환: (갱신된 스트릭, 이번 활동으로 정확히 도달한 마일스톤)
    pub async fn record_streak_activity(
        &self,
        user_id: Uuid,
        activity_date: NaiveDate,
    ) -> Result<(UserStreak, Option<i32>)> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserStreak>(
            r#"
            SELECT user_id, current_streak, longest_streak, last_activity_date
            FROM user_streaks
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let prev = row.as_ref().and_then(|r| {
            r.last_activity_date.map(|date| StreakState {
                current_streak: r.current_streak,
                longest_streak: r.longest_streak,
                last_activity_date: date,
            })
        });

        let (next, milestone) = apply_activity(prev, activity_date);

        let streak = sqlx::query_as::<_, UserStreak>(
            r#"
            INSERT INTO user_streaks (user_id, current_streak, longest_streak, last_activity_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET current_streak = $2, longest_streak = $3, last_activity_date = $4
            RETURNING user_id, current_streak, longest_streak, last_activity_date
            "#,
        )
        .bind(user_id)
        .bind(next.current_streak)
        .bind(next.longest_streak)
        .bind(next.last_activity_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((streak, milestone))
    }

    // ============ Badges ============

    /// 활성 배지 마스터 전체 조회
    pub async fn active_badges(&self) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, code, name, condition_type, condition_value, is_active
            FROM badges
            WHERE is_active = TRUE
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    /// 사용자가 보유한 배지 id 목록
    pub async fn held_badge_ids(&self, user_id: Uuid) -> Result<Vec<i64>> {
        let ids: Vec<(i64,)> =
            sqlx::query_as("SELECT badge_id FROM user_badges WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// 배지 수여 시도. 이미 보유(동시 경쟁 포함)면 no-op으로 false 반환
    pub async fn try_award_badge(&self, user_id: Uuid, badge_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// 전체 배지 + 획득 여부 (프로필 화면의 earned/not-earned 목록용)
    pub async fn list_badge_statuses(&self, user_id: Uuid) -> Result<Vec<BadgeStatusRow>> {
        let rows = sqlx::query_as::<_, BadgeStatusRow>(
            r#"
            SELECT b.id, b.code, b.name, b.condition_type, b.condition_value, ub.earned_at
            FROM badges b
            LEFT JOIN user_badges ub ON ub.badge_id = b.id AND ub.user_id = $1
            WHERE b.is_active = TRUE
            ORDER BY b.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============ Moments ============

    /// 모먼트 기록 (순수 append)
    pub async fn insert_moment(
        &self,
        user_id: Uuid,
        moment_code: &str,
        is_rare: bool,
    ) -> Result<MomentCollection> {
        let moment = sqlx::query_as::<_, MomentCollection>(
            r#"
            INSERT INTO moment_collections (user_id, moment_code, is_rare)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, moment_code, is_rare, earned_at
            "#,
        )
        .bind(user_id)
        .bind(moment_code)
        .bind(is_rare)
        .fetch_one(&self.pool)
        .await?;

        Ok(moment)
    }

    /// 모먼트 목록 (최신순)
    pub async fn list_moments(&self, user_id: Uuid) -> Result<Vec<MomentCollection>> {
        let moments = sqlx::query_as::<_, MomentCollection>(
            r#"
            SELECT id, user_id, moment_code, is_rare, earned_at
            FROM moment_collections
            WHERE user_id = $1
            ORDER BY earned_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(moments)
    }

    // ============ Interest Forest ============

    /// 참여 카운터 증가 (원자적 upsert, 증가 후 값 반환)
    pub async fn increment_participation(&self, user_id: Uuid, category_id: i64) -> Result<i32> {
        let (count,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO interest_forest (user_id, category_id, participation_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, category_id) DO UPDATE
            SET participation_count = interest_forest.participation_count + 1
            RETURNING participation_count
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// 관심사 숲 전체 조회
    pub async fn list_forest(&self, user_id: Uuid) -> Result<Vec<InterestForestEntry>> {
        let entries = sqlx::query_as::<_, InterestForestEntry>(
            r#"
            SELECT id, user_id, category_id, participation_count
            FROM interest_forest
            WHERE user_id = $1
            ORDER BY participation_count DESC, category_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
