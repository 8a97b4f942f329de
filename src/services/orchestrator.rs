//! Progression Orchestrator
//!
//! 외부 이벤트 하나를 받아 6개 하위 효과로 팬아웃하는 진입점.
//!
//! # 처리 순서 (고정)
//!
//! 1. 지표 스냅샷 읽기 (실패 시 어떤 변경도 없이 중단, fail closed)
//! 2. 이벤트 기본 포인트 적립 (원장 append + 성장 포인트/레벨 갱신)
//! 3. 스트릭 갱신 + 마일스톤 보상 지급
//! 4. 카테고리 있으면 관심사 숲 카운터 증가
//! 5. 엔진 소유 지표를 갱신값으로 덮어쓴 스냅샷으로 배지 재평가
//! 6. 이벤트가 동봉한 모먼트 기록
//!
//! # 부분 적용과 재시도
//!
//! 단계 사이에 트랜잭션 경계를 두지 않음: 각 단계가 독립적으로
//! 멱등-안전(append / 유니크 제약 no-op / 같은 날 no-op)이라
//! 중간 실패 후 재시도로 인한 부분 적용이 무해함.
//! 단, 포인트 EARN의 중복 적용 방지는 호출 측 이벤트 식별자 책임
//! (멱등키 저장소는 이 코어 범위 밖)

use std::collections::HashSet;

use crate::config::Config;
use crate::db::Database;
use crate::error::ApiError;
use crate::services::{badge, forest, ledger, level, metrics::MetricsProvider, moment, streak};
use crate::types::{
    EventType, ForestDelta, LevelDelta, ProgressionEvent, ProgressionResult, StreakDelta,
};

/// 마일스톤 보상의 원장 source 식별자
const STREAK_MILESTONE_SOURCE: &str = "STREAK_MILESTONE";

/// 이벤트 1건 적용
pub async fn apply_event(
    db: &Database,
    metrics: &dyn MetricsProvider,
    config: &Config,
    event: ProgressionEvent,
) -> Result<ProgressionResult, ApiError> {
    let user_id = event.user_id;

    // 1. 단일 스냅샷 읽기: 모든 하위 효과가 이 한 번의 읽기에서 출발
    //    (부분/불일치 읽기 방지). 공급자 장애면 여기서 중단
    let mut snapshot = metrics.snapshot(user_id).await?;

    tracing::debug!(
        "Applying {:?} for user {} (date: {})",
        event.event_type,
        user_id,
        event.activity_date
    );

    // 2. 기본 포인트 적립
    let base_points = event.event_type.base_points();
    let expires_at = ledger::expiry_from_now(config.point_expiry_days);
    ledger::earn(
        db,
        user_id,
        base_points,
        event.event_type.source(),
        None,
        expires_at,
    )
    .await?;
    let mut user_level = db.add_growth_points(user_id, base_points).await?;

    // 3. 스트릭 갱신 + 마일스톤 일회성 보상
    let (streak_row, milestone) = db
        .record_streak_activity(user_id, event.activity_date)
        .await?;

    let mut bonus_points = 0;
    if let Some(days) = milestone {
        let reward = streak::milestone_reward(days);
        if reward > 0 {
            let description = format!("{}일 연속 활동 달성", days);
            ledger::earn(
                db,
                user_id,
                reward,
                STREAK_MILESTONE_SOURCE,
                Some(description.as_str()),
                expires_at,
            )
            .await?;
            user_level = db.add_growth_points(user_id, reward).await?;
            bonus_points = reward;

            tracing::info!(
                "User {} reached {}-day streak milestone (+{}p)",
                user_id,
                days,
                reward
            );
        }
    }

    // 4. 관심사 숲 (이벤트가 카테고리를 동반할 때만)
    let forest_delta = match event.category_id {
        Some(category_id) => {
            let count = db.increment_participation(user_id, category_id).await?;
            let tier = forest::tree_level_for(count);
            let prev_tier = forest::tree_level_for(count - 1);
            Some(ForestDelta {
                category_id,
                participation_count: count,
                tree_level: tier.level,
                tree_name: tier.name.to_string(),
                tier_changed: tier.level > prev_tier.level,
            })
        }
        None => None,
    };

    // 5. 배지 재평가: 엔진 소유 필드를 방금 적용한 값으로 덮어쓴
    //    post-event 스냅샷 기준 (외부 유래 필드는 공급자 값 그대로)
    snapshot.growth_points = user_level.growth_points;
    snapshot.streak_days = streak_row.current_streak as i64;

    let active_badges = db.active_badges().await?;
    let held: HashSet<i64> = db.held_badge_ids(user_id).await?.into_iter().collect();

    let mut new_badges = Vec::new();
    for candidate in badge::newly_qualified(&snapshot, &active_badges, &held) {
        // 동시 평가 경쟁에서 진 INSERT는 false: 결과에서 제외
        if db.try_award_badge(user_id, candidate.id).await? {
            tracing::info!("Awarded badge '{}' to user {}", candidate.code, user_id);
            new_badges.push(candidate.code.clone());
        }
    }

    // 6. 호출 측이 동봉한 모먼트 기록
    let moment_recorded = match &event.moment {
        Some(m) => {
            let recorded = moment::record(db, user_id, &m.code, m.is_rare).await?;
            Some(recorded.moment_code)
        }
        None => None,
    };

    // 레벨업 여부는 적립 전 포인트의 등급과 비교 (순수 재계산)
    let points_before = user_level.growth_points - base_points - bonus_points;
    let tier = level::level_for(user_level.growth_points);
    let leveled_up = level::level_for(points_before).level < tier.level;

    Ok(ProgressionResult {
        user_id,
        points_earned: base_points,
        bonus_points,
        level: LevelDelta {
            level: tier.level,
            name: tier.name.to_string(),
            growth_points: user_level.growth_points,
            leveled_up,
        },
        streak: StreakDelta {
            current_streak: streak_row.current_streak,
            longest_streak: streak_row.longest_streak,
            milestone_reached: milestone,
        },
        new_badges,
        forest: forest_delta,
        moment_recorded,
    })
}

/// 카테고리를 동반할 수 있는 이벤트 타입인지 (요청 검증용).
/// 관심사 숲 카운터는 모임 계열 이벤트만 대상
pub fn carries_category(event_type: EventType) -> bool {
    matches!(
        event_type,
        EventType::GatheringAttended | EventType::GatheringHosted
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_up_detection_is_pure() {
        // 적립 전 49p → 60p 적립 후 109p: 씨앗(1) → 새싹(2)
        let before = level::level_for(49).level;
        let after = level::level_for(109).level;
        assert!(after > before);

        // 같은 등급 내 이동은 레벨업 아님
        assert_eq!(level::level_for(10).level, level::level_for(40).level);
    }

    #[test]
    fn test_category_carrying_events() {
        assert!(carries_category(EventType::GatheringAttended));
        assert!(carries_category(EventType::GatheringHosted));
        assert!(!carries_category(EventType::LoginStreakTick));
        assert!(!carries_category(EventType::ReviewSubmitted));
    }
}
