//! Condition Catalog & Badge Evaluator
//!
//! # Interview Q&A
//!
//! Q: 조건 타입을 enum + comparator로 분리한 이유는?
//! A: 태그드 레지스트리 패턴
//!    - 배지 마스터는 (condition_type, condition_value) 평면 데이터
//!    - 해석은 ConditionType이 담당: 타입별 비교 방향이 명시적
//!      (참석률/호스팅 수는 "이상", 지각 수/가입 순번은 "이하")
//!    - 새 조건 타입 추가 시 evaluator 루프는 손대지 않음
//!
//! Q: 동시에 두 요청이 같은 배지를 수여하려 하면?
//! A: 평가는 낙관적으로 하고 INSERT가 승부를 가림
//!    (user_id, badge_id) 유니크 제약 + ON CONFLICT DO NOTHING.
//!    진 쪽의 INSERT는 에러가 아니라 no-op: db::try_award_badge 참고

use std::collections::HashSet;

use crate::db::models::Badge;
use crate::services::metrics::MetricsSnapshot;

/// 배지 수여 조건 타입 (Condition Catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionType {
    /// 참석률 이상 (0.0 ~ 1.0)
    AttendanceRate,
    /// 호스팅 수 이상
    HostingCount,
    /// 모임 참여 수 이상
    ParticipationCount,
    /// 리뷰 수 이상
    ReviewCount,
    /// 평점 평균 이상
    RatingAvg,
    /// 연속 활동 일수 이상
    StreakDays,
    /// 누적 성장 포인트 이상
    GrowthPoints,
    /// 지각 수 이하 (낮게 유지해야 하는 지표)
    LateCount,
    /// 가입 순번 이하 (얼리어답터)
    SignupRank,
}

impl ConditionType {
    /// 마스터 데이터의 태그 문자열 파싱. 알 수 없는 태그는 None
    /// (해당 배지만 건너뛰고 경고 로그: 평가 전체를 중단하지 않음)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ATTENDANCE_RATE" => Some(Self::AttendanceRate),
            "HOSTING_COUNT" => Some(Self::HostingCount),
            "PARTICIPATION_COUNT" => Some(Self::ParticipationCount),
            "REVIEW_COUNT" => Some(Self::ReviewCount),
            "RATING_AVG" => Some(Self::RatingAvg),
            "STREAK_DAYS" => Some(Self::StreakDays),
            "GROWTH_POINTS" => Some(Self::GrowthPoints),
            "LATE_COUNT" => Some(Self::LateCount),
            "SIGNUP_RANK" => Some(Self::SignupRank),
            _ => None,
        }
    }

    /// 스냅샷에서 이 조건이 보는 지표를 선택. 미보고 지표는 None
    fn metric_of(&self, snapshot: &MetricsSnapshot) -> Option<f64> {
        match self {
            Self::AttendanceRate => Some(snapshot.attendance_rate),
            Self::HostingCount => Some(snapshot.hosting_count as f64),
            Self::ParticipationCount => Some(snapshot.participation_count as f64),
            Self::ReviewCount => Some(snapshot.review_count as f64),
            Self::RatingAvg => Some(snapshot.rating_avg),
            Self::StreakDays => Some(snapshot.streak_days as f64),
            Self::GrowthPoints => Some(snapshot.growth_points as f64),
            Self::LateCount => snapshot.late_count.map(|v| v as f64),
            Self::SignupRank => snapshot.signup_rank.map(|v| v as f64),
        }
    }

    /// 타입별 비교 방향 적용
    ///
    /// 수여는 되돌릴 수 없으므로 미보고(None) 지표는 불충족으로 처리.
    /// "이하" 조건을 누락값 0으로 평가하면 자동 충족이 되어 버림
    pub fn qualifies(&self, snapshot: &MetricsSnapshot, condition_value: f64) -> bool {
        let Some(metric) = self.metric_of(snapshot) else {
            return false;
        };
        match self {
            // 낮게 유지해야 하는 지표는 "이하"
            Self::LateCount | Self::SignupRank => metric <= condition_value,
            // 나머지는 "이상"
            _ => metric >= condition_value,
        }
    }
}

/// 활성 배지 중 미보유 + 조건 충족인 것만 반환 (순수 함수)
///
/// 수여 영속화(INSERT)는 호출 측 책임. 이미 수여된 배지는 지표가
/// 임계값 아래로 떨어져도 회수되지 않음: 평가 대상에서 제외될 뿐
pub fn newly_qualified<'a>(
    snapshot: &MetricsSnapshot,
    active_badges: &'a [Badge],
    held_badge_ids: &HashSet<i64>,
) -> Vec<&'a Badge> {
    active_badges
        .iter()
        .filter(|badge| !held_badge_ids.contains(&badge.id))
        .filter(|badge| match ConditionType::parse(&badge.condition_type) {
            Some(cond) => cond.qualifies(snapshot, badge.condition_value),
            None => {
                tracing::warn!(
                    "Badge {} has unknown condition type '{}', skipping",
                    badge.code,
                    badge.condition_type
                );
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(id: i64, code: &str, condition_type: &str, value: f64) -> Badge {
        Badge {
            id,
            code: code.to_string(),
            name: code.to_string(),
            condition_type: condition_type.to_string(),
            condition_value: value,
            is_active: true,
        }
    }

    #[test]
    fn test_gte_conditions() {
        let snap = MetricsSnapshot {
            hosting_count: 10,
            attendance_rate: 0.95,
            ..Default::default()
        };
        assert!(ConditionType::HostingCount.qualifies(&snap, 10.0));
        assert!(!ConditionType::HostingCount.qualifies(&snap, 11.0));
        assert!(ConditionType::AttendanceRate.qualifies(&snap, 0.9));
    }

    #[test]
    fn test_lte_conditions() {
        let snap = MetricsSnapshot {
            late_count: Some(0),
            signup_rank: Some(42),
            ..Default::default()
        };
        // 지각 0회 → "지각 없음" 충족
        assert!(ConditionType::LateCount.qualifies(&snap, 0.0));
        // 가입 순번 42 ≤ 100 → 얼리버드 충족
        assert!(ConditionType::SignupRank.qualifies(&snap, 100.0));

        let late = MetricsSnapshot { late_count: Some(2), ..Default::default() };
        assert!(!ConditionType::LateCount.qualifies(&late, 0.0));
    }

    #[test]
    fn test_unreported_lte_metrics_never_qualify() {
        // 공급자 응답에 "이하" 지표가 빠진 경우: 0으로 평가하면
        // 얼리버드/지각-없음이 자동 수여되므로 반드시 불충족이어야 함
        let badges = vec![
            badge(1, "early-bird", "SIGNUP_RANK", 100.0),
            badge(2, "never-late", "LATE_COUNT", 0.0),
        ];
        let snap: MetricsSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snap.signup_rank, None);
        assert_eq!(snap.late_count, None);
        assert!(newly_qualified(&snap, &badges, &HashSet::new()).is_empty());

        // 실제로 보고된 값이면 정상 충족
        let reported = MetricsSnapshot {
            signup_rank: Some(42),
            late_count: Some(0),
            ..Default::default()
        };
        assert_eq!(newly_qualified(&reported, &badges, &HashSet::new()).len(), 2);
    }

    #[test]
    fn test_newly_qualified_excludes_held() {
        let badges = vec![
            badge(1, "host-debut", "HOSTING_COUNT", 1.0),
            badge(2, "super-host", "HOSTING_COUNT", 10.0),
        ];
        let snap = MetricsSnapshot { hosting_count: 12, ..Default::default() };

        // 이미 host-debut 보유 → super-host만 새로 수여
        let held: HashSet<i64> = [1].into_iter().collect();
        let result = newly_qualified(&snap, &badges, &held);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code, "super-host");
    }

    #[test]
    fn test_newly_qualified_excludes_unmet() {
        let badges = vec![badge(1, "regular", "PARTICIPATION_COUNT", 10.0)];
        let snap = MetricsSnapshot { participation_count: 3, ..Default::default() };
        assert!(newly_qualified(&snap, &badges, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_unknown_condition_type_skipped() {
        // 핸들러 없는 조건 타입은 해당 배지만 건너뜀 (전체 평가는 계속)
        let badges = vec![
            badge(1, "mystery", "SOME_FUTURE_METRIC", 1.0),
            badge(2, "first-step", "PARTICIPATION_COUNT", 1.0),
        ];
        let snap = MetricsSnapshot { participation_count: 5, ..Default::default() };
        let result = newly_qualified(&snap, &badges, &HashSet::new());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].code, "first-step");
    }

    #[test]
    fn test_streak_and_points_conditions() {
        let snap = MetricsSnapshot {
            streak_days: 7,
            growth_points: 60,
            ..Default::default()
        };
        assert!(ConditionType::StreakDays.qualifies(&snap, 7.0));
        assert!(!ConditionType::StreakDays.qualifies(&snap, 30.0));
        assert!(ConditionType::GrowthPoints.qualifies(&snap, 50.0));
    }
}
