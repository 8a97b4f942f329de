//! Streak Tracker
//!
//! # Interview Q&A
//!
//! Q: 스트릭 전이를 순수 함수로 분리한 이유는?
//! A: 상태 기계의 전 경로를 DB 없이 단위 테스트하기 위함
//!    - 같은 날 재활동: no-op (중복 카운트 방지)
//!    - 다음 날: +1
//!    - 그 외(이틀 이상 공백, 과거 날짜): 1로 리셋
//!    영속화는 db 모듈이 SELECT ... FOR UPDATE 트랜잭션으로 감싸서
//!    동일 사용자의 동시 이벤트 간 lost update를 막음
//!
//! Q: 마일스톤 보상이 정확히 한 번만 지급되는 근거는?
//! A: "도달"과 "유지"를 구분함
//!    current_streak가 정확히 임계값이 되는 활동에서만 crossed로 판정.
//!    7일차 이후 매일 7 이상이어도 재지급되지 않고,
//!    스트릭이 끊겨 다시 7에 도달하면 새 streak run이므로 다시 지급됨

use chrono::{Duration, NaiveDate};

/// 마일스톤 임계값 (연속 활동 일수)
pub const MILESTONES: [i32; 5] = [3, 7, 30, 90, 365];

/// 마일스톤별 일회성 포인트 보상
pub fn milestone_reward(milestone: i32) -> i64 {
    match milestone {
        3 => 15,
        7 => 50,
        30 => 150,
        90 => 300,
        365 => 1000,
        _ => 0,
    }
}

/// 전이 계산에 필요한 스트릭 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakState {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub last_activity_date: NaiveDate,
}

/// 활동 기록 전이 (순수 함수)
///
/// 반환: (새 상태, 이번 활동으로 정확히 도달한 마일스톤)
pub fn apply_activity(
    prev: Option<StreakState>,
    activity_date: NaiveDate,
) -> (StreakState, Option<i32>) {
    let (current, longest) = match prev {
        // 첫 활동
        None => (1, 0),
        Some(s) => {
            if activity_date == s.last_activity_date {
                // 같은 날 재활동: 상태 변화 없음 (멱등)
                return (s, None);
            } else if activity_date == s.last_activity_date + Duration::days(1) {
                (s.current_streak + 1, s.longest_streak)
            } else {
                // 이틀 이상 공백 또는 과거 날짜: 리셋
                (1, s.longest_streak)
            }
        }
    };

    let next = StreakState {
        current_streak: current,
        longest_streak: longest.max(current),
        last_activity_date: activity_date,
    };

    // 정확히 임계값에 도달한 경우에만 crossed
    let milestone = MILESTONES.iter().copied().find(|&m| current == m);

    (next, milestone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_first_activity_starts_at_one() {
        let (s, m) = apply_activity(None, d(1));
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.longest_streak, 1);
        assert_eq!(s.last_activity_date, d(1));
        assert!(m.is_none());
    }

    #[test]
    fn test_same_day_is_noop() {
        let (s1, _) = apply_activity(None, d(1));
        let (s2, m) = apply_activity(Some(s1), d(1));
        assert_eq!(s1, s2);
        assert!(m.is_none());
    }

    #[test]
    fn test_next_day_increments() {
        let (s1, _) = apply_activity(None, d(1));
        let (s2, _) = apply_activity(Some(s1), d(2));
        assert_eq!(s2.current_streak, 2);
        assert_eq!(s2.longest_streak, 2);
    }

    #[test]
    fn test_gap_resets_to_one() {
        let (s1, _) = apply_activity(None, d(1));
        let (s2, _) = apply_activity(Some(s1), d(2));
        let (s3, _) = apply_activity(Some(s2), d(5)); // 이틀 공백
        assert_eq!(s3.current_streak, 1);
        assert_eq!(s3.longest_streak, 2); // longest는 절대 감소하지 않음
    }

    #[test]
    fn test_past_date_resets() {
        let (s1, _) = apply_activity(None, d(10));
        let (s2, _) = apply_activity(Some(s1), d(3));
        assert_eq!(s2.current_streak, 1);
    }

    #[test]
    fn test_milestone_fires_exactly_once_per_run() {
        // 2025-01-01..01-07 연속 7일 → 3일차와 7일차에 각각 한 번씩
        let mut state = None;
        let mut milestones = vec![];
        for day in 1..=7 {
            let (s, m) = apply_activity(state, d(day));
            if let Some(m) = m {
                milestones.push((day, m));
            }
            state = Some(s);
        }
        assert_eq!(state.unwrap().current_streak, 7);
        assert_eq!(milestones, vec![(3, 3), (7, 7)]);

        // 01-08을 건너뛰고 01-09 활동 → 1로 리셋, 마일스톤 없음
        let (s, m) = apply_activity(state, d(9));
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.longest_streak, 7);
        assert!(m.is_none());
    }

    #[test]
    fn test_milestone_not_refired_above_threshold() {
        // 8일째(스트릭 8)에는 7일 마일스톤이 다시 발화하지 않음
        let mut state = None;
        for day in 1..=7 {
            state = Some(apply_activity(state, d(day)).0);
        }
        let (s, m) = apply_activity(state, d(8));
        assert_eq!(s.current_streak, 8);
        assert!(m.is_none());
    }

    #[test]
    fn test_milestone_refires_on_new_run() {
        // 끊긴 뒤 다시 3일 연속이면 3일 마일스톤은 새 run에서 재지급
        let mut state = None;
        for day in 1..=3 {
            state = Some(apply_activity(state, d(day)).0);
        }
        state = Some(apply_activity(state, d(10)).0); // 리셋
        state = Some(apply_activity(state, d(11)).0);
        let (_, m) = apply_activity(state, d(12));
        assert_eq!(m, Some(3));
    }

    #[test]
    fn test_milestone_rewards() {
        assert_eq!(milestone_reward(3), 15);
        assert_eq!(milestone_reward(7), 50);
        assert_eq!(milestone_reward(30), 150);
        assert_eq!(milestone_reward(90), 300);
        assert_eq!(milestone_reward(365), 1000);
        assert_eq!(milestone_reward(4), 0);
    }
}
