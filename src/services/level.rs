//! Level Calculator
//!
//! 누적 성장 포인트 → 레벨/등급 설명자 매핑. 순수 함수이며
//! 음이 아닌 모든 정수에 대해 정확히 하나의 등급을 반환함 (빈틈 없는 분할).
//!
//! # Design Decision
//!
//! 레벨은 "계산 가능한 값은 저장하지 않는다" 원칙의 파생값:
//! growth_points가 원본이고 level 컬럼은 표시용 캐시로만 존재.
//! 캐시가 원본과 어긋나는 클래스의 버그를 원천 차단하기 위해
//! 캐시 갱신은 포인트를 변경하는 트랜잭션 안에서만 일어남 (db 모듈 참고).

use serde::Serialize;

/// 레벨 등급 설명자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelTier {
    pub level: i32,
    pub name: &'static str,
    /// 등급 최소 포인트 (inclusive)
    pub min_points: i64,
    /// 등급 최대 포인트 (inclusive). 최상위 등급은 None (open-ended)
    pub max_points: Option<i64>,
}

/// 7단계 레벨 테이블 (오름차순, 최상위는 open-ended)
pub const LEVEL_TIERS: [LevelTier; 7] = [
    LevelTier { level: 1, name: "씨앗", min_points: 0, max_points: Some(49) },
    LevelTier { level: 2, name: "새싹", min_points: 50, max_points: Some(149) },
    LevelTier { level: 3, name: "잎새", min_points: 150, max_points: Some(299) },
    LevelTier { level: 4, name: "가지", min_points: 300, max_points: Some(599) },
    LevelTier { level: 5, name: "나무", min_points: 600, max_points: Some(999) },
    LevelTier { level: 6, name: "큰나무", min_points: 1000, max_points: Some(1999) },
    LevelTier { level: 7, name: "숲", min_points: 2000, max_points: None },
];

/// 성장 포인트에 해당하는 등급 반환
///
/// 음수 입력은 발생하지 않아야 하지만(EARN만 집계) 방어적으로 1레벨 처리
pub fn level_for(growth_points: i64) -> LevelTier {
    for tier in LEVEL_TIERS.iter().rev() {
        if growth_points >= tier.min_points {
            return *tier;
        }
    }
    LEVEL_TIERS[0]
}

/// 다음 등급 반환 (최상위 등급이면 None)
pub fn next_level_for(level: i32) -> Option<LevelTier> {
    LEVEL_TIERS.iter().find(|t| t.level == level + 1).copied()
}

/// 다음 등급까지 남은 포인트 (최상위면 None)
pub fn points_to_next(growth_points: i64) -> Option<i64> {
    let current = level_for(growth_points);
    next_level_for(current.level).map(|next| next.min_points - growth_points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_partition_without_gaps() {
        // 인접 등급의 경계가 정확히 맞물리는지 (max + 1 == next.min)
        for pair in LEVEL_TIERS.windows(2) {
            assert_eq!(pair[0].max_points.unwrap() + 1, pair[1].min_points);
        }
        assert_eq!(LEVEL_TIERS[0].min_points, 0);
        assert!(LEVEL_TIERS[6].max_points.is_none());
    }

    #[test]
    fn test_level_for_boundaries() {
        assert_eq!(level_for(0).name, "씨앗");
        assert_eq!(level_for(49).name, "씨앗");
        assert_eq!(level_for(50).name, "새싹");
        assert_eq!(level_for(60).name, "새싹"); // 60 포인트 적립 시나리오
        assert_eq!(level_for(149).name, "새싹");
        assert_eq!(level_for(150).name, "잎새");
        assert_eq!(level_for(1999).level, 6);
        assert_eq!(level_for(2000).name, "숲");
        // 최상위 등급은 open-ended
        assert_eq!(level_for(i64::MAX).name, "숲");
    }

    #[test]
    fn test_every_point_has_exactly_one_tier() {
        // 경계마다 속하는 등급이 정확히 하나인지
        for p in [0, 49, 50, 149, 150, 299, 300, 599, 600, 999, 1000, 1999, 2000, 50_000] {
            let matches = LEVEL_TIERS
                .iter()
                .filter(|t| p >= t.min_points && t.max_points.map_or(true, |m| p <= m))
                .count();
            assert_eq!(matches, 1, "point {} matched {} tiers", p, matches);
        }
    }

    #[test]
    fn test_next_level() {
        assert_eq!(next_level_for(1).unwrap().name, "새싹");
        assert_eq!(next_level_for(6).unwrap().name, "숲");
        assert!(next_level_for(7).is_none());
    }

    #[test]
    fn test_points_to_next() {
        assert_eq!(points_to_next(0), Some(50));
        assert_eq!(points_to_next(60), Some(90)); // 새싹 → 잎새(150)
        assert_eq!(points_to_next(2000), None);
    }

    #[test]
    fn test_negative_points_clamped_to_first_tier() {
        assert_eq!(level_for(-1).level, 1);
    }
}
