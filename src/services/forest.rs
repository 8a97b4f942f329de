//! Interest Forest Tracker
//!
//! 카테고리별 참여 카운터의 트리 등급 파생. 카운터 증가 자체는
//! db 모듈의 원자적 upsert(ON CONFLICT ... + 1)가 담당하고,
//! 여기서는 participation_count → 트리 등급 순수 조회만 제공함.

use serde::Serialize;

/// 트리 등급 설명자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeTier {
    pub level: i32,
    pub name: &'static str,
    pub min_count: i32,
    /// 최상위 등급은 None (open-ended)
    pub max_count: Option<i32>,
}

/// 6단계 트리 등급 테이블 (오름차순)
pub const TREE_TIERS: [TreeTier; 6] = [
    TreeTier { level: 1, name: "씨앗", min_count: 0, max_count: Some(2) },
    TreeTier { level: 2, name: "새싹", min_count: 3, max_count: Some(5) },
    TreeTier { level: 3, name: "묘목", min_count: 6, max_count: Some(10) },
    TreeTier { level: 4, name: "어린나무", min_count: 11, max_count: Some(20) },
    TreeTier { level: 5, name: "나무", min_count: 21, max_count: Some(50) },
    TreeTier { level: 6, name: "거목", min_count: 51, max_count: None },
];

/// 참여 횟수에 해당하는 트리 등급 반환 (읽기 시점 파생값)
pub fn tree_level_for(participation_count: i32) -> TreeTier {
    for tier in TREE_TIERS.iter().rev() {
        if participation_count >= tier.min_count {
            return *tier;
        }
    }
    TREE_TIERS[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_partition_without_gaps() {
        for pair in TREE_TIERS.windows(2) {
            assert_eq!(pair[0].max_count.unwrap() + 1, pair[1].min_count);
        }
        assert_eq!(TREE_TIERS[0].min_count, 0);
        assert!(TREE_TIERS[5].max_count.is_none());
    }

    #[test]
    fn test_tree_level_boundaries() {
        assert_eq!(tree_level_for(0).name, "씨앗");
        assert_eq!(tree_level_for(2).name, "씨앗");
        assert_eq!(tree_level_for(3).name, "새싹");
        assert_eq!(tree_level_for(10).name, "묘목");
        assert_eq!(tree_level_for(11).name, "어린나무");
        assert_eq!(tree_level_for(51).name, "거목");
        assert_eq!(tree_level_for(i32::MAX).name, "거목");
    }

    #[test]
    fn test_tree_level_monotonic() {
        // participation_count가 늘수록 등급은 절대 내려가지 않음
        let mut prev = 0;
        for count in 0..200 {
            let level = tree_level_for(count).level;
            assert!(level >= prev, "tier dropped at count {}", count);
            prev = level;
        }
    }
}
