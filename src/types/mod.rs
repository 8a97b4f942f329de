//! Common Types Module
//!
//! 애플리케이션 전반에서 사용되는 공통 타입 정의

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// 진급 대상 이벤트 타입
///
/// 외부 협력자(모임/리뷰/게시판 서브시스템)가 발행하는 이벤트 종류.
/// 요청에는 문자열로 실려 오고 parse()에서 검증됨: 핸들러 없이 추가된
/// 타입은 설정 오류(UnknownEventType)로 거부
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    /// 모임 참석 완료
    GatheringAttended,
    /// 모임 호스팅 완료
    GatheringHosted,
    /// 리뷰 작성
    ReviewSubmitted,
    /// 로그인 스트릭 틱 (하루 1회)
    LoginStreakTick,
}

impl EventType {
    /// 이벤트별 기본 포인트 지급량
    pub fn base_points(&self) -> i64 {
        match self {
            EventType::GatheringAttended => 10,
            EventType::GatheringHosted => 20,
            EventType::ReviewSubmitted => 5,
            EventType::LoginStreakTick => 1,
        }
    }

    /// 원장 source 필드에 기록되는 식별자
    pub fn source(&self) -> &'static str {
        match self {
            EventType::GatheringAttended => "GATHERING_ATTENDED",
            EventType::GatheringHosted => "GATHERING_HOSTED",
            EventType::ReviewSubmitted => "REVIEW_SUBMITTED",
            EventType::LoginStreakTick => "LOGIN_STREAK_TICK",
        }
    }

    /// 문자열 파싱 (알 수 없는 타입은 설정 오류로 거부)
    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "GATHERING_ATTENDED" => Ok(EventType::GatheringAttended),
            "GATHERING_HOSTED" => Ok(EventType::GatheringHosted),
            "REVIEW_SUBMITTED" => Ok(EventType::ReviewSubmitted),
            "LOGIN_STREAK_TICK" => Ok(EventType::LoginStreakTick),
            other => Err(ApiError::UnknownEventType(other.to_string())),
        }
    }
}

/// 이벤트에 동봉되는 모먼트 (호출 측이 자격 판단)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentPayload {
    pub code: String,
    #[serde(default)]
    pub is_rare: bool,
}

/// 진급 이벤트 (applyEvent 입력, 요청 파싱 후의 검증된 형태)
#[derive(Debug, Clone)]
pub struct ProgressionEvent {
    pub user_id: Uuid,
    pub event_type: EventType,
    /// 활동 날짜 (스트릭 계산 기준, KST 기준 날짜를 호출 측이 결정)
    pub activity_date: NaiveDate,
    /// 이벤트가 속한 카테고리 (관심사 숲 카운터 대상)
    pub category_id: Option<i64>,
    /// 이벤트가 직접 자격을 주는 모먼트
    pub moment: Option<MomentPayload>,
}

/// 레벨 변화 델타
#[derive(Debug, Clone, Serialize)]
pub struct LevelDelta {
    pub level: i32,
    pub name: String,
    pub growth_points: i64,
    /// 이번 이벤트로 레벨이 올랐는지
    pub leveled_up: bool,
}

/// 스트릭 변화 델타
#[derive(Debug, Clone, Serialize)]
pub struct StreakDelta {
    pub current_streak: i32,
    pub longest_streak: i32,
    /// 이번 활동으로 정확히 도달한 마일스톤 (3/7/30/90/365)
    pub milestone_reached: Option<i32>,
}

/// 관심사 숲 변화 델타
#[derive(Debug, Clone, Serialize)]
pub struct ForestDelta {
    pub category_id: i64,
    pub participation_count: i32,
    pub tree_level: i32,
    pub tree_name: String,
    /// 이번 참여로 트리 등급이 올랐는지
    pub tier_changed: bool,
}

/// applyEvent 결과: 모든 하위 효과의 집계
///
/// 호출 측은 이 델타만으로 사용자 알림을 구성할 수 있어야 함
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionResult {
    pub user_id: Uuid,
    pub points_earned: i64,
    /// 스트릭 마일스톤 보상 포인트 (기본 지급과 별도)
    pub bonus_points: i64,
    pub level: LevelDelta,
    pub streak: StreakDelta,
    pub new_badges: Vec<String>,
    pub forest: Option<ForestDelta>,
    pub moment_recorded: Option<String>,
}

/// 페이지네이션 메타데이터
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub has_next: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parse() {
        assert_eq!(
            EventType::parse("GATHERING_ATTENDED").unwrap(),
            EventType::GatheringAttended
        );
        assert!(EventType::parse("SOMETHING_ELSE").is_err());
    }

    #[test]
    fn test_base_points() {
        // 호스팅 > 참석 > 리뷰 > 로그인
        assert_eq!(EventType::GatheringHosted.base_points(), 20);
        assert_eq!(EventType::GatheringAttended.base_points(), 10);
        assert_eq!(EventType::ReviewSubmitted.base_points(), 5);
        assert_eq!(EventType::LoginStreakTick.base_points(), 1);
    }
}
