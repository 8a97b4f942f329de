//! Services Module
//!
//! Trust & Progression 엔진의 비즈니스 로직
//!
//! # Services
//! - `level`: 성장 포인트 → 레벨 등급 (순수 함수)
//! - `ledger`: 포인트 적립/차감 규칙
//! - `streak`: 연속 활동 상태 기계 + 마일스톤
//! - `badge`: 조건 카탈로그 + 배지 평가
//! - `forest`: 관심사 숲 트리 등급 (순수 함수)
//! - `moment`: 모먼트 append 기록
//! - `metrics`: 외부 지표 스냅샷 공급자
//! - `orchestrator`: 이벤트 → 6개 하위 효과 팬아웃

pub mod badge;
pub mod forest;
pub mod ledger;
pub mod level;
pub mod metrics;
pub mod moment;
pub mod orchestrator;
pub mod streak;
