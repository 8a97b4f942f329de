//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health` - 헬스 체크
//! - `/api/trust/events` - 진급 이벤트 적용 (쓰기 진입점)
//! - `/api/trust/points/*` - 포인트 잔액/히스토리/사용
//! - `/api/trust/levels/*` - 레벨 조회
//! - `/api/trust/badges/*` - 배지 목록
//! - `/api/trust/streaks/*` - 스트릭 조회
//! - `/api/trust/moments/*` - 모먼트 목록
//! - `/api/trust/forest/*` - 관심사 숲 조회

pub mod events;
pub mod health;
pub mod trust;
