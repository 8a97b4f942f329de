//! Moim Trust API Library
//!
//! # Overview
//!
//! 이 라이브러리는 모임 플랫폼의 Trust & Progression 엔진을 제공합니다.
//! 사용자 활동(모임 참석/호스팅, 리뷰, 로그인)을 레벨 진급, 포인트 원장,
//! 배지 수여, 활동 스트릭, 모먼트 기록, 관심사 숲 성장으로 변환합니다.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                외부 협력자 (모임/리뷰/게시판)               │
//! └──────────────────────────┬───────────────────────────────┘
//!                            │ applyEvent
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                 Progression Orchestrator                  │
//! │                                                          │
//! │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │
//! │  │ Ledger │ │ Streak │ │ Badge  │ │ Forest │ │ Moment │ │
//! │  └───┬────┘ └───┬────┘ └───┬────┘ └───┬────┘ └───┬────┘ │
//! │      └──────────┴─────┬────┴──────────┴──────────┘      │
//! └───────────────────────┼──────────────────────────────────┘
//!                         ▼
//!                 ┌──────────────┐
//!                 │  PostgreSQL  │
//!                 └──────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 처리
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: 비즈니스 로직 (레벨/원장/스트릭/배지/숲/모먼트/오케스트레이터)
//! - `db`: 데이터베이스 연동
//! - `types`: 공통 타입 정의

use std::sync::Arc;

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::ApiError;
pub use services::metrics::MetricsProvider;

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub metrics: Arc<dyn MetricsProvider>,
    pub config: Arc<Config>,
}
