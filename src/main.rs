//! Moim Trust API Server
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          외부 협력자 (모임/리뷰/게시판 서브시스템, 프로필 UI)   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum Web Server                         │
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                      Routes Layer                        ││
//! │  │  /health  /api/trust/events  /api/trust/{읽기 경로}      ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Services Layer                        ││
//! │  │  Orchestrator  Ledger  Streak  Badge  Forest  Moment    ││
//! │  └─────────────────────────────────────────────────────────┘│
//! │  ┌─────────────────────────────────────────────────────────┐│
//! │  │                    Data Layer                            ││
//! │  │  PostgreSQL    외부 지표 스냅샷 공급자 (HTTP)             ││
//! │  └─────────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// 라이브러리에서 가져오기
use moim_trust_api::{
    routes,
    services::metrics::HttpMetricsProvider,
    AppState, Config, Database,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    // RUST_LOG=debug,sqlx=warn 형태로 레벨 제어 가능
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "moim_trust_api=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting Moim Trust API Server");

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("📋 Configuration loaded");

    // 데이터베이스 연결
    let db = Database::connect(&config.database_url).await?;
    tracing::info!("🗄️  Database connected");

    // 마이그레이션 실행 (스키마 + 배지 시드 데이터)
    db.run_migrations().await?;
    tracing::info!("📦 Migrations completed");

    // 외부 지표 스냅샷 공급자
    let metrics = HttpMetricsProvider::new(&config.metrics_provider_url);
    tracing::info!("📊 Metrics provider connected");

    // 앱 상태 구성
    let state = AppState {
        db: Arc::new(db),
        metrics: Arc::new(metrics),
        config: Arc::new(config.clone()),
    };

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🌐 Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET  /health                              - 서버 상태 확인
///
/// POST /api/trust/events                    - 진급 이벤트 적용 (applyEvent)
/// POST /api/trust/points/spend              - 포인트 사용
///
/// GET  /api/trust/levels/:user_id           - 레벨 조회
/// GET  /api/trust/points/:user_id/balance   - 잔액 조회
/// GET  /api/trust/points/:user_id/history   - 원장 히스토리
/// GET  /api/trust/badges/:user_id/all       - 배지 목록 (획득 + 미획득)
/// GET  /api/trust/streaks/:user_id          - 스트릭 조회
/// GET  /api/trust/moments/:user_id          - 모먼트 목록
/// GET  /api/trust/forest/:user_id           - 관심사 숲 조회
/// ```
fn create_router(state: AppState) -> Router {
    // CORS 설정
    // 프로덕션에서는 특정 도메인만 허용
    // 개발 환경에서는 localhost 허용
    let cors = if state.config.is_production() {
        // 프로덕션: 특정 도메인만 허용 (환경변수로 설정)
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "https://yourdomain.com".to_string());
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        // 개발: localhost 허용
        CorsLayer::new()
            .allow_origin([
                "http://localhost:5173".parse().unwrap(), // Vite dev server
                "http://localhost:3000".parse().unwrap(), // Alternative
                "http://127.0.0.1:5173".parse().unwrap(),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        // Health check
        .route("/health", get(routes::health::health_check))

        // Progression events (쓰기 진입점)
        .route("/api/trust/events", post(routes::events::apply_event))
        .route("/api/trust/points/spend", post(routes::events::spend_points))

        // 프로필 UI 읽기 경로
        .route("/api/trust/levels/:user_id", get(routes::trust::get_level))
        .route("/api/trust/points/:user_id/balance", get(routes::trust::get_balance))
        .route("/api/trust/points/:user_id/history", get(routes::trust::get_point_history))
        .route("/api/trust/badges/:user_id/all", get(routes::trust::list_badges))
        .route("/api/trust/streaks/:user_id", get(routes::trust::get_streak))
        .route("/api/trust/moments/:user_id", get(routes::trust::list_moments))
        .route("/api/trust/forest/:user_id", get(routes::trust::list_forest))

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}
