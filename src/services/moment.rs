//! Moment Recorder
//!
//! 희소/특별 "모먼트"의 append-only 기록. 엔진은 moment_code의 의미를
//! 해석하지 않음: 어떤 이벤트가 모먼트 자격이 있는지는 호출 측
//! (외부 협력자)이 결정하고, 여기서는 타임스탬프와 함께 적재만 함.
//! 카운터에서 재유도할 수 없는 기록이므로 절대 삭제되지 않음

use uuid::Uuid;

use crate::db::Database;
use crate::db::models::MomentCollection;
use crate::error::ApiError;

/// 모먼트 기록
pub async fn record(
    db: &Database,
    user_id: Uuid,
    moment_code: &str,
    is_rare: bool,
) -> Result<MomentCollection, ApiError> {
    let code = moment_code.trim();
    if code.is_empty() {
        return Err(ApiError::ValidationError(
            "moment code must not be empty".to_string(),
        ));
    }

    let moment = db.insert_moment(user_id, code, is_rare).await?;

    if is_rare {
        tracing::info!("Rare moment '{}' recorded for user {}", code, user_id);
    }

    Ok(moment)
}
