//! Point Ledger
//!
//! 포인트 적립/차감의 비즈니스 규칙. 실제 append와 집계는 db 모듈 담당.
//!
//! 불변식:
//! - 엔트리는 append-only: 만료 스윕조차 row를 지우지 않음 (감사 기록)
//! - 잔액 = 미만료 EARN 합 - 전체 SPEND 합, 항상 0 이상
//! - 잔액을 초과하는 SPEND는 상태 변경 없이 InsufficientBalance로 거부

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::db::{Database, SpendResult};
use crate::db::models::PointLedgerEntry;
use crate::error::ApiError;

/// 금액 검증 (EARN/SPEND 공통: 항상 양수)
fn validate_amount(amount: i64) -> Result<(), ApiError> {
    if amount <= 0 {
        return Err(ApiError::ValidationError(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

/// EARN 엔트리의 만료 시각 계산
pub fn expiry_from_now(expiry_days: i64) -> Option<DateTime<Utc>> {
    if expiry_days <= 0 {
        // 0 이하로 설정하면 무기한 (만료 없음)
        None
    } else {
        Some(Utc::now() + Duration::days(expiry_days))
    }
}

/// 포인트 적립. 유효한 양수 금액이면 항상 성공
pub async fn earn(
    db: &Database,
    user_id: Uuid,
    amount: i64,
    source: &str,
    description: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
) -> Result<PointLedgerEntry, ApiError> {
    validate_amount(amount)?;

    let entry = db
        .insert_ledger_entry(user_id, amount, "EARN", source, description, expires_at)
        .await?;

    tracing::debug!(
        "Earned {}p for user {} (source: {})",
        amount,
        user_id,
        source
    );

    Ok(entry)
}

/// 포인트 사용. 잔액 부족이면 아무것도 기록하지 않고 거부
pub async fn spend(
    db: &Database,
    user_id: Uuid,
    amount: i64,
    source: &str,
    description: Option<&str>,
) -> Result<PointLedgerEntry, ApiError> {
    validate_amount(amount)?;

    match db.try_spend(user_id, amount, source, description).await? {
        SpendResult::Applied(entry) => Ok(entry),
        SpendResult::Insufficient { balance } => Err(ApiError::InsufficientBalance {
            balance,
            requested: amount,
        }),
    }
}

/// 현재 잔액 조회
pub async fn balance(db: &Database, user_id: Uuid) -> Result<i64, ApiError> {
    Ok(db.balance_of(user_id, Utc::now()).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(1).is_ok());
        assert!(validate_amount(0).is_err());
        assert!(validate_amount(-10).is_err());
    }

    #[test]
    fn test_expiry_from_now() {
        let expiry = expiry_from_now(365).unwrap();
        let days = (expiry - Utc::now()).num_days();
        assert!((364..=365).contains(&days));

        // 0 이하는 무기한
        assert!(expiry_from_now(0).is_none());
        assert!(expiry_from_now(-1).is_none());
    }
}
