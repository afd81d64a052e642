use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PrincipalId;

/// JWT claims model (transport-agnostic).
///
/// Tokens carry identity only. Roles are never read from the token; they come
/// from the principal's memberships at request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Issued-at timestamp.
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Tolerated clock skew between the token issuer and this server, applied to
/// `iat` only. Expiry is enforced exactly.
pub const CLOCK_SKEW_LEEWAY_SECS: i64 = 30;

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification lives in
/// [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now + chrono::Duration::seconds(CLOCK_SKEW_LEEWAY_SECS) < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_at: DateTime<Utc>, ttl: Duration) -> JwtClaims {
        JwtClaims {
            sub: PrincipalId::new(),
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn window_checks() {
        let now = Utc::now();
        assert_eq!(validate_claims(&claims(now, Duration::minutes(5)), now), Ok(()));
        assert_eq!(
            validate_claims(&claims(now, Duration::minutes(5)), now + Duration::minutes(5)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims(now + Duration::minutes(1), Duration::minutes(5)), now),
            Err(TokenValidationError::NotYetValid)
        );
        assert_eq!(
            validate_claims(&claims(now, Duration::zero()), now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn issuer_clock_slightly_ahead_is_tolerated() {
        let now = Utc::now();
        let ahead = Duration::seconds(CLOCK_SKEW_LEEWAY_SECS);
        assert_eq!(validate_claims(&claims(now + Duration::seconds(1), Duration::minutes(5)), now), Ok(()));
        assert_eq!(validate_claims(&claims(now + ahead, Duration::minutes(5)), now), Ok(()));
        assert_eq!(
            validate_claims(&claims(now + ahead + Duration::seconds(1), Duration::minutes(5)), now),
            Err(TokenValidationError::NotYetValid)
        );
    }

    #[test]
    fn timestamps_serialize_as_unix_seconds() {
        let c = claims(DateTime::from_timestamp(1_700_000_000, 0).unwrap(), Duration::seconds(60));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["iat"], 1_700_000_000);
        assert_eq!(json["exp"], 1_700_000_060);
    }
}
