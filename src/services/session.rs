//! Revoked-token denylist kept in Redis.
//!
//! Logged-out access tokens are stored by SHA-256 digest until they would
//! have expired anyway, so the set never grows beyond the live token window.

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::errors::AppError;

const KEY_PREFIX: &str = "smartclinic:revoked:";

/// Redis key for a token, derived from its hex-encoded SHA-256 digest.
pub fn revocation_key(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(digest))
}

/// Seconds until `exp`, or `None` when the token has already expired.
pub fn remaining_ttl(exp: i64, now: i64) -> Option<u64> {
    u64::try_from(exp - now).ok().filter(|ttl| *ttl > 0)
}

/// Add a token to the denylist until its expiry.
pub async fn revoke(client: &redis::Client, token: &str, exp: i64) -> Result<(), AppError> {
    let Some(ttl) = remaining_ttl(exp, Utc::now().timestamp()) else {
        return Ok(());
    };

    let mut conn = client.get_multiplexed_async_connection().await?;
    redis::cmd("SET")
        .arg(revocation_key(token))
        .arg(1)
        .arg("EX")
        .arg(ttl)
        .query_async::<()>(&mut conn)
        .await?;

    tracing::debug!(ttl_secs = ttl, "Access token revoked");
    Ok(())
}

/// Whether a token has been revoked.
pub async fn is_revoked(client: &redis::Client, token: &str) -> Result<bool, AppError> {
    let mut conn = client.get_multiplexed_async_connection().await?;
    let exists: bool = redis::cmd("EXISTS")
        .arg(revocation_key(token))
        .query_async(&mut conn)
        .await?;
    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revocation_key_is_stable_digest() {
        let key = revocation_key("abc");
        assert_eq!(
            key,
            "smartclinic:revoked:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(key, revocation_key("abc"));
        assert_ne!(key, revocation_key("abd"));
    }

    #[test]
    fn ttl_for_live_and_expired_tokens() {
        assert_eq!(remaining_ttl(1_000, 400), Some(600));
        assert_eq!(remaining_ttl(1_000, 1_000), None);
        assert_eq!(remaining_ttl(1_000, 2_000), None);
    }
}
