//! Redis cache for store memberships and rate limiting.

use redis::{aio::ConnectionManager, AsyncCommands, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use common::AppResult;
use domain::Membership;

/// Cache key prefix for store memberships
const CACHE_PREFIX_MEMBERSHIP: &str = "membership:";

/// Cache key prefix for rate limiting
const CACHE_PREFIX_RATE_LIMIT: &str = "rate_limit:";

/// Redis cache wrapper.
pub struct Cache {
    conn: ConnectionManager,
    membership_ttl: u64,
}

fn membership_key(store_id: &Uuid, user_id: &Uuid) -> String {
    format!("{}{}:{}", CACHE_PREFIX_MEMBERSHIP, store_id, user_id)
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(url: &str, membership_ttl: u64) -> Result<Self, RedisError> {
        debug!("Connecting to Redis at {}", url);
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            membership_ttl,
        })
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let result: Option<String> = conn.get(key).await?;

        match result {
            Some(json) => match serde_json::from_str(&json) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    // Stale shape after a deploy reads as a miss
                    warn!("Failed to deserialize cached value for key {}: {}", key, e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Set a value in cache with TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| common::AppError::internal(format!("Serialization error: {}", e)))?;
        conn.set_ex::<_, _, ()>(key, json, ttl_seconds).await?;
        Ok(())
    }

    /// Delete a value from cache.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    /// Round-trip to Redis.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    // =========================================================================
    // Membership Cache Operations
    // =========================================================================

    pub async fn get_membership(&self, store_id: &Uuid, user_id: &Uuid) -> AppResult<Option<Membership>> {
        self.get(&membership_key(store_id, user_id)).await
    }

    pub async fn set_membership(&self, membership: &Membership) -> AppResult<()> {
        let key = membership_key(&membership.store_id, &membership.user_id);
        self.set(&key, membership, self.membership_ttl).await
    }

    /// Drop a cached membership after its role or status changed.
    pub async fn invalidate_membership(&self, store_id: &Uuid, user_id: &Uuid) -> AppResult<()> {
        self.delete(&membership_key(store_id, user_id)).await
    }

    // =========================================================================
    // Rate Limiting
    // =========================================================================

    /// Check rate limit and increment counter.
    /// Returns (current_count, allowed).
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.conn.clone();

        let count: u64 = conn.incr(&key, 1).await?;

        // Window starts with the first request
        if count == 1 {
            conn.expire::<_, ()>(&key, window_seconds as i64).await?;
        }

        Ok((count, count <= max_requests))
    }

    /// Seconds left in the current window, if one is open.
    pub async fn get_rate_limit_ttl(&self, identifier: &str) -> AppResult<Option<u64>> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.conn.clone();
        let ttl: i64 = conn.ttl(&key).await?;
        Ok(u64::try_from(ttl).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_keys_are_scoped_by_store_and_user() {
        let store = Uuid::nil();
        let user = Uuid::from_u128(1);
        assert_eq!(
            membership_key(&store, &user),
            format!("membership:{}:{}", store, user)
        );
        assert_ne!(membership_key(&store, &user), membership_key(&user, &store));
    }
}
