//! Key-value store wrapper.
//!
//! Thin adapter over a Redis [`ConnectionManager`]: each call is one
//! round-trip. `get` and `set` treat a nil or empty reply as a failure
//! ([`DbError::KeyValueRejected`]), so an empty string stored under a key
//! cannot be told apart from a missing key.

use crate::error::{DbError, DbResult};
use crate::models::ConnectionConfig;
use redis::ToRedisArgs;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Clone)]
pub struct KeyValue {
    conn: ConnectionManager,
}

impl std::fmt::Debug for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValue").finish_non_exhaustive()
    }
}

impl KeyValue {
    /// Connect and verify the server answers `PING`.
    pub async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        let url = config.to_url()?;
        let client = redis::Client::open(url.as_str())?;
        let mut conn = client.get_connection_manager().await?;

        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        info!(target_url = %config.masked(), reply = %pong, "Connected to key-value store");

        Ok(Self { conn })
    }

    /// Wrap an existing connection manager.
    pub fn from_manager(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// `SET key value`.
    pub async fn set<V>(&self, key: &str, value: V) -> DbResult<()>
    where
        V: ToRedisArgs + Send + Sync,
    {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await?;
        debug!(key = %key, reply = ?reply, "SET");
        match reply {
            Some(r) if !r.is_empty() => Ok(()),
            _ => Err(DbError::key_value_rejected("set", key)),
        }
    }

    /// `GET key`. A missing key and an empty value are both rejections.
    pub async fn get(&self, key: &str) -> DbResult<String> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        debug!(key = %key, found = reply.is_some(), "GET");
        match reply {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(DbError::key_value_rejected("get", key)),
        }
    }

    /// `HSET key field value [field value ...]`. Returns the number of fields
    /// that did not exist before.
    pub async fn hash_set<K, V>(&self, key: &str, fields: &[(K, V)]) -> DbResult<u64>
    where
        K: ToRedisArgs + Send + Sync,
        V: ToRedisArgs + Send + Sync,
    {
        if fields.is_empty() {
            return Err(DbError::key_value_rejected("hash_set", key));
        }
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in fields {
            cmd.arg(field).arg(value);
        }
        let added: u64 = cmd.query_async(&mut conn).await?;
        debug!(key = %key, fields = fields.len(), added, "HSET");
        Ok(added)
    }

    /// `HMGET key field [field ...]`, returned as a field to value map.
    /// Fields absent from the hash map to `None`.
    pub async fn hash_get(
        &self,
        key: &str,
        fields: &[&str],
    ) -> DbResult<HashMap<String, Option<String>>> {
        if fields.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.conn.clone();
        let values: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(key)
            .arg(fields)
            .query_async(&mut conn)
            .await?;
        debug!(key = %key, fields = fields.len(), "HMGET");
        Ok(zip_fields(fields, values))
    }

    /// `EXPIRE key ttl`. Returns whether a timeout was set.
    pub async fn expire(&self, key: &str, ttl_secs: i64) -> DbResult<bool> {
        let mut conn = self.conn.clone();
        let set: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await?;
        debug!(key = %key, ttl_secs, set, "EXPIRE");
        Ok(set == 1)
    }

    /// `DEL key`. Returns the number of keys removed.
    pub async fn delete(&self, key: &str) -> DbResult<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        debug!(key = %key, removed, "DEL");
        Ok(removed)
    }
}

/// Pair each requested field with the value at the same position.
fn zip_fields(fields: &[&str], values: Vec<Option<String>>) -> HashMap<String, Option<String>> {
    let mut values = values.into_iter();
    fields
        .iter()
        .map(|field| (field.to_string(), values.next().flatten()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_fields_positional() {
        let map = zip_fields(
            &["name", "age", "email"],
            vec![Some("ann".into()), None, Some("a@x".into())],
        );
        assert_eq!(map.len(), 3);
        assert_eq!(map["name"].as_deref(), Some("ann"));
        assert_eq!(map["age"], None);
        assert_eq!(map["email"].as_deref(), Some("a@x"));
    }

    #[test]
    fn test_zip_fields_short_reply() {
        let map = zip_fields(&["a", "b"], vec![Some("1".into())]);
        assert_eq!(map["a"].as_deref(), Some("1"));
        assert_eq!(map["b"], None);
    }
}
