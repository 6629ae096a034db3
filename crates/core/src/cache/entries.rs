//! Entry operations on a cache store.
//!
//! Provides put, match, delete and purge for request -> response entries.
//! Only `GET` requests are stored or matched.

use super::hash::compute_cache_key;
use super::stores::CacheStore;
use crate::Error;
use crate::message::{RequestDescriptor, ResponseSnapshot, ResponseType};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};
use url::Url;

/// Listing view of a stored entry, without the body.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntrySummary {
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub response_type: ResponseType,
    pub body_bytes: u64,
    pub stored_at: String,
}

/// Raw row as read from `cache_entries`.
struct StoredRow {
    request_headers_json: String,
    response_url: String,
    status_code: u16,
    response_type: String,
    response_headers_json: String,
    body: Vec<u8>,
}

impl StoredRow {
    fn request_headers(&self) -> Result<Vec<(String, String)>, Error> {
        serde_json::from_str(&self.request_headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))
    }

    fn into_response(self) -> Result<ResponseSnapshot, Error> {
        let url = Url::parse(&self.response_url).map_err(|e| Error::CorruptEntry(e.to_string()))?;
        let response_type: ResponseType = self.response_type.parse().map_err(Error::CorruptEntry)?;
        let headers: Vec<(String, String)> =
            serde_json::from_str(&self.response_headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;

        Ok(ResponseSnapshot::new(url, self.status_code, response_type)
            .with_headers(headers)
            .with_body(self.body))
    }
}

/// Row values for one insert, computed before entering the database thread.
struct NewRow {
    cache_key: String,
    method: String,
    url: String,
    request_headers_json: String,
    response_url: String,
    status_code: u16,
    response_type: &'static str,
    response_headers_json: String,
    body: Vec<u8>,
}

impl NewRow {
    fn build(request: &RequestDescriptor, response: &ResponseSnapshot) -> Result<Self, Error> {
        if !request.is_get() {
            return Err(Error::InvalidInput(format!(
                "only GET requests can be cached, got {}",
                request.method()
            )));
        }
        if response.vary().iter().any(|name| name == "*") {
            return Err(Error::InvalidInput(format!("response for {} has Vary: *", request.url())));
        }

        let request_headers_json =
            serde_json::to_string(request.headers()).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let response_headers_json =
            serde_json::to_string(response.headers()).map_err(|e| Error::InvalidInput(e.to_string()))?;

        Ok(Self {
            cache_key: compute_cache_key(request.method(), request.url().as_str()),
            method: request.method().to_string(),
            url: request.url().to_string(),
            request_headers_json,
            response_url: response.url().to_string(),
            status_code: response.status(),
            response_type: response.response_type().as_str(),
            response_headers_json,
            body: response.body().to_vec(),
        })
    }

    fn upsert(&self, conn: &rusqlite::Connection, store_name: &str, stored_at: &str) -> Result<(), Error> {
        conn.execute(
            "INSERT INTO cache_entries (
                store_name, cache_key, method, url, request_headers_json,
                response_url, status_code, response_type, response_headers_json,
                body, stored_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(store_name, cache_key) DO UPDATE SET
                method = excluded.method,
                url = excluded.url,
                request_headers_json = excluded.request_headers_json,
                response_url = excluded.response_url,
                status_code = excluded.status_code,
                response_type = excluded.response_type,
                response_headers_json = excluded.response_headers_json,
                body = excluded.body,
                stored_at = excluded.stored_at",
            params![
                store_name,
                &self.cache_key,
                &self.method,
                &self.url,
                &self.request_headers_json,
                &self.response_url,
                self.status_code,
                self.response_type,
                &self.response_headers_json,
                &self.body,
                stored_at,
            ],
        )?;
        Ok(())
    }
}

/// True if every header named in the stored response's `Vary` has the same
/// value on both requests.
fn vary_matches(vary: &[String], stored: &[(String, String)], incoming: &RequestDescriptor) -> bool {
    vary.iter().all(|name| {
        if name == "*" {
            return false;
        }
        let stored_value = stored
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str());
        stored_value == incoming.header(name)
    })
}

impl CacheStore {
    /// Store a response for a request, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for non-GET requests and `Vary: *`
    /// responses, and `Error::Database` if the store was deleted.
    pub async fn put(&self, request: &RequestDescriptor, response: &ResponseSnapshot) -> Result<(), Error> {
        let row = NewRow::build(request, response)?;
        let store_name = self.name.clone();
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| row.upsert(conn, &store_name, &stored_at))
            .await
            .map_err(Error::from)
    }

    /// Store several entries atomically: either all are written or none.
    pub async fn put_all(&self, entries: &[(RequestDescriptor, ResponseSnapshot)]) -> Result<(), Error> {
        let rows = entries
            .iter()
            .map(|(request, response)| NewRow::build(request, response))
            .collect::<Result<Vec<_>, _>>()?;
        let store_name = self.name.clone();
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    row.upsert(&tx, &store_name, &stored_at)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the stored response for a request.
    ///
    /// Returns None for non-GET requests, unknown URLs, and `Vary` mismatches.
    pub async fn match_request(&self, request: &RequestDescriptor) -> Result<Option<ResponseSnapshot>, Error> {
        if !request.is_get() {
            return Ok(None);
        }

        let store_name = self.name.clone();
        let cache_key = compute_cache_key(request.method(), request.url().as_str());
        let row = self
            .db
            .conn
            .call(move |conn| -> Result<Option<StoredRow>, Error> {
                let result = conn.query_row(
                    "SELECT request_headers_json, response_url, status_code, response_type,
                            response_headers_json, body
                     FROM cache_entries WHERE store_name = ?1 AND cache_key = ?2",
                    params![store_name, cache_key],
                    |row| {
                        Ok(StoredRow {
                            request_headers_json: row.get(0)?,
                            response_url: row.get(1)?,
                            status_code: row.get(2)?,
                            response_type: row.get(3)?,
                            response_headers_json: row.get(4)?,
                            body: row.get(5)?,
                        })
                    },
                );

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let stored_request_headers = row.request_headers()?;
        let response = row.into_response()?;
        if !vary_matches(&response.vary(), &stored_request_headers, request) {
            tracing::debug!(url = %request.url(), "stored entry rejected by Vary");
            return Ok(None);
        }

        Ok(Some(response))
    }

    /// Remove the entry for a request. Returns false if there was none.
    pub async fn delete(&self, request: &RequestDescriptor) -> Result<bool, Error> {
        let store_name = self.name.clone();
        let cache_key = compute_cache_key(request.method(), request.url().as_str());
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM cache_entries WHERE store_name = ?1 AND cache_key = ?2",
                    params![store_name, cache_key],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// List entries, oldest first.
    pub async fn keys(&self) -> Result<Vec<EntrySummary>, Error> {
        let store_name = self.name.clone();
        let rows = self
            .db
            .conn
            .call(move |conn| -> Result<Vec<(String, String, u16, String, u64, String)>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status_code, response_type, length(body), stored_at
                     FROM cache_entries WHERE store_name = ?1
                     ORDER BY stored_at ASC, url ASC",
                )?;
                let rows = stmt
                    .query_map(params![store_name], |row| {
                        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        rows.into_iter()
            .map(|(method, url, status_code, response_type, body_bytes, stored_at)| {
                Ok(EntrySummary {
                    method,
                    url,
                    status_code,
                    response_type: response_type.parse().map_err(Error::CorruptEntry)?,
                    body_bytes,
                    stored_at,
                })
            })
            .collect()
    }

    /// Number of entries in the store.
    pub async fn len(&self) -> Result<u64, Error> {
        let store_name = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE store_name = ?1",
                    params![store_name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }

    /// Delete entries whose URL contains `pattern`.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_matching(&self, pattern: &str) -> Result<u64, Error> {
        let store_name = self.name.clone();
        let pattern = pattern.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM cache_entries WHERE store_name = ?1 AND instr(url, ?2) > 0",
                    params![store_name, pattern],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Purge oldest entries until count <= max_entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_lru(&self, max_entries: usize) -> Result<u64, Error> {
        let store_name = self.name.clone();
        let max = max_entries as i64;
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries WHERE store_name = ?1",
                    params![store_name],
                    |row| row.get(0),
                )?;
                if count <= max {
                    return Ok(0);
                }

                let deleted = conn.execute(
                    "DELETE FROM cache_entries WHERE store_name = ?1 AND cache_key IN (
                        SELECT cache_key FROM cache_entries WHERE store_name = ?1
                        ORDER BY stored_at ASC, rowid ASC LIMIT ?2
                    )",
                    params![store_name, count - max],
                )?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }
}
