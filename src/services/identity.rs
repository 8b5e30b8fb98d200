//! Identity and sessions for SmartMark.
//!
//! Authentication itself happens at an external provider. Once it has
//! verified someone, `sign_in` records the (provider, subject) pair as a
//! viewer and hands back a random session token. Only the SHA-256 of that
//! token is kept in the database.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ring::digest::{digest, SHA256};
use ring::rand::{SecureRandom, SystemRandom};
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use crate::database::connection::Database;
use crate::types::errors::IdentityError;
use crate::types::identity::{Route, Viewer};

/// Session token length in random bytes, before encoding.
const TOKEN_LENGTH: usize = 32;

/// Resolves who is asking.
pub trait IdentityProvider {
    /// Returns the viewer id for a session token, or `None` if the token is
    /// unknown or absent.
    fn current_viewer(&self, token: Option<&str>) -> Option<String>;

    /// Login redirects signed-in viewers to the dashboard; the dashboard
    /// redirects everyone else to login.
    fn gate(&self, token: Option<&str>) -> Route {
        match self.current_viewer(token) {
            Some(viewer) => Route::Dashboard(viewer),
            None => Route::Login,
        }
    }
}

/// A freshly issued session. The raw token is wiped from memory on drop.
pub struct SignedIn {
    pub viewer: Viewer,
    pub token: Zeroizing<String>,
}

/// Session-backed identity stored in SQLite.
pub struct SessionIdentity {
    db: Arc<Database>,
    rng: SystemRandom,
}

impl SessionIdentity {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            rng: SystemRandom::new(),
        }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }

    /// Records the externally verified identity and issues a session token.
    ///
    /// Signing in again with the same provider and subject reuses the viewer
    /// and refreshes its display name.
    pub fn sign_in(
        &self,
        provider: &str,
        subject: &str,
        display_name: &str,
    ) -> Result<SignedIn, IdentityError> {
        if provider.trim().is_empty() || subject.trim().is_empty() {
            return Err(IdentityError::InvalidIdentity(
                "provider and subject are required".to_string(),
            ));
        }

        let viewer = self.upsert_viewer(provider, subject, display_name)?;
        let token = self.generate_token()?;

        self.db.connection().execute(
            "INSERT INTO sessions (token_hash, viewer_id, created_at) VALUES (?1, ?2, ?3)",
            params![hash_token(&token), viewer.id, Self::now()],
        )?;

        tracing::info!(viewer = %viewer.id, provider, "session issued");
        Ok(SignedIn { viewer, token })
    }

    /// Ends a session. Unknown tokens are ignored.
    pub fn sign_out(&self, token: &str) -> Result<(), IdentityError> {
        let removed = self.db.connection().execute(
            "DELETE FROM sessions WHERE token_hash = ?1",
            params![hash_token(token)],
        )?;
        tracing::info!(removed, "session ended");
        Ok(())
    }

    pub fn viewer(&self, viewer_id: &str) -> Result<Option<Viewer>, IdentityError> {
        let viewer = self
            .db
            .connection()
            .query_row(
                "SELECT id, provider, subject, display_name, created_at FROM viewers WHERE id = ?1",
                params![viewer_id],
                row_to_viewer,
            )
            .optional()?;
        Ok(viewer)
    }

    fn lookup_session(&self, token: &str) -> Result<Option<String>, IdentityError> {
        let viewer_id = self
            .db
            .connection()
            .query_row(
                "SELECT viewer_id FROM sessions WHERE token_hash = ?1",
                params![hash_token(token)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(viewer_id)
    }

    fn upsert_viewer(
        &self,
        provider: &str,
        subject: &str,
        display_name: &str,
    ) -> Result<Viewer, IdentityError> {
        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO viewers (id, provider, subject, display_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(provider, subject) DO UPDATE SET display_name = excluded.display_name",
            params![
                Uuid::new_v4().to_string(),
                provider,
                subject,
                display_name,
                Self::now()
            ],
        )?;

        let viewer = conn.query_row(
            "SELECT id, provider, subject, display_name, created_at FROM viewers
             WHERE provider = ?1 AND subject = ?2",
            params![provider, subject],
            row_to_viewer,
        )?;
        Ok(viewer)
    }

    fn generate_token(&self) -> Result<Zeroizing<String>, IdentityError> {
        let mut bytes = [0u8; TOKEN_LENGTH];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| IdentityError::RandomGeneration("system RNG unavailable".to_string()))?;
        let token = Zeroizing::new(URL_SAFE_NO_PAD.encode(bytes));
        bytes.zeroize();
        Ok(token)
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_viewer(&self, token: Option<&str>) -> Option<String> {
        let token = token.filter(|t| !t.is_empty())?;
        match self.lookup_session(token) {
            Ok(viewer) => viewer,
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed");
                None
            }
        }
    }
}

/// Hex SHA-256 of a session token.
fn hash_token(token: &str) -> String {
    digest(&SHA256, token.as_bytes())
        .as_ref()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn row_to_viewer(row: &rusqlite::Row) -> rusqlite::Result<Viewer> {
    Ok(Viewer {
        id: row.get(0)?,
        provider: row.get(1)?,
        subject: row.get(2)?,
        display_name: row.get(3)?,
        created_at: row.get(4)?,
    })
}
