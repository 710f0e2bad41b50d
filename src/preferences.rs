//! Persisted user preferences (favorites + theme).
//!
//! One SQLite connection lives on a blocking worker; callers talk to it over
//! a channel. Writes are queued in order, so a `load` issued after a `save`
//! always observes it.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::spawn_blocking;

/// Fixed key of the persisted record.
pub const STORAGE_KEY: &str = "pokemon-storage";
const STORAGE_VERSION: u32 = 0;

/// The only store fields that survive a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPreferences {
    pub favorites: BTreeSet<u32>,
    #[serde(rename = "darkMode")]
    pub dark_mode: bool,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    state: PersistedPreferences,
    version: u32,
}

enum PrefsMsg {
    Save(PersistedPreferences),
    Load {
        resp: oneshot::Sender<Option<PersistedPreferences>>,
    },
    Clear {
        resp: oneshot::Sender<()>,
    },
    Flush {
        resp: oneshot::Sender<()>,
    },
}

#[derive(Clone)]
pub struct Preferences {
    tx: UnboundedSender<PrefsMsg>,
}

impl Preferences {
    /// Open (or create) the database at `db_path`. Must be called from
    /// within a tokio runtime. Fails if the database cannot be opened.
    pub fn start(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open preferences database {db_path}"))?;
        conn.pragma_update(None, "busy_timeout", &250)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv(
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;

        let (tx, mut rx) = unbounded_channel::<PrefsMsg>();

        tokio::spawn(async move {
            let res = spawn_blocking(move || -> Result<()> {
                let mut stmt_put =
                    conn.prepare("INSERT OR REPLACE INTO kv(key,value) VALUES (?,?)")?;

                while let Some(msg) = rx.blocking_recv() {
                    match msg {
                        PrefsMsg::Save(prefs) => {
                            if let Err(e) = save_db(&mut stmt_put, &prefs) {
                                log::error!("[preferences] Failed to save: {e:#}");
                            }
                        }
                        PrefsMsg::Load { resp } => {
                            let prefs = load_db(&conn).unwrap_or_else(|e| {
                                log::warn!("[preferences] Ignoring unreadable record: {e:#}");
                                None
                            });
                            let _ = resp.send(prefs);
                        }
                        PrefsMsg::Clear { resp } => {
                            if let Err(e) =
                                conn.execute("DELETE FROM kv WHERE key = ?", params![STORAGE_KEY])
                            {
                                log::error!("[preferences] Failed to clear: {e}");
                            }
                            let _ = resp.send(());
                        }
                        PrefsMsg::Flush { resp } => {
                            let _ = resp.send(());
                        }
                    }
                }
                Ok(())
            })
            .await;

            match res {
                Ok(Err(e)) => log::error!("[preferences] Worker stopped: {e:#}"),
                Err(e) => log::error!("[preferences] Worker panicked: {e}"),
                Ok(Ok(())) => {}
            }
        });

        Ok(Self { tx })
    }

    /// Private in-memory database; nothing survives the handle.
    pub fn in_memory() -> Result<Self> {
        Self::start(":memory:")
    }

    /// Queue a write of the full record. Never blocks.
    pub fn save(&self, prefs: PersistedPreferences) {
        if self.tx.send(PrefsMsg::Save(prefs)).is_err() {
            log::warn!("[preferences] Worker gone, preference change not persisted");
        }
    }

    /// `None` when nothing was stored yet or the record is unreadable.
    pub async fn load(&self) -> Option<PersistedPreferences> {
        let (resp_tx, resp_rx) = oneshot::channel();
        if self.tx.send(PrefsMsg::Load { resp: resp_tx }).is_err() {
            return None;
        }
        resp_rx.await.ok().flatten()
    }

    pub async fn clear(&self) {
        let (resp_tx, resp_rx) = oneshot::channel();
        let _ = self.tx.send(PrefsMsg::Clear { resp: resp_tx });
        let _ = resp_rx.await;
    }

    /// Resolves once every previously queued write has been applied.
    pub async fn flush(&self) {
        let (resp_tx, resp_rx) = oneshot::channel();
        let _ = self.tx.send(PrefsMsg::Flush { resp: resp_tx });
        let _ = resp_rx.await;
    }
}

fn save_db(stmt: &mut rusqlite::Statement, prefs: &PersistedPreferences) -> Result<()> {
    let value = serde_json::to_string(&Envelope {
        state: prefs.clone(),
        version: STORAGE_VERSION,
    })?;
    stmt.execute(params![STORAGE_KEY, value])?;
    Ok(())
}

fn load_db(conn: &Connection) -> Result<Option<PersistedPreferences>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM kv WHERE key = ?",
            params![STORAGE_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(raw) => {
            let envelope: Envelope = serde_json::from_str(&raw)?;
            Ok(Some(envelope.state))
        }
        None => Ok(None),
    }
}
