use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::pick::{Pick, PickResult, SignalSnapshot};
use crate::types::{BetType, Side, Sport, Tier};

const SNAPSHOT_VERSION: u32 = 1;

/// Storage port for the pick history. All operations are total: a missing or
/// broken backing store reads as empty and drops writes, it never errors out
/// of the calling flow.
pub trait PickStore {
    /// Every stored pick, ordered by recording time then id.
    fn all(&self) -> Vec<Pick>;
    fn get(&self, id: &str) -> Option<Pick>;
    /// Insert or overwrite by id.
    fn put(&self, pick: &Pick);
    fn clear(&self);
}

/// In-memory store; the default for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryPickStore {
    picks: RefCell<BTreeMap<String, Pick>>,
}

impl MemoryPickStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PickStore for MemoryPickStore {
    fn all(&self) -> Vec<Pick> {
        let mut out: Vec<Pick> = self.picks.borrow().values().cloned().collect();
        sort_picks(&mut out);
        out
    }

    fn get(&self, id: &str) -> Option<Pick> {
        self.picks.borrow().get(id).cloned()
    }

    fn put(&self, pick: &Pick) {
        self.picks
            .borrow_mut()
            .insert(pick.id.clone(), pick.clone());
    }

    fn clear(&self) {
        self.picks.borrow_mut().clear();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SnapshotFile {
    version: u32,
    picks: Vec<Pick>,
}

/// Single-file JSON store. Writes go through a tmp file and an atomic rename
/// so a crash mid-write never corrupts the history; any unreadable or
/// version-mismatched file reads as empty.
pub struct JsonFilePickStore {
    path: PathBuf,
}

impl JsonFilePickStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Vec<Pick> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        let Ok(snapshot) = serde_json::from_str::<SnapshotFile>(&raw) else {
            return Vec::new();
        };
        if snapshot.version != SNAPSHOT_VERSION {
            return Vec::new();
        }
        snapshot.picks
    }

    fn save(&self, picks: Vec<Pick>) {
        let Some(dir) = self.path.parent() else {
            return;
        };
        let _ = fs::create_dir_all(dir);

        let snapshot = SnapshotFile {
            version: SNAPSHOT_VERSION,
            picks,
        };
        let Ok(json) = serde_json::to_string(&snapshot) else {
            return;
        };
        let tmp = self.path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, &self.path);
        }
    }
}

impl PickStore for JsonFilePickStore {
    fn all(&self) -> Vec<Pick> {
        let mut picks = self.load();
        sort_picks(&mut picks);
        picks
    }

    fn get(&self, id: &str) -> Option<Pick> {
        self.load().into_iter().find(|p| p.id == id)
    }

    fn put(&self, pick: &Pick) {
        let mut picks = self.load();
        match picks.iter_mut().find(|p| p.id == pick.id) {
            Some(existing) => *existing = pick.clone(),
            None => picks.push(pick.clone()),
        }
        self.save(picks);
    }

    fn clear(&self) {
        self.save(Vec::new());
    }
}

/// Durable sqlite store. If the database cannot be opened the store still
/// constructs, reads empty and drops writes, keeping the caller alive.
pub struct SqlitePickStore {
    conn: Option<Connection>,
}

impl SqlitePickStore {
    pub fn open(path: &Path) -> Self {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let conn = Connection::open(path)
            .ok()
            .filter(|conn| init_schema(conn).is_ok());
        Self { conn }
    }

    pub fn open_in_memory() -> Self {
        let conn = Connection::open_in_memory()
            .ok()
            .filter(|conn| init_schema(conn).is_ok());
        Self { conn }
    }

    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS picks (
            pick_id TEXT PRIMARY KEY,
            recorded_at TEXT NOT NULL,
            sport TEXT NOT NULL,
            home TEXT NOT NULL,
            away TEXT NOT NULL,
            bet_type TEXT NOT NULL,
            side TEXT NOT NULL,
            line REAL NULL,
            odds INTEGER NOT NULL,
            book TEXT NULL,
            confidence INTEGER NOT NULL,
            tier TEXT NOT NULL,
            signals_json TEXT NOT NULL,
            result TEXT NULL,
            closing_line REAL NULL,
            clv REAL NULL
        );
        CREATE INDEX IF NOT EXISTS idx_picks_recorded_at ON picks(recorded_at);
        CREATE INDEX IF NOT EXISTS idx_picks_sport ON picks(sport);
        CREATE INDEX IF NOT EXISTS idx_picks_result ON picks(result);
        "#,
    )
}

impl PickStore for SqlitePickStore {
    fn all(&self) -> Vec<Pick> {
        let Some(conn) = self.conn.as_ref() else {
            return Vec::new();
        };
        let Ok(mut stmt) = conn.prepare(
            r#"
            SELECT pick_id, recorded_at, sport, home, away, bet_type, side,
                   line, odds, book, confidence, tier, signals_json,
                   result, closing_line, clv
            FROM picks
            ORDER BY recorded_at ASC, pick_id ASC
            "#,
        ) else {
            return Vec::new();
        };

        let Ok(rows) = stmt.query_map([], decode_row) else {
            return Vec::new();
        };
        rows.filter_map(|row| row.ok().flatten()).collect()
    }

    fn get(&self, id: &str) -> Option<Pick> {
        let conn = self.conn.as_ref()?;
        conn.query_row(
            r#"
            SELECT pick_id, recorded_at, sport, home, away, bet_type, side,
                   line, odds, book, confidence, tier, signals_json,
                   result, closing_line, clv
            FROM picks
            WHERE pick_id = ?1
            "#,
            params![id],
            decode_row,
        )
        .ok()
        .flatten()
    }

    fn put(&self, pick: &Pick) {
        let Some(conn) = self.conn.as_ref() else {
            return;
        };
        let signals_json =
            serde_json::to_string(&pick.signals).unwrap_or_else(|_| "[]".to_string());
        let _ = conn.execute(
            r#"
            INSERT INTO picks (
                pick_id, recorded_at, sport, home, away, bet_type, side,
                line, odds, book, confidence, tier, signals_json,
                result, closing_line, clv
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7,
                ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16
            )
            ON CONFLICT(pick_id) DO UPDATE SET
                recorded_at = excluded.recorded_at,
                sport = excluded.sport,
                home = excluded.home,
                away = excluded.away,
                bet_type = excluded.bet_type,
                side = excluded.side,
                line = excluded.line,
                odds = excluded.odds,
                book = excluded.book,
                confidence = excluded.confidence,
                tier = excluded.tier,
                signals_json = excluded.signals_json,
                result = excluded.result,
                closing_line = excluded.closing_line,
                clv = excluded.clv
            "#,
            params![
                pick.id,
                pick.recorded_at,
                pick.sport.code(),
                pick.home,
                pick.away,
                pick.bet_type.code(),
                pick.side.code(),
                pick.line,
                pick.odds as i64,
                pick.book,
                pick.confidence as i64,
                pick.tier.label(),
                signals_json,
                pick.result.map(|r| r.code()),
                pick.closing_line,
                pick.clv,
            ],
        );
    }

    fn clear(&self) {
        let Some(conn) = self.conn.as_ref() else {
            return;
        };
        let _ = conn.execute("DELETE FROM picks", []);
    }
}

/// Rows that fail enum decoding are dropped rather than failing the scan;
/// a foreign row in the table cannot take the whole history down.
fn decode_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Option<Pick>> {
    let sport: String = row.get(2)?;
    let bet_type: String = row.get(5)?;
    let side: String = row.get(6)?;
    let tier: String = row.get(11)?;
    let signals_json: String = row.get(12)?;
    let result: Option<String> = row.get(13)?;

    let (Some(sport), Some(bet_type), Some(side), Some(tier)) = (
        Sport::from_code(&sport),
        BetType::from_code(&bet_type),
        Side::from_code(&side),
        Tier::from_label(&tier),
    ) else {
        return Ok(None);
    };

    let signals: Vec<SignalSnapshot> =
        serde_json::from_str(&signals_json).unwrap_or_default();
    let result = match result {
        Some(code) => match PickResult::from_code(&code) {
            Some(r) => Some(r),
            None => return Ok(None),
        },
        None => None,
    };

    Ok(Some(Pick {
        id: row.get(0)?,
        recorded_at: row.get(1)?,
        sport,
        home: row.get(3)?,
        away: row.get(4)?,
        bet_type,
        side,
        line: row.get(7)?,
        odds: row.get::<_, i64>(8)? as i32,
        book: row.get(9)?,
        confidence: row.get::<_, i64>(10)?.max(0) as u32,
        tier,
        signals,
        result,
        closing_line: row.get(14)?,
        clv: row.get(15)?,
    }))
}

fn sort_picks(picks: &mut [Pick]) {
    picks.sort_by(|a, b| {
        a.recorded_at
            .cmp(&b.recorded_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BetType, Side, Sport, Tier};

    fn stub_pick(id: &str) -> Pick {
        Pick {
            id: id.to_string(),
            recorded_at: "2026-01-01T00:00:00+00:00".to_string(),
            sport: Sport::Nba,
            home: "Lakers".to_string(),
            away: "Celtics".to_string(),
            bet_type: BetType::Spread,
            side: Side::Home,
            line: Some(-3.5),
            odds: -110,
            book: Some("mirage".to_string()),
            confidence: 71,
            tier: Tier::PartialAlignment,
            signals: Vec::new(),
            result: None,
            closing_line: None,
            clv: None,
        }
    }

    #[test]
    fn memory_store_overwrites_by_id() {
        let store = MemoryPickStore::new();
        let mut pick = stub_pick("p1");
        store.put(&pick);
        pick.result = Some(PickResult::Win);
        store.put(&pick);

        assert_eq!(store.all().len(), 1);
        assert_eq!(store.get("p1").unwrap().result, Some(PickResult::Win));
        store.clear();
        assert!(store.all().is_empty());
    }

    #[test]
    fn sqlite_store_round_trips_a_graded_pick() {
        let store = SqlitePickStore::open_in_memory();
        assert!(store.is_available());

        let mut pick = stub_pick("p1");
        pick.result = Some(PickResult::Loss);
        pick.closing_line = Some(-5.0);
        pick.clv = Some(1.5);
        pick.signals = vec![SignalSnapshot {
            name: "sharp_money".to_string(),
            family: crate::types::SignalFamily::Market,
            score: 72.0,
            weight: 25,
        }];
        store.put(&pick);

        let loaded = store.get("p1").expect("stored pick");
        assert_eq!(loaded.result, Some(PickResult::Loss));
        assert_eq!(loaded.closing_line, Some(-5.0));
        assert_eq!(loaded.clv, Some(1.5));
        assert_eq!(loaded.signals.len(), 1);
        assert_eq!(loaded.signals[0].name, "sharp_money");

        store.put(&pick);
        assert_eq!(store.all().len(), 1, "upsert must not duplicate");

        store.clear();
        assert!(store.all().is_empty());
        assert!(store.get("p1").is_none());
    }

    #[test]
    fn sqlite_orders_by_recorded_at() {
        let store = SqlitePickStore::open_in_memory();
        let mut late = stub_pick("a_late");
        late.recorded_at = "2026-02-01T00:00:00+00:00".to_string();
        let early = stub_pick("z_early");
        store.put(&late);
        store.put(&early);
        let all = store.all();
        assert_eq!(all[0].id, "z_early");
        assert_eq!(all[1].id, "a_late");
    }
}
