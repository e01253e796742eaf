//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::process::{ProcessBasicInfo, ProcessSeed};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const BASIC_INFO_COLUMNS: &str = "b.process_id, b.forum_code, b.forum_name, b.process_code, \
     b.judge, b.class, b.claimant, b.defendant, b.court_section, b.url";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens or creates the database file, creating its directory if needed
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn require_process_id(process_id: &str) -> StorageResult<()> {
    if process_id.trim().is_empty() {
        return Err(StorageError::InvalidRecord(
            "empty process_id".to_string(),
        ));
    }
    Ok(())
}

fn basic_info_from_row(row: &Row<'_>, oab: String) -> rusqlite::Result<ProcessBasicInfo> {
    Ok(ProcessBasicInfo {
        oab,
        process_id: row.get(0)?,
        forum_code: row.get(1)?,
        forum_name: row.get(2)?,
        process_code: row.get(3)?,
        judge: row.get(4)?,
        class: row.get(5)?,
        claimant: row.get(6)?,
        defendant: row.get(7)?,
        court_section: row.get(8)?,
        url: row.get(9)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Seeds =====

    fn save_seeds(&mut self, seeds: &[ProcessSeed]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO process_seeds (process_id, oab, url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)
                 ON CONFLICT(process_id) DO UPDATE SET
                     oab = excluded.oab,
                     url = excluded.url,
                     updated_at = excluded.updated_at",
            )?;
            for seed in seeds {
                require_process_id(&seed.process_id)?;
                stmt.execute(params![seed.process_id, seed.oab, seed.url, now])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Saved {} seeds", seeds.len());
        Ok(seeds.len())
    }

    fn seeds_by_oab(&self, oab: &str) -> StorageResult<Vec<ProcessSeed>> {
        let mut stmt = self.conn.prepare(
            "SELECT process_id, oab, url FROM process_seeds WHERE oab = ?1 ORDER BY process_id",
        )?;

        let seeds = stmt
            .query_map(params![oab], |row| {
                Ok(ProcessSeed {
                    process_id: row.get(0)?,
                    oab: row.get(1)?,
                    url: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(seeds)
    }

    // ===== Basic info =====

    fn save_basic_info(&mut self, info: &ProcessBasicInfo) -> StorageResult<()> {
        require_process_id(&info.process_id)?;

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO process_basic_info (
                 process_id, forum_code, forum_name, process_code, judge, class,
                 claimant, defendant, court_section, url, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
             ON CONFLICT(process_id) DO UPDATE SET
                 forum_code = excluded.forum_code,
                 forum_name = excluded.forum_name,
                 process_code = excluded.process_code,
                 judge = excluded.judge,
                 class = excluded.class,
                 claimant = excluded.claimant,
                 defendant = excluded.defendant,
                 court_section = excluded.court_section,
                 url = excluded.url,
                 updated_at = excluded.updated_at",
            params![
                info.process_id,
                info.forum_code,
                info.forum_name,
                info.process_code,
                info.judge,
                info.class,
                info.claimant,
                info.defendant,
                info.court_section,
                info.url,
                now,
            ],
        )?;

        if !info.oab.is_empty() {
            tx.execute(
                "INSERT OR IGNORE INTO process_basic_info_oabs (process_id, oab, created_at)
                 VALUES (?1, ?2, ?3)",
                params![info.process_id, info.oab, now],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn basic_info(&self, process_id: &str) -> StorageResult<Option<ProcessBasicInfo>> {
        let first_oab = self.oabs_for_process(process_id)?.into_iter().next();

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM process_basic_info b WHERE b.process_id = ?1",
            BASIC_INFO_COLUMNS
        ))?;

        let info = stmt
            .query_row(params![process_id], |row| {
                basic_info_from_row(row, first_oab.clone().unwrap_or_default())
            })
            .optional()?;

        Ok(info)
    }

    fn basic_info_by_oab(&self, oab: &str) -> StorageResult<Vec<ProcessBasicInfo>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM process_basic_info b
             JOIN process_basic_info_oabs o ON o.process_id = b.process_id
             WHERE o.oab = ?1
             ORDER BY b.process_id",
            BASIC_INFO_COLUMNS
        ))?;

        let infos = stmt
            .query_map(params![oab], |row| basic_info_from_row(row, oab.to_string()))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(infos)
    }

    fn oabs_for_process(&self, process_id: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT oab FROM process_basic_info_oabs WHERE process_id = ?1 ORDER BY id",
        )?;

        let oabs = stmt
            .query_map(params![process_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(oabs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(process_id: &str, oab: &str) -> ProcessSeed {
        ProcessSeed {
            process_id: process_id.to_string(),
            oab: oab.to_string(),
            url: format!(
                "https://esaj.tjsp.jus.br/cpopg/show.do?processo.codigo=X&processo.foro=53&id={}",
                process_id
            ),
        }
    }

    fn info(process_id: &str, oab: &str, judge: &str) -> ProcessBasicInfo {
        ProcessBasicInfo {
            oab: oab.to_string(),
            process_id: process_id.to_string(),
            forum_code: "53".to_string(),
            forum_name: "Foro Central".to_string(),
            process_code: "1H000QWJM0000".to_string(),
            judge: judge.to_string(),
            class: "Procedimento Comum Cível".to_string(),
            claimant: "Maria".to_string(),
            defendant: "Banco".to_string(),
            court_section: "2ª Vara".to_string(),
            url: "https://esaj.tjsp.jus.br/cpopg/show.do".to_string(),
        }
    }

    fn seed_timestamps(storage: &SqliteStorage, process_id: &str) -> (String, String) {
        storage
            .conn
            .query_row(
                "SELECT created_at, updated_at FROM process_seeds WHERE process_id = ?1",
                params![process_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap()
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStorage::new_in_memory().is_ok());
    }

    #[test]
    fn test_new_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("esaj.db");
        assert!(SqliteStorage::new(&path).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_save_seeds_is_idempotent() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let seeds = vec![
            seed("1029989-06.2022.8.26.0053", "103289"),
            seed("1007573-30.2024.8.26.0229", "103289"),
        ];

        storage.save_seeds(&seeds).unwrap();
        let (created, _) = seed_timestamps(&storage, "1029989-06.2022.8.26.0053");

        storage.save_seeds(&seeds).unwrap();
        let (created_again, updated) = seed_timestamps(&storage, "1029989-06.2022.8.26.0053");

        let stored = storage.seeds_by_oab("103289").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(created, created_again);
        assert!(updated >= created);
    }

    #[test]
    fn test_seeds_by_oab_is_ordered_and_filtered() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .save_seeds(&[
                seed("2000000-00.2020.8.26.0001", "1"),
                seed("1000000-00.2020.8.26.0001", "1"),
                seed("3000000-00.2020.8.26.0001", "2"),
            ])
            .unwrap();

        let ids: Vec<_> = storage
            .seeds_by_oab("1")
            .unwrap()
            .into_iter()
            .map(|s| s.process_id)
            .collect();
        assert_eq!(
            ids,
            vec!["1000000-00.2020.8.26.0001", "2000000-00.2020.8.26.0001"]
        );
    }

    #[test]
    fn test_seed_upsert_moves_oab() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.save_seeds(&[seed("1000000-00.2020.8.26.0001", "1")]).unwrap();
        storage.save_seeds(&[seed("1000000-00.2020.8.26.0001", "2")]).unwrap();

        assert!(storage.seeds_by_oab("1").unwrap().is_empty());
        assert_eq!(storage.seeds_by_oab("2").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_process_id_is_rejected() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let result = storage.save_seeds(&[seed(" ", "1")]);
        assert!(matches!(result, Err(StorageError::InvalidRecord(_))));
        assert!(storage.seeds_by_oab("1").unwrap().is_empty());
    }

    #[test]
    fn test_basic_info_upsert_accumulates_oabs() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let id = "1029989-06.2022.8.26.0053";

        storage.save_basic_info(&info(id, "103289", "Fulano")).unwrap();
        storage.save_basic_info(&info(id, "200000", "Beltrano")).unwrap();
        storage.save_basic_info(&info(id, "103289", "Beltrano")).unwrap();

        assert_eq!(
            storage.oabs_for_process(id).unwrap(),
            vec!["103289".to_string(), "200000".to_string()]
        );

        let stored = storage.basic_info(id).unwrap().unwrap();
        assert_eq!(stored.judge, "Beltrano");
        assert_eq!(stored.oab, "103289");

        let by_second = storage.basic_info_by_oab("200000").unwrap();
        assert_eq!(by_second.len(), 1);
        assert_eq!(by_second[0].oab, "200000");
    }

    #[test]
    fn test_basic_info_without_oab() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let id = "1029989-06.2022.8.26.0053";

        storage.save_basic_info(&info(id, "", "Fulano")).unwrap();

        let stored = storage.basic_info(id).unwrap().unwrap();
        assert_eq!(stored.oab, "");
        assert!(storage.oabs_for_process(id).unwrap().is_empty());
    }

    #[test]
    fn test_basic_info_by_oab_is_ordered() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        for id in [
            "3000000-00.2020.8.26.0001",
            "1000000-00.2020.8.26.0001",
            "2000000-00.2020.8.26.0001",
        ] {
            storage.save_basic_info(&info(id, "9", "J")).unwrap();
        }

        let ids: Vec<_> = storage
            .basic_info_by_oab("9")
            .unwrap()
            .into_iter()
            .map(|i| i.process_id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "1000000-00.2020.8.26.0001",
                "2000000-00.2020.8.26.0001",
                "3000000-00.2020.8.26.0001"
            ]
        );
    }

    #[test]
    fn test_missing_basic_info() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.basic_info("nope").unwrap().is_none());
    }
}
