use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::tables::*;
use crate::models::{AnimeFields, AnimeRow, Counter};

impl Database {
    // ========================================================================
    // Anime operations
    // ========================================================================

    /// Store an anime row as-is
    pub fn put_anime(&self, row: &AnimeRow) -> Result<(), DatabaseError> {
        debug_assert!(!row.id.is_empty(), "anime id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(ANIME)?;
            let data = rmp_serde::to_vec_named(row)?;
            table.insert(row.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_anime(&self, id: &str) -> Result<Option<AnimeRow>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ANIME)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// All anime rows in key order
    pub fn list_anime(&self) -> Result<Vec<AnimeRow>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ANIME)?;

        let mut rows = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            rows.push(rmp_serde::from_slice(value.value())?);
        }
        Ok(rows)
    }

    /// Insert a new row with a fresh uuid and zeroed counters
    pub fn insert_anime(&self, fields: &AnimeFields) -> Result<AnimeRow, DatabaseError> {
        let mut row = AnimeRow {
            id: uuid::Uuid::new_v4().to_string(),
            likes: Some(0),
            views: Some(0),
            ..Default::default()
        };
        apply_fields(&mut row, fields);
        self.put_anime(&row)?;
        Ok(row)
    }

    /// Overwrite the writable columns of an existing row
    pub fn update_anime(
        &self,
        id: &str,
        fields: &AnimeFields,
    ) -> Result<Option<AnimeRow>, DatabaseError> {
        self.modify_anime(id, |row| apply_fields(row, fields))
    }

    pub fn set_anime_counter(
        &self,
        id: &str,
        counter: Counter,
        value: i64,
    ) -> Result<Option<i64>, DatabaseError> {
        let updated = self.modify_anime(id, |row| match counter {
            Counter::Likes => row.likes = Some(value),
            Counter::Views => row.views = Some(value),
        })?;
        Ok(updated.map(|_| value))
    }

    /// Read, change and write back one row inside a single write transaction
    fn modify_anime<F>(&self, id: &str, change: F) -> Result<Option<AnimeRow>, DatabaseError>
    where
        F: FnOnce(&mut AnimeRow),
    {
        let write_txn = self.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(ANIME)?;
            let existing: Option<AnimeRow> = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };

            match existing {
                Some(mut row) => {
                    change(&mut row);
                    let data = rmp_serde::to_vec_named(&row)?;
                    table.insert(id, data.as_slice())?;
                    Some(row)
                }
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(updated)
    }
}

fn apply_fields(row: &mut AnimeRow, fields: &AnimeFields) {
    row.title = fields.title.clone();
    row.status = Some(fields.status.clone());
    row.total_seasons = Some(fields.total_seasons);
    row.seasons_watched = Some(fields.seasons_watched);
    row.is_favorite = Some(fields.is_favorite);
    row.tags = Some(fields.tags.clone());
    row.notes = fields.notes.clone();
    row.sort_order = Some(fields.sort_order);
    row.cover_url = fields.cover_url.clone();
}
