use chrono::Utc;
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::tables::*;
use crate::models::{apply_delta, Counter, NewPhoto, PhotoChanges, PhotoQuery, PhotoRow};

const PHOTO_SEQUENCE: &str = "photos";

impl Database {
    // ========================================================================
    // Photo operations
    // ========================================================================

    /// Insert a photo under the next sequence id, stamped with the current time
    pub fn insert_photo(&self, photo: &NewPhoto) -> Result<PhotoRow, DatabaseError> {
        let write_txn = self.begin_write()?;
        let row = {
            let id = Database::next_sequence(&write_txn, PHOTO_SEQUENCE)? as i64;
            let row = PhotoRow {
                id,
                category: Some(photo.category.as_str().to_string()),
                title: Some(photo.title.clone()),
                description: Some(photo.description.clone()),
                image_path: photo.image_path.clone(),
                tags: Some(photo.tags.clone()),
                likes: Some(0),
                views: Some(0),
                created_at: Some(Utc::now()),
            };
            let mut table = write_txn.open_table(PHOTOS)?;
            let data = rmp_serde::to_vec_named(&row)?;
            table.insert(id, data.as_slice())?;
            row
        };
        write_txn.commit()?;
        Ok(row)
    }

    /// Store a photo row as-is (seeding and tests)
    pub fn put_photo(&self, row: &PhotoRow) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(PHOTOS)?;
            let data = rmp_serde::to_vec_named(row)?;
            table.insert(row.id, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_photo(&self, id: i64) -> Result<Option<PhotoRow>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PHOTOS)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    /// Photos matching the query, newest first
    pub fn list_photos(&self, query: &PhotoQuery) -> Result<Vec<PhotoRow>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(PHOTOS)?;

        let wanted = query.category.map(|c| c.as_str());
        let mut rows: Vec<PhotoRow> = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let row: PhotoRow = rmp_serde::from_slice(value.value())?;
            if wanted.is_none() || row.category.as_deref() == wanted {
                rows.push(row);
            }
        }

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }
        Ok(rows)
    }

    pub fn update_photo(
        &self,
        id: i64,
        changes: &PhotoChanges,
    ) -> Result<Option<PhotoRow>, DatabaseError> {
        self.modify_photo(id, |row| {
            row.title = changes.title.clone();
            row.description = changes.description.clone();
            row.tags = Some(changes.tags.clone());
            row.likes = Some(changes.likes);
            row.views = Some(changes.views);
        })
    }

    pub fn set_photo_counter(
        &self,
        id: i64,
        counter: Counter,
        value: i64,
    ) -> Result<Option<i64>, DatabaseError> {
        let updated = self.modify_photo(id, |row| match counter {
            Counter::Likes => row.likes = Some(value),
            Counter::Views => row.views = Some(value),
        })?;
        Ok(updated.map(|_| value))
    }

    /// Atomically add `delta` to a photo's likes, flooring at zero
    pub fn increment_photo_likes(&self, id: i64, delta: i64) -> Result<Option<i64>, DatabaseError> {
        let updated = self.modify_photo(id, |row| {
            row.likes = Some(apply_delta(row.likes.unwrap_or(0), delta));
        })?;
        Ok(updated.and_then(|row| row.likes))
    }

    /// Add one view to every listed photo; unknown ids are skipped.
    /// Returns how many rows changed.
    pub fn increment_photo_views(&self, ids: &[i64]) -> Result<u64, DatabaseError> {
        let write_txn = self.begin_write()?;
        let mut changed = 0;
        {
            let mut table = write_txn.open_table(PHOTOS)?;
            for &id in ids {
                let existing: Option<PhotoRow> = match table.get(id)? {
                    Some(data) => Some(rmp_serde::from_slice(data.value())?),
                    None => None,
                };
                if let Some(mut row) = existing {
                    row.views = Some(row.views.unwrap_or(0).saturating_add(1));
                    let data = rmp_serde::to_vec_named(&row)?;
                    table.insert(id, data.as_slice())?;
                    changed += 1;
                }
            }
        }
        write_txn.commit()?;
        Ok(changed)
    }

    fn modify_photo<F>(&self, id: i64, change: F) -> Result<Option<PhotoRow>, DatabaseError>
    where
        F: FnOnce(&mut PhotoRow),
    {
        let write_txn = self.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(PHOTOS)?;
            let existing: Option<PhotoRow> = match table.get(id)? {
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
