// Stamps a fresh database with the current version and refuses to run on a
// database written by a newer binary.
use std::cmp::Ordering;

use crate::error::Error;
use crate::kv::{KVStoreRead, KVStoreWrite};
use crate::schema::{COLUMN_META, MIGRATION_VERSION_KEY};
use crate::Result;

pub const DB_VERSION: u32 = 1;

pub fn check_db_version<DB: KVStoreRead + KVStoreWrite>(db: &DB) -> Result<()> {
    let stored = match db.get(COLUMN_META, MIGRATION_VERSION_KEY)? {
        Some(raw) => {
            let bytes: [u8; 4] = raw
                .as_slice()
                .try_into()
                .map_err(|_| Error::from("malformed db version"))?;
            u32::from_be_bytes(bytes)
        }
        None => {
            log::info!("init db version {}", DB_VERSION);
            return db.insert_raw(COLUMN_META, MIGRATION_VERSION_KEY, &DB_VERSION.to_be_bytes());
        }
    };
    match stored.cmp(&DB_VERSION) {
        Ordering::Greater => Err(Error::from(format!(
            "The database is created by a higher version executable binary (db version {}, supported {})",
            stored, DB_VERSION
        ))),
        Ordering::Equal => Ok(()),
        Ordering::Less => {
            log::info!("migrate db version {} -> {}", stored, DB_VERSION);
            db.insert_raw(COLUMN_META, MIGRATION_VERSION_KEY, &DB_VERSION.to_be_bytes())
        }
    }
}
