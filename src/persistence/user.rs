use super::files::{atomic_write, read_file};
use log::warn;
use std::path::Path;
use uuid::Uuid;

/// Used when no id can be read or stored; data still saves, just unshared
pub const TEMPORARY_UID: &str = "temporary_uid";

const UID_FILE: &str = "user_id";

/// Read the per-user id from `dir`, creating one on first run
pub fn get_or_create_user_uid(dir: &Path) -> String {
    let path = dir.join(UID_FILE);

    match read_file(&path) {
        Ok(content) if !content.trim().is_empty() => return content.trim().to_string(),
        Ok(_) => {}
        Err(e) => {
            warn!("could not read user id: {:#}", e);
            return TEMPORARY_UID.to_string();
        }
    }

    let uid = Uuid::new_v4().simple().to_string();
    if let Err(e) = atomic_write(&path, &uid) {
        warn!("could not store user id: {:#}", e);
        return TEMPORARY_UID.to_string();
    }
    uid
}
