//! Atomic save/restore of the tracker state blob plus the input-stream
//! cursor, so a restart can resume without replaying the whole decay window.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub last_raw_message_id: u64,
    pub tracker_state: Vec<u8>,
}

/// Writes to a temp file in the same directory and renames over the target,
/// so a crash mid-write never leaves a truncated checkpoint.
pub fn save(path: &Path, checkpoint: &Checkpoint) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    let bytes = serde_json::to_vec(checkpoint).expect("Checkpoint contains no non-serializable types");
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)
}

pub fn load(path: &Path) -> io::Result<Option<Checkpoint>> {
    match fs::read(path) {
        Ok(bytes) => {
            let checkpoint = serde_json::from_slice(&bytes)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            Ok(Some(checkpoint))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
