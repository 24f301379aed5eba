//! Loading and saving the ledger state file.
//!
//! The file holds one bincode-encoded [`LedgerSnapshot`]. A missing file is
//! an empty ledger. Saves go through a sibling temporary file and a rename,
//! so an interrupted write never leaves a truncated state behind.

use std::path::{Path, PathBuf};

use veil_ledger::{Ledger, LedgerSnapshot};
use veil_nullables::NullStore;
use veil_program::OsSeed;
use veil_utils::spans;

use crate::CliError;

pub fn load(path: &Path) -> Result<Ledger<NullStore>, CliError> {
    let _span = spans::state_file_span(&path.display().to_string()).entered();
    if !path.exists() {
        tracing::debug!("no state file yet, starting from an empty ledger");
        return Ok(Ledger::new(NullStore::new()));
    }
    let bytes = std::fs::read(path).map_err(|e| CliError::State(format!("read: {e}")))?;
    let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
    Ok(Ledger::from_snapshot(
        &snapshot,
        NullStore::new(),
        Box::new(OsSeed),
    )?)
}

pub fn save(ledger: &Ledger<NullStore>, path: &Path) -> Result<(), CliError> {
    let _span = spans::state_file_span(&path.display().to_string()).entered();
    let snapshot = ledger.snapshot()?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, snapshot.to_bytes())
        .map_err(|e| CliError::State(format!("write {}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| CliError::State(format!("rename to {}: {e}", path.display())))?;
    tracing::info!(height = snapshot.height, hash = %snapshot.hash_hex(), "state saved");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
