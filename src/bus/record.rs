use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Bus, Command};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecordedCommand {
    /// Zero for commands issued from outside, one more for each level of
    /// nesting inside a handler.
    pub depth: usize,
    pub command: Command,
}

/// Log of every command the bus dispatched, nested ones included.
#[derive(Debug, Default)]
pub struct Record {
    entries: Option<Vec<RecordedCommand>>,
    path: Option<PathBuf>,
}

impl Record {
    pub fn disabled() -> Self { Record::default() }

    pub fn in_memory() -> Self { Record { entries: Some(Vec::new()), path: None } }

    pub fn to_file(path: PathBuf) -> Self { Record { entries: Some(Vec::new()), path: Some(path) } }

    pub fn on_command(&mut self, depth: usize, command: &Command) {
        if let Some(entries) = &mut self.entries {
            entries.push(RecordedCommand { depth, command: command.clone() });
        }
    }

    pub fn entries(&self) -> &[RecordedCommand] { self.entries.as_deref().unwrap_or_default() }

    pub fn clear(&mut self) {
        if let Some(entries) = &mut self.entries {
            entries.clear();
        }
    }

    /// Writes the record to its file, if it has one.
    pub fn save(&self) -> anyhow::Result<()> {
        let (Some(path), Some(entries)) = (&self.path, &self.entries) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(entries, ron::ser::PrettyConfig::default())?;
        File::create(path)?.write_all(text.as_bytes())?;
        info!(?path, count = entries.len(), "Saved command record");
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Vec<RecordedCommand>> {
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        Ok(ron::from_str(&buf)?)
    }
}

/// Re-issues the top-level commands of a record. Nested commands are skipped
/// since their handlers issue them again.
pub fn replay(bus: &mut Bus, entries: &[RecordedCommand]) {
    for entry in entries.iter().filter(|e| e.depth == 0) {
        if let Err(err) = bus.invoke(entry.command.clone()) {
            warn!(%err, command = entry.command.name(), "Replayed command failed");
        }
    }
}
