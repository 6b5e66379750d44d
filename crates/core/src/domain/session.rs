//! Editing session driven by a front end
//!
//! A session owns the binding store, the visible column list and the current
//! target directory. Every binding change is written back to the default
//! binding file immediately.

use crate::domain::binding::{BindingChange, BindingError, BindingStore, Fader, Layer};
use crate::domain::codec::{CodecError, ConfigCodec, ParsedConfig};
use crate::domain::columns::{ColumnError, ColumnList};
use crate::domain::target::{
    DiscoveryError, NameResolver, TargetDirectory, TargetDiscovery, TargetId,
};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors surfaced to the front end
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt binding file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("Invalid target id {:?}: must be non-empty and contain no whitespace", .0.as_str())]
    InvalidTarget(TargetId),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Column(#[from] ColumnError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Outcome of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Bindings now in the store
    pub bindings: usize,
    /// Columns appended to the session
    pub columns_added: usize,
}

/// Read-only view of one layer for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerGrid {
    pub layer: Layer,
    pub columns: Vec<TargetId>,
    /// `cells[row][col]`, row 0 is fader 1
    pub cells: Vec<Vec<bool>>,
}

impl LayerGrid {
    pub fn is_bound(&self, fader: Fader, column: usize) -> bool {
        self.cells
            .get(usize::from(fader.index() - Fader::MIN))
            .and_then(|row| row.get(column))
            .copied()
            .unwrap_or(false)
    }
}

#[derive(Debug)]
pub struct Session {
    store: BindingStore,
    columns: ColumnList,
    directory: TargetDirectory,
    default_path: PathBuf,
}

impl Session {
    /// Empty session persisting to `default_path`
    pub fn new(default_path: impl Into<PathBuf>) -> Self {
        Self {
            store: BindingStore::new(),
            columns: ColumnList::new(),
            directory: TargetDirectory::new(),
            default_path: default_path.into(),
        }
    }

    /// Open the default binding file. A missing file starts an empty session.
    #[instrument(skip(default_path))]
    pub fn load_default(default_path: impl Into<PathBuf>) -> Result<Self> {
        let mut session = Self::new(default_path);
        match read_bindings(&session.default_path)? {
            Some(parsed) => {
                info!(
                    path = %session.default_path.display(),
                    bindings = parsed.store.len(),
                    "Bindings loaded"
                );
                session.store = parsed.store;
                session.columns = parsed.columns;
            }
            None => {
                info!(
                    path = %session.default_path.display(),
                    "No binding file yet, starting empty"
                );
            }
        }
        Ok(session)
    }

    /// Toggle a binding and persist the default file.
    ///
    /// An out-of-range fader or an id that cannot be written back to the
    /// binding file is rejected before anything changes.
    pub fn toggle_binding(
        &mut self,
        layer: Layer,
        fader: i64,
        target: &TargetId,
    ) -> Result<BindingChange> {
        let fader = Fader::new(fader)?;
        check_target(target)?;
        let change = self.store.toggle_binding(layer, fader, target);
        self.save()?;
        Ok(change)
    }

    /// Targets on `(layer, fader)`. Never fails; unknown pairs are empty.
    pub fn query(&self, layer: Layer, fader: i64) -> &[TargetId] {
        match Fader::new(fader) {
            Ok(fader) => self.store.query(layer, fader),
            Err(_) => &[],
        }
    }

    /// Show `target` as a column. Returns false if it was already visible.
    pub fn add_column(&mut self, target: TargetId) -> Result<bool> {
        check_target(&target)?;
        Ok(self.columns.add(target))
    }

    pub fn remove_column(&mut self, index: usize) -> Result<TargetId> {
        Ok(self.columns.remove(index)?)
    }

    /// Replace the bindings with those of `path`, append its columns, and
    /// persist the default file.
    #[instrument(skip(self, path))]
    pub fn import_from(&mut self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = parse_at(path, &text)?;

        self.store = parsed.store;
        let columns_added = self.columns.merge(parsed.columns.iter().cloned());
        self.save()?;

        let summary = ImportSummary {
            bindings: self.store.len(),
            columns_added,
        };
        info!(
            path = %path.display(),
            bindings = summary.bindings,
            columns_added,
            "Bindings imported"
        );
        Ok(summary)
    }

    /// Write the current bindings to `path`, overwriting it
    #[instrument(skip(self, path))]
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<()> {
        write_bindings(path.as_ref(), &self.store, &self.directory)
    }

    /// Write the current bindings to the default file
    pub fn save(&self) -> Result<()> {
        write_bindings(&self.default_path, &self.store, &self.directory)
    }

    /// Refresh the target directory.
    ///
    /// On failure the previous directory stays in place.
    pub fn refresh_targets(
        &mut self,
        discovery: &dyn TargetDiscovery,
    ) -> std::result::Result<usize, DiscoveryError> {
        match discovery.discover() {
            Ok(directory) => {
                debug!(targets = directory.len(), "Target directory refreshed");
                self.directory = directory;
                Ok(self.directory.len())
            }
            Err(e) => {
                warn!(error = %e, "Target discovery failed, keeping previous targets");
                Err(e)
            }
        }
    }

    pub fn set_directory(&mut self, directory: TargetDirectory) {
        self.directory = directory;
    }

    /// Header label for a column: the display name, or the raw id
    pub fn column_label(&self, target: &TargetId) -> String {
        self.directory
            .resolve(target)
            .unwrap_or_else(|| target.to_string())
    }

    /// Bound/unbound matrix of `layer` over the visible columns
    pub fn grid(&self, layer: Layer) -> LayerGrid {
        let columns: Vec<TargetId> = self.columns.iter().cloned().collect();
        let cells: Vec<Vec<bool>> = Fader::all()
            .map(|fader| {
                columns
                    .iter()
                    .map(|target| self.store.is_bound(layer, fader, target))
                    .collect()
            })
            .collect();
        LayerGrid {
            layer,
            columns,
            cells,
        }
    }

    pub fn store(&self) -> &BindingStore {
        &self.store
    }

    pub fn columns(&self) -> &ColumnList {
        &self.columns
    }

    pub fn directory(&self) -> &TargetDirectory {
        &self.directory
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }
}

fn check_target(target: &TargetId) -> Result<()> {
    if target.is_valid() {
        Ok(())
    } else {
        Err(SessionError::InvalidTarget(target.clone()))
    }
}

/// Read and parse `path`; `None` when the file does not exist.
fn read_bindings(path: &Path) -> Result<Option<ParsedConfig>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SessionError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_at(path, &text).map(Some)
}

fn parse_at(path: &Path, text: &str) -> Result<ParsedConfig> {
    ConfigCodec::parse(text).map_err(|source| SessionError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_bindings(path: &Path, store: &BindingStore, resolver: &dyn NameResolver) -> Result<()> {
    let io_err = |source: io::Error| SessionError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, ConfigCodec::serialize(store, resolver)).map_err(io_err)?;

    debug!(path = %path.display(), bindings = store.len(), "Bindings written");
    Ok(())
}
