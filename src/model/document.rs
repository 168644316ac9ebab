use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ropey::Rope;
use tempfile::NamedTempFile;
use thiserror::Error;

/// State changes the surrounding app reacts to (title label, dirty colour).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// First edit since the last new/open/save.
    Changed,
    Saved,
    /// A different file is now loaded (or the same one under a new name).
    FileChanged(Option<PathBuf>),
}

/// Receiver for [`DocumentEvent`]s, injected into the document.
pub trait DocumentObserver {
    fn notify(&mut self, event: DocumentEvent);
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("document has no file name")]
    Untitled,
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// Nothing changed since the last save.
    Unchanged,
}

/// Identity of the edited file: its path and whether it has unsaved edits.
pub struct Document {
    path: Option<PathBuf>,
    dirty: bool,
    observer: Box<dyn DocumentObserver>,
}

impl Document {
    pub fn new(observer: Box<dyn DocumentObserver>) -> Self {
        Self {
            path: None,
            dirty: false,
            observer,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// File name for display, `untitled` when there is no path.
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled".to_string())
    }

    /// Record an edit. Only the first edit after a fresh state notifies.
    pub fn mark_changed(&mut self) {
        if self.dirty {
            return;
        }
        self.dirty = true;
        self.observer.notify(DocumentEvent::Changed);
    }

    /// Start a fresh document that will be saved to `path`.
    pub fn reset(&mut self, path: Option<PathBuf>) {
        self.path = path;
        self.dirty = false;
        self.observer.notify(DocumentEvent::FileChanged(self.path.clone()));
    }

    /// Read `path` and make it the current file.
    pub fn open(&mut self, path: &Path) -> Result<String, DocumentError> {
        if !path.is_file() {
            return Err(DocumentError::NotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!("opened {}", path.display());
        self.reset(Some(path.to_path_buf()));
        Ok(text)
    }

    /// Write `rope` to the current path if there are unsaved edits.
    pub fn save(&mut self, rope: &Rope) -> Result<SaveOutcome, DocumentError> {
        if !self.dirty {
            return Ok(SaveOutcome::Unchanged);
        }

        let path = self.path.clone().ok_or(DocumentError::Untitled)?;
        write_rope(&path, rope)?;

        tracing::info!("saved {}", path.display());
        self.dirty = false;
        self.observer.notify(DocumentEvent::Saved);
        Ok(SaveOutcome::Written)
    }

    /// Write `rope` to `path` unconditionally and adopt it as the current path.
    pub fn save_as(&mut self, path: PathBuf, rope: &Rope) -> Result<(), DocumentError> {
        write_rope(&path, rope)?;

        tracing::info!("saved as {}", path.display());
        self.dirty = false;
        self.path = Some(path);
        self.observer.notify(DocumentEvent::Saved);
        self.observer
            .notify(DocumentEvent::FileChanged(self.path.clone()));
        Ok(())
    }
}

/// Write through a uniquely named temp file next to `path`, then move it into
/// place. A failed write leaves `path` untouched and removes the temp file.
fn write_rope(path: &Path, rope: &Rope) -> Result<(), DocumentError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let result = (|| -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = io::BufWriter::new(&mut tmp);
            for chunk in rope.chunks() {
                writer.write_all(chunk.as_bytes())?;
            }
            writer.flush()?;
        }
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    })();

    result.map_err(|source| {
        tracing::error!("save failed: {source}");
        DocumentError::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::{DocumentEvent, DocumentObserver};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Observer that keeps every event for later inspection.
    #[derive(Clone, Default)]
    pub(crate) struct Recorder(Rc<RefCell<Vec<DocumentEvent>>>);

    impl DocumentObserver for Recorder {
        fn notify(&mut self, event: DocumentEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    impl Recorder {
        pub(crate) fn take(&self) -> Vec<DocumentEvent> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::Recorder;
    use super::*;

    fn document() -> (Document, Recorder) {
        let recorder = Recorder::default();
        (Document::new(Box::new(recorder.clone())), recorder)
    }

    #[test]
    fn starts_untitled_and_clean() {
        let (doc, events) = document();
        assert!(doc.path().is_none());
        assert!(!doc.is_dirty());
        assert_eq!(doc.display_name(), "untitled");
        assert!(events.take().is_empty());
    }

    #[test]
    fn changed_fires_once_per_fresh_state() {
        let (mut doc, events) = document();
        doc.mark_changed();
        doc.mark_changed();
        doc.mark_changed();
        assert_eq!(events.take(), vec![DocumentEvent::Changed]);

        doc.reset(None);
        doc.mark_changed();
        assert_eq!(
            events.take(),
            vec![DocumentEvent::FileChanged(None), DocumentEvent::Changed]
        );
    }

    #[test]
    fn open_missing_file_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut doc, events) = document();
        let missing = dir.path().join("nope.txt");
        let err = doc.open(&missing).unwrap_err();
        assert!(matches!(err, DocumentError::NotFound(ref p) if p == &missing));
        assert!(doc.path().is_none());
        assert!(events.take().is_empty());
    }

    #[test]
    fn open_then_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello\n").unwrap();

        let (mut doc, events) = document();
        let text = doc.open(&path).unwrap();
        assert_eq!(text, "hello\n");
        assert_eq!(doc.display_name(), "notes.txt");
        assert_eq!(
            events.take(),
            vec![DocumentEvent::FileChanged(Some(path.clone()))]
        );

        let rope = Rope::from_str("hello world\n");
        assert_eq!(doc.save(&rope).unwrap(), SaveOutcome::Unchanged);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");

        doc.mark_changed();
        assert_eq!(doc.save(&rope).unwrap(), SaveOutcome::Written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello world\n");
        assert!(!doc.is_dirty());
        assert_eq!(
            events.take(),
            vec![DocumentEvent::Changed, DocumentEvent::Saved]
        );
        assert!(!dir.path().join("notes.tmp").exists());
    }

    #[test]
    fn save_untitled_requires_a_name() {
        let (mut doc, _events) = document();
        doc.mark_changed();
        let err = doc.save(&Rope::from_str("x")).unwrap_err();
        assert!(matches!(err, DocumentError::Untitled));
        assert!(doc.is_dirty());
    }

    #[test]
    fn save_as_adopts_new_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let (mut doc, events) = document();
        doc.mark_changed();
        events.take();

        doc.save_as(path.clone(), &Rope::from_str("a\nb")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nb");
        assert_eq!(doc.path(), Some(path.as_path()));
        assert!(!doc.is_dirty());
        assert_eq!(
            events.take(),
            vec![DocumentEvent::Saved, DocumentEvent::FileChanged(Some(path))]
        );
    }

    #[test]
    fn save_leaves_sibling_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let sibling = dir.path().join("notes.tmp");
        std::fs::write(&sibling, "precious").unwrap();

        let (mut doc, _events) = document();
        doc.save_as(path.clone(), &Rope::from_str("draft")).unwrap();
        doc.mark_changed();
        doc.save(&Rope::from_str("final")).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "final");
        assert_eq!(std::fs::read_to_string(&sibling).unwrap(), "precious");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("out.txt");
        let (mut doc, _events) = document();
        let err = doc.save_as(path, &Rope::from_str("x")).unwrap_err();
        assert!(matches!(err, DocumentError::Write { .. }));
        assert!(doc.path().is_none());
    }
}
