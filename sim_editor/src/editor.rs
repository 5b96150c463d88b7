//! Simulated editor implementation

use overlay_path::OverlayIdentity;
use overlay_types::DocumentUri;
use serde::Serialize;
use services_overlay_fs::VirtualFileProvider;
use services_redirect::{DocumentId, EditorHost, HostError, ShowOptions};
use std::fs;
use std::rc::Rc;

/// An open document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    /// Tab identifier
    pub id: DocumentId,
    /// Document locator
    pub uri: DocumentUri,
    /// Buffer content
    pub text: String,
    /// Preview tabs are replaced by the next preview open
    pub preview: bool,
    /// Buffer differs from what was last loaded or saved
    pub dirty: bool,
}

/// Simulated editor
pub struct SimEditor {
    provider: Rc<dyn VirtualFileProvider>,
    tabs: Vec<Tab>,
    /// Tab ids, least recently used first
    recent: Vec<DocumentId>,
    active: Option<DocumentId>,
}

impl SimEditor {
    /// Creates an editor with no tabs, serving overlay documents from `provider`
    pub fn new(provider: Rc<dyn VirtualFileProvider>) -> Self {
        Self {
            provider,
            tabs: Vec::new(),
            recent: Vec::new(),
            active: None,
        }
    }

    /// Returns every tab in open order
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Returns a tab by id
    pub fn tab(&self, id: DocumentId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Returns the active tab
    pub fn active_tab(&self) -> Option<&Tab> {
        self.tab(self.active?)
    }

    /// Opens a real file the way a single click does: as a preview tab
    pub fn open_file(&mut self, path: &str) -> Result<DocumentId, HostError> {
        let uri = DocumentUri::file(path);
        let pinned = self.tabs.iter().any(|t| t.uri == uri && !t.preview);
        let id = self.open_document(&uri)?;
        self.show_document(id, ShowOptions { preview: !pinned })?;
        Ok(id)
    }

    /// Replaces the active buffer
    ///
    /// Editing pins a preview tab.
    pub fn edit_active(&mut self, text: impl Into<String>) -> Result<(), HostError> {
        let tab = self.active_tab_mut()?;
        tab.text = text.into();
        tab.dirty = true;
        tab.preview = false;
        Ok(())
    }

    /// Saves the active buffer
    ///
    /// Real files are written directly, overlay documents through the
    /// provider. On failure the buffer stays dirty.
    pub fn save_active(&mut self) -> Result<(), HostError> {
        let provider = Rc::clone(&self.provider);
        let tab = self.active_tab_mut()?;

        let result = if tab.uri.is_overlay() {
            OverlayIdentity::from_uri(&tab.uri)
                .map_err(|err| HostError::Provider(err.into()))
                .and_then(|identity| {
                    provider
                        .write(&identity, &tab.text)
                        .map_err(HostError::from)
                })
        } else {
            write_real(&tab.uri, &tab.text)
        };

        match result {
            Ok(()) => {
                tab.dirty = false;
                tracing::debug!(target: "sim::editor", uri = %tab.uri, "saved");
                Ok(())
            }
            Err(err) => {
                tracing::debug!(target: "sim::editor", uri = %tab.uri, error = %err, "save failed");
                Err(err)
            }
        }
    }

    fn active_tab_mut(&mut self) -> Result<&mut Tab, HostError> {
        let active = self.active.ok_or(HostError::NoActiveDocument)?;
        self.tabs
            .iter_mut()
            .find(|t| t.id == active)
            .ok_or(HostError::NoActiveDocument)
    }

    fn load(&self, uri: &DocumentUri) -> Result<String, HostError> {
        if uri.is_overlay() {
            let identity =
                OverlayIdentity::from_uri(uri).map_err(|err| HostError::Provider(err.into()))?;
            return Ok(self.provider.read(&identity)?);
        }
        let path = uri
            .fs_path()
            .ok_or_else(|| HostError::UnsupportedScheme(uri.scheme.clone()))?;
        fs::read_to_string(&path).map_err(|err| HostError::Io {
            path,
            reason: err.to_string(),
        })
    }

    fn touch(&mut self, id: DocumentId) {
        self.recent.retain(|r| *r != id);
        self.recent.push(id);
    }
}

impl EditorHost for SimEditor {
    fn active_document(&self) -> Option<DocumentUri> {
        self.active_tab().map(|t| t.uri.clone())
    }

    fn close_active(&mut self) -> Result<(), HostError> {
        let active = self.active.take().ok_or(HostError::NoActiveDocument)?;
        self.tabs.retain(|t| t.id != active);
        self.recent.retain(|r| *r != active);
        self.active = self.recent.last().copied();
        tracing::debug!(target: "sim::editor", closed = %active, "close_active");
        Ok(())
    }

    fn open_document(&mut self, uri: &DocumentUri) -> Result<DocumentId, HostError> {
        if let Some(tab) = self.tabs.iter().find(|t| &t.uri == uri) {
            return Ok(tab.id);
        }

        let text = self.load(uri)?;
        let tab = Tab {
            id: DocumentId::new(),
            uri: uri.clone(),
            text,
            preview: false,
            dirty: false,
        };
        let id = tab.id;
        tracing::debug!(target: "sim::editor", uri = %uri, tab = %id, "opened");
        self.tabs.push(tab);
        Ok(id)
    }

    fn show_document(&mut self, id: DocumentId, options: ShowOptions) -> Result<(), HostError> {
        let tab = self
            .tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(HostError::UnknownDocument(id))?;
        tab.preview = options.preview;

        if options.preview {
            let replaced: Vec<DocumentId> = self
                .tabs
                .iter()
                .filter(|t| t.preview && t.id != id)
                .map(|t| t.id)
                .collect();
            self.tabs.retain(|t| !replaced.contains(&t.id));
            self.recent.retain(|r| !replaced.contains(r));
        }

        self.active = Some(id);
        self.touch(id);
        Ok(())
    }
}

fn write_real(uri: &DocumentUri, text: &str) -> Result<(), HostError> {
    let path = uri
        .fs_path()
        .ok_or_else(|| HostError::UnsupportedScheme(uri.scheme.clone()))?;
    fs::write(&path, text).map_err(|err| HostError::Io {
        path,
        reason: err.to_string(),
    })
}
