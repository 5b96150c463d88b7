//! Recording host for unit tests

use crate::host::{DocumentId, EditorHost, HostError, ShowOptions};
use overlay_types::DocumentUri;

#[derive(Default)]
pub(crate) struct FakeHost {
    pub docs: Vec<(DocumentId, DocumentUri)>,
    pub active: Option<DocumentId>,
    pub calls: Vec<String>,
    pub fail_open: bool,
}

impl FakeHost {
    pub fn with_active(uri: DocumentUri) -> Self {
        let id = DocumentId::new();
        Self {
            docs: vec![(id, uri)],
            active: Some(id),
            ..Self::default()
        }
    }
}

impl EditorHost for FakeHost {
    fn active_document(&self) -> Option<DocumentUri> {
        let active = self.active?;
        self.docs
            .iter()
            .find(|(id, _)| *id == active)
            .map(|(_, uri)| uri.clone())
    }

    fn close_active(&mut self) -> Result<(), HostError> {
        let active = self.active.take().ok_or(HostError::NoActiveDocument)?;
        self.docs.retain(|(id, _)| *id != active);
        self.calls.push("close".to_string());
        Ok(())
    }

    fn open_document(&mut self, uri: &DocumentUri) -> Result<DocumentId, HostError> {
        if self.fail_open {
            return Err(HostError::UnsupportedScheme(uri.scheme.clone()));
        }
        let id = DocumentId::new();
        self.docs.push((id, uri.clone()));
        self.calls.push(format!("open {}", uri));
        Ok(id)
    }

    fn show_document(&mut self, id: DocumentId, options: ShowOptions) -> Result<(), HostError> {
        if !self.docs.iter().any(|(doc, _)| *doc == id) {
            return Err(HostError::UnknownDocument(id));
        }
        self.active = Some(id);
        self.calls.push(format!("show preview={}", options.preview));
        Ok(())
    }
}
