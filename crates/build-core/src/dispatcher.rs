//! UI request dispatcher.
//!
//! Server-driven requests are held in a queue of one: a newer request
//! replaces an older pending one, and a request stays pending until the
//! front end explicitly takes it. At most one server-driven modal is open at
//! a time. User-driven panels are tracked separately and may overlap.

use serde_json::Value;
use tracing::debug;

use crate::session::{UiRequest, UiRequestKind};

/// Modal presented because the server asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerModal {
    DatabaseCredentials,
}

/// A server-driven request waiting to be presented.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub modal: ServerModal,
    pub data: Option<Value>,
}

/// Tracks pending and open server-driven modals.
#[derive(Debug, Clone, Default)]
pub struct UiRequestDispatcher {
    pending: Option<PendingRequest>,
    open: Option<ServerModal>,
}

impl UiRequestDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request for the given modal, replacing any pending one.
    pub fn request(&mut self, modal: ServerModal, data: Option<Value>) {
        if let Some(previous) = &self.pending {
            debug!(previous = ?previous.modal, next = ?modal, "superseding pending ui request");
        }
        self.pending = Some(PendingRequest { modal, data });
    }

    /// Queue a raw server `ui_request`.
    ///
    /// Returns the modal it maps to, or `None` for unrecognized types.
    pub fn submit(&mut self, request: &UiRequest) -> Option<ServerModal> {
        match request.kind() {
            UiRequestKind::RequestDbCredentials => {
                self.request(ServerModal::DatabaseCredentials, request.data.clone());
                Some(ServerModal::DatabaseCredentials)
            }
            UiRequestKind::Unrecognized(kind) => {
                debug!(request_type = %kind, "no modal for ui request");
                None
            }
        }
    }

    /// The request waiting to be presented, if any.
    pub fn pending(&self) -> Option<&PendingRequest> {
        self.pending.as_ref()
    }

    /// Consume the pending request and mark its modal open.
    ///
    /// Opening a modal closes any other server-driven modal.
    pub fn acknowledge(&mut self) -> Option<PendingRequest> {
        let request = self.pending.take()?;
        self.open = Some(request.modal);
        Some(request)
    }

    /// The server-driven modal currently open.
    pub fn open_modal(&self) -> Option<ServerModal> {
        self.open
    }

    pub fn is_open(&self, modal: ServerModal) -> bool {
        self.open == Some(modal)
    }

    /// Close a modal and drop any pending request for it.
    ///
    /// Closing a modal that is not open is a no-op.
    pub fn dismiss(&mut self, modal: ServerModal) {
        if self.open == Some(modal) {
            self.open = None;
        }
        if self.pending.as_ref().is_some_and(|p| p.modal == modal) {
            self.pending = None;
        }
    }

    /// Forget everything. Used when a new build starts.
    pub fn reset(&mut self) {
        self.pending = None;
        self.open = None;
    }
}

/// Panels the user opens directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserPanel {
    KnowledgeBase,
    FileUpload,
    ActionConfig,
}

/// Open/closed state of user-driven panels. Panels may overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserPanels {
    knowledge_base: bool,
    file_upload: bool,
    action_config: bool,
}

impl UserPanels {
    fn slot(&mut self, panel: UserPanel) -> &mut bool {
        match panel {
            UserPanel::KnowledgeBase => &mut self.knowledge_base,
            UserPanel::FileUpload => &mut self.file_upload,
            UserPanel::ActionConfig => &mut self.action_config,
        }
    }

    pub fn open(&mut self, panel: UserPanel) {
        *self.slot(panel) = true;
    }

    pub fn close(&mut self, panel: UserPanel) {
        *self.slot(panel) = false;
    }

    pub fn is_open(&self, panel: UserPanel) -> bool {
        match panel {
            UserPanel::KnowledgeBase => self.knowledge_base,
            UserPanel::FileUpload => self.file_upload,
            UserPanel::ActionConfig => self.action_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::REQUEST_DB_CREDENTIALS;
    use serde_json::json;

    #[test]
    fn test_submit_and_acknowledge() {
        let mut dispatcher = UiRequestDispatcher::new();
        let modal = dispatcher.submit(&UiRequest::new(REQUEST_DB_CREDENTIALS));
        assert_eq!(modal, Some(ServerModal::DatabaseCredentials));
        assert!(dispatcher.pending().is_some());
        assert!(!dispatcher.is_open(ServerModal::DatabaseCredentials));

        let taken = dispatcher.acknowledge().unwrap();
        assert_eq!(taken.modal, ServerModal::DatabaseCredentials);
        assert!(dispatcher.pending().is_none());
        assert!(dispatcher.is_open(ServerModal::DatabaseCredentials));
        assert!(dispatcher.acknowledge().is_none());
    }

    #[test]
    fn test_newer_request_supersedes() {
        let mut dispatcher = UiRequestDispatcher::new();
        dispatcher.request(ServerModal::DatabaseCredentials, Some(json!({"attempt": 1})));
        dispatcher.request(ServerModal::DatabaseCredentials, Some(json!({"attempt": 2})));

        let taken = dispatcher.acknowledge().unwrap();
        assert_eq!(taken.data, Some(json!({"attempt": 2})));
    }

    #[test]
    fn test_unrecognized_is_ignored() {
        let mut dispatcher = UiRequestDispatcher::new();
        assert!(dispatcher.submit(&UiRequest::new("REQUEST_CSV_FILE")).is_none());
        assert!(dispatcher.pending().is_none());
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut dispatcher = UiRequestDispatcher::new();
        dispatcher.dismiss(ServerModal::DatabaseCredentials);
        assert!(dispatcher.open_modal().is_none());

        dispatcher.request(ServerModal::DatabaseCredentials, None);
        dispatcher.acknowledge();
        dispatcher.dismiss(ServerModal::DatabaseCredentials);
        dispatcher.dismiss(ServerModal::DatabaseCredentials);
        assert!(dispatcher.open_modal().is_none());
    }

    #[test]
    fn test_user_panels_overlap() {
        let mut panels = UserPanels::default();
        panels.open(UserPanel::KnowledgeBase);
        panels.open(UserPanel::FileUpload);
        assert!(panels.is_open(UserPanel::KnowledgeBase));
        assert!(panels.is_open(UserPanel::FileUpload));
        assert!(!panels.is_open(UserPanel::ActionConfig));

        panels.close(UserPanel::KnowledgeBase);
        assert!(!panels.is_open(UserPanel::KnowledgeBase));
        assert!(panels.is_open(UserPanel::FileUpload));
    }
}
