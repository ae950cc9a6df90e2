// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use tracing::{debug, warn};

use crate::{Parametres, ReferenceListKind, TransferOutcome, TransferRecord, TransferRequest};

pub trait ParametresBackend {
    fn fetch_parametres(&mut self) -> Result<Parametres>;
    fn append_value(&mut self, kind: ReferenceListKind, value: &str) -> Result<()>;
    fn delete_value(&mut self, kind: ReferenceListKind, index: usize) -> Result<()>;
    fn replace_values(&mut self, kind: ReferenceListKind, values: &[String]) -> Result<()>;
    fn transfer_portfolio(&mut self, request: &TransferRequest) -> Result<TransferOutcome>;
    fn transfer_history(&mut self) -> Result<Vec<TransferRecord>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Loaded { count: usize },
    LoadFailed,
    ValueAdded(String),
    DeleteRequested { index: usize, label: String },
    DeleteCancelled,
    ValueDeleted(String),
    ReorderModeChanged(bool),
    ItemMoved { from: usize, to: usize },
    ReorderCommitted,
    ReorderDiscarded,
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub index: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceListEditor {
    kind: ReferenceListKind,
    items: Vec<String>,
    persisted: Vec<String>,
    reordering: bool,
    pending_reorder: bool,
    pending_delete: Option<PendingDelete>,
    load_error: Option<String>,
    loaded: bool,
}

impl ReferenceListEditor {
    pub fn new(kind: ReferenceListKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            persisted: Vec::new(),
            reordering: false,
            pending_reorder: false,
            pending_delete: None,
            load_error: None,
            loaded: false,
        }
    }

    pub const fn kind(&self) -> ReferenceListKind {
        self.kind
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub const fn is_reordering(&self) -> bool {
        self.reordering
    }

    pub const fn has_pending_reorder(&self) -> bool {
        self.pending_reorder
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn load(&mut self, backend: &mut dyn ParametresBackend) -> Vec<EditorEvent> {
        match backend.fetch_parametres() {
            Ok(parametres) => {
                self.items = parametres.values(self.kind);
                self.persisted = self.items.clone();
                self.pending_reorder = false;
                self.load_error = None;
                self.loaded = true;
                debug!(list = self.kind.as_str(), count = self.items.len(), "list loaded");
                vec![EditorEvent::Loaded {
                    count: self.items.len(),
                }]
            }
            Err(error) => {
                warn!(list = self.kind.as_str(), error = %error, "list load failed");
                self.items.clear();
                self.persisted.clear();
                self.pending_reorder = false;
                self.loaded = true;
                let message = format!("could not load {}: {error:#}", self.kind.label());
                self.load_error = Some(message.clone());
                vec![
                    EditorEvent::LoadFailed,
                    EditorEvent::Notice(Notice::Error(message)),
                ]
            }
        }
    }

    pub fn add(&mut self, backend: &mut dyn ParametresBackend, value: &str) -> Vec<EditorEvent> {
        if value.trim().is_empty() {
            return Vec::new();
        }

        if let Err(error) = backend.append_value(self.kind, value) {
            return self.failure("add value", error);
        }

        // Reload goes last; its error must be the final notice.
        let mut events = vec![
            EditorEvent::ValueAdded(value.to_owned()),
            EditorEvent::Notice(Notice::Success(format!(
                "{value} added to {}",
                self.kind.label()
            ))),
        ];
        events.extend(self.load(backend));
        events
    }

    pub fn request_delete(&mut self, index: usize) -> Vec<EditorEvent> {
        let Some(label) = self.items.get(index).cloned() else {
            return vec![EditorEvent::Notice(Notice::Error(format!(
                "no value at position {} in {}",
                index + 1,
                self.kind.label()
            )))];
        };
        self.pending_delete = Some(PendingDelete {
            index,
            label: label.clone(),
        });
        vec![EditorEvent::DeleteRequested { index, label }]
    }

    pub fn cancel_delete(&mut self) -> Vec<EditorEvent> {
        if self.pending_delete.take().is_some() {
            vec![EditorEvent::DeleteCancelled]
        } else {
            Vec::new()
        }
    }

    // Re-fetches first: the backend deletes by position only.
    pub fn confirm_delete(&mut self, backend: &mut dyn ParametresBackend) -> Vec<EditorEvent> {
        let Some(pending) = self.pending_delete.take() else {
            return Vec::new();
        };

        let current = match backend.fetch_parametres() {
            Ok(parametres) => parametres.values(self.kind),
            Err(error) => return self.failure("delete value", error),
        };

        if current.get(pending.index) != Some(&pending.label) {
            warn!(
                list = self.kind.as_str(),
                index = pending.index,
                label = %pending.label,
                "list changed before delete; aborting"
            );
            self.items = current;
            self.persisted = self.items.clone();
            self.pending_reorder = false;
            return vec![
                EditorEvent::Loaded {
                    count: self.items.len(),
                },
                EditorEvent::Notice(Notice::Error(format!(
                    "{} changed since the confirmation -- {} was not deleted, check the list and retry",
                    self.kind.label(),
                    pending.label
                ))),
            ];
        }

        if let Err(error) = backend.delete_value(self.kind, pending.index) {
            return self.failure("delete value", error);
        }

        let mut events = vec![
            EditorEvent::Notice(Notice::Success(format!(
                "{} removed from {}",
                pending.label,
                self.kind.label()
            ))),
            EditorEvent::ValueDeleted(pending.label),
        ];
        events.extend(self.load(backend));
        events
    }

    pub fn toggle_reorder_mode(&mut self) -> Vec<EditorEvent> {
        if self.reordering {
            return self.cancel_reorder();
        }
        if !self.kind.can_reorder() {
            return vec![EditorEvent::Notice(Notice::Error(format!(
                "{} are ordered by the server",
                self.kind.label()
            )))];
        }
        self.reordering = true;
        self.persisted = self.items.clone();
        vec![EditorEvent::ReorderModeChanged(true)]
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Vec<EditorEvent> {
        if !self.reordering || from >= self.items.len() || to >= self.items.len() || from == to {
            return Vec::new();
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        self.pending_reorder = self.items != self.persisted;
        vec![EditorEvent::ItemMoved { from, to }]
    }

    pub fn commit_reorder(&mut self, backend: &mut dyn ParametresBackend) -> Vec<EditorEvent> {
        if !self.reordering {
            return Vec::new();
        }
        if !self.pending_reorder {
            self.reordering = false;
            return vec![EditorEvent::ReorderModeChanged(false)];
        }

        if let Err(error) = backend.replace_values(self.kind, &self.items) {
            self.items = self.persisted.clone();
            self.pending_reorder = false;
            let mut events = vec![EditorEvent::ReorderDiscarded];
            events.extend(self.failure("save order", error));
            return events;
        }

        self.persisted = self.items.clone();
        self.pending_reorder = false;
        self.reordering = false;
        let mut events = vec![
            EditorEvent::ReorderCommitted,
            EditorEvent::ReorderModeChanged(false),
            EditorEvent::Notice(Notice::Success(format!(
                "{} order saved",
                self.kind.label()
            ))),
        ];
        events.extend(self.load(backend));
        events
    }

    pub fn cancel_reorder(&mut self) -> Vec<EditorEvent> {
        if !self.reordering {
            return Vec::new();
        }
        self.reordering = false;
        let mut events = Vec::new();
        if self.pending_reorder {
            self.items = self.persisted.clone();
            self.pending_reorder = false;
            events.push(EditorEvent::ReorderDiscarded);
        }
        events.push(EditorEvent::ReorderModeChanged(false));
        events
    }

    fn failure(&self, action: &str, error: anyhow::Error) -> Vec<EditorEvent> {
        warn!(list = self.kind.as_str(), action, error = %error, "list mutation failed");
        vec![EditorEvent::Notice(Notice::Error(format!(
            "could not {action} in {}: {error:#}",
            self.kind.label()
        )))]
    }
}

#[cfg(test)]
mod tests {
    use super::{EditorEvent, Notice, ParametresBackend, ReferenceListEditor};
    use crate::{
        Parametres, ReferenceListKind, TransferOutcome, TransferRecord, TransferRequest,
    };
    use anyhow::{Result, bail};

    #[derive(Debug, Default)]
    struct FakeBackend {
        parametres: Parametres,
        fail_fetch: bool,
        fail_mutations: bool,
        replaced: Vec<Vec<String>>,
        appended: Vec<String>,
        deleted: Vec<usize>,
        fetches: usize,
    }

    impl FakeBackend {
        fn with_regions(values: &[&str]) -> Self {
            Self {
                parametres: Parametres::new().with_list(ReferenceListKind::Regions, values),
                ..Self::default()
            }
        }
    }

    impl ParametresBackend for FakeBackend {
        fn fetch_parametres(&mut self) -> Result<Parametres> {
            self.fetches += 1;
            if self.fail_fetch {
                bail!("connection refused");
            }
            Ok(self.parametres.clone())
        }

        fn append_value(&mut self, kind: ReferenceListKind, value: &str) -> Result<()> {
            if self.fail_mutations {
                bail!("server error (500)");
            }
            self.appended.push(value.to_owned());
            let mut values = self.parametres.values(kind);
            // server keeps the list sorted, so the client must not assume append
            values.push(value.to_owned());
            values.sort();
            self.parametres.set_values(kind, values);
            Ok(())
        }

        fn delete_value(&mut self, kind: ReferenceListKind, index: usize) -> Result<()> {
            if self.fail_mutations {
                bail!("server error (500)");
            }
            self.deleted.push(index);
            let mut values = self.parametres.values(kind);
            values.remove(index);
            self.parametres.set_values(kind, values);
            Ok(())
        }

        fn replace_values(&mut self, kind: ReferenceListKind, values: &[String]) -> Result<()> {
            if self.fail_mutations {
                bail!("server error (500)");
            }
            self.replaced.push(values.to_vec());
            self.parametres.set_values(kind, values.to_vec());
            Ok(())
        }

        fn transfer_portfolio(&mut self, _request: &TransferRequest) -> Result<TransferOutcome> {
            bail!("not used")
        }

        fn transfer_history(&mut self) -> Result<Vec<TransferRecord>> {
            bail!("not used")
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    fn has_error(events: &[EditorEvent]) -> bool {
        events
            .iter()
            .any(|event| matches!(event, EditorEvent::Notice(Notice::Error(_))))
    }

    #[test]
    fn load_projects_the_named_list() {
        let mut backend = FakeBackend::with_regions(&["Bretagne", "Alsace"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);

        let events = editor.load(&mut backend);
        assert_eq!(events, vec![EditorEvent::Loaded { count: 2 }]);
        assert_eq!(editor.items(), strings(&["Bretagne", "Alsace"]).as_slice());
        assert!(editor.load_error().is_none());
    }

    #[test]
    fn load_failure_leaves_list_empty_with_error() {
        let mut backend = FakeBackend::with_regions(&["Bretagne"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        backend.fail_fetch = true;
        let events = editor.load(&mut backend);
        assert!(editor.items().is_empty());
        assert!(editor.load_error().is_some());
        assert_eq!(events[0], EditorEvent::LoadFailed);
        assert!(has_error(&events));
    }

    #[test]
    fn blank_add_is_a_no_op() {
        let mut backend = FakeBackend::with_regions(&["Bretagne"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        assert!(editor.add(&mut backend, "   ").is_empty());
        assert!(backend.appended.is_empty());
    }

    #[test]
    fn add_sends_raw_value_and_takes_server_order() {
        let mut backend = FakeBackend::with_regions(&["Bretagne", "Normandie"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        let events = editor.add(&mut backend, " Alsace");
        assert_eq!(backend.appended, strings(&[" Alsace"]));
        assert_eq!(
            editor.items(),
            strings(&[" Alsace", "Bretagne", "Normandie"]).as_slice()
        );
        assert!(events.contains(&EditorEvent::ValueAdded(" Alsace".to_owned())));
        assert!(!has_error(&events));
    }

    #[test]
    fn add_failure_reports_error_without_value_added() {
        let mut backend = FakeBackend::with_regions(&["Bretagne"]);
        backend.fail_mutations = true;
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        let events = editor.add(&mut backend, "Alsace");
        assert!(has_error(&events));
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, EditorEvent::ValueAdded(_)))
        );
        assert_eq!(editor.items(), strings(&["Bretagne"]).as_slice());
    }

    #[test]
    fn failed_reload_after_add_is_the_last_notice() {
        let mut backend = FakeBackend::with_regions(&["Bretagne"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        backend.fail_fetch = true;
        let events = editor.add(&mut backend, "Alsace");
        assert_eq!(backend.appended, strings(&["Alsace"]));
        assert!(events.contains(&EditorEvent::ValueAdded("Alsace".to_owned())));
        assert_eq!(
            events.last(),
            Some(&EditorEvent::Notice(Notice::Error(
                "could not load régions: connection refused".to_owned()
            )))
        );
    }

    #[test]
    fn delete_requires_confirmation_and_removes_confirmed_value() {
        let mut backend = FakeBackend::with_regions(&["A", "B", "C"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        let requested = editor.request_delete(1);
        assert_eq!(
            requested,
            vec![EditorEvent::DeleteRequested {
                index: 1,
                label: "B".to_owned(),
            }]
        );
        assert!(backend.deleted.is_empty());

        let events = editor.confirm_delete(&mut backend);
        assert_eq!(backend.deleted, vec![1]);
        assert_eq!(editor.items(), strings(&["A", "C"]).as_slice());
        assert!(events.contains(&EditorEvent::ValueDeleted("B".to_owned())));
        assert!(editor.pending_delete().is_none());
    }

    #[test]
    fn delete_out_of_range_is_rejected() {
        let mut backend = FakeBackend::with_regions(&["A"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        assert!(has_error(&editor.request_delete(3)));
        assert!(editor.pending_delete().is_none());
    }

    #[test]
    fn cancelled_delete_sends_nothing() {
        let mut backend = FakeBackend::with_regions(&["A", "B"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        editor.request_delete(0);
        assert_eq!(editor.cancel_delete(), vec![EditorEvent::DeleteCancelled]);
        assert!(editor.confirm_delete(&mut backend).is_empty());
        assert!(backend.deleted.is_empty());
    }

    #[test]
    fn delete_is_aborted_when_list_changed_after_confirmation() {
        let mut backend = FakeBackend::with_regions(&["A", "B", "C"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        editor.request_delete(1);
        backend
            .parametres
            .set_values(ReferenceListKind::Regions, strings(&["A", "Z", "B", "C"]));

        let events = editor.confirm_delete(&mut backend);
        assert!(backend.deleted.is_empty());
        assert!(has_error(&events));
        assert_eq!(editor.items(), strings(&["A", "Z", "B", "C"]).as_slice());
    }

    #[test]
    fn move_item_is_local_until_commit() {
        let mut backend = FakeBackend::with_regions(&["A", "B", "C"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);

        assert!(editor.move_item(0, 2).is_empty(), "needs reorder mode");
        editor.toggle_reorder_mode();
        let fetches = backend.fetches;
        editor.move_item(0, 2);

        assert_eq!(editor.items(), strings(&["B", "C", "A"]).as_slice());
        assert!(editor.has_pending_reorder());
        assert_eq!(backend.fetches, fetches);
        assert!(backend.replaced.is_empty());

        let events = editor.commit_reorder(&mut backend);
        assert_eq!(backend.replaced, vec![strings(&["B", "C", "A"])]);
        assert!(events.contains(&EditorEvent::ReorderCommitted));
        assert!(!editor.has_pending_reorder());
        assert!(!editor.is_reordering());
        assert_eq!(editor.items(), strings(&["B", "C", "A"]).as_slice());
    }

    #[test]
    fn moves_preserve_the_multiset() {
        let mut backend = FakeBackend::with_regions(&["A", "B", "C", "D", "B"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);
        editor.toggle_reorder_mode();

        for (from, to) in [(0, 4), (3, 1), (2, 2), (4, 0), (1, 3), (9, 0)] {
            editor.move_item(from, to);
        }

        let mut moved = editor.items().to_vec();
        moved.sort();
        assert_eq!(moved, strings(&["A", "B", "B", "C", "D"]));
    }

    #[test]
    fn moving_back_to_persisted_order_clears_pending_flag() {
        let mut backend = FakeBackend::with_regions(&["A", "B"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);
        editor.toggle_reorder_mode();

        editor.move_item(0, 1);
        assert!(editor.has_pending_reorder());
        editor.move_item(0, 1);
        assert!(!editor.has_pending_reorder());
    }

    #[test]
    fn failed_commit_restores_persisted_order() {
        let mut backend = FakeBackend::with_regions(&["A", "B", "C"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);
        editor.toggle_reorder_mode();
        editor.move_item(2, 0);

        backend.fail_mutations = true;
        let events = editor.commit_reorder(&mut backend);
        assert!(has_error(&events));
        assert!(events.contains(&EditorEvent::ReorderDiscarded));
        assert_eq!(editor.items(), strings(&["A", "B", "C"]).as_slice());
        assert!(!editor.has_pending_reorder());
        assert!(editor.is_reordering());
    }

    #[test]
    fn cancel_reorder_discards_local_order_without_network() {
        let mut backend = FakeBackend::with_regions(&["A", "B", "C"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);
        editor.toggle_reorder_mode();
        editor.move_item(0, 1);
        let fetches = backend.fetches;

        let events = editor.toggle_reorder_mode();
        assert_eq!(
            events,
            vec![
                EditorEvent::ReorderDiscarded,
                EditorEvent::ReorderModeChanged(false),
            ]
        );
        assert_eq!(editor.items(), strings(&["A", "B", "C"]).as_slice());
        assert_eq!(backend.fetches, fetches);
    }

    #[test]
    fn departements_cannot_be_reordered() {
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Departements);
        let events = editor.toggle_reorder_mode();
        assert!(has_error(&events));
        assert!(!editor.is_reordering());
    }

    #[test]
    fn commit_without_changes_just_leaves_reorder_mode() {
        let mut backend = FakeBackend::with_regions(&["A", "B"]);
        let mut editor = ReferenceListEditor::new(ReferenceListKind::Regions);
        editor.load(&mut backend);
        editor.toggle_reorder_mode();

        let events = editor.commit_reorder(&mut backend);
        assert_eq!(events, vec![EditorEvent::ReorderModeChanged(false)]);
        assert!(backend.replaced.is_empty());
    }
}
