// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classification session
//!
//! A session owns the pending state of one open editor: the snapshot, the
//! quantities table, the grouping mode and the selection. Callers drive it
//! with [`Intent`]s; the host is only written when the session is accepted.
//!
//! ```text
//! Collecting -> Viewing <-> Editing
//!                  |           |
//!                  +-----+-----+
//!                        v
//!          Reconciling -> Closed   (Cancel also closes)
//! ```

use crate::config::ElementsConfig;
use crate::edit::{
    apply_cell_edit, apply_global_edit, summarize, CellEdit, EditOutcome, GlobalEdit,
    IgnoreReason, SelectionSummary,
};
use crate::error::{Result, SessionError};
use crate::lock::SessionGuard;
use crate::quantities::{compute_quantities, QuantityTable};
use crate::reconcile::{commit, reconcile, CommitReport, WriteSet};
use crate::snapshot::{collect, Snapshot};
use crate::view::{GroupMode, ViewBuilder, ViewTree};
use ifc_lite_model::{
    ElementId, MaterialId, MaterialRegistry, ObjectStore, QuantityKind, RoleCatalog,
    TransactionService,
};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Reading the host
    Collecting,
    /// Tree shown, no cell editor open
    Viewing,
    /// Per-cell editor open on the selection
    Editing,
    /// Writing accepted changes
    Reconciling,
    /// Accepted or cancelled
    Closed,
}

/// User action forwarded by the presentation layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    SetMode(GroupMode),
    SetVisibleOnly(bool),
    /// Replace the tree selection
    Select(Vec<ElementId>),
    /// Open the per-cell editor on the selection
    BeginEdit,
    EditCell(CellEdit),
    EndEdit,
    /// Global role combo box
    GlobalRole(String),
    /// Global material combo box
    GlobalMaterial(MaterialId),
    /// Edit a dimension in the quantities table
    SetQuantity {
        element: ElementId,
        kind: QuantityKind,
        value: f64,
    },
    /// Toggle a quantity column for some rows of the quantities table
    SetExport {
        elements: Vec<ElementId>,
        kind: QuantityKind,
        export: bool,
    },
    Accept,
    Cancel,
}

impl Intent {
    /// Short name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Intent::SetMode(_) => "change grouping mode",
            Intent::SetVisibleOnly(_) => "change visibility filter",
            Intent::Select(_) => "select",
            Intent::BeginEdit => "begin cell edit",
            Intent::EditCell(_) => "edit cell",
            Intent::EndEdit => "end cell edit",
            Intent::GlobalRole(_) => "set role",
            Intent::GlobalMaterial(_) => "set material",
            Intent::SetQuantity { .. } => "set quantity",
            Intent::SetExport { .. } => "set export flag",
            Intent::Accept => "accept",
            Intent::Cancel => "cancel",
        }
    }
}

/// Result of a dispatched intent
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// The tree was rebuilt; read it with [`Session::view`]
    ViewUpdated,
    /// Selection changed or the cell editor opened
    Selection(SelectionSummary),
    /// A role, material or label edit was attempted
    Edit(EditOutcome),
    /// Quantities table cells changed
    Quantity { changed: usize },
    /// Pending state was written to the host
    Committed(CommitReport),
    Cancelled,
}

/// One open classification editor
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    config: ElementsConfig,
    roles: RoleCatalog,
    mode: GroupMode,
    visible_only: bool,
    /// Every classifiable element, hidden ones included
    pending: Snapshot,
    quantities: QuantityTable,
    selection: Vec<ElementId>,
    view: ViewTree,
    guard: Option<SessionGuard>,
}

impl Session {
    /// Open a session on a host document
    ///
    /// The guard comes from [`SessionLocks::acquire`](crate::SessionLocks::acquire)
    /// and is released when the session closes or is dropped.
    pub fn open<H: ObjectStore + MaterialRegistry + ?Sized>(
        host: &H,
        roles: RoleCatalog,
        config: ElementsConfig,
        guard: SessionGuard,
    ) -> Result<Self> {
        config.validate()?;

        let mut session = Self {
            state: SessionState::Collecting,
            mode: config.default_mode,
            visible_only: config.visible_only,
            config,
            roles,
            pending: collect(host, false),
            quantities: QuantityTable::default(),
            selection: Vec::new(),
            view: ViewTree::default(),
            guard: Some(guard),
        };
        session.quantities = compute_quantities(&session.shown(host), host);
        session.rebuild(host);
        session.state = SessionState::Viewing;

        log::info!(
            "Opened classification session on '{}': {} element(s), {} quantity row(s)",
            session.guard.as_ref().map(|g| g.document()).unwrap_or_default(),
            session.pending.len(),
            session.quantities.len()
        );
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    pub fn visible_only(&self) -> bool {
        self.visible_only
    }

    pub fn view(&self) -> &ViewTree {
        &self.view
    }

    pub fn pending(&self) -> &Snapshot {
        &self.pending
    }

    pub fn quantities(&self) -> &QuantityTable {
        &self.quantities
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn roles(&self) -> &RoleCatalog {
        &self.roles
    }

    pub fn config(&self) -> &ElementsConfig {
        &self.config
    }

    /// Summary of the current selection
    pub fn summary(&self) -> SelectionSummary {
        summarize(&self.pending, &self.selection, self.config.single_edit_limit)
    }

    /// Writes an accept would perform right now
    pub fn preview<H: ObjectStore + MaterialRegistry + ?Sized>(&self, host: &H) -> WriteSet {
        reconcile(&self.pending, &self.quantities, host, &self.roles)
    }

    /// Handle one intent
    ///
    /// Intents the current state does not accept fail with
    /// [`SessionError::InvalidTransition`] and change nothing.
    pub fn dispatch<H>(&mut self, host: &mut H, intent: Intent) -> Result<Response>
    where
        H: ObjectStore + MaterialRegistry + TransactionService + ?Sized,
    {
        use SessionState::{Editing, Viewing};

        match (self.state, intent) {
            (SessionState::Closed, _) => Err(SessionError::Closed),

            (Viewing, Intent::SetMode(mode)) => {
                self.mode = mode;
                self.rebuild(&*host);
                Ok(Response::ViewUpdated)
            }
            (Viewing, Intent::SetVisibleOnly(visible_only)) => {
                self.visible_only = visible_only;
                self.rebuild(&*host);
                Ok(Response::ViewUpdated)
            }

            (Viewing, Intent::Select(ids)) => {
                self.selection = ids;
                Ok(Response::Selection(self.summary()))
            }
            (Editing, Intent::Select(ids)) => {
                // Moving the selection closes the cell editor
                self.selection = ids;
                self.state = Viewing;
                Ok(Response::Selection(self.summary()))
            }

            (Viewing, Intent::BeginEdit) => {
                let summary = self.summary();
                if summary.count == 0 {
                    return Ok(Response::Edit(EditOutcome::Ignored(
                        IgnoreReason::EmptySelection,
                    )));
                }
                if !summary.single_edit_enabled {
                    return Ok(Response::Edit(EditOutcome::Ignored(
                        IgnoreReason::SelectionTooLarge,
                    )));
                }
                self.state = Editing;
                Ok(Response::Selection(summary))
            }
            (Editing, Intent::EditCell(edit)) => {
                let outcome = apply_cell_edit(
                    &mut self.pending,
                    &self.selection,
                    &edit,
                    &self.roles,
                    &*host,
                    self.config.single_edit_limit,
                );
                self.after_edit(&*host, outcome)
            }
            (Editing, Intent::EndEdit) => {
                self.state = Viewing;
                Ok(Response::ViewUpdated)
            }

            (Viewing, Intent::GlobalRole(role)) => {
                let edit = GlobalEdit::Role(role);
                self.global(&*host, &edit)
            }
            (Viewing, Intent::GlobalMaterial(material)) => {
                let edit = GlobalEdit::Material(material);
                self.global(&*host, &edit)
            }

            (Viewing, Intent::SetQuantity { element, kind, value }) => {
                let changed = self.quantities.set_value(element, kind, value);
                Ok(Response::Quantity {
                    changed: changed as usize,
                })
            }
            (Viewing, Intent::SetExport { elements, kind, export }) => {
                let changed = self.quantities.set_export_bulk(&elements, kind, export);
                Ok(Response::Quantity { changed })
            }

            (Viewing | Editing, Intent::Accept) => self.accept(host),
            (Viewing | Editing, Intent::Cancel) => {
                self.close();
                log::info!("Classification session cancelled");
                Ok(Response::Cancelled)
            }

            (state, intent) => Err(SessionError::InvalidTransition {
                state,
                intent: intent.name(),
            }),
        }
    }

    /// Pending states of the elements currently shown
    fn shown<H: ObjectStore + ?Sized>(&self, host: &H) -> Snapshot {
        if self.visible_only {
            self.pending.filtered(|s| host.is_visible(s.id))
        } else {
            self.pending.clone()
        }
    }

    fn rebuild<H: ObjectStore + MaterialRegistry + ?Sized>(&mut self, host: &H) {
        let shown = self.shown(host);
        self.view = ViewBuilder::new(host, &self.roles)
            .with_max_depth(self.config.max_hierarchy_depth)
            .build(&shown, self.mode);
    }

    fn global<H: ObjectStore + MaterialRegistry + ?Sized>(
        &mut self,
        host: &H,
        edit: &GlobalEdit,
    ) -> Result<Response> {
        let outcome = apply_global_edit(&mut self.pending, &self.selection, edit, &self.roles, host);
        self.after_edit(&*host, outcome)
    }

    fn after_edit<H: ObjectStore + MaterialRegistry + ?Sized>(
        &mut self,
        host: &H,
        outcome: EditOutcome,
    ) -> Result<Response> {
        if outcome.changed() > 0 {
            self.rebuild(&*host);
        }
        Ok(Response::Edit(outcome))
    }

    fn accept<H>(&mut self, host: &mut H) -> Result<Response>
    where
        H: ObjectStore + MaterialRegistry + TransactionService + ?Sized,
    {
        let previous = self.state;
        self.state = SessionState::Reconciling;

        let writes = reconcile(&self.pending, &self.quantities, &*host, &self.roles);
        match commit(&writes, host, &self.config.transaction_label) {
            Ok(report) => {
                self.close();
                Ok(Response::Committed(report))
            }
            Err(err) => {
                // Nothing was written; the user may retry or cancel
                self.state = previous;
                Err(SessionError::Store(err))
            }
        }
    }

    fn close(&mut self) {
        self.state = SessionState::Closed;
        self.selection.clear();
        self.guard = None;
    }
}
