use super::{RowUpdate, Sheet, SheetId, SheetSnapshot, SheetSummary, Workspace, WorkspaceSummary};
use crate::error::{Error, Result};

/// Remote sheet service. Authentication and transport belong to the implementor.
pub trait SheetService {
    fn list_sheets(&self) -> Result<Vec<SheetSummary>>;

    fn list_workspaces(&self) -> Result<Vec<WorkspaceSummary>>;

    fn get_workspace(&self, workspace_id: i64) -> Result<Workspace>;

    /// Full snapshot: columns, rows and cells.
    fn get_sheet(&self, sheet_id: SheetId) -> Result<Sheet>;

    fn update_rows(&self, sheet_id: SheetId, rows: &[RowUpdate]) -> Result<()>;
}

/// Where to look for a sheet by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetScope {
    /// Sheets listed directly for the caller.
    #[default]
    Direct,
    /// Sheets nested inside the caller's workspaces.
    Workspace,
}

pub fn find_sheet_id<S: SheetService + ?Sized>(service: &S, name: &str) -> Result<SheetId> {
    service
        .list_sheets()?
        .into_iter()
        .find(|s| s.name == name)
        .map(|s| s.id)
        .ok_or_else(|| Error::SheetNotFound {
            name: name.to_string(),
        })
}

pub fn find_workspace_sheet_id<S: SheetService + ?Sized>(service: &S, name: &str) -> Result<SheetId> {
    for ws in service.list_workspaces()? {
        let workspace = service.get_workspace(ws.id)?;
        if let Some(sheet) = workspace.sheets.into_iter().find(|s| s.name == name) {
            tracing::debug!(workspace = %workspace.name, sheet_id = sheet.id, "sheet found in workspace");
            return Ok(sheet.id);
        }
    }
    Err(Error::SheetNotFound {
        name: name.to_string(),
    })
}

/// A named sheet fetched once, plus the service handle for writes.
pub struct SheetClient<S> {
    service: S,
    sheet_id: SheetId,
    snapshot: SheetSnapshot,
}

impl<S: SheetService> SheetClient<S> {
    pub fn open(service: S, sheet_name: &str, scope: SheetScope) -> Result<Self> {
        let sheet_id = match scope {
            SheetScope::Direct => find_sheet_id(&service, sheet_name)?,
            SheetScope::Workspace => find_workspace_sheet_id(&service, sheet_name)?,
        };
        let snapshot = SheetSnapshot::new(service.get_sheet(sheet_id)?)?;
        tracing::info!(
            sheet = sheet_name,
            sheet_id,
            rows = snapshot.row_count(),
            columns = snapshot.sheet().columns.len(),
            "sheet loaded"
        );
        Ok(Self {
            service,
            sheet_id,
            snapshot,
        })
    }

    pub fn sheet_id(&self) -> SheetId {
        self.sheet_id
    }

    pub fn snapshot(&self) -> &SheetSnapshot {
        &self.snapshot
    }

    /// Push row edits. The local snapshot is not refreshed.
    pub fn update_rows(&self, rows: &[RowUpdate]) -> Result<()> {
        tracing::debug!(sheet_id = self.sheet_id, rows = rows.len(), "updating rows");
        self.service.update_rows(self.sheet_id, rows)
    }
}
