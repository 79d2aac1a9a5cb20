// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Move-to-trash command

use crate::config::ElementsConfig;
use ifc_lite_model::{ElementId, GroupId, GroupStore, ObjectStore, Result, TransactionService};

/// Transaction label of the trash command
pub const TRASH_TRANSACTION: &str = "Move to Trash";

/// Outcome of a trash command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrashReport {
    /// Group the elements went into; `None` when nothing was moved
    pub group: Option<GroupId>,
    pub moved: usize,
}

/// Move elements into the trash group and hide them
///
/// The group named by `config.trash_group` is reused when it exists,
/// otherwise created (the host may pick another name if an element already
/// uses this one). Everything happens in one transaction; elements the host
/// no longer knows are skipped and an empty selection does nothing.
pub fn move_to_trash<H>(
    host: &mut H,
    selection: &[ElementId],
    config: &ElementsConfig,
) -> Result<TrashReport>
where
    H: ObjectStore + GroupStore + TransactionService + ?Sized,
{
    let group_name = config.trash_group.as_str();
    let ids: Vec<ElementId> = selection.iter().copied().filter(|id| host.exists(*id)).collect();
    if ids.is_empty() {
        return Ok(TrashReport::default());
    }

    host.begin_transaction(TRASH_TRANSACTION)?;
    match trash_all(host, &ids, group_name) {
        Ok(group) => {
            host.commit_transaction()?;
            log::info!("Moved {} element(s) to {}", ids.len(), group);
            Ok(TrashReport {
                group: Some(group),
                moved: ids.len(),
            })
        }
        Err(err) => {
            log::warn!("Move to trash failed, rolling back: {}", err);
            if let Err(abort_err) = host.abort_transaction() {
                log::warn!("Rollback of '{}' failed: {}", TRASH_TRANSACTION, abort_err);
            }
            Err(err)
        }
    }
}

fn trash_all<H>(host: &mut H, ids: &[ElementId], group_name: &str) -> Result<GroupId>
where
    H: ObjectStore + GroupStore + TransactionService + ?Sized,
{
    let group = match host.find_group(group_name) {
        Some(group) => group,
        None => host.create_group(group_name)?,
    };
    for id in ids {
        host.add_to_group(group, *id)?;
        host.set_visible(*id, false)?;
    }
    Ok(group)
}
