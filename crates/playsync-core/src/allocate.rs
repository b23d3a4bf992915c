//! Folder allocation.
//!
//! Two allocators share the [`FolderIndex`]: the capacity-bounded
//! [`allocate_tracks`] used by sync/append, which fills folders in numeric
//! order, and the randomized [`plan_reshuffle`] used by the reshuffle pass,
//! which redistributes existing files at one logical slot per occupied
//! position. Both only plan; the orchestrator performs the mutations so a
//! dry run can share the exact same code path.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::PathBuf;

use rand::Rng;
use tracing::debug;

use crate::error::{Result, SyncError};
use crate::folders::FolderIndex;
use crate::fs::FileSystem;
use crate::naming::NamedTrack;

/// One planned copy of a playlist track onto the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    /// The track being copied.
    pub track: NamedTrack,
    /// Full destination path, folder included.
    pub destination: PathBuf,
}

/// Outcome of allocating pending tracks to folders.
#[derive(Debug, Clone, Default)]
pub struct AllocationPlan {
    /// Planned copies, in allocation order.
    pub copies: Vec<PlannedCopy>,
    /// Numbers of folders that did not exist before, in creation order.
    pub created_folders: Vec<u32>,
}

/// One planned move of an existing destination file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// Current path of the file.
    pub from: PathBuf,
    /// Planned path after the move.
    pub to: PathBuf,
}

/// Assign pending tracks to folders, honoring the per-folder capacity.
///
/// Folder numbers are tried from 1 upward: unknown numbers are registered as
/// new folders with full remaining capacity, full folders are skipped, and
/// each accepting folder takes items off the front of the queue until its
/// capacity is reached. With capacity 0 the whole queue maps onto the
/// destination root and no folder is ever created. Terminates because the
/// queue strictly shrinks on every accepting folder.
///
/// Occupancy counts in the index are updated as items are placed.
#[must_use]
pub fn allocate_tracks(
    index: &mut FolderIndex,
    pending: Vec<NamedTrack>,
    capacity: usize,
) -> AllocationPlan {
    let mut queue: VecDeque<NamedTrack> = pending.into();
    let mut plan = AllocationPlan::default();

    if capacity == 0 {
        let root = index.folder_path(1);
        while let Some(track) = queue.pop_front() {
            let destination = root.join(&track.name);
            index.record_addition(1);
            plan.copies.push(PlannedCopy { track, destination });
        }
        return plan;
    }

    let mut number: u32 = 0;
    while !queue.is_empty() {
        number += 1;

        let remainder = if index.contains_folder(number) {
            let occupancy = index.occupancy(number);
            if occupancy >= capacity {
                continue; // Folder is full, try the next one.
            }
            capacity - occupancy
        } else {
            index.add_folder(number);
            plan.created_folders.push(number);
            capacity
        };

        let folder_path = index.folder_path(number);
        for _ in 0..remainder {
            let Some(track) = queue.pop_front() else {
                break;
            };
            let destination = folder_path.join(&track.name);
            index.record_addition(number);
            plan.copies.push(PlannedCopy { track, destination });
        }
    }

    debug!(
        "Allocated {} tracks, created {} folders",
        plan.copies.len(),
        plan.created_folders.len()
    );
    plan
}

/// Plan a randomized redistribution of all existing destination files.
///
/// Every folder contributes as many slots as it currently holds files. For
/// each file, a folder is picked uniformly at random from the known folder
/// set; picks landing on a folder without free slots are rejected and
/// retried, and once every known folder has been rejected for one file the
/// reshuffle fails — no valid placement exists. The unweighted
/// pick-and-reject selection is deliberate; folders close to exhaustion get
/// rejected more often as the pass progresses, and that bias is part of the
/// observable behavior.
///
/// All moves are planned before any is executed, so a failure plans zero
/// moves.
///
/// # Errors
///
/// Fails with [`SyncError::FoldersFull`] when a file has no placement left
/// and with [`SyncError::NameCollision`] when a planned target path already
/// exists on disk and is not the file's current path (destination basenames
/// are not unique, which reshuffling cannot survive).
pub fn plan_reshuffle<R: Rng + ?Sized>(
    index: &FolderIndex,
    fs: &dyn FileSystem,
    rng: &mut R,
) -> Result<Vec<PlannedMove>> {
    let numbers: Vec<u32> = index.folders().map(|(n, _)| n).collect();
    let mut slots: BTreeMap<u32, usize> = index.folders().collect();
    let mut moves = Vec::with_capacity(index.file_count());

    for file in index.files() {
        if numbers.is_empty() {
            return Err(SyncError::FoldersFull {
                file: file.name.clone(),
            }
            .into());
        }

        let mut exhausted: HashSet<u32> = HashSet::new();
        loop {
            let number = numbers[rng.gen_range(0..numbers.len())];
            let free = slots.get(&number).copied().unwrap_or(0);
            if free == 0 {
                exhausted.insert(number);
                if exhausted.len() == numbers.len() {
                    return Err(SyncError::FoldersFull {
                        file: file.name.clone(),
                    }
                    .into());
                }
                continue;
            }

            slots.insert(number, free - 1);
            let to = index.folder_path(number).join(&file.name);
            if fs.exists(&to) && to != file.path {
                return Err(SyncError::NameCollision { path: to }.into());
            }
            moves.push(PlannedMove {
                from: file.path.clone(),
                to,
            });
            break;
        }
    }

    debug!("Planned {} reshuffle moves", moves.len());
    Ok(moves)
}
