//! Per-round pair scan.
//!
//! The scan turns a frontier into the ordered list of pairs that have a known
//! child in the catalog. With more than one worker the frontier rows are
//! striped across scoped threads; each worker sends one message per row over
//! a bounded channel and the caller reassembles rows in index order, so the
//! result is identical to the inline scan.

use std::collections::HashSet;
use std::thread;

use crossbeam_channel::bounded;

use crate::catalog::{CombinationTable, EntityCatalog};
use crate::entity::{Entity, EntityKey};
use crate::error::{BreedError, BreedResult};

/// A frontier pair `(left, right)` with `left < right` and its child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Proposal {
    pub left: usize,
    pub right: usize,
    pub child: EntityKey,
}

/// Read-only inputs shared by every scan worker.
#[derive(Clone, Copy)]
pub(crate) struct ScanInput<'a> {
    pub frontier: &'a [Entity],
    pub reachable: &'a HashSet<EntityKey>,
    pub table: &'a CombinationTable,
    pub catalog: &'a EntityCatalog,
}

impl ScanInput<'_> {
    fn scan_row(&self, left: usize) -> Vec<Proposal> {
        let p1 = &self.frontier[left];
        if !self.reachable.contains(&p1.key) {
            return Vec::new();
        }
        let mut found = Vec::new();
        for (right, p2) in self.frontier.iter().enumerate().skip(left + 1) {
            if !self.reachable.contains(&p2.key) {
                continue;
            }
            let Some(child) = self.table.lookup(&p1.key, &p2.key) else {
                continue;
            };
            if !self.catalog.contains(child) {
                continue;
            }
            found.push(Proposal {
                left,
                right,
                child: child.clone(),
            });
        }
        found
    }
}

/// Scans every unordered frontier pair and returns proposals in pair order.
pub(crate) fn propose(input: ScanInput<'_>, workers: usize) -> BreedResult<Vec<Proposal>> {
    let rows = input.frontier.len();
    let workers = workers.clamp(1, rows.max(1));
    if workers == 1 {
        return Ok((0..rows).flat_map(|row| input.scan_row(row)).collect());
    }

    let (tx, rx) = bounded::<(usize, Vec<Proposal>)>(workers * 2);

    let by_row = thread::scope(|scope| -> BreedResult<Vec<Option<Vec<Proposal>>>> {
        // Owned here so an early return disconnects any worker blocked on send.
        let rx = rx;
        for worker in 0..workers {
            let tx = tx.clone();
            thread::Builder::new()
                .name(format!("breedpath-scan-{worker}"))
                .spawn_scoped(scope, move || {
                    for row in (worker..rows).step_by(workers) {
                        if tx.send((row, input.scan_row(row))).is_err() {
                            break;
                        }
                    }
                })
                .map_err(|e| BreedError::internal(format!("failed to spawn scan worker: {e}")))?;
        }
        // Workers hold the remaining senders; the loop ends when they finish.
        drop(tx);
        let mut by_row = vec![None; rows];
        for (row, found) in rx.iter() {
            by_row[row] = Some(found);
        }
        Ok(by_row)
    })?;

    let mut proposals = Vec::new();
    for (row, found) in by_row.into_iter().enumerate() {
        let found = found
            .ok_or_else(|| BreedError::internal(format!("scan row {row} was never reported")))?;
        proposals.extend(found);
    }
    Ok(proposals)
}
