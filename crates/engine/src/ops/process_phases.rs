// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase-list preprocessing.
//!
//! Callers may hand over phase names or raw plan functions. Inline
//! functions get a synthesized name and a registration in a local phase
//! map, so the executor only ever deals in names.

use convoy_core::{Phase, PhaseMap, PhaseName};

use super::options::PhaseRef;

/// Split keyword references from inline plan functions.
///
/// Returns the ordered name list plus the map of synthesized phases to
/// merge into every target's phase map.
pub fn process_phases(phases: &[PhaseRef]) -> (Vec<PhaseName>, PhaseMap) {
    let mut names = Vec::with_capacity(phases.len());
    let mut inline = PhaseMap::new();
    for phase in phases {
        match phase {
            PhaseRef::Named(name) => names.push(name.clone()),
            PhaseRef::Inline(plan) => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                let name = PhaseName::new(format!("phase-{}", &id[..8]));
                inline.insert(name.clone(), Phase::new(plan.clone()));
                names.push(name);
            }
        }
    }
    (names, inline)
}

#[cfg(test)]
#[path = "process_phases_tests.rs"]
mod tests;
