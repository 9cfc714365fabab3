// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Server specs: a phase map plus per-phase metadata, composable through
//! `extends` chains.

use convoy_core::{Phase, PhaseMap, PhaseMeta, PhaseName, PlanFn};

use crate::merge::merge_server_specs;

/// Mapping from phase name to plan function plus per-phase metadata.
#[derive(Debug, Clone, Default)]
pub struct ServerSpec {
    pub phases: PhaseMap,
    /// Phases run when the caller names none. Canonical specs always carry
    /// at least `[configure]`; an empty list only appears mid-merge and
    /// means "unspecified".
    pub default_phases: Vec<PhaseName>,
}

impl ServerSpec {
    pub fn builder() -> ServerSpecBuilder {
        ServerSpecBuilder::default()
    }
}

#[derive(Default)]
pub struct ServerSpecBuilder {
    phases: PhaseMap,
    phase_metas: Vec<(PhaseName, PhaseMeta)>,
    default_phases: Vec<PhaseName>,
    extends: Vec<ServerSpec>,
}

impl ServerSpecBuilder {
    /// Bind a plan function to a phase name.
    pub fn phase(mut self, name: impl Into<PhaseName>, plan: PlanFn) -> Self {
        self.phases.insert(name.into(), Phase::new(plan));
        self
    }

    /// Bind a plan function with explicit metadata.
    pub fn phase_with_meta(
        mut self,
        name: impl Into<PhaseName>,
        plan: PlanFn,
        meta: PhaseMeta,
    ) -> Self {
        self.phases.insert(name.into(), Phase::with_meta(plan, meta));
        self
    }

    /// Attach metadata to a phase declared here or inherited via `extends`.
    pub fn phase_meta(mut self, name: impl Into<PhaseName>, meta: PhaseMeta) -> Self {
        self.phase_metas.push((name.into(), meta));
        self
    }

    pub fn default_phases<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<PhaseName>,
    {
        self.default_phases = names.into_iter().map(Into::into).collect();
        self
    }

    /// Parent specs, merged left-to-right before this spec's own
    /// declarations.
    pub fn extends(mut self, parents: impl IntoIterator<Item = ServerSpec>) -> Self {
        self.extends.extend(parents);
        self
    }

    /// Flatten the extends chain, overlay own declarations, attach caller
    /// metadata, and fill `default_phases` with `[configure]` when nothing
    /// in the chain specified one.
    pub fn build(self) -> ServerSpec {
        let mut effective = ServerSpec::default();
        for parent in &self.extends {
            effective = merge_server_specs(&effective, parent);
        }
        let own = ServerSpec { phases: self.phases, default_phases: self.default_phases };
        let mut spec = merge_server_specs(&effective, &own);

        for (name, meta) in &self.phase_metas {
            if !spec.phases.merge_meta(name, meta) {
                tracing::warn!(phase = %name, "phase metadata attached to unknown phase, ignored");
            }
        }

        if spec.default_phases.is_empty() {
            spec.default_phases = vec![PhaseName::configure()];
        }
        spec
    }
}

#[cfg(test)]
#[path = "server_spec_tests.rs"]
mod tests;
