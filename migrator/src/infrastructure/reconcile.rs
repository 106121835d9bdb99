// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The controller loop: wires [`kube::runtime::Controller`] to the phase
//! catalogue and state machine. One reconcile either advances the current
//! phase by one step, records an approval wait, or advances the rollback
//! sweep by one phase — it never matches on [`PhaseName`] itself, only on
//! what the state machine and catalogue report.

use futures::StreamExt;
use kube::api::Api;
use kube::runtime::controller::{Action, Controller};
use kube::runtime::watcher;
use kube::{Client, ResourceExt};
use migrator_domain::aggregates::MigrationAggregate;
use migrator_domain::entities::MigrationSpec;
use migrator_domain::error::MigrationError;
use migrator_domain::repositories::MigrationRepository;
use migrator_domain::services::{initiate_rollback, record_phase_completion, record_waiting_for_approval, rollback_sweep_order, should_execute_phase, should_requeue, ExecutionDecision};
use migrator_domain::value_objects::{MigrationPhaseField, MigrationState, PhaseName, PhaseStatus};
use migrator_domain::PhaseContext;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::application::phase_catalogue::PhaseCatalogue;
use crate::application::phases::cvo_prior_replicas;
use crate::application::well_known::{CVO_DEPLOYMENT, CVO_NAMESPACE};
use crate::infrastructure::crd::VSphereMigration;

const APPROVAL_REQUEUE: Duration = Duration::from_secs(30);
const ERROR_REQUEUE: Duration = Duration::from_secs(15);
const IDLE_REQUEUE: Duration = Duration::from_secs(60);

pub struct ReconcilerContext {
    pub catalogue: Arc<PhaseCatalogue>,
    pub phase_ctx: PhaseContext,
    pub repository: Arc<dyn MigrationRepository>,
    pub namespace: String,
}

pub async fn run(client: Client, ctx: Arc<ReconcilerContext>) {
    let api: Api<VSphereMigration> = Api::namespaced(client, &ctx.namespace);
    Controller::new(api, watcher::Config::default())
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok((object_ref, _)) => info!(migration = %object_ref.name, "reconciled"),
                Err(err) => warn!(error = %err, "reconcile failed"),
            }
        })
        .await;
}

async fn reconcile(obj: Arc<VSphereMigration>, ctx: Arc<ReconcilerContext>) -> Result<Action, MigrationError> {
    let name = obj.name_any();
    let spec = &obj.spec.inner;
    let now = ctx.phase_ctx.clock.now();

    if matches!(spec.state, MigrationState::Pending) {
        return Ok(Action::requeue(IDLE_REQUEUE));
    }
    spec.validate()?;

    let status = ctx.repository.get_status(&name).await?.unwrap_or_default();
    let mut aggregate = MigrationAggregate::new(status);
    aggregate.initialize(now);

    if matches!(spec.state, MigrationState::Rollback) {
        return advance_rollback_sweep(&name, spec, &mut aggregate, &ctx, now).await;
    }

    if matches!(aggregate.status().phase, MigrationPhaseField::Completed | MigrationPhaseField::Failed | MigrationPhaseField::RollbackCompleted) {
        return Ok(Action::requeue(IDLE_REQUEUE));
    }

    let phase = match aggregate.status().phase {
        MigrationPhaseField::InPhase(p) => p,
        MigrationPhaseField::RollingBack => return advance_rollback_sweep(&name, spec, &mut aggregate, &ctx, now).await,
        MigrationPhaseField::NotStarted | MigrationPhaseField::Completed | MigrationPhaseField::Failed | MigrationPhaseField::RollbackCompleted => {
            return Ok(Action::requeue(IDLE_REQUEUE));
        }
    };

    match should_execute_phase(&aggregate, spec.state, spec.approval_mode) {
        ExecutionDecision::Paused => Ok(Action::requeue(IDLE_REQUEUE)),
        ExecutionDecision::WaitingForApproval => {
            record_waiting_for_approval(&mut aggregate, phase, now);
            ctx.repository.commit(&name, &mut aggregate).await?;
            Ok(Action::requeue(APPROVAL_REQUEUE))
        }
        ExecutionDecision::Execute => execute_current_phase(&name, phase, spec, &mut aggregate, &ctx, now).await,
    }
}

async fn execute_current_phase(
    name: &str,
    phase: PhaseName,
    spec: &MigrationSpec,
    aggregate: &mut MigrationAggregate,
    ctx: &ReconcilerContext,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Action, MigrationError> {
    let phase_impl = ctx.catalogue.get(phase);
    phase_impl.validate(spec, aggregate.status())?;

    let is_fresh = !aggregate.status().current_phase_state.as_ref().map(|c| c.name == phase).unwrap_or(false);
    aggregate.begin_phase(phase, now);
    if is_fresh {
        aggregate.set_requires_approval(phase_impl.requires_approval());
    }

    let mut status = aggregate.status().clone();
    let result = phase_impl.execute(&ctx.phase_ctx, spec, &mut status).await;
    *aggregate = MigrationAggregate::new(status);

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) if err.is_transient() => {
            warn!(phase = %phase, error = %err, "transient phase error, requeueing");
            ctx.repository.commit(name, aggregate).await?;
            return Ok(Action::requeue(ERROR_REQUEUE));
        }
        Err(err) => {
            record_phase_completion(aggregate, phase, PhaseStatus::Failed, err.to_string(), Vec::new(), now);
            aggregate.mark_failed();
            ctx.repository.commit(name, aggregate).await?;
            if spec.rollback_on_failure && !err.is_safety_gated() {
                return advance_rollback_sweep(name, spec, aggregate, ctx, now).await;
            }
            return Ok(Action::requeue(ERROR_REQUEUE));
        }
    };

    record_phase_completion(aggregate, phase, outcome.status, outcome.message.clone(), outcome.logs.clone(), now);

    if outcome.status.is_done() {
        aggregate.advance_to_next_phase(phase);
        if phase.is_last() {
            aggregate.complete_migration(now);
        }
    }

    aggregate.validate()?;
    ctx.repository.commit(name, aggregate).await?;

    if should_requeue(outcome.status) {
        Ok(Action::requeue(outcome.requeue_after.unwrap_or(ERROR_REQUEUE)))
    } else {
        Ok(Action::requeue(IDLE_REQUEUE))
    }
}

/// Runs the full rollback sweep in one reconcile: `rollback_sweep_order`
/// already hands back the complete reverse-order phase list (only the
/// phases that actually completed), and unlike forward execution (where
/// each phase can itself be long-running and needs its own resumable
/// steps) rollback's per-phase work is a bounded unwind of whatever that
/// phase backed up. Individual rollback errors are logged and swallowed so
/// one stuck phase can't block the rest of the unwind — which is exactly
/// why the sweep ends with an unconditional CVO rescale rather than
/// trusting `DisableCvoPhase::rollback` to have run cleanly.
async fn advance_rollback_sweep(name: &str, spec: &MigrationSpec, aggregate: &mut MigrationAggregate, ctx: &ReconcilerContext, now: chrono::DateTime<chrono::Utc>) -> Result<Action, MigrationError> {
    if !matches!(aggregate.status().phase, MigrationPhaseField::RollingBack) {
        initiate_rollback(aggregate, now);
        let order = rollback_sweep_order(&aggregate.status().phase_history);

        for &phase in &order {
            let phase_impl = ctx.catalogue.get(phase);
            let mut status = aggregate.status().clone();
            if let Err(err) = phase_impl.rollback(&ctx.phase_ctx, spec, &mut status).await {
                warn!(phase = %phase, error = %err, "rollback step failed, continuing sweep");
            }
            *aggregate = MigrationAggregate::new(status);
            record_phase_completion(aggregate, phase, PhaseStatus::Completed, format!("rolled back {phase}"), Vec::new(), now);
        }

        let prior_replicas = cvo_prior_replicas(aggregate.status());
        if let Err(err) = ctx.phase_ctx.cluster.scale_deployment(CVO_DEPLOYMENT, CVO_NAMESPACE, prior_replicas).await {
            warn!(error = %err, "final CVO rescale after rollback failed");
        }

        aggregate.complete_rollback(order, now);
    }

    ctx.repository.commit(name, aggregate).await?;
    Ok(Action::requeue(IDLE_REQUEUE))
}

fn error_policy(_obj: Arc<VSphereMigration>, err: &MigrationError, _ctx: Arc<ReconcilerContext>) -> Action {
    warn!(error = %err, "reconcile error");
    Action::requeue(ERROR_REQUEUE)
}
