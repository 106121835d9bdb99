// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Composition root for the `vsphere-migrator` binary: parses CLI/config,
//! builds a `kube::Client`, preloads target vCenter credentials, wires the
//! gateways into a `PhaseContext`, and runs leader election, the metrics
//! endpoint, and the reconciler side by side until a shutdown signal lands.

use k8s_openapi::api::core::v1::Secret;
use kube::api::{Api, ListParams};
use kube::Client;
use migrator::infrastructure::{KubeClusterGateway, KubeMigrationRepository, MetricsEndpoint, MetricsService, OperatorConfig, ReconcilerContext, RestVsphereGateway, SharedVsphereGatewayFactory, VSphereMigration};
use migrator::PhaseContext;
use migrator::application::phase_catalogue::PhaseCatalogue;
use migrator_bootstrap::leader_election::{self, LeaderElectionConfig};
use migrator_bootstrap::logger::{BootstrapLogger, ConsoleLogger};
use migrator_bootstrap::shutdown::ShutdownCoordinator;
use migrator_bootstrap::{exit_code, signals};
use migrator_domain::repositories::SystemClock;
use migrator_domain::value_objects::TargetCredentialsRef;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn main() -> std::process::ExitCode {
    let runtime = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    exit_code::result_to_exit_code(runtime.block_on(run()))
}

async fn run() -> anyhow::Result<()> {
    let logger = ConsoleLogger::with_prefix("bootstrap");
    let cli = migrator_bootstrap::bootstrap_cli()?;

    let mut config = OperatorConfig::load()?;
    config.leader_election_lease_name = cli.lease_name.clone();
    config.log_format = cli.log_format.clone();
    migrator::infrastructure::logging::init(&config);

    logger.info("starting vsphere-migrator");

    let client = match &cli.kubeconfig {
        Some(path) => {
            let kubeconfig = kube::config::Kubeconfig::read_from(path)?;
            let options = kube::config::KubeConfigOptions::default();
            let client_config = kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?;
            Client::try_from(client_config)?
        }
        None => Client::try_default().await?,
    };

    let credentials = load_vsphere_credentials(client.clone(), &config.namespace).await?;
    logger.info(&format!("preloaded vSphere credentials for {} target vCenter(s)", credentials.len()));

    let vsphere_gateway = Arc::new(RestVsphereGateway::new(credentials)?);
    let phase_ctx = PhaseContext::new(
        Arc::new(KubeClusterGateway::new(client.clone())),
        Arc::new(SharedVsphereGatewayFactory::new(vsphere_gateway)),
        Arc::new(SystemClock),
    );

    let repository = Arc::new(KubeMigrationRepository::new(client.clone(), &config.namespace));
    let reconciler_ctx = Arc::new(ReconcilerContext {
        catalogue: Arc::new(PhaseCatalogue::new()),
        phase_ctx,
        repository,
        namespace: config.namespace.clone(),
    });

    let shutdown = ShutdownCoordinator::new(Duration::from_secs(cli.shutdown_grace_secs));
    signals::install(shutdown.clone());

    let metrics = Arc::new(MetricsService::new()?);
    let metrics_port: u16 = cli.metrics_addr.rsplit(':').next().and_then(|p| p.parse().ok()).unwrap_or(config.metrics_port);
    let metrics_endpoint = MetricsEndpoint::new(metrics, metrics_port);
    tokio::spawn(async move {
        if let Err(err) = metrics_endpoint.start().await {
            tracing::error!(error = %err, "metrics endpoint stopped");
        }
    });

    if cli.leader_elect {
        let holder_identity = std::env::var("HOSTNAME").unwrap_or_else(|_| "vsphere-migrator".to_string());
        let lease_cfg = LeaderElectionConfig::new(config.leader_election_lease_name.clone(), cli.lease_namespace.clone(), holder_identity);
        let election_client = client.clone();
        let election_shutdown = shutdown.clone();
        tokio::spawn(leader_election::run(election_client, lease_cfg, election_shutdown));
    }

    tokio::select! {
        _ = migrator::infrastructure::reconcile::run(client, reconciler_ctx) => {
            logger.warn("reconciler loop exited");
        }
        _ = shutdown.token().cancelled() => {
            logger.info("shutdown signal received, stopping reconciler");
        }
    }

    shutdown.complete_shutdown();
    Ok(())
}

/// Reads every `VSphereMigration` in `namespace` and resolves its
/// `targetCredentialsRef` secret so the vCenter REST client can establish a
/// session for each target server before the controller starts reconciling.
/// Migrations created after startup pick up their credentials the next time
/// the operator restarts — acceptable since `targetCredentialsRef` is
/// treated as immutable once a migration begins (see DESIGN.md).
async fn load_vsphere_credentials(client: Client, namespace: &str) -> anyhow::Result<HashMap<String, migrator::infrastructure::vsphere::VsphereCredentials>> {
    let migrations: Api<VSphereMigration> = Api::namespaced(client.clone(), namespace);

    let mut credentials = HashMap::new();
    for migration in migrations.list(&ListParams::default()).await?.items {
        let spec = &migration.spec.inner;
        let secrets: Api<Secret> = Api::namespaced(client.clone(), &spec.target_credentials_ref.secret_namespace);
        let secret = match secrets.get_opt(&spec.target_credentials_ref.secret_name).await? {
            Some(secret) => secret,
            None => continue,
        };
        let data = secret.data.unwrap_or_default();

        for server in spec.unique_target_servers() {
            let username_key = TargetCredentialsRef::username_key(&server);
            let password_key = TargetCredentialsRef::password_key(&server);
            let (Some(username), Some(password)) = (data.get(&username_key), data.get(&password_key)) else {
                continue;
            };
            credentials.insert(
                server,
                migrator::infrastructure::vsphere::VsphereCredentials {
                    username: String::from_utf8_lossy(&username.0).into_owned(),
                    password: String::from_utf8_lossy(&password.0).into_owned(),
                },
            );
        }
    }

    Ok(credentials)
}
