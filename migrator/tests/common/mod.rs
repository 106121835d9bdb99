// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! In-memory fakes for [`migrator_domain::repositories`] ports, shared by the
//! integration tests in this crate. Real `kube`/`reqwest` adapters live in
//! `src/infrastructure`; nothing here talks to a socket.

use async_trait::async_trait;
use migrator_domain::error::MigrationError;
use migrator_domain::repositories::{ClusterGateway, VsphereGateway, VsphereGatewayFactory};
use migrator_domain::value_objects::{
    ClusterOperatorHealth, CpmsSnapshot, CrossVCenterTarget, DummyVmHandle, FailureDomain, FailureDomainTopology, InfrastructurePlatformSpec, MachineSetSummary, PvSummary, ResolvedTopology,
    TagCategory, VmSummary, WorkloadRef,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

pub fn fd(name: &str, server: &str) -> FailureDomain {
    FailureDomain {
        name: name.into(),
        region: "region-a".into(),
        zone: "zone-a".into(),
        server: server.into(),
        topology: FailureDomainTopology {
            datacenter: "DC".into(),
            compute_cluster: "Cluster".into(),
            datastore: "Datastore".into(),
            networks: vec!["network-a".into()],
            resource_pool: "Resources".into(),
            folder: None,
            template: "/DC/vm/template".into(),
        },
    }
}

/// Everything a fake `ClusterGateway` needs to answer a phase's questions,
/// set up once per test and never mutated by the gateway itself except
/// through the `Mutex`-guarded fields a phase is expected to write.
#[derive(Default)]
pub struct FakeClusterGateway {
    pub infrastructure: Mutex<InfrastructurePlatformSpec>,
    pub operator_health: Mutex<Vec<ClusterOperatorHealth>>,
    pub secrets: Mutex<HashMap<(String, String), BTreeMap<String, String>>>,
}

impl FakeClusterGateway {
    pub fn healthy(infrastructure_name: &str, vcenters: &[&str]) -> Self {
        Self {
            infrastructure: Mutex::new(InfrastructurePlatformSpec {
                infrastructure_name: infrastructure_name.into(),
                vcenters: vcenters.iter().map(|s| s.to_string()).collect(),
                failure_domain_names: Vec::new(),
            }),
            operator_health: Mutex::new(vec![ClusterOperatorHealth { name: "kube-apiserver".into(), available: true, degraded: false, progressing: false }]),
            secrets: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_degraded_operator(self, name: &str) -> Self {
        self.operator_health.lock().unwrap().push(ClusterOperatorHealth { name: name.into(), available: false, degraded: true, progressing: false });
        self
    }
}

fn unimplemented(op: &str) -> MigrationError {
    MigrationError::infrastructure(format!("FakeClusterGateway: {op} not wired for this test"))
}

#[async_trait]
impl ClusterGateway for FakeClusterGateway {
    async fn get_infrastructure(&self) -> Result<InfrastructurePlatformSpec, MigrationError> {
        Ok(self.infrastructure.lock().unwrap().clone())
    }

    async fn update_infrastructure(&self, spec: &InfrastructurePlatformSpec) -> Result<(), MigrationError> {
        *self.infrastructure.lock().unwrap() = spec.clone();
        Ok(())
    }

    async fn strip_infrastructure_crd_validations(&self) -> Result<serde_json::Value, MigrationError> {
        Ok(serde_json::Value::Null)
    }

    async fn restore_infrastructure_crd_validations(&self, _previous: serde_json::Value) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn get_secret_keys(&self, name: &str, namespace: &str) -> Result<BTreeMap<String, String>, MigrationError> {
        Ok(self.secrets.lock().unwrap().get(&(name.to_string(), namespace.to_string())).cloned().unwrap_or_default())
    }

    async fn merge_secret_keys(&self, name: &str, namespace: &str, entries: BTreeMap<String, String>) -> Result<(), MigrationError> {
        self.secrets.lock().unwrap().entry((name.to_string(), namespace.to_string())).or_default().extend(entries);
        Ok(())
    }

    async fn remove_secret_keys(&self, name: &str, namespace: &str, keys: &[String]) -> Result<(), MigrationError> {
        if let Some(existing) = self.secrets.lock().unwrap().get_mut(&(name.to_string(), namespace.to_string())) {
            for key in keys {
                existing.remove(key);
            }
        }
        Ok(())
    }

    async fn get_config_map(&self, _name: &str, _namespace: &str, _key: &str) -> Result<String, MigrationError> {
        Err(unimplemented("get_config_map"))
    }

    async fn update_config_map(&self, _name: &str, _namespace: &str, _key: &str, _contents: String) -> Result<(), MigrationError> {
        Err(unimplemented("update_config_map"))
    }

    async fn get_deployment_replicas(&self, _name: &str, _namespace: &str) -> Result<u32, MigrationError> {
        Err(unimplemented("get_deployment_replicas"))
    }

    async fn scale_deployment(&self, _name: &str, _namespace: &str, _replicas: u32) -> Result<(), MigrationError> {
        Err(unimplemented("scale_deployment"))
    }

    async fn is_deployment_ready(&self, _name: &str, _namespace: &str) -> Result<bool, MigrationError> {
        Err(unimplemented("is_deployment_ready"))
    }

    async fn delete_pods_by_label(&self, _namespace: &str, _label_selector: &str) -> Result<u32, MigrationError> {
        Err(unimplemented("delete_pods_by_label"))
    }

    async fn count_pods_by_label(&self, _namespace: &str, _label_selector: &str) -> Result<u32, MigrationError> {
        Err(unimplemented("count_pods_by_label"))
    }

    async fn list_cluster_operator_health(&self) -> Result<Vec<ClusterOperatorHealth>, MigrationError> {
        Ok(self.operator_health.lock().unwrap().clone())
    }

    async fn get_machine_set(&self, _name: &str) -> Result<Option<MachineSetSummary>, MigrationError> {
        Ok(None)
    }

    async fn list_machine_sets(&self) -> Result<Vec<MachineSetSummary>, MigrationError> {
        Ok(Vec::new())
    }

    async fn ensure_machine_set(&self, name: &str, _provider_spec_patch: serde_json::Value, replicas: u32) -> Result<MachineSetSummary, MigrationError> {
        Ok(MachineSetSummary { name: name.into(), replicas, ready_replicas: replicas, provider_server: String::new() })
    }

    async fn scale_machine_set(&self, _name: &str, _replicas: u32) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn delete_machine_set_and_wait_machines_gone(&self, _name: &str) -> Result<bool, MigrationError> {
        Ok(true)
    }

    async fn machine_set_nodes_ready(&self, _name: &str) -> Result<bool, MigrationError> {
        Ok(true)
    }

    async fn get_cpms(&self) -> Result<Option<CpmsSnapshot>, MigrationError> {
        Ok(None)
    }

    async fn delete_cpms(&self) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn patch_cpms_failure_domain_and_activate(&self, _failure_domain_name: &str) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn list_vsphere_csi_pvs(&self) -> Result<Vec<PvSummary>, MigrationError> {
        Ok(Vec::new())
    }

    async fn set_pv_reclaim_policy(&self, _pv_name: &str, _policy: &str) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn patch_pv_volume_handle(&self, _pv_name: &str, _new_handle: &str) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn clear_pv_claim_ref(&self, _pv_name: &str) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn delete_pvc_and_wait(&self, _name: &str, _namespace: &str) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn create_pvc_from_spec_and_wait_bound(&self, _name: &str, _namespace: &str, _spec_base64: &str, _bind_to_pv: &str) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn get_pvc_spec_base64(&self, _name: &str, _namespace: &str) -> Result<String, MigrationError> {
        Ok(String::new())
    }

    async fn volume_attachment_exists_for_pv(&self, _pv_name: &str) -> Result<bool, MigrationError> {
        Ok(false)
    }

    async fn workloads_mounting_pvc(&self, _pvc_name: &str, _namespace: &str) -> Result<Vec<WorkloadRef>, MigrationError> {
        Ok(Vec::new())
    }

    async fn scale_workload(&self, _workload: &WorkloadRef, _replicas: u32) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn pods_for_pvc_terminated(&self, _pvc_name: &str, _namespace: &str) -> Result<bool, MigrationError> {
        Ok(true)
    }
}

/// A vCenter double whose topology resolution can be steered per-server to
/// exercise both the happy path and Preflight's "missing network" failure.
pub struct FakeVsphereGateway {
    pub missing_networks: Vec<String>,
}

#[async_trait]
impl VsphereGateway for FakeVsphereGateway {
    async fn connect(&self, _server: &str) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn resolve_topology(&self, _server: &str, topology: &FailureDomainTopology) -> Result<ResolvedTopology, MigrationError> {
        Ok(ResolvedTopology {
            datacenter_moref: format!("moref-{}", topology.datacenter),
            compute_cluster_moref: format!("moref-{}", topology.compute_cluster),
            datastore_moref: format!("moref-{}", topology.datastore),
            network_morefs: topology.networks.iter().filter(|n| !self.missing_networks.contains(n)).map(|n| format!("moref-{n}")).collect(),
            resource_pool_moref: format!("moref-{}", topology.resource_pool),
            template_moref: format!("moref-{}", topology.template),
            missing_networks: self.missing_networks.clone(),
        })
    }

    async fn ensure_tag(&self, _server: &str, category: TagCategory, name: &str) -> Result<String, MigrationError> {
        Ok(format!("tag-{}-{name}", category.category_name()))
    }

    async fn attach_tag(&self, _server: &str, _tag_id: &str, _object_moref: &str) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn ensure_folder(&self, _server: &str, _datacenter_moref: &str, path: &str) -> Result<String, MigrationError> {
        Ok(format!("moref-folder-{path}"))
    }

    async fn folder_exists(&self, _server: &str, _datacenter_moref: &str, _path: &str) -> Result<bool, MigrationError> {
        Ok(true)
    }

    async fn default_vm_folder(&self, _server: &str) -> Result<String, MigrationError> {
        Ok("moref-folder-default".into())
    }

    async fn cross_vcenter_target(&self, server: &str, topology: &ResolvedTopology) -> Result<CrossVCenterTarget, MigrationError> {
        Ok(CrossVCenterTarget {
            server: server.into(),
            ssl_thumbprint: "AA:BB:CC".into(),
            instance_uuid: "instance-uuid".into(),
            datastore_moref: topology.datastore_moref.clone(),
            resource_pool_moref: topology.resource_pool_moref.clone(),
            folder_moref: "moref-folder-default".into(),
        })
    }

    async fn create_dummy_vm_with_fcd(&self, server: &str, _folder_moref: &str, name: &str, _fcd_id: &str) -> Result<DummyVmHandle, MigrationError> {
        Ok(DummyVmHandle { name: name.into(), moref: format!("moref-{name}"), server: server.into() })
    }

    async fn relocate_cross_vcenter(&self, vm: &DummyVmHandle, target: &CrossVCenterTarget) -> Result<DummyVmHandle, MigrationError> {
        Ok(DummyVmHandle { name: vm.name.clone(), moref: vm.moref.clone(), server: target.server.clone() })
    }

    async fn detach_fcd(&self, _vm: &DummyVmHandle, _fcd_id: &str) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn delete_vm(&self, _vm: &DummyVmHandle) -> Result<(), MigrationError> {
        Ok(())
    }

    async fn vm_device_fcd_ids(&self, _server: &str, _vm_moref: &str) -> Result<Vec<String>, MigrationError> {
        Ok(Vec::new())
    }

    async fn list_vms_in_folder(&self, _server: &str, _folder_moref: &str) -> Result<Vec<VmSummary>, MigrationError> {
        Ok(Vec::new())
    }

    async fn find_vm_by_name(&self, _server: &str, _folder_moref: &str, _name: &str) -> Result<Option<DummyVmHandle>, MigrationError> {
        Ok(None)
    }

    async fn cns_query_volume(&self, _server: &str, _fcd_id: &str) -> Result<Option<String>, MigrationError> {
        Ok(None)
    }

    async fn cns_register_volume(&self, _server: &str, _datastore_moref: &str, fcd_id: &str, _infrastructure_id: &str, pv_name: &str) -> Result<String, MigrationError> {
        Ok(format!("registered-{fcd_id}-{pv_name}"))
    }
}

/// Hands back the same gateway for every server — tests that need
/// per-server behavior construct one `FakeVsphereGateway` per target FQDN
/// and insert it directly instead of going through this factory.
pub struct FakeVsphereGatewayFactory {
    pub gateway: std::sync::Arc<dyn VsphereGateway>,
}

impl FakeVsphereGatewayFactory {
    pub fn new(gateway: FakeVsphereGateway) -> Self {
        Self { gateway: std::sync::Arc::new(gateway) }
    }
}

#[async_trait]
impl VsphereGatewayFactory for FakeVsphereGatewayFactory {
    async fn gateway_for(&self, _server: &str) -> Result<std::sync::Arc<dyn VsphereGateway>, MigrationError> {
        Ok(self.gateway.clone())
    }
}
