// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `kube`/`k8s-openapi` implementation of [`ClusterGateway`]. OpenShift's own
//! CRDs (Infrastructure, ClusterOperator, MachineSet, ControlPlaneMachineSet)
//! have no `k8s-openapi` bindings, so those are addressed through
//! [`kube::core::DynamicObject`] against a statically known
//! [`kube::core::GroupVersionKind`]; stock Kubernetes kinds use their
//! concrete `k8s-openapi` types.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, PersistentVolume, PersistentVolumeClaim, Pod, Secret};
use k8s_openapi::api::storage::v1::VolumeAttachment;
use kube::api::{DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::core::{DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;
use kube::{Api, Client};
use migrator_domain::error::MigrationError;
use migrator_domain::repositories::ClusterGateway;
use migrator_domain::value_objects::{ClusterOperatorHealth, CpmsSnapshot, CpmsState, InfrastructurePlatformSpec, MachineSetSummary, PvSummary, WorkloadKind, WorkloadRef};
use std::collections::BTreeMap;

const FIELD_MANAGER: &str = "vsphere-migrator";

fn resource(msg: impl Into<String>) -> MigrationError {
    MigrationError::resource(msg)
}

fn openshift_resource(client: &Client, group: &str, version: &str, kind: &str) -> Api<DynamicObject> {
    let gvk = GroupVersionKind::gvk(group, version, kind);
    let api_resource = ApiResource::from_gvk(&gvk);
    Api::all_with(client.clone(), &api_resource)
}

fn openshift_resource_namespaced(client: &Client, group: &str, version: &str, kind: &str, namespace: &str) -> Api<DynamicObject> {
    let gvk = GroupVersionKind::gvk(group, version, kind);
    let api_resource = ApiResource::from_gvk(&gvk);
    Api::namespaced_with(client.clone(), namespace, &api_resource)
}

pub struct KubeClusterGateway {
    client: Client,
}

impl KubeClusterGateway {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn infrastructure_api(&self) -> Api<DynamicObject> {
        openshift_resource(&self.client, "config.openshift.io", "v1", "Infrastructure")
    }

    fn cluster_operator_api(&self) -> Api<DynamicObject> {
        openshift_resource(&self.client, "config.openshift.io", "v1", "ClusterOperator")
    }

    fn machine_set_api(&self) -> Api<DynamicObject> {
        openshift_resource_namespaced(&self.client, "machine.openshift.io", "v1beta1", "MachineSet", "openshift-machine-api")
    }

    fn cpms_api(&self) -> Api<DynamicObject> {
        openshift_resource_namespaced(&self.client, "machine.openshift.io", "v1", "ControlPlaneMachineSet", "openshift-machine-api")
    }

    fn crd_api(&self) -> Api<DynamicObject> {
        openshift_resource(&self.client, "apiextensions.k8s.io", "v1", "CustomResourceDefinition")
    }
}

#[async_trait]
impl ClusterGateway for KubeClusterGateway {
    async fn get_infrastructure(&self) -> Result<InfrastructurePlatformSpec, MigrationError> {
        let obj = self.infrastructure_api().get("cluster").await.map_err(|e| resource(format!("get Infrastructure/cluster: {e}")))?;
        let spec = obj.data.get("spec").ok_or_else(|| resource("Infrastructure/cluster has no spec"))?;
        let platform = spec.pointer("/platformSpec/vsphere").ok_or_else(|| resource("Infrastructure/cluster has no platformSpec.vsphere"))?;

        let infrastructure_name = obj.data.pointer("/status/infrastructureName").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let vcenters = platform
            .get("vcenters")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|e| e.get("server").and_then(|s| s.as_str()).map(String::from)).collect())
            .unwrap_or_default();
        let failure_domain_names = platform
            .get("failureDomains")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|e| e.get("name").and_then(|s| s.as_str()).map(String::from)).collect())
            .unwrap_or_default();

        Ok(InfrastructurePlatformSpec { infrastructure_name, vcenters, failure_domain_names })
    }

    async fn update_infrastructure(&self, spec: &InfrastructurePlatformSpec) -> Result<(), MigrationError> {
        let patch = serde_json::json!({
            "spec": {
                "platformSpec": {
                    "vsphere": {
                        "vcenters": spec.vcenters.iter().map(|server| serde_json::json!({ "server": server })).collect::<Vec<_>>(),
                    }
                }
            }
        });
        self.infrastructure_api()
            .patch("cluster", &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Apply(patch))
            .await
            .map_err(|e| resource(format!("patch Infrastructure/cluster: {e}")))?;
        Ok(())
    }

    async fn strip_infrastructure_crd_validations(&self) -> Result<serde_json::Value, MigrationError> {
        let crd = self.crd_api().get("infrastructures.config.openshift.io").await.map_err(|e| resource(format!("get Infrastructure CRD: {e}")))?;
        let previous = crd.data.pointer("/spec/versions").cloned().unwrap_or(serde_json::Value::Null);

        let versions = crd.data.pointer("/spec/versions").and_then(|v| v.as_array()).cloned().unwrap_or_default();
        let stripped: Vec<serde_json::Value> = versions
            .into_iter()
            .map(|mut version| {
                if let Some(rules) = version.pointer_mut("/schema/openAPIV3Schema/x-kubernetes-validations") {
                    *rules = serde_json::Value::Array(Vec::new());
                }
                version
            })
            .collect();

        let patch = serde_json::json!({ "spec": { "versions": stripped } });
        self.crd_api()
            .patch("infrastructures.config.openshift.io", &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Apply(patch))
            .await
            .map_err(|e| resource(format!("strip Infrastructure CRD validations: {e}")))?;

        Ok(previous)
    }

    async fn restore_infrastructure_crd_validations(&self, previous: serde_json::Value) -> Result<(), MigrationError> {
        let patch = serde_json::json!({ "spec": { "versions": previous } });
        self.crd_api()
            .patch("infrastructures.config.openshift.io", &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Apply(patch))
            .await
            .map_err(|e| resource(format!("restore Infrastructure CRD validations: {e}")))?;
        Ok(())
    }

    async fn get_secret_keys(&self, name: &str, namespace: &str) -> Result<BTreeMap<String, String>, MigrationError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api.get(name).await.map_err(|e| resource(format!("get secret {namespace}/{name}: {e}")))?;
        let mut out = BTreeMap::new();
        if let Some(data) = secret.data {
            for (key, value) in data {
                out.insert(key, BASE64.encode(&value.0));
            }
        }
        Ok(out)
    }

    async fn merge_secret_keys(&self, name: &str, namespace: &str, entries: BTreeMap<String, String>) -> Result<(), MigrationError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let data: BTreeMap<String, String> = entries;
        let patch = serde_json::json!({ "data": data });
        api.patch(name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
            .await
            .map_err(|e| resource(format!("merge secret {namespace}/{name}: {e}")))?;
        Ok(())
    }

    async fn remove_secret_keys(&self, name: &str, namespace: &str, keys: &[String]) -> Result<(), MigrationError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let data: BTreeMap<&String, serde_json::Value> = keys.iter().map(|k| (k, serde_json::Value::Null)).collect();
        let patch = serde_json::json!({ "data": data });
        api.patch(name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
            .await
            .map_err(|e| resource(format!("remove secret keys {namespace}/{name}: {e}")))?;
        Ok(())
    }

    async fn get_config_map(&self, name: &str, namespace: &str, key: &str) -> Result<String, MigrationError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let cm = api.get(name).await.map_err(|e| resource(format!("get configmap {namespace}/{name}: {e}")))?;
        cm.data
            .and_then(|d| d.get(key).cloned())
            .ok_or_else(|| resource(format!("configmap {namespace}/{name} has no key '{key}'")))
    }

    async fn update_config_map(&self, name: &str, namespace: &str, key: &str, contents: String) -> Result<(), MigrationError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let patch = serde_json::json!({ "data": { key: contents } });
        api.patch(name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
            .await
            .map_err(|e| resource(format!("update configmap {namespace}/{name}: {e}")))?;
        Ok(())
    }

    async fn get_deployment_replicas(&self, name: &str, namespace: &str) -> Result<u32, MigrationError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let dep = api.get(name).await.map_err(|e| resource(format!("get deployment {namespace}/{name}: {e}")))?;
        Ok(dep.spec.and_then(|s| s.replicas).unwrap_or(0) as u32)
    }

    async fn scale_deployment(&self, name: &str, namespace: &str, replicas: u32) -> Result<(), MigrationError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let patch = serde_json::json!({ "spec": { "replicas": replicas } });
        api.patch(name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
            .await
            .map_err(|e| resource(format!("scale deployment {namespace}/{name}: {e}")))?;
        Ok(())
    }

    async fn is_deployment_ready(&self, name: &str, namespace: &str) -> Result<bool, MigrationError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let dep = api.get(name).await.map_err(|e| resource(format!("get deployment {namespace}/{name}: {e}")))?;
        let wanted = dep.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0);
        let ready = dep.status.as_ref().and_then(|s| s.ready_replicas).unwrap_or(0);
        Ok(wanted > 0 && wanted == ready)
    }

    async fn delete_pods_by_label(&self, namespace: &str, label_selector: &str) -> Result<u32, MigrationError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let lp = ListParams::default().labels(label_selector);
        let pods = api.list(&lp).await.map_err(|e| resource(format!("list pods {namespace} ({label_selector}): {e}")))?;
        let count = pods.items.len() as u32;
        for pod in pods.items {
            if let Some(name) = pod.metadata.name {
                api.delete(&name, &DeleteParams::default()).await.map_err(|e| resource(format!("delete pod {namespace}/{name}: {e}")))?;
            }
        }
        Ok(count)
    }

    async fn count_pods_by_label(&self, namespace: &str, label_selector: &str) -> Result<u32, MigrationError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let lp = ListParams::default().labels(label_selector);
        let pods = api.list(&lp).await.map_err(|e| resource(format!("list pods {namespace} ({label_selector}): {e}")))?;
        Ok(pods.items.len() as u32)
    }

    async fn list_cluster_operator_health(&self) -> Result<Vec<ClusterOperatorHealth>, MigrationError> {
        let objs = self.cluster_operator_api().list(&ListParams::default()).await.map_err(|e| resource(format!("list ClusterOperators: {e}")))?;
        let mut out = Vec::new();
        for obj in objs.items {
            let name = obj.metadata.name.clone().unwrap_or_default();
            let conditions = obj.data.pointer("/status/conditions").and_then(|v| v.as_array()).cloned().unwrap_or_default();
            let condition = |kind: &str| -> bool {
                conditions
                    .iter()
                    .find(|c| c.get("type").and_then(|t| t.as_str()) == Some(kind))
                    .and_then(|c| c.get("status").and_then(|s| s.as_str()))
                    .map(|s| s == "True")
                    .unwrap_or(false)
            };
            out.push(ClusterOperatorHealth {
                name,
                available: condition("Available"),
                degraded: condition("Degraded"),
                progressing: condition("Progressing"),
            });
        }
        Ok(out)
    }

    async fn get_machine_set(&self, name: &str) -> Result<Option<MachineSetSummary>, MigrationError> {
        match self.machine_set_api().get_opt(name).await.map_err(|e| resource(format!("get MachineSet {name}: {e}")))? {
            Some(obj) => Ok(Some(machine_set_summary(&obj))),
            None => Ok(None),
        }
    }

    async fn list_machine_sets(&self) -> Result<Vec<MachineSetSummary>, MigrationError> {
        let objs = self.machine_set_api().list(&ListParams::default()).await.map_err(|e| resource(format!("list MachineSets: {e}")))?;
        Ok(objs.items.iter().map(machine_set_summary).collect())
    }

    async fn ensure_machine_set(&self, name: &str, provider_spec_patch: serde_json::Value, replicas: u32) -> Result<MachineSetSummary, MigrationError> {
        if let Some(existing) = self.get_machine_set(name).await? {
            return Ok(existing);
        }
        let body = serde_json::json!({
            "apiVersion": "machine.openshift.io/v1beta1",
            "kind": "MachineSet",
            "metadata": { "name": name, "namespace": "openshift-machine-api" },
            "spec": {
                "replicas": replicas,
                "selector": { "matchLabels": { "machine.openshift.io/cluster-api-machineset": name } },
                "template": {
                    "metadata": { "labels": { "machine.openshift.io/cluster-api-machineset": name } },
                    "spec": { "providerSpec": { "value": provider_spec_patch } }
                }
            }
        });
        let obj: DynamicObject = serde_json::from_value(body).map_err(MigrationError::from)?;
        let created = self
            .machine_set_api()
            .create(&PostParams::default(), &obj)
            .await
            .map_err(|e| resource(format!("create MachineSet {name}: {e}")))?;
        Ok(machine_set_summary(&created))
    }

    async fn scale_machine_set(&self, name: &str, replicas: u32) -> Result<(), MigrationError> {
        let patch = serde_json::json!({ "spec": { "replicas": replicas } });
        self.machine_set_api()
            .patch(name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
            .await
            .map_err(|e| resource(format!("scale MachineSet {name}: {e}")))?;
        Ok(())
    }

    async fn delete_machine_set_and_wait_machines_gone(&self, name: &str) -> Result<bool, MigrationError> {
        match self.machine_set_api().get_opt(name).await.map_err(|e| resource(format!("get MachineSet {name}: {e}")))? {
            None => Ok(true),
            Some(_) => {
                self.machine_set_api()
                    .delete(name, &DeleteParams::default())
                    .await
                    .map_err(|e| resource(format!("delete MachineSet {name}: {e}")))?;
                Ok(false)
            }
        }
    }

    async fn machine_set_nodes_ready(&self, name: &str) -> Result<bool, MigrationError> {
        match self.get_machine_set(name).await? {
            Some(summary) => Ok(summary.replicas > 0 && summary.replicas == summary.ready_replicas),
            None => Ok(false),
        }
    }

    async fn get_cpms(&self) -> Result<Option<CpmsSnapshot>, MigrationError> {
        match self.cpms_api().get_opt("cluster").await.map_err(|e| resource(format!("get ControlPlaneMachineSet/cluster: {e}")))? {
            None => Ok(None),
            Some(obj) => Ok(Some(cpms_snapshot(&obj))),
        }
    }

    async fn delete_cpms(&self) -> Result<(), MigrationError> {
        self.cpms_api()
            .delete("cluster", &DeleteParams::default())
            .await
            .map_err(|e| resource(format!("delete ControlPlaneMachineSet/cluster: {e}")))?;
        Ok(())
    }

    async fn patch_cpms_failure_domain_and_activate(&self, failure_domain_name: &str) -> Result<(), MigrationError> {
        let patch = serde_json::json!({
            "spec": {
                "state": "Active",
                "template": {
                    "machineType": "machines_v1beta1_machine_openshift_io",
                    "machines_v1beta1_machine_openshift_io": {
                        "failureDomains": { "platform": "VSphere", "vsphere": [{ "name": failure_domain_name }] }
                    }
                }
            }
        });
        self.cpms_api()
            .patch("cluster", &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Apply(patch))
            .await
            .map_err(|e| resource(format!("patch ControlPlaneMachineSet/cluster: {e}")))?;
        Ok(())
    }

    async fn list_vsphere_csi_pvs(&self) -> Result<Vec<PvSummary>, MigrationError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let pvs = api.list(&ListParams::default()).await.map_err(|e| resource(format!("list PersistentVolumes: {e}")))?;
        let mut out = Vec::new();
        for pv in pvs.items {
            let name = pv.metadata.name.clone().unwrap_or_default();
            let spec = match pv.spec {
                Some(s) => s,
                None => continue,
            };
            let csi = match spec.csi {
                Some(c) => c,
                None => continue,
            };
            let claim = spec.claim_ref;
            out.push(PvSummary {
                name,
                volume_handle: csi.volume_handle,
                driver: csi.driver,
                reclaim_policy: spec.persistent_volume_reclaim_policy.unwrap_or_else(|| "Delete".into()),
                bound_pvc_name: claim.as_ref().and_then(|c| c.name.clone()),
                bound_pvc_namespace: claim.as_ref().and_then(|c| c.namespace.clone()),
            });
        }
        Ok(out)
    }

    async fn set_pv_reclaim_policy(&self, pv_name: &str, policy: &str) -> Result<(), MigrationError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let patch = serde_json::json!({ "spec": { "persistentVolumeReclaimPolicy": policy } });
        api.patch(pv_name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
            .await
            .map_err(|e| resource(format!("set reclaim policy on PV {pv_name}: {e}")))?;
        Ok(())
    }

    async fn patch_pv_volume_handle(&self, pv_name: &str, new_handle: &str) -> Result<(), MigrationError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let patch = serde_json::json!({ "spec": { "csi": { "volumeHandle": new_handle } } });
        api.patch(pv_name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
            .await
            .map_err(|e| resource(format!("patch volume handle on PV {pv_name}: {e}")))?;
        Ok(())
    }

    async fn clear_pv_claim_ref(&self, pv_name: &str) -> Result<(), MigrationError> {
        let api: Api<PersistentVolume> = Api::all(self.client.clone());
        let patch = serde_json::json!({ "spec": { "claimRef": null } });
        api.patch(pv_name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
            .await
            .map_err(|e| resource(format!("clear claimRef on PV {pv_name}: {e}")))?;
        Ok(())
    }

    async fn delete_pvc_and_wait(&self, name: &str, namespace: &str) -> Result<(), MigrationError> {
        let api: Api<PersistentVolumeClaim> = Api::namespaced(self.client.clone(), namespace);
        match api.get_opt(name).await.map_err(|e| resource(format!("get PVC {namespace}/{name}: {e}")))? {
            None => Ok(()),
            Some(_) => {
                api.delete(name, &DeleteParams::default()).await.map_err(|e| resource(format!("delete PVC {namespace}/{name}: {e}")))?;
                Ok(())
            }
        }
    }

    async fn create_pvc_from_spec_and_wait_bound(&self, name: &str, namespace: &str, spec_base64: &str, bind_to_pv: &str) -> Result<(), MigrationError> {
        let decoded = BASE64.decode(spec_base64).map_err(|e| resource(format!("decode PVC spec for {namespace}/{name}: {e}")))?;
        let mut spec_value: serde_json::Value = serde_json::from_slice(&decoded)?;
        if let Some(obj) = spec_value.as_object_mut() {
            obj.insert("volumeName".into(), serde_json::Value::String(bind_to_pv.to_string()));
        }
        let api: Api<PersistentVolumeClaim> = Api::namespaced(self.client.clone(), namespace);
        let body = serde_json::json!({
            "apiVersion": "v1",
            "kind": "PersistentVolumeClaim",
            "metadata": { "name": name, "namespace": namespace },
            "spec": spec_value,
        });
        let pvc: PersistentVolumeClaim = serde_json::from_value(body).map_err(MigrationError::from)?;
        api.create(&PostParams::default(), &pvc).await.map_err(|e| resource(format!("create PVC {namespace}/{name}: {e}")))?;
        Ok(())
    }

    async fn get_pvc_spec_base64(&self, name: &str, namespace: &str) -> Result<String, MigrationError> {
        let api: Api<PersistentVolumeClaim> = Api::namespaced(self.client.clone(), namespace);
        let pvc = api.get(name).await.map_err(|e| resource(format!("get PVC {namespace}/{name}: {e}")))?;
        let spec = pvc.spec.ok_or_else(|| resource(format!("PVC {namespace}/{name} has no spec")))?;
        let reduced = serde_json::json!({
            "accessModes": spec.access_modes,
            "resources": spec.resources,
            "storageClassName": spec.storage_class_name,
            "selector": spec.selector,
        });
        let bytes = serde_json::to_vec(&reduced)?;
        Ok(BASE64.encode(bytes))
    }

    async fn volume_attachment_exists_for_pv(&self, pv_name: &str) -> Result<bool, MigrationError> {
        let api: Api<VolumeAttachment> = Api::all(self.client.clone());
        let attachments = api.list(&ListParams::default()).await.map_err(|e| resource(format!("list VolumeAttachments: {e}")))?;
        Ok(attachments.items.iter().any(|va| va.spec.source.persistent_volume_name.as_deref() == Some(pv_name)))
    }

    async fn workloads_mounting_pvc(&self, pvc_name: &str, namespace: &str) -> Result<Vec<WorkloadRef>, MigrationError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let deployments = api.list(&ListParams::default()).await.map_err(|e| resource(format!("list Deployments in {namespace}: {e}")))?;
        let mut out = Vec::new();
        for dep in deployments.items {
            let mounts_pvc = dep
                .spec
                .as_ref()
                .and_then(|s| s.template.spec.as_ref())
                .and_then(|ps| ps.volumes.as_ref())
                .map(|vols| vols.iter().any(|v| v.persistent_volume_claim.as_ref().map(|c| c.claim_name == pvc_name).unwrap_or(false)))
                .unwrap_or(false);
            if mounts_pvc {
                out.push(WorkloadRef {
                    kind: WorkloadKind::Deployment,
                    name: dep.metadata.name.clone().unwrap_or_default(),
                    namespace: namespace.to_string(),
                    replicas: dep.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0) as u32,
                });
            }
        }
        // StatefulSets own their PVC via volumeClaimTemplates and are named by
        // the claim's deterministic `<template>-<statefulset>-<ordinal>`
        // convention; a full scan is left to the infrastructure's own
        // StatefulSet lookup where a cluster exposes it.
        Ok(out)
    }

    async fn scale_workload(&self, workload: &WorkloadRef, replicas: u32) -> Result<(), MigrationError> {
        let patch = serde_json::json!({ "spec": { "replicas": replicas } });
        match workload.kind {
            WorkloadKind::Deployment => {
                let api: Api<Deployment> = Api::namespaced(self.client.clone(), &workload.namespace);
                api.patch(&workload.name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
                    .await
                    .map_err(|e| resource(format!("scale Deployment {}/{}: {e}", workload.namespace, workload.name)))?;
            }
            WorkloadKind::StatefulSet | WorkloadKind::ReplicaSet => {
                let gvk_kind = if workload.kind == WorkloadKind::StatefulSet { "StatefulSet" } else { "ReplicaSet" };
                let api = openshift_resource_namespaced(&self.client, "apps", "v1", gvk_kind, &workload.namespace);
                api.patch(&workload.name, &PatchParams::apply(FIELD_MANAGER).force(), &Patch::Merge(patch))
                    .await
                    .map_err(|e| resource(format!("scale {gvk_kind} {}/{}: {e}", workload.namespace, workload.name)))?;
            }
        }
        Ok(())
    }

    async fn pods_for_pvc_terminated(&self, pvc_name: &str, namespace: &str) -> Result<bool, MigrationError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let pods = api.list(&ListParams::default()).await.map_err(|e| resource(format!("list pods in {namespace}: {e}")))?;
        let still_mounting = pods.items.iter().any(|p| {
            p.spec
                .as_ref()
                .and_then(|s| s.volumes.as_ref())
                .map(|vols| vols.iter().any(|v| v.persistent_volume_claim.as_ref().map(|c| c.claim_name == pvc_name).unwrap_or(false)))
                .unwrap_or(false)
        });
        Ok(!still_mounting)
    }
}

fn machine_set_summary(obj: &DynamicObject) -> MachineSetSummary {
    let name = obj.metadata.name.clone().unwrap_or_default();
    let replicas = obj.data.pointer("/spec/replicas").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    let ready_replicas = obj.data.pointer("/status/readyReplicas").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
    let provider_server = obj
        .data
        .pointer("/spec/template/spec/providerSpec/value/workspace/server")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    MachineSetSummary { name, replicas, ready_replicas, provider_server }
}

fn cpms_snapshot(obj: &DynamicObject) -> CpmsSnapshot {
    let state = match obj.data.pointer("/spec/state").and_then(|v| v.as_str()) {
        Some("Active") => CpmsState::Active,
        _ => CpmsState::Inactive,
    };
    CpmsSnapshot {
        state,
        generation: obj.metadata.generation.unwrap_or(0),
        observed_generation: obj.data.pointer("/status/observedGeneration").and_then(|v| v.as_i64()).unwrap_or(0),
        replicas: obj.data.pointer("/status/replicas").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
        updated_replicas: obj.data.pointer("/status/updatedReplicas").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
        ready_replicas: obj.data.pointer("/status/readyReplicas").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
    }
}
