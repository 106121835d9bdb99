// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Well-known object names the phase catalogue reads or mutates. Centralized
//! here so a rename only touches one file.

pub const INFRASTRUCTURE_NAME: &str = "cluster";

pub const VSPHERE_CREDS_SECRET: &str = "vsphere-creds";
pub const VSPHERE_CREDS_NAMESPACE: &str = "kube-system";

pub const CLOUD_PROVIDER_CONFIGMAP: &str = "cloud-provider-config";
pub const CLOUD_PROVIDER_NAMESPACE: &str = "openshift-config";
pub const CLOUD_PROVIDER_CONFIG_KEY: &str = "config";

pub const MACHINE_API_NAMESPACE: &str = "openshift-machine-api";
pub const CPMS_NAME: &str = "cluster";

pub const CVO_DEPLOYMENT: &str = "cluster-version-operator";
pub const CVO_NAMESPACE: &str = "openshift-cluster-version";

pub const CCM_NAMESPACE: &str = "openshift-cloud-controller-manager";
pub const CCM_LABEL: &str = "infrastructure.openshift.io/cloud-controller-manager=VSphere";

pub const MACHINE_API_CONTROLLER_LABEL: &str = "k8s-app=machine-api-operator";

pub const CSI_DRIVER_NAMESPACE: &str = "openshift-cluster-csi-drivers";
pub const CSI_DRIVER_LABEL: &str = "app=vmware-vsphere-csi-driver-operator";

pub const MCO_NAMESPACE: &str = "openshift-machine-config-operator";
pub const MCO_LABEL: &str = "k8s-app=machine-config-operator";

/// `MachineSetReplicaBackup` is stored using the generic `ResourceBackup`
/// envelope so the backup store doesn't need a second collection.
pub const MACHINE_SET_REPLICAS_KIND: &str = "MachineSetReplicas";
pub const DEPLOYMENT_KIND: &str = "Deployment";
pub const INFRASTRUCTURE_KIND: &str = "Infrastructure";
pub const SECRET_KIND: &str = "Secret";
pub const CONFIGMAP_KIND: &str = "ConfigMap";
pub const CPMS_KIND: &str = "ControlPlaneMachineSet";
