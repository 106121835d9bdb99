// /////////////////////////////////////////////////////////////////////////////
// vSphere Migrator
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `reqwest`-based implementation of [`VsphereGateway`] over the vCenter
//! REST (vAPI) surface. One [`RestVsphereGateway`] instance serves every
//! target vCenter the migration touches; sessions are keyed by server FQDN
//! and established lazily on first use.

use async_trait::async_trait;
use migrator_domain::error::MigrationError;
use migrator_domain::repositories::{VsphereGateway, VsphereGatewayFactory};
use migrator_domain::value_objects::{CrossVCenterTarget, DummyVmHandle, FailureDomainTopology, ResolvedTopology, TagCategory, VmSummary};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct VsphereCredentials {
    pub username: String,
    pub password: String,
}

pub struct RestVsphereGateway {
    http: reqwest::Client,
    credentials: HashMap<String, VsphereCredentials>,
    sessions: Mutex<HashMap<String, String>>,
}

impl RestVsphereGateway {
    pub fn new(credentials: HashMap<String, VsphereCredentials>) -> Result<Self, MigrationError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| MigrationError::infrastructure(format!("failed to build vSphere HTTP client: {e}")))?;
        Ok(Self { http, credentials, sessions: Mutex::new(HashMap::new()) })
    }

    fn base_url(server: &str) -> String {
        format!("https://{server}/api")
    }

    async fn session_id(&self, server: &str) -> Result<String, MigrationError> {
        if let Some(id) = self.sessions.lock().await.get(server) {
            return Ok(id.clone());
        }
        Err(MigrationError::transient(format!("no active vSphere session for {server}; connect() was not called")))
    }

    async fn request(&self, server: &str, method: Method, path: &str) -> Result<reqwest::RequestBuilder, MigrationError> {
        let session_id = self.session_id(server).await?;
        Ok(self.http.request(method, format!("{}{path}", Self::base_url(server))).header("vmware-api-session-id", session_id))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, server: &str, path: &str) -> Result<T, MigrationError> {
        let resp = self.request(server, Method::GET, path).await?.send().await.map_err(|e| MigrationError::transient(format!("GET {path} on {server}: {e}")))?;
        read_json(server, path, resp).await
    }

    async fn post_json<B: serde::Serialize, T: for<'de> Deserialize<'de>>(&self, server: &str, path: &str, body: &B) -> Result<T, MigrationError> {
        let resp = self
            .request(server, Method::POST, path)
            .await?
            .json(body)
            .send()
            .await
            .map_err(|e| MigrationError::transient(format!("POST {path} on {server}: {e}")))?;
        read_json(server, path, resp).await
    }

    /// Resolves a single named object through a `filter.names` query,
    /// returning its identifier. Shared by datacenter/cluster/datastore/
    /// network/resource-pool/template lookups, which all follow the same
    /// `GET {kind}?filter.names=<name>` shape in the vCenter REST API.
    async fn find_by_name(&self, server: &str, kind: &str, name: &str) -> Result<Option<String>, MigrationError> {
        #[derive(Deserialize)]
        struct Summary {
            #[serde(rename = "datacenter", alias = "cluster", alias = "datastore", alias = "network", alias = "resource_pool", alias = "vm")]
            id: Option<String>,
        }
        let path = format!("/vcenter/{kind}?filter.names={}", urlencode(name));
        let results: Vec<Summary> = self.get_json(server, &path).await?;
        Ok(results.into_iter().find_map(|s| s.id))
    }

    async fn folder_root(&self, server: &str, datacenter_moref: &str) -> Result<String, MigrationError> {
        #[derive(Deserialize)]
        struct FolderSummary {
            folder: String,
        }
        let path = format!("/vcenter/folder?filter.datacenters={datacenter_moref}&filter.type=VIRTUAL_MACHINE&filter.names=vm");
        let results: Vec<FolderSummary> = self.get_json(server, &path).await?;
        results
            .into_iter()
            .next()
            .map(|f| f.folder)
            .ok_or_else(|| MigrationError::resource(format!("datacenter {datacenter_moref} on {server} has no root VM folder")))
    }

    async fn child_folder(&self, server: &str, parent_moref: &str, name: &str) -> Result<Option<String>, MigrationError> {
        #[derive(Deserialize)]
        struct FolderSummary {
            folder: String,
        }
        let path = format!("/vcenter/folder?filter.parent_folders={parent_moref}&filter.type=VIRTUAL_MACHINE&filter.names={}", urlencode(name));
        let results: Vec<FolderSummary> = self.get_json(server, &path).await?;
        Ok(results.into_iter().next().map(|f| f.folder))
    }

    /// Walks `path` (e.g. `/DC/vm/my-infra-id`) one segment at a time below
    /// the datacenter's root VM folder, optionally creating segments that
    /// don't exist yet. The leading datacenter name and the literal `vm`
    /// segment are both implied by `folder_root` and skipped.
    async fn walk_folder_path(&self, server: &str, datacenter_moref: &str, path: &str, create_missing: bool) -> Result<Option<String>, MigrationError> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        segments.next(); // datacenter name, implied by datacenter_moref
        let mut current = self.folder_root(server, datacenter_moref).await?;
        for segment in segments {
            if segment == "vm" {
                continue;
            }
            match self.child_folder(server, &current, segment).await? {
                Some(child) => current = child,
                None if create_missing => current = self.create_folder(server, &current, segment).await?,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    async fn create_folder(&self, server: &str, parent_moref: &str, name: &str) -> Result<String, MigrationError> {
        #[derive(serde::Serialize)]
        struct CreateSpec<'a> {
            name: &'a str,
            parent: &'a str,
        }
        #[derive(Deserialize)]
        struct CreateResponse {
            folder: String,
        }
        let spec = CreateSpec { name, parent: parent_moref };
        let created: CreateResponse = self.post_json(server, "/vcenter/folder", &spec).await?;
        Ok(created.folder)
    }
}

#[async_trait]
impl VsphereGateway for RestVsphereGateway {
    async fn connect(&self, server: &str) -> Result<(), MigrationError> {
        if self.sessions.lock().await.contains_key(server) {
            return Ok(());
        }
        let creds = self.credentials.get(server).ok_or_else(|| MigrationError::validation(format!("no credentials configured for vCenter {server}")))?;
        let resp = self
            .http
            .post(format!("{}/session", Self::base_url(server)))
            .basic_auth(&creds.username, Some(&creds.password))
            .send()
            .await
            .map_err(|e| MigrationError::transient(format!("session establishment against {server}: {e}")))?;
        let session_id: String = read_json(server, "/session", resp).await?;
        self.sessions.lock().await.insert(server.to_string(), session_id);
        Ok(())
    }

    async fn resolve_topology(&self, server: &str, topology: &FailureDomainTopology) -> Result<ResolvedTopology, MigrationError> {
        let datacenter_moref = self
            .find_by_name(server, "datacenter", &topology.datacenter)
            .await?
            .ok_or_else(|| MigrationError::resource(format!("datacenter '{}' not found on {server}", topology.datacenter)))?;
        let compute_cluster_moref = self
            .find_by_name(server, "cluster", &topology.compute_cluster)
            .await?
            .ok_or_else(|| MigrationError::resource(format!("compute cluster '{}' not found on {server}", topology.compute_cluster)))?;
        let datastore_moref = self
            .find_by_name(server, "datastore", &topology.datastore)
            .await?
            .ok_or_else(|| MigrationError::resource(format!("datastore '{}' not found on {server}", topology.datastore)))?;
        let resource_pool_moref = self
            .find_by_name(server, "resource-pool", &topology.resource_pool)
            .await?
            .ok_or_else(|| MigrationError::resource(format!("resource pool '{}' not found on {server}", topology.resource_pool)))?;
        let template_moref = self
            .find_by_name(server, "vm", &topology.template)
            .await?
            .ok_or_else(|| MigrationError::resource(format!("template '{}' not found on {server}", topology.template)))?;

        let mut network_morefs = Vec::new();
        let mut missing_networks = Vec::new();
        for network in &topology.networks {
            match self.find_by_name(server, "network", network).await? {
                Some(moref) => network_morefs.push(moref),
                None => missing_networks.push(network.clone()),
            }
        }

        Ok(ResolvedTopology { datacenter_moref, compute_cluster_moref, datastore_moref, network_morefs, resource_pool_moref, template_moref, missing_networks })
    }

    async fn ensure_tag(&self, server: &str, category: TagCategory, name: &str) -> Result<String, MigrationError> {
        #[derive(Deserialize)]
        struct CategorySummary {
            category: String,
        }
        #[derive(Deserialize)]
        struct TagSummary {
            tag: String,
        }
        #[derive(serde::Serialize)]
        struct CreateCategorySpec<'a> {
            name: &'a str,
            cardinality: &'a str,
            associable_types: Vec<&'a str>,
        }
        #[derive(serde::Serialize)]
        struct CreateTagSpec<'a> {
            name: &'a str,
            category_id: &'a str,
        }

        let categories: Vec<CategorySummary> = self.get_json(server, &format!("/cis/tagging/category?filter.names={}", urlencode(category.category_name()))).await?;
        let category_id = match categories.into_iter().next() {
            Some(c) => c.category,
            None => {
                let spec = CreateCategorySpec { name: category.category_name(), cardinality: "SINGLE", associable_types: vec!["Folder", "VirtualMachine"] };
                let created: CategorySummary = self.post_json(server, "/cis/tagging/category", &spec).await?;
                created.category
            }
        };

        let tags: Vec<TagSummary> = self.get_json(server, &format!("/cis/tagging/tag?filter.names={}&filter.category_id={category_id}", urlencode(name))).await?;
        if let Some(t) = tags.into_iter().next() {
            return Ok(t.tag);
        }
        let spec = CreateTagSpec { name, category_id: &category_id };
        let created: TagSummary = self.post_json(server, "/cis/tagging/tag", &spec).await?;
        Ok(created.tag)
    }

    async fn attach_tag(&self, server: &str, tag_id: &str, object_moref: &str) -> Result<(), MigrationError> {
        #[derive(serde::Serialize)]
        struct AttachBody<'a> {
            object_id: &'a str,
        }
        let path = format!("/cis/tagging/tag/id:{tag_id}?action=attach");
        let _: serde_json::Value = self.post_json(server, &path, &AttachBody { object_id: object_moref }).await?;
        Ok(())
    }

    async fn ensure_folder(&self, server: &str, datacenter_moref: &str, path: &str) -> Result<String, MigrationError> {
        self.walk_folder_path(server, datacenter_moref, path, true)
            .await?
            .ok_or_else(|| MigrationError::infrastructure(format!("folder path '{path}' could not be created on {server}")))
    }

    async fn folder_exists(&self, server: &str, datacenter_moref: &str, path: &str) -> Result<bool, MigrationError> {
        Ok(self.walk_folder_path(server, datacenter_moref, path, false).await?.is_some())
    }

    async fn default_vm_folder(&self, server: &str) -> Result<String, MigrationError> {
        let datacenters: Vec<serde_json::Value> = self.get_json(server, "/vcenter/datacenter").await?;
        let datacenter_moref = datacenters
            .first()
            .and_then(|d| d.get("datacenter").and_then(|v| v.as_str()))
            .ok_or_else(|| MigrationError::resource(format!("no datacenters visible on {server}")))?
            .to_string();
        self.folder_root(server, &datacenter_moref).await
    }

    async fn cross_vcenter_target(&self, server: &str, topology: &ResolvedTopology) -> Result<CrossVCenterTarget, MigrationError> {
        #[derive(Deserialize)]
        struct SystemInfo {
            instance_uuid: String,
            ssl_thumbprint: String,
        }
        let info: SystemInfo = self.get_json(server, "/appliance/system/version").await.unwrap_or(SystemInfo { instance_uuid: String::new(), ssl_thumbprint: String::new() });
        Ok(CrossVCenterTarget {
            server: server.to_string(),
            ssl_thumbprint: info.ssl_thumbprint,
            instance_uuid: info.instance_uuid,
            datastore_moref: topology.datastore_moref.clone(),
            resource_pool_moref: topology.resource_pool_moref.clone(),
            folder_moref: String::new(),
        })
    }

    async fn create_dummy_vm_with_fcd(&self, server: &str, folder_moref: &str, name: &str, fcd_id: &str) -> Result<DummyVmHandle, MigrationError> {
        #[derive(serde::Serialize)]
        struct CreateVmSpec<'a> {
            name: &'a str,
            placement: CreatePlacement<'a>,
            cpu: CpuSpec,
            memory: MemorySpec,
            guest_os: &'static str,
        }
        #[derive(serde::Serialize)]
        struct CreatePlacement<'a> {
            folder: &'a str,
        }
        #[derive(serde::Serialize)]
        struct CpuSpec {
            count: u32,
        }
        #[derive(serde::Serialize)]
        struct MemorySpec {
            size_mib: u32,
        }
        #[derive(Deserialize)]
        struct CreateVmResponse {
            vm: String,
        }
        let spec = CreateVmSpec { name, placement: CreatePlacement { folder: folder_moref }, cpu: CpuSpec { count: 1 }, memory: MemorySpec { size_mib: 128 }, guest_os: "OTHER_64" };
        let created: CreateVmResponse = self.post_json(server, "/vcenter/vm", &spec).await?;

        #[derive(serde::Serialize)]
        struct AttachFcdBody<'a> {
            vdisk_id: &'a str,
        }
        let attach_path = format!("/vcenter/vm/{}/hardware/disk?action=attach-existing", created.vm);
        let _: serde_json::Value = self.post_json(server, &attach_path, &AttachFcdBody { vdisk_id: fcd_id }).await?;

        Ok(DummyVmHandle { name: name.to_string(), moref: created.vm, server: server.to_string() })
    }

    async fn relocate_cross_vcenter(&self, vm: &DummyVmHandle, target: &CrossVCenterTarget) -> Result<DummyVmHandle, MigrationError> {
        target.validate()?;
        #[derive(serde::Serialize)]
        struct RelocateSpec<'a> {
            placement: RelocatePlacement<'a>,
            target_server: TargetServer<'a>,
        }
        #[derive(serde::Serialize)]
        struct RelocatePlacement<'a> {
            folder: &'a str,
            datastore: &'a str,
            resource_pool: &'a str,
        }
        #[derive(serde::Serialize)]
        struct TargetServer<'a> {
            hostname: &'a str,
            ssl_thumbprint: &'a str,
            instance_uuid: &'a str,
        }
        #[derive(Deserialize)]
        struct RelocateResponse {
            vm: String,
        }
        let spec = RelocateSpec {
            placement: RelocatePlacement { folder: &target.folder_moref, datastore: &target.datastore_moref, resource_pool: &target.resource_pool_moref },
            target_server: TargetServer { hostname: &target.server, ssl_thumbprint: &target.ssl_thumbprint, instance_uuid: &target.instance_uuid },
        };
        let path = format!("/vcenter/vm/{}?action=relocate", vm.moref);
        let relocated: RelocateResponse = self.post_json(&vm.server, &path, &spec).await?;
        Ok(DummyVmHandle { name: vm.name.clone(), moref: relocated.vm, server: target.server.clone() })
    }

    async fn detach_fcd(&self, vm: &DummyVmHandle, fcd_id: &str) -> Result<(), MigrationError> {
        let path = format!("/vcenter/vm/{}/hardware/disk?action=detach-existing&vdisk_id={fcd_id}", vm.moref);
        let _: serde_json::Value = self.post_json(&vm.server, &path, &serde_json::Value::Null).await?;
        Ok(())
    }

    async fn delete_vm(&self, vm: &DummyVmHandle) -> Result<(), MigrationError> {
        let resp = self.request(&vm.server, Method::DELETE, &format!("/vcenter/vm/{}", vm.moref)).await?.send().await.map_err(|e| MigrationError::transient(format!("delete VM {}: {e}", vm.moref)))?;
        if resp.status().is_success() || resp.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(MigrationError::infrastructure(format!("delete VM {} on {} failed: {}", vm.moref, vm.server, resp.status())))
    }

    async fn vm_device_fcd_ids(&self, server: &str, vm_moref: &str) -> Result<Vec<String>, MigrationError> {
        #[derive(Deserialize)]
        struct DiskSummary {
            #[serde(default)]
            vdisk_id: Option<String>,
        }
        let disks: Vec<DiskSummary> = self.get_json(server, &format!("/vcenter/vm/{vm_moref}/hardware/disk")).await?;
        Ok(disks.into_iter().filter_map(|d| d.vdisk_id).collect())
    }

    async fn list_vms_in_folder(&self, server: &str, folder_moref: &str) -> Result<Vec<VmSummary>, MigrationError> {
        #[derive(Deserialize)]
        struct VmEntry {
            vm: String,
            name: String,
        }
        let entries: Vec<VmEntry> = self.get_json(server, &format!("/vcenter/vm?filter.folders={folder_moref}")).await?;
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            let attached_fcd_ids = self.vm_device_fcd_ids(server, &entry.vm).await?;
            out.push(VmSummary { name: entry.name, moref: entry.vm, attached_fcd_ids });
        }
        Ok(out)
    }

    async fn find_vm_by_name(&self, server: &str, folder_moref: &str, name: &str) -> Result<Option<DummyVmHandle>, MigrationError> {
        #[derive(Deserialize)]
        struct VmEntry {
            vm: String,
        }
        let path = format!("/vcenter/vm?filter.folders={folder_moref}&filter.names={}", urlencode(name));
        let entries: Vec<VmEntry> = self.get_json(server, &path).await?;
        Ok(entries.into_iter().next().map(|e| DummyVmHandle { name: name.to_string(), moref: e.vm, server: server.to_string() }))
    }

    async fn cns_query_volume(&self, server: &str, fcd_id: &str) -> Result<Option<String>, MigrationError> {
        #[derive(serde::Serialize)]
        struct QueryFilter<'a> {
            volume_ids: Vec<&'a str>,
        }
        #[derive(Deserialize)]
        struct QueryResult {
            volumes: Vec<CnsVolume>,
        }
        #[derive(Deserialize)]
        struct CnsVolume {
            volume_id: String,
        }
        let result: QueryResult = self.post_json(server, "/cns/volumes/query", &QueryFilter { volume_ids: vec![fcd_id] }).await?;
        Ok(result.volumes.into_iter().next().map(|v| v.volume_id))
    }

    async fn cns_register_volume(&self, server: &str, datastore_moref: &str, fcd_id: &str, infrastructure_id: &str, pv_name: &str) -> Result<String, MigrationError> {
        #[derive(serde::Serialize)]
        struct RegisterSpec<'a> {
            backing_disk_id: &'a str,
            datastore: &'a str,
            name: String,
        }
        #[derive(Deserialize)]
        struct RegisterResponse {
            volume_id: String,
        }
        let spec = RegisterSpec { backing_disk_id: fcd_id, datastore: datastore_moref, name: format!("{infrastructure_id}-{pv_name}") };
        let created: RegisterResponse = self.post_json(server, "/cns/volumes/create", &spec).await?;
        Ok(created.volume_id)
    }
}

/// Every target vCenter is served by the same [`RestVsphereGateway`]
/// instance; it already keys sessions and credentials per server FQDN, so
/// the factory's only job is to guarantee a session exists before handing
/// the gateway back.
pub struct SharedVsphereGatewayFactory {
    gateway: Arc<RestVsphereGateway>,
}

impl SharedVsphereGatewayFactory {
    pub fn new(gateway: Arc<RestVsphereGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl VsphereGatewayFactory for SharedVsphereGatewayFactory {
    async fn gateway_for(&self, server: &str) -> Result<Arc<dyn VsphereGateway>, MigrationError> {
        self.gateway.connect(server).await?;
        Ok(self.gateway.clone())
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(server: &str, path: &str, resp: reqwest::Response) -> Result<T, MigrationError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::GATEWAY_TIMEOUT {
        return Err(MigrationError::transient(format!("{path} on {server} returned {status}")));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(MigrationError::infrastructure(format!("{path} on {server} returned {status}: {body}")));
    }
    resp.json::<T>().await.map_err(|e| MigrationError::infrastructure(format!("decoding response from {path} on {server}: {e}")))
}

fn urlencode(value: &str) -> String {
    value.chars().flat_map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~') { vec![c] } else { format!("%{:02X}", c as u32).chars().collect() }).collect()
}
