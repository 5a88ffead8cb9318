//! Setup reconciliation: bring the registry in line with the inventory.
//!
//! The passes run strictly in order (delete, create, readiness check,
//! capabilities, submodels) with fixed pauses in between so the registry
//! can settle. Per-resource failures are recorded and the run continues;
//! only token or listing failures abort it.

use crate::capability::Capability;
use crate::client::RegistryClient;
use crate::error::RegistryResult;
use crate::inventory::{Device, Inventory};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Switches controlling which passes run and how conflicts are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupOptions {
    /// Overwrite resources and capabilities that already exist.
    pub force_overwrite: bool,
    /// Run the delete pass before creating resources.
    pub force_delete: bool,
    /// In the delete pass, delete every registry resource, not only inventory ones.
    pub delete_all: bool,
    /// Upload the submodel files listed in the inventory.
    pub attach_submodels: bool,
}

/// Fixed pauses between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub after_delete: Duration,
    pub after_create: Duration,
    pub readiness_retry: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            after_delete: Duration::from_secs(5),
            after_create: Duration::from_secs(20),
            readiness_retry: Duration::from_secs(20),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            after_delete: Duration::ZERO,
            after_create: Duration::ZERO,
            readiness_retry: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStage {
    Delete,
    Create,
    Capabilities,
    Submodels,
}

/// A per-resource failure that did not abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupFailure {
    pub stage: SetupStage,
    pub resource_id: Uuid,
    pub message: String,
}

/// Outcome of a setup run.
#[derive(Debug, Clone, Serialize)]
pub struct SetupReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub deleted: Vec<String>,
    pub added: Vec<String>,
    pub skipped: Vec<String>,
    pub capabilities_added: Vec<String>,
    pub submodels_added: Vec<String>,
    pub failures: Vec<SetupFailure>,
    /// Resources visible in the registry at the readiness check.
    pub registered_after_create: usize,
}

impl SetupReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            elapsed_secs: 0.0,
            deleted: Vec::new(),
            added: Vec::new(),
            skipped: Vec::new(),
            capabilities_added: Vec::new(),
            submodels_added: Vec::new(),
            failures: Vec::new(),
            registered_after_create: 0,
        }
    }

    fn fail(&mut self, stage: SetupStage, resource_id: Uuid, message: impl Into<String>) {
        self.failures.push(SetupFailure {
            stage,
            resource_id,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// What to do with one requested capability given what the resource already has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityDecision {
    Add,
    Overwrite,
    Skip,
}

/// Decide whether a requested capability gets attached.
#[must_use]
pub fn plan_capability(
    requested: Capability,
    existing: &[String],
    overwrite: bool,
) -> CapabilityDecision {
    let present = existing.iter().any(|name| name == requested.name());
    match (present, overwrite) {
        (false, _) => CapabilityDecision::Add,
        (true, true) => CapabilityDecision::Overwrite,
        (true, false) => CapabilityDecision::Skip,
    }
}

/// Runs the setup passes against one registry.
pub struct SetupRunner<'a> {
    client: &'a RegistryClient,
    inventory: &'a Inventory,
    options: SetupOptions,
    pacing: Pacing,
}

impl<'a> SetupRunner<'a> {
    #[must_use]
    pub fn new(
        client: &'a RegistryClient,
        inventory: &'a Inventory,
        options: SetupOptions,
        pacing: Pacing,
    ) -> Self {
        Self {
            client,
            inventory,
            options,
            pacing,
        }
    }

    /// Run every pass and return the collected report.
    pub async fn run(&self) -> RegistryResult<SetupReport> {
        let clock = Instant::now();
        let mut report = SetupReport::new(Utc::now());

        info!(
            devices = self.inventory.devices().len(),
            force_overwrite = self.options.force_overwrite,
            force_delete = self.options.force_delete,
            delete_all = self.options.delete_all,
            "starting registry setup"
        );

        if self.options.force_delete {
            self.delete_pass(&mut report).await?;
            pause("after delete", self.pacing.after_delete).await;
        }

        self.create_pass(&mut report).await?;
        if !report.added.is_empty() {
            pause("after create", self.pacing.after_create).await;
        }

        report.registered_after_create = self.readiness_check().await?;

        self.capability_pass(&mut report).await?;

        if self.options.attach_submodels {
            self.submodel_pass(&mut report).await?;
        }

        report.elapsed_secs = clock.elapsed().as_secs_f64();
        info!(
            deleted = report.deleted.len(),
            added = report.added.len(),
            capabilities = report.capabilities_added.len(),
            submodels = report.submodels_added.len(),
            failures = report.failures.len(),
            elapsed_secs = report.elapsed_secs,
            "registry setup finished"
        );
        Ok(report)
    }

    async fn delete_pass(&self, report: &mut SetupReport) -> RegistryResult<()> {
        info!(delete_all = self.options.delete_all, "starting resource clean up");

        for resource in self.client.list_resources().await? {
            if !self.options.delete_all && !self.inventory.known_ids().contains(&resource.id) {
                info!(
                    resource_id = %resource.id,
                    "skipped deleting resource not present in inventory"
                );
                continue;
            }

            match self.client.delete_resource(resource.id).await {
                Ok(()) => {
                    info!(resource_id = %resource.id, "removed resource");
                    report.deleted.push(resource.summary_line());
                }
                Err(e) => {
                    warn!(resource_id = %resource.id, error = %e, "failed to remove resource");
                    report.fail(SetupStage::Delete, resource.id, e.to_string());
                }
            }
        }
        Ok(())
    }

    async fn create_pass(&self, report: &mut SetupReport) -> RegistryResult<()> {
        info!(
            force_overwrite = self.options.force_overwrite,
            "starting resource creation"
        );
        let current: HashSet<Uuid> = self.client.resource_ids().await?.into_iter().collect();

        for device in self.inventory.devices() {
            if current.contains(&device.id) {
                if !self.options.force_overwrite {
                    warn!(
                        resource_id = %device.id,
                        "skipped overwriting existing resource (overwrite not forced)"
                    );
                    report.skipped.push(device.summary_line());
                    continue;
                }
                warn!(resource_id = %device.id, "overwriting existing resource");
            }

            let item = device.to_item();
            match self.client.create_resource(device.id, &item).await {
                Ok(()) => {
                    info!(resource_id = %device.id, item = ?item, "added resource");
                    report.added.push(device.summary_line());
                }
                Err(e) => {
                    warn!(resource_id = %device.id, error = %e, "failed to add resource");
                    report.fail(SetupStage::Create, device.id, e.to_string());
                }
            }
        }
        Ok(())
    }

    /// Wait for the registry to list resources again; returns how many it lists.
    async fn readiness_check(&self) -> RegistryResult<usize> {
        let count = self.client.list_resources().await?.len();
        if count > 0 {
            info!(count, "resources available, continuing with capabilities");
            return Ok(count);
        }

        warn!("no resources available yet, waiting once more");
        pause("readiness retry", self.pacing.readiness_retry).await;

        let count = self.client.list_resources().await?.len();
        if count > 0 {
            info!(count, "resources available, continuing with capabilities");
        } else {
            error!("no resources available, continuing but expecting failures");
        }
        Ok(count)
    }

    async fn capability_pass(&self, report: &mut SetupReport) -> RegistryResult<()> {
        info!("starting capability assignment");
        let current: HashSet<Uuid> = self.client.resource_ids().await?.into_iter().collect();

        for device in self.inventory.devices() {
            if !current.contains(&device.id) {
                warn!(
                    resource_id = %device.id,
                    "cannot add capabilities, resource is not registered"
                );
                report.fail(
                    SetupStage::Capabilities,
                    device.id,
                    "resource is not registered",
                );
                continue;
            }

            if device.capabilities.is_empty() {
                info!(resource_id = %device.id, "no capabilities requested");
                continue;
            }

            let added = self.assign_capabilities(device, report).await;
            if !added.is_empty() {
                let names: Vec<&str> = added.iter().map(Capability::name).collect();
                report
                    .capabilities_added
                    .push(format!("{}, {}, [{}]", device.id, device.hostname, names.join(", ")));
            }
        }
        Ok(())
    }

    /// Attach the device's capabilities; returns those actually added.
    async fn assign_capabilities(
        &self,
        device: &Device,
        report: &mut SetupReport,
    ) -> Vec<Capability> {
        let existing: Vec<String> = match self
            .client
            .list_deployment_capabilities(device.id)
            .await
        {
            Ok(capabilities) => capabilities.into_iter().map(|c| c.name).collect(),
            Err(e) => {
                warn!(resource_id = %device.id, error = %e, "failed to read capabilities");
                report.fail(SetupStage::Capabilities, device.id, e.to_string());
                return Vec::new();
            }
        };

        let mut added = Vec::new();
        for &capability in &device.capabilities {
            if !capability.is_assignable() {
                let message = format!(
                    "capability '{capability}' not in available options {:?}",
                    Capability::assignable_names()
                );
                warn!(resource_id = %device.id, "{message}");
                report.fail(SetupStage::Capabilities, device.id, message);
                break;
            }

            match plan_capability(capability, &existing, self.options.force_overwrite) {
                CapabilityDecision::Skip => {
                    info!(
                        resource_id = %device.id,
                        %capability,
                        "skipped capability already present (overwrite not forced)"
                    );
                    continue;
                }
                CapabilityDecision::Overwrite => {
                    info!(resource_id = %device.id, %capability, "overwriting capability");
                }
                CapabilityDecision::Add => {
                    info!(resource_id = %device.id, %capability, "adding capability");
                }
            }

            match self.client.add_capability(device.id, capability).await {
                Ok(()) => added.push(capability),
                Err(e) => {
                    warn!(
                        resource_id = %device.id,
                        %capability,
                        error = %e,
                        "failed to add capability"
                    );
                    report.fail(
                        SetupStage::Capabilities,
                        device.id,
                        format!("{capability}: {e}"),
                    );
                }
            }
        }
        added
    }

    async fn submodel_pass(&self, report: &mut SetupReport) -> RegistryResult<()> {
        info!("starting submodel upload");
        let current: HashSet<Uuid> = self.client.resource_ids().await?.into_iter().collect();

        for device in self.inventory.devices() {
            if device.submodels.is_empty() {
                continue;
            }
            if !current.contains(&device.id) {
                report.fail(SetupStage::Submodels, device.id, "resource is not registered");
                continue;
            }

            let mut uploaded = Vec::new();
            for file in &device.submodels {
                match self.client.add_submodel(device.id, file).await {
                    Ok(()) => {
                        info!(resource_id = %device.id, file = %file.display(), "added submodel");
                        uploaded.push(file.display().to_string());
                    }
                    Err(e) => {
                        warn!(
                            resource_id = %device.id,
                            file = %file.display(),
                            error = %e,
                            "failed to add submodel"
                        );
                        report.fail(
                            SetupStage::Submodels,
                            device.id,
                            format!("{}: {e}", file.display()),
                        );
                    }
                }
            }

            if !uploaded.is_empty() {
                report
                    .submodels_added
                    .push(format!("{}, {}, [{}]", device.id, device.hostname, uploaded.join(", ")));
            }
        }
        Ok(())
    }
}

async fn pause(reason: &str, duration: Duration) {
    if duration.is_zero() {
        return;
    }
    info!(reason, secs = duration.as_secs(), "pausing for the registry to settle");
    tokio::time::sleep(duration).await;
}
