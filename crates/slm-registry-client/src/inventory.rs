//! Desired-state device inventory.
//!
//! The inventory is the `DEVICES` sheet of the rack workbook exported as
//! CSV. Rows flagged `is_resource = yes` become [`Device`]s; the UUIDs of
//! all rows form the set of ids the delete pass is allowed to touch.

use crate::capability::Capability;
use crate::error::{RegistryError, RegistryResult};
use crate::models::DeviceItem;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const REQUIRED_COLUMNS: [&str; 3] = ["UUID", "hostname", "is_resource"];

/// Placeholder used in the sheet for an unused interface.
const NO_ADDRESS: &str = "-";

#[derive(Debug, Deserialize)]
struct InventoryRecord {
    #[serde(rename = "UUID", default)]
    uuid: String,
    #[serde(default)]
    hostname: String,
    #[serde(rename = "eth0 IP", default)]
    eth0_ip: String,
    #[serde(rename = "eth1 IP", default)]
    eth1_ip: String,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    is_resource: String,
    #[serde(default)]
    submodels: String,
}

fn is_yes(cell: &str) -> bool {
    cell.trim().eq_ignore_ascii_case("yes")
}

impl InventoryRecord {
    /// `eth0 IP`, or `eth1 IP` as written when eth0 is unused.
    fn address(&self) -> &str {
        let eth0 = self.eth0_ip.trim();
        if eth0.is_empty() || eth0 == NO_ADDRESS {
            self.eth1_ip.trim()
        } else {
            eth0
        }
    }
}

/// Header positions of the capability columns present in the sheet.
fn capability_columns(headers: &csv::StringRecord) -> Vec<(Capability, usize)> {
    Capability::ALL
        .iter()
        .filter_map(|&capability| {
            let column = capability.inventory_column()?;
            let index = headers.iter().position(|h| h == column)?;
            Some((capability, index))
        })
        .collect()
}

/// A device row the registry should contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: Uuid,
    pub hostname: String,
    pub ip: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub capabilities: Vec<Capability>,
    pub submodels: Vec<PathBuf>,
}

impl Device {
    /// Registry payload for this device.
    #[must_use]
    pub fn to_item(&self) -> DeviceItem {
        DeviceItem {
            resource_hostname: self.hostname.clone(),
            resource_ip: self.ip.clone(),
            resource_connection_port: 0,
            resource_username: self.username.clone(),
            resource_password: self.password.clone(),
        }
    }

    /// `id, hostname, ip` line used in setup summaries.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!("{}, {}, {}", self.id, self.hostname, self.ip)
    }
}

/// Parsed inventory.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    devices: Vec<Device>,
    known_ids: HashSet<Uuid>,
    row_count: usize,
}

impl Inventory {
    /// Load an inventory CSV from disk.
    ///
    /// Relative submodel paths are resolved against the file's directory.
    pub fn load(path: &Path) -> RegistryResult<Self> {
        if !path.exists() {
            return Err(RegistryError::InventoryNotFound(path.display().to_string()));
        }
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file = std::fs::File::open(path)?;
        let inventory = Self::from_reader(file, base_dir)?;
        debug!(
            path = %path.display(),
            rows = inventory.row_count,
            devices = inventory.devices.len(),
            "loaded inventory"
        );
        Ok(inventory)
    }

    /// Parse inventory CSV from any reader.
    pub fn from_reader<R: std::io::Read>(reader: R, base_dir: &Path) -> RegistryResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(RegistryError::Inventory(format!(
                    "missing required column '{column}'"
                )));
            }
        }

        let columns = capability_columns(&headers);
        let mut inventory = Inventory::default();

        for result in csv_reader.records() {
            let row = result?;
            let record: InventoryRecord = row.deserialize(Some(&headers))?;
            inventory.row_count += 1;
            // Header is line 1.
            let line = inventory.row_count + 1;

            let parsed_id = Uuid::parse_str(record.uuid.trim()).ok();
            if let Some(id) = parsed_id {
                inventory.known_ids.insert(id);
            }

            if !is_yes(&record.is_resource) {
                continue;
            }

            let id = parsed_id.ok_or_else(|| {
                RegistryError::Inventory(format!(
                    "line {line}: invalid UUID '{}' for a resource row",
                    record.uuid
                ))
            })?;

            let ip = record.address();
            if ip.is_empty() || ip == NO_ADDRESS {
                warn!(
                    line,
                    resource_id = %id,
                    ip,
                    "device has neither an eth0 nor an eth1 IP"
                );
            }

            let capabilities = columns
                .iter()
                .filter(|(_, index)| row.get(*index).is_some_and(is_yes))
                .map(|(capability, _)| *capability)
                .collect();

            let submodels = record
                .submodels
                .split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(|p| {
                    let p = Path::new(p);
                    if p.is_absolute() {
                        p.to_path_buf()
                    } else {
                        base_dir.join(p)
                    }
                })
                .collect();

            inventory.devices.push(Device {
                id,
                hostname: record.hostname.clone(),
                ip: ip.to_string(),
                username: record.user.clone().filter(|u| !u.is_empty()),
                password: record.password.clone().filter(|p| !p.is_empty()),
                capabilities,
                submodels,
            });
        }

        Ok(inventory)
    }

    /// Device rows in sheet order.
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// UUIDs of all rows, devices or not.
    #[must_use]
    pub fn known_ids(&self) -> &HashSet<Uuid> {
        &self.known_ids
    }

    /// Number of data rows read, including non-resource rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
UUID,hostname,eth0 IP,eth1 IP,user,password,is_resource,DC_Docker,DC_Transferapp,DC_Swarm,DC_K3S,submodels
3fa85f64-5717-4562-b3fc-2c963f66afa6,edge-01,10.0.0.5,-,pi,secret,yes,yes,no,yes,no,
1b4e28ba-2fa1-11d2-883f-0016d3cca427,edge-02,-,10.0.1.7,pi,secret,yes,no,yes,no,yes,aas/edge-02.aasx; /abs/extra.aasx
6ba7b810-9dad-11d1-80b4-00c04fd430c8,switch-01,10.0.0.1,-,,,no,,,,,
";

    fn parse(sheet: &str) -> RegistryResult<Inventory> {
        Inventory::from_reader(sheet.as_bytes(), Path::new("/data"))
    }

    #[test]
    fn test_only_resource_rows_become_devices() {
        let inventory = parse(SHEET).unwrap();
        assert_eq!(inventory.row_count(), 3);
        assert_eq!(inventory.devices().len(), 2);
        assert_eq!(inventory.known_ids().len(), 3);
        let switch: Uuid = "6ba7b810-9dad-11d1-80b4-00c04fd430c8".parse().unwrap();
        assert!(inventory.known_ids().contains(&switch));
    }

    #[test]
    fn test_ip_falls_back_to_eth1() {
        let inventory = parse(SHEET).unwrap();
        assert_eq!(inventory.devices()[0].ip, "10.0.0.5");
        assert_eq!(inventory.devices()[1].ip, "10.0.1.7");
    }

    #[test]
    fn test_capability_columns_in_order() {
        let inventory = parse(SHEET).unwrap();
        assert_eq!(
            inventory.devices()[0].capabilities,
            vec![Capability::Docker, Capability::DockerSwarm]
        );
        assert_eq!(
            inventory.devices()[1].capabilities,
            vec![Capability::TransferApp, Capability::K3s]
        );
    }

    #[test]
    fn test_submodel_paths_resolved_against_sheet_dir() {
        let inventory = parse(SHEET).unwrap();
        assert!(inventory.devices()[0].submodels.is_empty());
        assert_eq!(
            inventory.devices()[1].submodels,
            vec![
                PathBuf::from("/data/aas/edge-02.aasx"),
                PathBuf::from("/abs/extra.aasx")
            ]
        );
    }

    #[test]
    fn test_missing_capability_columns_mean_no() {
        let sheet = "\
UUID,hostname,eth0 IP,eth1 IP,user,password,is_resource
3fa85f64-5717-4562-b3fc-2c963f66afa6,edge-01,10.0.0.5,-,pi,secret,yes
";
        let inventory = parse(sheet).unwrap();
        assert!(inventory.devices()[0].capabilities.is_empty());
    }

    #[test]
    fn test_invalid_uuid_on_resource_row_is_rejected() {
        let sheet = "\
UUID,hostname,eth0 IP,eth1 IP,user,password,is_resource
not-a-uuid,edge-01,10.0.0.5,-,pi,secret,yes
";
        let err = parse(sheet).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_invalid_uuid_on_other_rows_is_tolerated() {
        let sheet = "\
UUID,hostname,eth0 IP,eth1 IP,user,password,is_resource
-,patch-panel,-,-,,,no
";
        let inventory = parse(sheet).unwrap();
        assert!(inventory.devices().is_empty());
        assert!(inventory.known_ids().is_empty());
    }

    #[test]
    fn test_missing_required_column() {
        let sheet = "hostname,is_resource\nedge,yes\n";
        let err = parse(sheet).unwrap_err();
        assert!(err.to_string().contains("UUID"));
    }

    #[test]
    fn test_device_without_address_keeps_eth1_value() {
        let sheet = "\
UUID,hostname,eth0 IP,eth1 IP,is_resource
3fa85f64-5717-4562-b3fc-2c963f66afa6,edge-01,-,-,yes
1b4e28ba-2fa1-11d2-883f-0016d3cca427,edge-02,,,yes
";
        let inventory = parse(sheet).unwrap();
        assert_eq!(inventory.devices().len(), 2);
        assert_eq!(inventory.devices()[0].ip, "-");
        assert_eq!(inventory.devices()[1].ip, "");
    }

    #[test]
    fn test_capability_columns_found_by_header_name() {
        let sheet = "\
DC_K3S,UUID,hostname,eth0 IP,is_resource,DC_Docker
yes,3fa85f64-5717-4562-b3fc-2c963f66afa6,edge-01,10.0.0.5,yes,YES
";
        let inventory = parse(sheet).unwrap();
        assert_eq!(
            inventory.devices()[0].capabilities,
            vec![Capability::Docker, Capability::K3s]
        );
    }

    #[test]
    fn test_to_item_defaults_port_zero() {
        let inventory = parse(SHEET).unwrap();
        let item = inventory.devices()[0].to_item();
        assert_eq!(item.resource_connection_port, 0);
        assert_eq!(item.resource_hostname, "edge-01");
        assert_eq!(item.resource_username.as_deref(), Some("pi"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Inventory::load(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, RegistryError::InventoryNotFound(_)));
    }
}
