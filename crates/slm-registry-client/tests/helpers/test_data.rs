//! Inventory and registry fixtures.

#![allow(dead_code)]

use serde_json::{json, Value};
use slm_registry_client::inventory::Inventory;
use std::path::Path;
use uuid::Uuid;

pub const HEADER: &str =
    "UUID,hostname,eth0 IP,eth1 IP,user,password,is_resource,DC_Docker,DC_Transferapp,DC_Swarm,DC_K3S,submodels";

/// One inventory row for a resource device.
pub struct DeviceRow {
    pub id: Uuid,
    pub hostname: String,
    pub docker: bool,
    pub swarm: bool,
    pub submodels: String,
}

impl DeviceRow {
    pub fn new(hostname: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            hostname: hostname.to_string(),
            docker: false,
            swarm: false,
            submodels: String::new(),
        }
    }

    pub fn with_docker(mut self) -> Self {
        self.docker = true;
        self
    }

    pub fn with_swarm(mut self) -> Self {
        self.swarm = true;
        self
    }

    pub fn with_submodels(mut self, submodels: &str) -> Self {
        self.submodels = submodels.to_string();
        self
    }

    fn csv_line(&self) -> String {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        format!(
            "{},{},10.0.0.10,-,pi,secret,yes,{},no,{},no,{}",
            self.id,
            self.hostname,
            yes_no(self.docker),
            yes_no(self.swarm),
            self.submodels
        )
    }

    /// Registry listing entry for this device.
    pub fn as_registered(&self) -> Value {
        registered(self.id, &self.hostname)
    }
}

pub fn registered(id: Uuid, hostname: &str) -> Value {
    json!({ "id": id, "hostname": hostname, "ip": "10.0.0.10" })
}

pub fn inventory_csv(rows: &[DeviceRow], extra_lines: &[&str]) -> String {
    let mut csv = String::from(HEADER);
    csv.push('\n');
    for row in rows {
        csv.push_str(&row.csv_line());
        csv.push('\n');
    }
    for line in extra_lines {
        csv.push_str(line);
        csv.push('\n');
    }
    csv
}

pub fn inventory(rows: &[DeviceRow]) -> Inventory {
    inventory_with(rows, &[], Path::new("."))
}

pub fn inventory_with(rows: &[DeviceRow], extra_lines: &[&str], base_dir: &Path) -> Inventory {
    let csv = inventory_csv(rows, extra_lines);
    Inventory::from_reader(csv.as_bytes(), base_dir).expect("valid inventory fixture")
}
