//! Deployment capability catalog of the registry.

use std::fmt;

/// Deployment capabilities known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Dummy,
    Docker,
    TransferApp,
    DockerSwarm,
    K3s,
    Kubernetes,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Dummy,
        Capability::Docker,
        Capability::TransferApp,
        Capability::DockerSwarm,
        Capability::K3s,
        Capability::Kubernetes,
    ];

    /// Registry-side capability id.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Capability::Dummy => "2c8cafe5-1155-471c-9639-0db48ec249eb",
            Capability::Docker => "08c5b8de-5d4a-4116-a73f-1d1f616c7c70",
            Capability::TransferApp => "110d43ff-f351-4e55-92c0-77625875ce6e",
            Capability::DockerSwarm => "5dcb8fc8-556b-4735-9c80-fce546e7bd7a",
            Capability::K3s => "21afb100-01f9-4915-9c8c-bf9afc032c01",
            Capability::Kubernetes => "a2ae8818-09ae-4e86-8e5a-2effb1122fa6",
        }
    }

    /// Name as reported by the registry's deployment-capabilities listing.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Dummy => "DUMMY",
            Capability::Docker => "DOCKER",
            Capability::TransferApp => "TRANSFERAPP",
            Capability::DockerSwarm => "DOCKER_SWARM",
            Capability::K3s => "K3S",
            Capability::Kubernetes => "KUBERNETES",
        }
    }

    /// Whether the setup flow may attach this capability to a resource.
    #[must_use]
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Capability::Kubernetes)
    }

    /// Names of all assignable capabilities, for error messages.
    #[must_use]
    pub fn assignable_names() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .filter(|c| c.is_assignable())
            .map(Capability::name)
            .collect()
    }

    /// Inventory column that requests this capability, if any.
    #[must_use]
    pub fn inventory_column(&self) -> Option<&'static str> {
        match self {
            Capability::Docker => Some("DC_Docker"),
            Capability::TransferApp => Some("DC_Transferapp"),
            Capability::DockerSwarm => Some("DC_Swarm"),
            Capability::K3s => Some("DC_K3S"),
            Capability::Dummy | Capability::Kubernetes => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kubernetes_is_not_assignable() {
        assert!(!Capability::Kubernetes.is_assignable());
        assert_eq!(
            Capability::assignable_names(),
            vec!["DUMMY", "DOCKER", "TRANSFERAPP", "DOCKER_SWARM", "K3S"]
        );
    }

    #[test]
    fn test_inventory_columns_in_sheet_order() {
        let columns: Vec<&str> = Capability::ALL
            .iter()
            .filter_map(Capability::inventory_column)
            .collect();
        assert_eq!(columns, vec!["DC_Docker", "DC_Transferapp", "DC_Swarm", "DC_K3S"]);
        assert_eq!(Capability::Kubernetes.inventory_column(), None);
    }

    #[test]
    fn test_display_uses_registry_name() {
        assert_eq!(Capability::DockerSwarm.to_string(), "DOCKER_SWARM");
    }
}
