//! Icon categories for scene nodes.
//!
//! Categories are cosmetic: they pick the glyph drawn above a node label and the provider
//! metadata emitted into DOT output. They carry no behavior.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Azure,
    OnPrem,
    Generic,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Azure => "azure",
            Provider::OnPrem => "onprem",
            Provider::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconCategory {
    Vm,
    VmWindows,
    Disks,
    CloudServicesClassic,
    HostPool,
    Workspace,
    ApplicationGroup,
    VirtualNetworks,
    Subnets,
    NetworkSecurityGroupsClassic,
    ResourceGroups,
    Users,
    User,
    ClientUsers,
    #[default]
    Blank,
}

impl IconCategory {
    pub const ALL: [IconCategory; 15] = [
        IconCategory::Vm,
        IconCategory::VmWindows,
        IconCategory::Disks,
        IconCategory::CloudServicesClassic,
        IconCategory::HostPool,
        IconCategory::Workspace,
        IconCategory::ApplicationGroup,
        IconCategory::VirtualNetworks,
        IconCategory::Subnets,
        IconCategory::NetworkSecurityGroupsClassic,
        IconCategory::ResourceGroups,
        IconCategory::Users,
        IconCategory::User,
        IconCategory::ClientUsers,
        IconCategory::Blank,
    ];

    pub fn provider(&self) -> Provider {
        match self {
            IconCategory::User | IconCategory::ClientUsers => Provider::OnPrem,
            IconCategory::Blank => Provider::Generic,
            _ => Provider::Azure,
        }
    }

    /// Resource family within the provider (`compute`, `network`, ...).
    pub fn resource(&self) -> &'static str {
        match self {
            IconCategory::Vm
            | IconCategory::VmWindows
            | IconCategory::Disks
            | IconCategory::CloudServicesClassic
            | IconCategory::HostPool
            | IconCategory::Workspace
            | IconCategory::ApplicationGroup => "compute",
            IconCategory::VirtualNetworks
            | IconCategory::Subnets
            | IconCategory::NetworkSecurityGroupsClassic => "network",
            IconCategory::ResourceGroups => "general",
            IconCategory::Users => "identity",
            IconCategory::User | IconCategory::ClientUsers => "client",
            IconCategory::Blank => "blank",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            IconCategory::Vm => "vm",
            IconCategory::VmWindows => "vm-windows",
            IconCategory::Disks => "disks",
            IconCategory::CloudServicesClassic => "cloud-services-classic",
            IconCategory::HostPool => "host-pool",
            IconCategory::Workspace => "workspace",
            IconCategory::ApplicationGroup => "application-group",
            IconCategory::VirtualNetworks => "virtual-networks",
            IconCategory::Subnets => "subnets",
            IconCategory::NetworkSecurityGroupsClassic => "network-security-groups-classic",
            IconCategory::ResourceGroups => "resource-groups",
            IconCategory::Users => "users",
            IconCategory::User => "user",
            IconCategory::ClientUsers => "client-users",
            IconCategory::Blank => "blank",
        }
    }

    /// Dotted path used as the DOT `class` hint, e.g. `azure.network.subnets`.
    pub fn qualified_name(&self) -> String {
        format!(
            "{}.{}.{}",
            self.provider().as_str(),
            self.resource(),
            self.name()
        )
    }
}

impl std::str::FromStr for IconCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        IconCategory::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or(())
    }
}
