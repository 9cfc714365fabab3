// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider-neutral template for a new node. Inert data: the compute
//! provider interprets it, the engine only carries it around.

use serde::{Deserialize, Serialize};

/// Template for provisioning a node: image, hardware, network, location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<HardwareSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HardwareSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_cores: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ram_mb: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkSpec {
    #[serde(default)]
    pub inbound_ports: Vec<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl NodeSpec {
    pub fn with_image(mut self, image: ImageSpec) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_hardware(mut self, hardware: HardwareSpec) -> Self {
        self.hardware = Some(hardware);
        self
    }

    pub fn with_network(mut self, network: NetworkSpec) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_location(mut self, location: LocationSpec) -> Self {
        self.location = Some(location);
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        *self == NodeSpec::default()
    }

    /// Overlay `child` over this spec: each top-level section set on the
    /// child replaces the parent's section wholesale (scalars overwrite).
    pub fn overlaid_with(&self, child: &NodeSpec) -> NodeSpec {
        NodeSpec {
            image: child.image.clone().or_else(|| self.image.clone()),
            hardware: child.hardware.clone().or_else(|| self.hardware.clone()),
            network: child.network.clone().or_else(|| self.network.clone()),
            location: child.location.clone().or_else(|| self.location.clone()),
        }
    }
}

impl ImageSpec {
    pub fn id(image_id: impl Into<String>) -> Self {
        Self { image_id: Some(image_id.into()), os_family: None, os_version: None }
    }

    pub fn os(family: impl Into<String>, version: impl Into<String>) -> Self {
        Self { image_id: None, os_family: Some(family.into()), os_version: Some(version.into()) }
    }
}

#[cfg(test)]
#[path = "node_spec_tests.rs"]
mod tests;
