// SPDX-License-Identifier: GPL-3.0-only
//! GPU identification

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::bus::RegisterBus;
use super::connector::Connector;

/// GPU architecture generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipsetFamily {
    /// NV40 / GeForce 6 and 7
    Curie,
    /// NV50 / G8x-GT2xx
    Tesla,
    Fermi,
    Kepler,
    Maxwell,
    /// Anything without a backlight codec here
    Other,
}

impl ChipsetFamily {
    /// Whether the backlight lives in the NV50-style display engine
    pub fn has_pdisp_pwm(self) -> bool {
        matches!(
            self,
            ChipsetFamily::Tesla
                | ChipsetFamily::Fermi
                | ChipsetFamily::Kepler
                | ChipsetFamily::Maxwell
        )
    }
}

impl fmt::Display for ChipsetFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChipsetFamily::Curie => "curie",
            ChipsetFamily::Tesla => "tesla",
            ChipsetFamily::Fermi => "fermi",
            ChipsetFamily::Kepler => "kepler",
            ChipsetFamily::Maxwell => "maxwell",
            ChipsetFamily::Other => "other",
        };
        f.write_str(name)
    }
}

impl FromStr for ChipsetFamily {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "curie" => Ok(ChipsetFamily::Curie),
            "tesla" => Ok(ChipsetFamily::Tesla),
            "fermi" => Ok(ChipsetFamily::Fermi),
            "kepler" => Ok(ChipsetFamily::Kepler),
            "maxwell" => Ok(ChipsetFamily::Maxwell),
            "other" => Ok(ChipsetFamily::Other),
            _ => Err(anyhow::anyhow!("unknown chipset family {s:?}")),
        }
    }
}

/// PCI identification of the GPU function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PciIds {
    pub vendor: u16,
    pub device: u16,
    pub subsystem_vendor: u16,
    pub subsystem_device: u16,
}

impl PciIds {
    /// Match on device id plus subsystem vendor/device
    pub fn matches(&self, device: u16, subsystem_vendor: u16, subsystem_device: u16) -> bool {
        self.device == device
            && self.subsystem_vendor == subsystem_vendor
            && self.subsystem_device == subsystem_device
    }
}

/// Static device information reported by the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub family: ChipsetFamily,
    /// Chipset number, e.g. 0xa3 for GT215
    pub chipset: u32,
    pub pci: PciIds,
}

/// The parts of a GPU driver instance the backlight code looks at
#[derive(Debug, Clone)]
pub struct GpuDevice {
    pub info: DeviceInfo,
    pub bus: Arc<dyn RegisterBus>,
    /// Connectors in mode-config order
    pub connectors: Vec<Connector>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_parse() {
        assert_eq!("Kepler".parse::<ChipsetFamily>().unwrap(), ChipsetFamily::Kepler);
        assert_eq!("curie".parse::<ChipsetFamily>().unwrap(), ChipsetFamily::Curie);
        assert!("volta".parse::<ChipsetFamily>().is_err());
    }

    #[test]
    fn test_pdisp_families() {
        assert!(!ChipsetFamily::Curie.has_pdisp_pwm());
        assert!(ChipsetFamily::Fermi.has_pdisp_pwm());
        assert!(ChipsetFamily::Maxwell.has_pdisp_pwm());
        assert!(!ChipsetFamily::Other.has_pdisp_pwm());
    }

    #[test]
    fn test_pci_match_ignores_vendor() {
        let pci = PciIds {
            vendor: 0x10de,
            device: 0x0867,
            subsystem_vendor: 0x106b,
            subsystem_device: 0x00ad,
        };
        assert!(pci.matches(0x0867, 0x106b, 0x00ad));
        assert!(!pci.matches(0x0867, 0x106b, 0x00ae));
    }
}
