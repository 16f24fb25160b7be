// SPDX-License-Identifier: GPL-3.0-only
//! Machine description for the `nv-backlight` tool
//!
//! Describes a GPU in KDL so the backlight code can be exercised without
//! hardware:
//!
//! ```kdl
//! gpu family="kepler" chipset=0xe7 {
//!     pci vendor=0x10de device=0x0fd1 subsystem-vendor=0x1043 subsystem-device=0x1507
//! }
//! register 0x61c080 0x4b0
//! register 0x61c084 0xc0000258
//! connector "eDP-1" type="edp" {
//!     encoder type="dp" or=0
//! }
//! ```
//!
//! A bare `gmux` node marks a competing backlight controller as present.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use kdl::{KdlDocument, KdlNode};

use crate::gpu::regs::{
    NV50_PDISP_SOR_PWM_CTL_NEW, NVA3_PDISP_SOR_PWM_CTL_UNK, nv50_pdisp_sor_pwm_ctl,
    nv50_pdisp_sor_pwm_div,
};
use crate::gpu::{
    ChipsetFamily, Connector, ConnectorType, DeviceInfo, GpuDevice, MemoryRegisterBus, PciIds,
    StaticProbe,
};

pub const CONFIG_DIR: &str = "nv-backlight";
pub const MACHINE_FILE: &str = "machine.kdl";

/// A simulated machine: GPU identity, register contents and connectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    pub info: DeviceInfo,
    pub gmux: bool,
    /// Initial register values as `(addr, value)`
    pub registers: Vec<(u32, u32)>,
    pub connectors: Vec<Connector>,
}

impl MachineConfig {
    /// `$XDG_CONFIG_HOME/nv-backlight/machine.kdl`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(MACHINE_FILE))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid machine description {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let doc: KdlDocument = text.parse().context("failed to parse KDL")?;

        let mut info = None;
        let mut gmux = false;
        let mut registers = Vec::new();
        let mut connectors = Vec::new();

        for node in doc.nodes() {
            match node.name().value() {
                "gpu" => info = Some(parse_gpu(node)?),
                "gmux" => gmux = true,
                "register" => {
                    let addr = int_arg(node, 0)?.context("register needs an address")?;
                    let value = int_arg(node, 1)?.context("register needs a value")?;
                    registers.push((addr, value));
                }
                "connector" => connectors.push(parse_connector(node)?),
                other => warn!("ignoring unknown machine node {:?}", other),
            }
        }

        Ok(Self {
            info: info.context("missing gpu node")?,
            gmux,
            registers,
            connectors,
        })
    }

    /// GK107 laptop with an eDP panel on SOR 0 at half brightness
    pub fn builtin() -> Self {
        Self {
            info: DeviceInfo {
                family: ChipsetFamily::Kepler,
                chipset: 0xe7,
                pci: PciIds {
                    vendor: 0x10de,
                    device: 0x0fd1,
                    subsystem_vendor: 0x1043,
                    subsystem_device: 0x1507,
                },
            },
            gmux: false,
            registers: vec![
                (nv50_pdisp_sor_pwm_div(0), 0x4b0),
                (
                    nv50_pdisp_sor_pwm_ctl(0),
                    NV50_PDISP_SOR_PWM_CTL_NEW | NVA3_PDISP_SOR_PWM_CTL_UNK | 0x258,
                ),
            ],
            connectors: vec![
                Connector::new("eDP-1", ConnectorType::Edp)
                    .with_encoder(crate::gpu::OutputType::Dp, 0),
                Connector::new("HDMI-A-1", ConnectorType::Hdmi)
                    .with_encoder(crate::gpu::OutputType::Tmds, 1),
            ],
        }
    }

    /// Build the simulated GPU and platform probe
    pub fn into_gpu(self) -> (GpuDevice, StaticProbe) {
        let gpu = GpuDevice {
            info: self.info,
            bus: Arc::new(MemoryRegisterBus::with_registers(self.registers)),
            connectors: self.connectors,
        };
        (gpu, StaticProbe::new(self.gmux))
    }
}

fn parse_gpu(node: &KdlNode) -> Result<DeviceInfo> {
    let family = str_prop(node, "family")?
        .context("gpu needs a family")?
        .parse::<ChipsetFamily>()?;
    let chipset = int_prop(node, "chipset")?.context("gpu needs a chipset")?;

    let mut pci = PciIds::default();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() != "pci" {
                continue;
            }
            pci = PciIds {
                vendor: u16_prop(child, "vendor")?,
                device: u16_prop(child, "device")?,
                subsystem_vendor: u16_prop(child, "subsystem-vendor")?,
                subsystem_device: u16_prop(child, "subsystem-device")?,
            };
        }
    }

    Ok(DeviceInfo {
        family,
        chipset,
        pci,
    })
}

fn parse_connector(node: &KdlNode) -> Result<Connector> {
    let name = node
        .entry(0usize)
        .and_then(|e| e.value().as_string())
        .context("connector needs a name")?;
    let kind = str_prop(node, "type")?
        .with_context(|| format!("connector {name} needs a type"))?
        .parse::<ConnectorType>()?;

    let mut connector = Connector::new(name, kind);
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() != "encoder" {
                continue;
            }
            let output = str_prop(child, "type")?
                .with_context(|| format!("encoder on {name} needs a type"))?
                .parse()?;
            let or = int_prop(child, "or")?.unwrap_or(0);
            connector = connector.with_encoder(output, or);
        }
    }
    Ok(connector)
}

fn str_prop<'a>(node: &'a KdlNode, key: &str) -> Result<Option<&'a str>> {
    match node.entry(key) {
        None => Ok(None),
        Some(entry) => entry
            .value()
            .as_string()
            .map(Some)
            .ok_or_else(|| anyhow!("{}: {key} must be a string", node.name().value())),
    }
}

fn int_prop(node: &KdlNode, key: &str) -> Result<Option<u32>> {
    match node.entry(key) {
        None => Ok(None),
        Some(entry) => to_u32(node, key, entry.value().as_integer()).map(Some),
    }
}

fn int_arg(node: &KdlNode, index: usize) -> Result<Option<u32>> {
    match node.entry(index) {
        None => Ok(None),
        Some(entry) => to_u32(node, &index.to_string(), entry.value().as_integer()).map(Some),
    }
}

fn u16_prop(node: &KdlNode, key: &str) -> Result<u16> {
    let value = int_prop(node, key)?.unwrap_or(0);
    u16::try_from(value).map_err(|_| anyhow!("pci {key} {value:#x} does not fit 16 bits"))
}

fn to_u32(node: &KdlNode, key: &str, value: Option<i128>) -> Result<u32> {
    let Some(value) = value else {
        bail!("{}: {key} must be an integer", node.name().value());
    };
    u32::try_from(value)
        .map_err(|_| anyhow!("{}: {key} value {value} does not fit 32 bits", node.name().value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{OutputType, RegisterBus};

    const IMAC: &str = r#"
gpu family="tesla" chipset=0xac {
    pci vendor=0x10de device=0x0867 subsystem-vendor=0x106b subsystem-device=0x00ad
}
register 0x61c084 0x80000200
connector "VGA-1" type="vga"
connector "LVDS-1" type="lvds" {
    encoder type="lvds" or=0
}
"#;

    #[test]
    fn test_parse_machine() {
        let machine = MachineConfig::parse(IMAC).unwrap();
        assert_eq!(machine.info.family, ChipsetFamily::Tesla);
        assert_eq!(machine.info.chipset, 0xac);
        assert_eq!(machine.info.pci.subsystem_vendor, 0x106b);
        assert_eq!(machine.info.pci.subsystem_device, 0x00ad);
        assert!(!machine.gmux);
        assert_eq!(machine.registers, vec![(0x61c084, 0x8000_0200)]);
        assert_eq!(machine.connectors.len(), 2);
        assert_eq!(machine.connectors[1].kind, ConnectorType::Lvds);
        assert_eq!(
            machine.connectors[1].find_encoder(OutputType::Lvds).map(|e| e.or),
            Some(0)
        );
    }

    #[test]
    fn test_gmux_node() {
        let machine = MachineConfig::parse("gpu family=\"fermi\" chipset=0xc3\ngmux\n").unwrap();
        assert!(machine.gmux);
        assert!(machine.connectors.is_empty());
    }

    #[test]
    fn test_missing_gpu() {
        assert!(MachineConfig::parse("connector \"eDP-1\" type=\"edp\"\n").is_err());
    }

    #[test]
    fn test_bad_values() {
        assert!(MachineConfig::parse("gpu family=\"volta\" chipset=0x140\n").is_err());
        assert!(MachineConfig::parse("gpu family=\"kepler\" chipset=\"gk107\"\n").is_err());
        assert!(MachineConfig::parse("gpu family=\"kepler\" chipset=0x1ffffffff\n").is_err());
    }

    #[test]
    fn test_builtin_machine() {
        let (gpu, probe) = MachineConfig::builtin().into_gpu();
        assert_eq!(gpu.info.family, ChipsetFamily::Kepler);
        assert!(!crate::gpu::PlatformProbe::competing_controller_present(&probe));
        assert_eq!(gpu.bus.rd32(nv50_pdisp_sor_pwm_div(0)), 0x4b0);
    }
}
