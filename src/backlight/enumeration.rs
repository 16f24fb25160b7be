// SPDX-License-Identifier: GPL-3.0-only
//! Backlight connector selection
//!
//! Walks the connector list for the first internal panel, then picks the
//! codec for the chipset generation. Only that first panel is considered:
//! a GPU drives at most one backlight device.

use std::sync::Arc;

use super::backend::{BacklightHandle, BacklightOps, BacklightProperties, BacklightService};
use crate::codecs::{
    BrightnessCodec, CurieCodec, IntensityCodec, KeplerCodec, QuirkCodec, TeslaCodec,
};
use crate::devices;
use crate::error::{BacklightError, Result};
use crate::gpu::regs::nv50_pdisp_sor_pwm_ctl;
use crate::gpu::{ChipsetFamily, Connector, DeviceInfo, GpuDevice, OutputType};
use crate::identity::{BacklightConnector, IdentityAllocator};

/// Last chipset of the fixed-divisor PWM design
const NV50_LAST_CHIPSET: u32 = 0xa0;

/// IGPs numbered after GT215 that still have the old PWM
const NV50_LATE_IGPS: [u32; 2] = [0xaa, 0xac];

/// How a backlight init ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A device was registered under this name
    Registered { name: String },
    /// Another controller owns the backlight
    CompetingController,
    /// No LVDS or eDP connector
    NoPanel,
    /// Firmware left the backlight register at zero
    BacklightOff,
    /// No codec for this chipset generation
    UnsupportedChipset,
    /// The name pool is exhausted; nothing was registered
    NoIdentity,
}

/// Result of a connector scan
#[derive(Debug)]
pub enum Scan<'a> {
    /// Register a device for this connector with this codec
    Found {
        connector: &'a Connector,
        codec: BrightnessCodec,
    },
    /// Nothing to register
    Done(InitOutcome),
}

/// A registered device and its claim on a name
#[derive(Debug)]
pub struct Registration {
    pub record: BacklightConnector,
    pub handle: BacklightHandle,
}

/// First connector that can own a backlight
pub fn find_panel(connectors: &[Connector]) -> Option<&Connector> {
    connectors.iter().find(|c| c.kind.is_panel())
}

/// Find the panel and the codec that drives it
pub fn scan(gpu: &GpuDevice) -> Result<Scan<'_>> {
    let Some(connector) = find_panel(&gpu.connectors) else {
        debug!("no LVDS or eDP connector, skipping backlight");
        return Ok(Scan::Done(InitOutcome::NoPanel));
    };

    let codec = match gpu.info.family {
        ChipsetFamily::Curie => {
            if !CurieCodec::is_enabled(gpu.bus.as_ref()) {
                debug!(connector = %connector, "nv40 backlight field is zero");
                return Ok(Scan::Done(InitOutcome::BacklightOff));
            }
            BrightnessCodec::Curie(CurieCodec)
        }
        family if family.has_pdisp_pwm() => {
            let encoder = connector
                .find_encoder(OutputType::Lvds)
                .or_else(|| connector.find_encoder(OutputType::Dp))
                .ok_or_else(|| BacklightError::EncoderNotFound {
                    connector: connector.name.clone(),
                })?;

            let ctl = gpu.bus.rd32(nv50_pdisp_sor_pwm_ctl(encoder.or));
            if ctl == 0 {
                debug!(connector = %connector, or = encoder.or, "PWM control is zero");
                return Ok(Scan::Done(InitOutcome::BacklightOff));
            }
            pdisp_codec(&gpu.info, encoder.or)
        }
        family => {
            debug!(%family, "no backlight support for chipset family");
            return Ok(Scan::Done(InitOutcome::UnsupportedChipset));
        }
    };

    Ok(Scan::Found { connector, codec })
}

/// Codec for the NV50-style display PWM on output `or`
pub fn pdisp_codec(info: &DeviceInfo, or: u32) -> BrightnessCodec {
    if info.chipset <= NV50_LAST_CHIPSET || NV50_LATE_IGPS.contains(&info.chipset) {
        match devices::get_device_spec(&info.pci) {
            Some(spec) => {
                info!(machine = spec.name, "using machine-specific backlight range");
                BrightnessCodec::Quirk(QuirkCodec::new(or, spec))
            }
            None => BrightnessCodec::Tesla(TeslaCodec::new(or)),
        }
    } else {
        BrightnessCodec::Kepler(KeplerCodec::new(or))
    }
}

/// Name and register a device for `connector`
///
/// Returns `Ok(None)` when no name is available; that is logged and not
/// treated as a failure. If the service refuses the device, the name is
/// given back before the error is returned.
pub fn register(
    ida: &Arc<IdentityAllocator>,
    service: &dyn BacklightService,
    gpu: &GpuDevice,
    connector: &Connector,
    codec: BrightnessCodec,
) -> Result<Option<Registration>> {
    let props = BacklightProperties::raw(codec.max_brightness());

    let (record, name) = match BacklightConnector::allocate(ida) {
        Ok(allocated) => allocated,
        Err(e) => {
            error!("Failed to retrieve a unique name for the backlight interface: {}", e);
            return Ok(None);
        }
    };

    let ops = BacklightOps::new(codec, Arc::clone(&gpu.bus));
    let handle = match service.register(&name, Some(connector.name.as_str()), ops, props) {
        Ok(handle) => handle,
        Err(source) => {
            drop(record);
            return Err(BacklightError::Registration { name, source });
        }
    };

    info!(
        device = %name,
        connector = %connector,
        codec = codec.name(),
        max_brightness = props.max_brightness,
        "registered backlight"
    );
    Ok(Some(Registration { record, handle }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::apple;
    use crate::gpu::regs::NV40_PMC_BACKLIGHT;
    use crate::gpu::{ConnectorType, MemoryRegisterBus, PciIds};

    fn info(family: ChipsetFamily, chipset: u32) -> DeviceInfo {
        DeviceInfo {
            family,
            chipset,
            pci: PciIds::default(),
        }
    }

    fn gpu(info: DeviceInfo, regs: Vec<(u32, u32)>, connectors: Vec<Connector>) -> GpuDevice {
        GpuDevice {
            info,
            bus: Arc::new(MemoryRegisterBus::with_registers(regs)),
            connectors,
        }
    }

    fn edp(or: u32) -> Connector {
        Connector::new("eDP-1", ConnectorType::Edp).with_encoder(OutputType::Dp, or)
    }

    #[test]
    fn test_find_panel_skips_external() {
        let connectors = vec![
            Connector::new("HDMI-A-1", ConnectorType::Hdmi),
            Connector::new("LVDS-1", ConnectorType::Lvds),
            Connector::new("eDP-1", ConnectorType::Edp),
        ];
        assert_eq!(find_panel(&connectors).map(|c| c.name.as_str()), Some("LVDS-1"));
        assert!(find_panel(&connectors[..1]).is_none());
    }

    #[test]
    fn test_no_panel() {
        let gpu = gpu(
            info(ChipsetFamily::Kepler, 0xe7),
            vec![],
            vec![Connector::new("DP-1", ConnectorType::DisplayPort).with_encoder(OutputType::Dp, 0)],
        );
        assert!(matches!(scan(&gpu).unwrap(), Scan::Done(InitOutcome::NoPanel)));
    }

    #[test]
    fn test_curie_off_and_on() {
        let off = gpu(info(ChipsetFamily::Curie, 0x46), vec![], vec![edp(0)]);
        assert!(matches!(scan(&off).unwrap(), Scan::Done(InitOutcome::BacklightOff)));

        let on = gpu(
            info(ChipsetFamily::Curie, 0x46),
            vec![(NV40_PMC_BACKLIGHT, 0x000f_0000)],
            vec![Connector::new("LVDS-1", ConnectorType::Lvds)],
        );
        match scan(&on).unwrap() {
            Scan::Found { connector, codec } => {
                assert_eq!(connector.name, "LVDS-1");
                assert_eq!(codec, BrightnessCodec::Curie(CurieCodec));
            }
            other => panic!("unexpected scan result {other:?}"),
        }
    }

    #[test]
    fn test_missing_encoder() {
        let gpu = gpu(
            info(ChipsetFamily::Fermi, 0xc3),
            vec![],
            vec![Connector::new("LVDS-1", ConnectorType::Lvds).with_encoder(OutputType::Tmds, 0)],
        );
        let err = scan(&gpu).unwrap_err();
        assert!(matches!(err, BacklightError::EncoderNotFound { connector } if connector == "LVDS-1"));
    }

    #[test]
    fn test_lvds_encoder_preferred() {
        let connector = Connector::new("LVDS-1", ConnectorType::Lvds)
            .with_encoder(OutputType::Dp, 3)
            .with_encoder(OutputType::Lvds, 1);
        let gpu = gpu(
            info(ChipsetFamily::Tesla, 0x86),
            vec![(nv50_pdisp_sor_pwm_ctl(1), 0x400)],
            vec![connector],
        );
        match scan(&gpu).unwrap() {
            Scan::Found { codec, .. } => {
                assert_eq!(codec, BrightnessCodec::Tesla(TeslaCodec::new(1)));
            }
            other => panic!("unexpected scan result {other:?}"),
        }
    }

    #[test]
    fn test_pwm_off() {
        let gpu = gpu(info(ChipsetFamily::Kepler, 0xe7), vec![], vec![edp(0)]);
        assert!(matches!(scan(&gpu).unwrap(), Scan::Done(InitOutcome::BacklightOff)));
    }

    #[test]
    fn test_unsupported_family() {
        let gpu = gpu(info(ChipsetFamily::Other, 0x140), vec![], vec![edp(0)]);
        assert!(matches!(
            scan(&gpu).unwrap(),
            Scan::Done(InitOutcome::UnsupportedChipset)
        ));
    }

    #[test]
    fn test_chipset_boundary() {
        let tesla = |chipset| pdisp_codec(&info(ChipsetFamily::Tesla, chipset), 0);
        assert_eq!(tesla(0x50), BrightnessCodec::Tesla(TeslaCodec::new(0)));
        assert_eq!(tesla(0xa0), BrightnessCodec::Tesla(TeslaCodec::new(0)));
        assert_eq!(tesla(0xaa), BrightnessCodec::Tesla(TeslaCodec::new(0)));
        assert_eq!(tesla(0xac), BrightnessCodec::Tesla(TeslaCodec::new(0)));
        assert_eq!(tesla(0xa3), BrightnessCodec::Kepler(KeplerCodec::new(0)));
        assert_eq!(tesla(0xaf), BrightnessCodec::Kepler(KeplerCodec::new(0)));
        assert_eq!(
            pdisp_codec(&info(ChipsetFamily::Maxwell, 0x117), 2),
            BrightnessCodec::Kepler(KeplerCodec::new(2))
        );
    }

    #[test]
    fn test_imac91_quirk() {
        let mut imac = info(ChipsetFamily::Tesla, 0xac);
        imac.pci = PciIds {
            vendor: 0x10de,
            device: apple::imac91::PCI_DEVICE,
            subsystem_vendor: apple::VENDOR_ID,
            subsystem_device: apple::imac91::SUBSYSTEM_DEVICE,
        };
        let codec = pdisp_codec(&imac, 0);
        assert_eq!(codec, BrightnessCodec::Quirk(QuirkCodec::new(0, apple::imac91::SPEC)));
        assert_eq!(codec.max_brightness(), 0x401 - 0x92);

        // same board ids on a GT215+ part get the generic codec
        imac.chipset = 0xa3;
        assert_eq!(pdisp_codec(&imac, 0), BrightnessCodec::Kepler(KeplerCodec::new(0)));
    }
}
