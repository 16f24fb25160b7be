// SPDX-License-Identifier: GPL-3.0-only
//! Display connectors and the encoders behind them

use std::fmt;
use std::str::FromStr;

/// Connector type as reported by mode setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorType {
    Vga,
    Dvi,
    Hdmi,
    DisplayPort,
    /// Internal LVDS panel
    Lvds,
    /// Embedded DisplayPort panel
    Edp,
    Tv,
}

impl ConnectorType {
    /// Internal panels are the only connectors that can own a backlight
    pub fn is_panel(self) -> bool {
        matches!(self, ConnectorType::Lvds | ConnectorType::Edp)
    }
}

impl FromStr for ConnectorType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vga" => Ok(ConnectorType::Vga),
            "dvi" => Ok(ConnectorType::Dvi),
            "hdmi" => Ok(ConnectorType::Hdmi),
            "dp" | "displayport" => Ok(ConnectorType::DisplayPort),
            "lvds" => Ok(ConnectorType::Lvds),
            "edp" => Ok(ConnectorType::Edp),
            "tv" => Ok(ConnectorType::Tv),
            _ => Err(anyhow::anyhow!("unknown connector type {s:?}")),
        }
    }
}

/// DCB output type of an encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Analog,
    Tv,
    Tmds,
    Lvds,
    Dp,
}

impl FromStr for OutputType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "analog" | "crt" => Ok(OutputType::Analog),
            "tv" => Ok(OutputType::Tv),
            "tmds" => Ok(OutputType::Tmds),
            "lvds" => Ok(OutputType::Lvds),
            "dp" => Ok(OutputType::Dp),
            _ => Err(anyhow::anyhow!("unknown output type {s:?}")),
        }
    }
}

/// Display encoder attached to a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
    pub output: OutputType,
    /// Output resource index used to address per-SOR registers
    pub or: u32,
}

/// Display connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    pub name: String,
    pub kind: ConnectorType,
    pub encoders: Vec<Encoder>,
}

impl Connector {
    pub fn new(name: impl Into<String>, kind: ConnectorType) -> Self {
        Self {
            name: name.into(),
            kind,
            encoders: Vec::new(),
        }
    }

    pub fn with_encoder(mut self, output: OutputType, or: u32) -> Self {
        self.encoders.push(Encoder { output, or });
        self
    }

    /// First encoder of the given output type
    pub fn find_encoder(&self, output: OutputType) -> Option<&Encoder> {
        self.encoders.iter().find(|e| e.output == output)
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
