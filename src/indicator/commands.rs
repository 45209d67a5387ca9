// src/indicator/commands.rs

//! Cooler LED command tables.
//!
//! Each status maps to one command per zone (`logo`, `fan`, `ring`), which the
//! RGB tool receives as a flat argument list after its `set` verb.

use std::collections::BTreeMap;
use std::fmt;

use crate::sync::status::SyncState;

pub const SET_VERB: &str = "set";
pub const RESTORE_VERB: &str = "restore";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Logo,
    Fan,
    Ring,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Zone::Logo => "logo",
            Zone::Fan => "fan",
            Zone::Ring => "ring",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Static,
    Rainbow,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Static => "static",
            Mode::Rainbow => "rainbow",
        })
    }
}

/// Settings for one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCommand {
    pub zone: Zone,
    pub mode: Mode,
    pub color: Option<&'static str>,
    /// Red, green and blue mirage frequencies.
    pub mirage: Option<[u16; 3]>,
    pub speed: Option<u8>,
    pub brightness: Option<u8>,
}

impl ZoneCommand {
    fn new(zone: Zone, mode: Mode) -> Self {
        Self {
            zone,
            mode,
            color: None,
            mirage: None,
            speed: None,
            brightness: None,
        }
    }

    fn color(mut self, hex: &'static str) -> Self {
        self.color = Some(hex);
        self
    }

    fn mirage(mut self, freq: [u16; 3]) -> Self {
        self.mirage = Some(freq);
        self
    }

    fn speed(mut self, speed: u8) -> Self {
        self.speed = Some(speed);
        self
    }

    fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    /// Append this zone's arguments. The tool expects mode, color, mirage,
    /// speed, brightness in that order.
    pub fn push_args(&self, args: &mut Vec<String>) {
        args.push(self.zone.to_string());
        args.push(format!("--mode={}", self.mode));
        if let Some(color) = self.color {
            args.push(format!("--color={}", color));
        }
        if let Some([red, green, blue]) = self.mirage {
            args.push(format!("--mirage-red-freq={}", red));
            args.push(format!("--mirage-green-freq={}", green));
            args.push(format!("--mirage-blue-freq={}", blue));
        }
        if let Some(speed) = self.speed {
            args.push(format!("--speed={}", speed));
        }
        if let Some(brightness) = self.brightness {
            args.push(format!("--brightness={}", brightness));
        }
    }
}

/// Static accent on logo and fan, rainbow ring.
fn static_rainbow(accent: &'static str, ring_speed: u8) -> Vec<ZoneCommand> {
    vec![
        ZoneCommand::new(Zone::Logo, Mode::Static).color(accent).brightness(4),
        ZoneCommand::new(Zone::Fan, Mode::Static).color(accent).brightness(4),
        ZoneCommand::new(Zone::Ring, Mode::Rainbow).speed(ring_speed).brightness(5),
    ]
}

/// One static color everywhere.
fn all_static(color: &'static str) -> Vec<ZoneCommand> {
    vec![
        ZoneCommand::new(Zone::Logo, Mode::Static).color(color).brightness(4),
        ZoneCommand::new(Zone::Fan, Mode::Static).color(color).brightness(4),
        ZoneCommand::new(Zone::Ring, Mode::Static).color(color).speed(1).brightness(5),
    ]
}

fn neutral_white() -> Vec<ZoneCommand> {
    const WHITE: &str = "#ffffff";
    vec![
        ZoneCommand::new(Zone::Logo, Mode::Static).color(WHITE).speed(1).brightness(3),
        ZoneCommand::new(Zone::Fan, Mode::Static)
            .color(WHITE)
            .mirage([120, 120, 120])
            .speed(1)
            .brightness(4),
        ZoneCommand::new(Zone::Ring, Mode::Static).color(WHITE).speed(1).brightness(3),
    ]
}

/// What the indicator tool is told to do for a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorCommand {
    Set(Vec<ZoneCommand>),
    Restore,
}

impl IndicatorCommand {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            IndicatorCommand::Set(zones) => {
                let mut args = vec![SET_VERB.to_string()];
                for zone in zones {
                    zone.push_args(&mut args);
                }
                args
            }
            IndicatorCommand::Restore => vec![RESTORE_VERB.to_string()],
        }
    }
}

/// State to zone-command lookup.
#[derive(Debug, Clone)]
pub struct CommandTable {
    entries: BTreeMap<SyncState, Vec<ZoneCommand>>,
}

impl Default for CommandTable {
    fn default() -> Self {
        let entries = BTreeMap::from([
            (SyncState::Down, neutral_white()),
            (SyncState::Syncing, static_rainbow("#1e99e6", 3)),
            (SyncState::Done, static_rainbow("#00ff00", 1)),
            (SyncState::Idle, static_rainbow("#a746e8", 1)),
            (SyncState::Error, all_static("#ff0000")),
        ]);
        Self { entries }
    }
}

impl CommandTable {
    pub fn insert(&mut self, state: SyncState, zones: Vec<ZoneCommand>) {
        self.entries.insert(state, zones);
    }

    pub fn remove(&mut self, state: SyncState) -> Option<Vec<ZoneCommand>> {
        self.entries.remove(&state)
    }

    /// States without an entry fall back to restoring the factory defaults.
    pub fn resolve(&self, state: SyncState) -> IndicatorCommand {
        match self.entries.get(&state) {
            Some(zones) => IndicatorCommand::Set(zones.clone()),
            None => IndicatorCommand::Restore,
        }
    }
}
