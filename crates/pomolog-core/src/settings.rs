//! User-adjustable timer settings.
//!
//! Settings are edited as free text (a CLI argument, a line typed into the
//! interactive session, a hand-edited TOML file). Input that is not a
//! number, or a number out of range, never reaches the engine: the field
//! keeps its last good value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::debug;

use crate::timer::Mode;

pub const MINUTES_RANGE: RangeInclusive<u32> = 1..=300;
pub const CYCLES_RANGE: RangeInclusive<u32> = 1..=50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    #[serde(default = "default_cycles_before_long")]
    pub cycles_before_long: u32,
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_work_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_cycles_before_long() -> u32 {
    4
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            cycles_before_long: default_cycles_before_long(),
            auto_start: false,
            sound_enabled: true,
        }
    }
}

impl Settings {
    pub fn minutes_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Work => self.work_minutes,
            Mode::ShortBreak => self.short_break_minutes,
            Mode::LongBreak => self.long_break_minutes,
        }
    }

    /// Full length of an interval in `mode`, in seconds.
    pub fn duration_secs(&self, mode: Mode) -> u64 {
        u64::from(self.minutes_for(mode)) * 60
    }

    /// Work intervals per long break, never below one.
    pub fn cycles_before_long(&self) -> u32 {
        self.cycles_before_long.max(1)
    }

    /// Replace any out-of-range field with its default.
    ///
    /// Used on values that bypassed `apply_input`, e.g. a hand-edited
    /// config file.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !MINUTES_RANGE.contains(&self.work_minutes) {
            self.work_minutes = defaults.work_minutes;
        }
        if !MINUTES_RANGE.contains(&self.short_break_minutes) {
            self.short_break_minutes = defaults.short_break_minutes;
        }
        if !MINUTES_RANGE.contains(&self.long_break_minutes) {
            self.long_break_minutes = defaults.long_break_minutes;
        }
        if !CYCLES_RANGE.contains(&self.cycles_before_long) {
            self.cycles_before_long = defaults.cycles_before_long;
        }
        self
    }

    /// Apply raw user input to one field.
    ///
    /// Returns `true` if the field took the new value. Invalid input leaves
    /// the field untouched and returns `false`.
    pub fn apply_input(&mut self, field: SettingsField, raw: &str) -> bool {
        let accepted = match field {
            SettingsField::WorkMinutes => set_in_range(&mut self.work_minutes, raw, MINUTES_RANGE),
            SettingsField::ShortBreakMinutes => {
                set_in_range(&mut self.short_break_minutes, raw, MINUTES_RANGE)
            }
            SettingsField::LongBreakMinutes => {
                set_in_range(&mut self.long_break_minutes, raw, MINUTES_RANGE)
            }
            SettingsField::CyclesBeforeLong => {
                set_in_range(&mut self.cycles_before_long, raw, CYCLES_RANGE)
            }
            SettingsField::AutoStart => set_flag(&mut self.auto_start, raw),
            SettingsField::SoundEnabled => set_flag(&mut self.sound_enabled, raw),
        };
        if !accepted {
            debug!(field = field.key(), input = raw, "ignoring invalid setting input");
        }
        accepted
    }

    /// Current value of a field, rendered as text.
    pub fn value_of(&self, field: SettingsField) -> String {
        match field {
            SettingsField::WorkMinutes => self.work_minutes.to_string(),
            SettingsField::ShortBreakMinutes => self.short_break_minutes.to_string(),
            SettingsField::LongBreakMinutes => self.long_break_minutes.to_string(),
            SettingsField::CyclesBeforeLong => self.cycles_before_long.to_string(),
            SettingsField::AutoStart => self.auto_start.to_string(),
            SettingsField::SoundEnabled => self.sound_enabled.to_string(),
        }
    }
}

fn set_in_range(slot: &mut u32, raw: &str, range: RangeInclusive<u32>) -> bool {
    match raw.trim().parse::<u32>() {
        Ok(v) if range.contains(&v) => {
            *slot = v;
            true
        }
        _ => false,
    }
}

fn set_flag(slot: &mut bool, raw: &str) -> bool {
    let value = match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => true,
        "false" | "off" | "no" | "0" => false,
        _ => return false,
    };
    *slot = value;
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    WorkMinutes,
    ShortBreakMinutes,
    LongBreakMinutes,
    CyclesBeforeLong,
    AutoStart,
    SoundEnabled,
}

impl SettingsField {
    pub const ALL: [SettingsField; 6] = [
        Self::WorkMinutes,
        Self::ShortBreakMinutes,
        Self::LongBreakMinutes,
        Self::CyclesBeforeLong,
        Self::AutoStart,
        Self::SoundEnabled,
    ];

    /// Key as it appears under `[timer]` in the config file.
    pub fn key(self) -> &'static str {
        match self {
            Self::WorkMinutes => "work_minutes",
            Self::ShortBreakMinutes => "short_break_minutes",
            Self::LongBreakMinutes => "long_break_minutes",
            Self::CyclesBeforeLong => "cycles_before_long",
            Self::AutoStart => "auto_start",
            Self::SoundEnabled => "sound_enabled",
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SettingsField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let short = match key.as_str() {
            "work" => Some(Self::WorkMinutes),
            "short" => Some(Self::ShortBreakMinutes),
            "long" => Some(Self::LongBreakMinutes),
            "cycles" => Some(Self::CyclesBeforeLong),
            "auto" => Some(Self::AutoStart),
            "sound" => Some(Self::SoundEnabled),
            _ => None,
        };
        short
            .or_else(|| Self::ALL.into_iter().find(|f| f.key() == key))
            .ok_or_else(|| format!("unknown setting: {s}"))
    }
}
