use chrono::{NaiveTime, Weekday};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;

use crate::calendar::hhmm;
use crate::error::{BookingError, Result};
use crate::model::{is_valid_student_id, MusicRoom, SlotCategory, TimeSlot, User};
use crate::query::QuotaScope;
use crate::schedule::WeeklySchedule;

const DEFAULT_STORE_PATH: &str = "reservations.json";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_rooms")]
    pub rooms: Vec<MusicRoom>,
    #[serde(default = "default_slots")]
    pub slots: Vec<TimeSlot>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub schedule: WeeklySchedule,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SystemConfig {
    #[serde(default = "default_quota")]
    pub max_after_school_per_day: usize,
    #[serde(default)]
    pub quota_scope: QuotaScope,
    #[serde(default)]
    pub weekly_cleanup: WeeklyCleanup,
    #[serde(default)]
    pub after_school_cleanup: AfterSchoolCleanup,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WeeklyCleanup {
    pub day: Weekday,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default = "default_true")]
    pub exclude_after_school: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AfterSchoolCleanup {
    pub day: Weekday,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_after_school_per_day: default_quota(),
            quota_scope: QuotaScope::default(),
            weekly_cleanup: WeeklyCleanup::default(),
            after_school_cleanup: AfterSchoolCleanup::default(),
        }
    }
}

impl Default for WeeklyCleanup {
    fn default() -> Self {
        Self {
            day: Weekday::Fri,
            time: hm(12, 0),
            exclude_after_school: true,
        }
    }
}

impl Default for AfterSchoolCleanup {
    fn default() -> Self {
        Self {
            day: Weekday::Sat,
            time: NaiveTime::MIN,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rooms: default_rooms(),
            slots: default_slots(),
            users: Vec::new(),
            schedule: WeeklySchedule::default(),
            system: SystemConfig::default(),
            store_path: default_store_path(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BookingError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()?;

        unique_ids("room", self.rooms.iter().map(|r| r.id.as_str()))?;
        unique_ids("slot", self.slots.iter().map(|s| s.id.as_str()))?;
        unique_ids("user", self.users.iter().map(|u| u.id.as_str()))?;

        for slot in &self.slots {
            if slot.end <= slot.start {
                return Err(BookingError::Config(format!(
                    "Slot '{}' ends before it starts",
                    slot.id
                )));
            }
        }
        for user in &self.users {
            if !is_valid_student_id(&user.student_id) {
                return Err(BookingError::Config(format!(
                    "User '{}' has invalid student id '{}'",
                    user.id, user.student_id
                )));
            }
            if !(1..=3).contains(&user.grade()) {
                return Err(BookingError::Config(format!(
                    "User '{}' has grade {} outside 1..=3",
                    user.id,
                    user.grade()
                )));
            }
        }
        Ok(())
    }

    pub fn room(&self, id: &str) -> Result<&MusicRoom> {
        self.rooms
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| BookingError::UnknownRoom(id.to_string()))
    }

    pub fn slot(&self, id: &str) -> Result<&TimeSlot> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| BookingError::UnknownSlot(id.to_string()))
    }
}

fn unique_ids<'a>(what: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(BookingError::Config(format!("Duplicate {} id '{}'", what, id)));
        }
    }
    Ok(())
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

fn default_rooms() -> Vec<MusicRoom> {
    (1..=5)
        .map(|n| MusicRoom {
            id: n.to_string(),
            name: format!("합주실 {}", n),
            capacity: 8,
            available: true,
        })
        .collect()
}

fn default_slots() -> Vec<TimeSlot> {
    let slot = |id: &str, name: &str, start: NaiveTime, end: NaiveTime, category| TimeSlot {
        id: id.to_string(),
        name: name.to_string(),
        start,
        end,
        category,
        active: true,
    };

    let mut slots = vec![
        slot("morning-1", "아침 1교시", hm(8, 10), hm(9, 0), SlotCategory::Morning),
        slot("lunch-1", "점심시간", hm(12, 20), hm(13, 10), SlotCategory::Lunch),
    ];
    // Periods 7 to 11 run hourly from 15:20.
    for period in 7..=11u32 {
        let hour = 15 + (period - 7);
        slots.push(slot(
            &format!("after-{}", period),
            &format!("{}교시", period),
            hm(hour, 20),
            hm(hour + 1, 10),
            SlotCategory::AfterSchool,
        ));
    }
    slots
}

fn default_quota() -> usize {
    1
}

fn default_store_path() -> String {
    DEFAULT_STORE_PATH.to_string()
}

fn default_true() -> bool {
    true
}
