use serde::Deserialize;
use tracing::{debug, error, info};

pub(crate) const STATUS_MIN: f32 = 0.0;
pub(crate) const STATUS_MAX: f32 = 100.0;
pub(crate) const HEART_COUNT: usize = 4;
const POINTS_PER_HEART: f32 = STATUS_MAX / HEART_COUNT as f32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub(crate) enum StatusKind {
    Hunger,
    Fun,
    Lone,
}

impl StatusKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            StatusKind::Hunger => "hunger",
            StatusKind::Fun => "fun",
            StatusKind::Lone => "lone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StatusConfig {
    pub(crate) kind: StatusKind,
    #[serde(default = "default_status_value")]
    pub(crate) value: f32,
    #[serde(default = "default_decrease_amount")]
    pub(crate) decrease_amount: f32,
    #[serde(default = "default_decrease_interval")]
    pub(crate) decrease_interval_seconds: f32,
}

fn default_status_value() -> f32 {
    STATUS_MAX
}

fn default_decrease_amount() -> f32 {
    5.0
}

fn default_decrease_interval() -> f32 {
    10.0
}

impl StatusConfig {
    pub(crate) fn new(kind: StatusKind) -> Self {
        Self {
            kind,
            value: default_status_value(),
            decrease_amount: default_decrease_amount(),
            decrease_interval_seconds: default_decrease_interval(),
        }
    }
}

pub(crate) fn default_statuses() -> Vec<StatusConfig> {
    [StatusKind::Hunger, StatusKind::Fun, StatusKind::Lone]
        .into_iter()
        .map(StatusConfig::new)
        .collect()
}

#[derive(Debug, Clone)]
struct StatusEntry {
    config: StatusConfig,
    value: f32,
    decay_timer: f32,
}

/// Per-kind values in [0, 100] with independent interval decay.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatusBoard {
    entries: Vec<StatusEntry>,
}

impl StatusBoard {
    pub(crate) fn new(configs: &[StatusConfig]) -> Self {
        let mut board = Self::default();
        for config in configs {
            if board.entry(config.kind).is_some() {
                continue;
            }
            board.entries.push(StatusEntry {
                config: *config,
                value: config.value.clamp(STATUS_MIN, STATUS_MAX),
                decay_timer: 0.0,
            });
        }
        board
    }

    fn entry(&self, kind: StatusKind) -> Option<&StatusEntry> {
        self.entries.iter().find(|entry| entry.config.kind == kind)
    }

    fn entry_mut(&mut self, kind: StatusKind) -> Option<&mut StatusEntry> {
        let entry = self.entries.iter_mut().find(|entry| entry.config.kind == kind);
        if entry.is_none() {
            error!(kind = kind.as_str(), "status_kind_unconfigured");
        }
        entry
    }

    pub(crate) fn kinds(&self) -> impl Iterator<Item = StatusKind> + '_ {
        self.entries.iter().map(|entry| entry.config.kind)
    }

    pub(crate) fn value(&self, kind: StatusKind) -> Option<f32> {
        let value = self.entry(kind).map(|entry| entry.value);
        if value.is_none() {
            error!(kind = kind.as_str(), "status_kind_unconfigured");
        }
        value
    }

    /// Returns the new value, or `None` when `kind` is not configured.
    pub(crate) fn add_status(&mut self, kind: StatusKind, amount: f32) -> Option<f32> {
        let entry = self.entry_mut(kind)?;
        entry.value = (entry.value + amount).clamp(STATUS_MIN, STATUS_MAX);
        debug!(kind = kind.as_str(), amount, value = entry.value, "status_changed");
        Some(entry.value)
    }

    pub(crate) fn feed(&mut self, amount: f32) {
        if let Some(value) = self.add_status(StatusKind::Hunger, amount) {
            info!(amount, hunger = value, "pet_fed");
        }
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        for entry in &mut self.entries {
            let interval = entry.config.decrease_interval_seconds;
            if interval <= 0.0 {
                continue;
            }
            entry.decay_timer += dt;
            while entry.decay_timer >= interval {
                entry.decay_timer -= interval;
                entry.value = (entry.value - entry.config.decrease_amount)
                    .clamp(STATUS_MIN, STATUS_MAX);
            }
        }
    }

    /// Fill of each heart, 25 points per heart.
    pub(crate) fn heart_fills(&self, kind: StatusKind) -> Option<[f32; HEART_COUNT]> {
        let value = self.value(kind)?;
        let mut fills = [0.0; HEART_COUNT];
        for (index, fill) in fills.iter_mut().enumerate() {
            *fill = ((value - index as f32 * POINTS_PER_HEART) / POINTS_PER_HEART).clamp(0.0, 1.0);
        }
        Some(fills)
    }
}
