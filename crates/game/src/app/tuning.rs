use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::habitat::{
    default_statuses, AgentTuning, AnimationTuning, CollisionProbe, RoomLimitsTuning,
    SleepTuning, StatusConfig, ViewportTuning, WanderTuning,
};

pub(crate) const TUNING_FILE_NAME: &str = "tuning.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PetTuning {
    pub(crate) agent: AgentTuning,
    pub(crate) animation: AnimationTuning,
    pub(crate) wander: WanderTuning,
    pub(crate) sleep: SleepTuning,
    pub(crate) viewport: ViewportTuning,
    pub(crate) probe: CollisionProbe,
    pub(crate) room_limits: RoomLimitsTuning,
    pub(crate) statuses: Vec<StatusConfig>,
    /// Height added above the bed anchor by the force-move-to-bed event.
    pub(crate) bed_raise: f32,
    pub(crate) feed_amount: f32,
    pub(crate) rng_seed: Option<u64>,
}

impl Default for PetTuning {
    fn default() -> Self {
        Self {
            agent: AgentTuning::default(),
            animation: AnimationTuning::default(),
            wander: WanderTuning::default(),
            sleep: SleepTuning::default(),
            viewport: ViewportTuning::default(),
            probe: CollisionProbe::default(),
            room_limits: RoomLimitsTuning::default(),
            statuses: default_statuses(),
            bed_raise: 1.38,
            feed_amount: 20.0,
            rng_seed: None,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse tuning file {path} at {json_path}: {source}")]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tuning in {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Missing file means defaults; anything present must parse and validate.
pub(crate) fn load_tuning(path: &Path) -> Result<PetTuning, TuningError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "tuning_defaults_used");
            return Ok(PetTuning::default());
        }
        Err(source) => {
            return Err(TuningError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let tuning = parse_tuning(&raw).map_err(|(json_path, source)| TuningError::Parse {
        path: path.to_path_buf(),
        json_path,
        source,
    })?;
    validate_tuning(&tuning).map_err(|message| TuningError::Invalid {
        path: path.to_path_buf(),
        message,
    })?;

    info!(
        path = %path.display(),
        statuses = tuning.statuses.len(),
        seeded = tuning.rng_seed.is_some(),
        "tuning_loaded"
    );
    Ok(tuning)
}

fn parse_tuning(raw: &str) -> Result<PetTuning, (String, serde_json::Error)> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, PetTuning>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        (json_path, error.into_inner())
    })
}

fn validate_tuning(tuning: &PetTuning) -> Result<(), String> {
    let wander = &tuning.wander;
    require_positive("wander.move_speed", wander.move_speed)?;
    require_positive("wander.pixels_per_unit", wander.pixels_per_unit)?;
    for (field, range) in [
        ("wander.idle_seconds", wander.idle_seconds),
        ("wander.walk_seconds", wander.walk_seconds),
        ("wander.walk_scale", wander.walk_scale),
    ] {
        require_ordered(field, range)?;
        require_positive(&format!("{field}[0]"), range[0])?;
    }
    if !(0.0..=1.0).contains(&wander.keep_probability) {
        return Err(format!(
            "wander.keep_probability must be within [0, 1], got {}",
            wander.keep_probability
        ));
    }
    require_non_negative("wander.jitter_x", wander.jitter_x)?;
    require_non_negative("wander.jitter_y", wander.jitter_y)?;
    require_non_negative(
        "wander.initial_decision_seconds",
        wander.initial_decision_seconds,
    )?;

    if !tuning.sleep.sleep_after_seconds.is_finite() || tuning.sleep.sleep_after_seconds < 0.0 {
        return Err(format!(
            "sleep.sleep_after_seconds must be finite and >= 0, got {}",
            tuning.sleep.sleep_after_seconds
        ));
    }
    if tuning.sleep.wake_clip.trim().is_empty() {
        return Err("sleep.wake_clip must not be empty".to_string());
    }

    require_positive("viewport.snap_speed", tuning.viewport.snap_speed)?;
    if !tuning.viewport.drag_sensitivity.is_finite() {
        return Err("viewport.drag_sensitivity must be finite".to_string());
    }
    require_ordered(
        "viewport.handle_min_x/handle_max_x",
        [tuning.viewport.handle_min_x, tuning.viewport.handle_max_x],
    )?;

    require_non_negative("viewport.parallax_ratio", tuning.viewport.parallax_ratio)?;

    require_non_negative("probe.distance", tuning.probe.distance)?;
    require_ordered(
        "room_limits.bottom/top",
        [tuning.room_limits.bottom, tuning.room_limits.top],
    )?;
    require_non_negative(
        "animation.blend_latency_seconds",
        tuning.animation.blend_latency_seconds,
    )?;

    for (index, status) in tuning.statuses.iter().enumerate() {
        require_non_negative(
            &format!("statuses[{index}].decrease_interval_seconds"),
            status.decrease_interval_seconds,
        )?;
        if !status.decrease_amount.is_finite() || !status.value.is_finite() {
            return Err(format!("statuses[{index}] values must be finite"));
        }
    }

    if !tuning.bed_raise.is_finite() {
        return Err("bed_raise must be finite".to_string());
    }
    if !tuning.feed_amount.is_finite() {
        return Err("feed_amount must be finite".to_string());
    }
    Ok(())
}

fn require_positive(field: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be finite and > 0, got {value}"))
    }
}

fn require_non_negative(field: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be finite and >= 0, got {value}"))
    }
}

fn require_ordered(field: &str, [min, max]: [f32; 2]) -> Result<(), String> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(format!("{field} must be finite with min <= max, got [{min}, {max}]"))
    }
}
