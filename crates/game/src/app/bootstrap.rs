use pethouse_engine::{
    compile_house_def, resolve_app_paths, resolve_room_geometry, Aabb, HouseCompileError,
    HouseDef, LoopConfig, RoomGeometry, Scene, StartupError,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::habitat::{
    AnimatorSlot, BlockingSurface, ClipAnimator, Habitat, HouseLayout, RoomSpec,
};
use super::scene::PetScene;
use super::tuning::{load_tuning, TuningError, TUNING_FILE_NAME};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("house definition failed to compile: {0}")]
    House(#[from] HouseCompileError),
    #[error(transparent)]
    Tuning(#[from] TuningError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("startup");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "app_paths_resolved");

    let house = compile_house_def(&paths.base_content_dir)?;
    let geometry = resolve_room_geometry(&house, &paths.sprites_dir);
    let layout = house_layout(&house, &geometry);
    info!(
        path = %house.source_path.display(),
        rooms = layout.rooms.len(),
        furniture = layout.furniture.len(),
        bed = layout.bed.is_some(),
        "house_compiled"
    );

    let tuning = load_tuning(&paths.base_content_dir.join(TUNING_FILE_NAME))?;
    let seed = tuning.rng_seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, fixed = tuning.rng_seed.is_some(), "rng_seeded");

    let animator = AnimatorSlot::new(Some(Box::new(ClipAnimator::new(tuning.animation))));
    let habitat = Habitat::new(&tuning, layout, SmallRng::seed_from_u64(seed), animator);

    Ok(AppWiring {
        config: LoopConfig::default(),
        scene: Box::new(PetScene::new(habitat)),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Rooms come from measured geometry; furniture and bed straight from the house file.
fn house_layout(house: &HouseDef, geometry: &[RoomGeometry]) -> HouseLayout {
    HouseLayout {
        rooms: geometry
            .iter()
            .map(|room| RoomSpec {
                width: room.width,
                safe_y: room.safe_y,
            })
            .collect(),
        fallback_room_width: house.fallback_room_width,
        furniture: house
            .furniture
            .iter()
            .map(|furniture| BlockingSurface {
                name: furniture.name.clone(),
                layer: furniture.layer.clone(),
                bounds: Aabb::new(furniture.center, furniture.half_extents),
            })
            .collect(),
        bed: house.bed.as_ref().map(|bed| bed.anchor),
    }
}
