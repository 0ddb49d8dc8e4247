use crate::physics::scene::SceneLoop;
use bevy::prelude::*;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

#[derive(Resource, Deref, DerefMut, Debug, Clone, PartialEq)]
pub struct SharedRng(pub ChaCha8Rng);

impl SharedRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::default(),
        }
    }
}

impl Default for SharedRng {
    fn default() -> Self {
        Self(ChaCha8Rng::from_rng(&mut rand::rng()))
    }
}

/// The running scene, owned by the ECS world and mutated only by the
/// simulation plugin's fixed tick and command handlers.
#[derive(Resource, Deref, DerefMut, Debug)]
pub struct ActiveScene(pub SceneLoop);

impl ActiveScene {
    pub fn new(scene: SceneLoop) -> Self {
        Self(scene)
    }
}
