use bevy::prelude::*;

#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Running,
    Paused,
}

impl AppState {
    pub fn from_running(running: bool) -> Self {
        if running { Self::Running } else { Self::Paused }
    }
}
