mod diffusion;
mod heating;
mod life_cycle;

pub use diffusion::{diffuse, DiffusionSystem, DIFFUSE_RATIO};
pub use heating::{apply_heating, local_heating, HeatingSystem};
pub use life_cycle::{
    advance_life_cycle, seed_threshold, LifeCycleReport, LifeCycleSystem, MAXIMUM_POLLUTION,
    POLLUTION_AGE_INCREMENT,
};
