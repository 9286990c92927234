pub mod biome;
pub mod climate;
pub mod config;
pub mod error;
pub mod field;
pub mod generator;
pub mod geometry;
pub mod heightmap;
pub mod layers;
pub mod noise;
pub mod pathfinding;
pub mod preview;
pub mod random;
pub mod rivers;
pub mod sampling;
pub mod world;

pub use biome::{Biome, BiomeMap};
pub use config::{GridSettings, MapOptions, WorldConfig};
pub use error::{MapgenError, PathError, Result};
pub use field::ScalarField;
pub use generator::{TerrainBundle, TerrainSummary, generate_map};
pub use geometry::{Geometry, GridLayout};
pub use pathfinding::{Path, shortest_path};
pub use random::SinePrng;
pub use world::GridWorld;
