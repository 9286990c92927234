//! Конвейер генерации рельефа
//!
//! Шум → тектоника → высота → температура → ветер → влажность → реки → биомы.
//! Каждый этап выполняется в своём `tracing`-спане и пишет время выполнения.
//! Генератор случайных чисел создаётся заново из сида и передаётся по этапам
//! в фиксированном порядке, так что одинаковые параметры дают побитово
//! одинаковый результат.

use crate::biome::{Biome, BiomeMap, assign_biomes};
use crate::climate::{generate_humidity, generate_temperature, generate_wind, randomise_humidity};
use crate::config::MapOptions;
use crate::error::Result;
use crate::field::ScalarField;
use crate::heightmap::{SeaLevel, compute_folds, erode, normalize_elevation, raw_elevation};
use crate::noise::{NoiseParams, gradient_noise};
use crate::random::SinePrng;
use crate::rivers::{RiverStats, generate_rivers};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Все поля, построенные за один вызов [`generate_map`]
#[derive(Debug, Clone)]
pub struct TerrainBundle {
    pub width: u32,
    pub height: u32,
    pub elevation: ScalarField,
    pub folds: ScalarField,
    pub rivers: ScalarField,
    pub wind: ScalarField,
    pub noise: ScalarField,
    pub tectonic: ScalarField,
    pub temperature: ScalarField,
    pub humidity: ScalarField,
    pub biome: BiomeMap,
    pub sea_level: SeaLevel,
    pub river_stats: RiverStats,
}

/// Краткая сводка по карте для отчёта
#[derive(Debug, Clone, Serialize)]
pub struct TerrainSummary {
    pub width: u32,
    pub height: u32,
    pub land_fraction: f32,
    pub river_cells: usize,
    pub sea_level: SeaLevel,
    pub biomes: BTreeMap<&'static str, usize>,
    pub rivers: RiverStats,
}

impl TerrainBundle {
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.elevation.len()
    }

    #[must_use]
    pub fn is_land(&self, cell: usize) -> bool {
        self.elevation.data.get(cell).is_some_and(|&v| v > 0.0)
    }

    /// Биом клетки. Классификация не смотрит на высоту, поэтому у моря он тоже есть
    #[must_use]
    pub fn biome_at(&self, cell: usize) -> Option<Biome> {
        self.biome.data.get(cell).copied()
    }

    #[must_use]
    pub fn summary(&self) -> TerrainSummary {
        let land = (0..self.cell_count()).filter(|&i| self.is_land(i)).count();
        let river_cells = self.rivers.data.iter().filter(|&&v| v > 0.0).count();
        let biomes = self
            .biome
            .histogram()
            .into_iter()
            .map(|(biome, count)| (biome.name(), count))
            .collect();
        TerrainSummary {
            width: self.width,
            height: self.height,
            land_fraction: land as f32 / self.cell_count().max(1) as f32,
            river_cells,
            sea_level: self.sea_level,
            biomes,
            rivers: self.river_stats,
        }
    }
}

/// Выполняет этап в спане `stage` и пишет затраченное время
fn timed<T>(stage: &'static str, f: impl FnOnce() -> T) -> T {
    let _span = tracing::debug_span!("stage", name = stage).entered();
    let started = Instant::now();
    let result = f();
    tracing::debug!(
        stage,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "stage finished"
    );
    result
}

/// Строит карту по параметрам. Параметры проверяются до начала работы.
pub fn generate_map(options: &MapOptions) -> Result<TerrainBundle> {
    options.validate()?;
    let _span = tracing::info_span!(
        "generate_map",
        seed = options.seed,
        width = options.width,
        height = options.height
    )
    .entered();
    let started = Instant::now();

    let (width, height) = (options.width, options.height);
    let mut rng = SinePrng::new(options.seed);
    let diagonal = (width as f32).hypot(height as f32);

    let (noise, tectonic) = timed("noise", || {
        let noise = gradient_noise(width, height, &NoiseParams::detail(diagonal), &mut rng);
        let tectonic = gradient_noise(width, height, &NoiseParams::tectonic(diagonal), &mut rng);
        (noise, tectonic)
    });

    let (folds, mut elevation) = timed("tectonics", || -> Result<_> {
        let folds = compute_folds(&tectonic, &mut rng)?;
        let elevation = raw_elevation(&noise, &tectonic, &folds, options.pangaea);
        Ok((folds, elevation))
    })?;

    let sea_level = timed("normalize", || -> Result<_> {
        let sea_level = normalize_elevation(&mut elevation, options.sea_ratio, &mut rng)?;
        erode(&mut elevation, &folds, options.erosion);
        Ok(sea_level)
    })?;

    let (temperature, wind) = timed("climate", || {
        (generate_temperature(&elevation), generate_wind(&elevation))
    });

    let humidity = timed("humidity", || {
        let humidity = generate_humidity(&elevation, &wind, &mut rng);
        if options.randomise_humidity {
            randomise_humidity(&humidity, &noise, &elevation)
        } else {
            humidity
        }
    });

    let (rivers, river_stats) = timed("rivers", || {
        generate_rivers(
            &mut elevation,
            &humidity,
            options.river_age,
            options.rivers_shown,
            &mut rng,
        )
    });

    let biome = timed("biome", || assign_biomes(&humidity, &temperature))?;

    tracing::info!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        sea_level = sea_level.sea_level,
        rivers = river_stats.recorded,
        "map generated"
    );

    Ok(TerrainBundle {
        width,
        height,
        elevation,
        folds,
        rivers,
        wind,
        noise,
        tectonic,
        temperature,
        humidity,
        biome,
        sea_level,
        river_stats,
    })
}
