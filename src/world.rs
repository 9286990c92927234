//! Крупная сетка мира поверх карты рельефа
//!
//! Карта рельефа прореживается через [`rescale_coordinates`] до клеток выбранной
//! раскладки. Каждая клетка получает слои (море, биом, река), стоимость прохода
//! и, для рек, направление течения. По этой сетке ищутся маршруты.

use crate::biome::Biome;
use crate::config::GridSettings;
use crate::error::{PathError, Result};
use crate::generator::TerrainBundle;
use crate::geometry::{Geometry, rescale_coordinates};
use crate::layers::{Connection, Directional, LayerGrid, LayerId, Tileset, connectivity};
use crate::pathfinding::{Path, shortest_path};

/// Слой моря; слои биомов совпадают с идентификаторами [`Biome`]
pub const LAYER_SEA: LayerId = 100;
pub const LAYER_RIVER: LayerId = 101;

/// Стоимость шага по ровной суше
const BASE_COST: f32 = 1.0;
/// Надбавка за высоту: на вершине шаг в пять раз дороже
const CLIMB_COST: f32 = 4.0;
/// Множитель стоимости вдоль реки
const RIVER_DISCOUNT: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct GridWorld {
    pub geometry: Geometry,
    /// Индекс клетки рельефа под каждой клеткой сетки; `None` — данных нет
    pub source: Vec<Option<usize>>,
    pub elevation: Vec<Option<f32>>,
    pub layers: LayerGrid,
    pub directional: Directional,
    /// Стоимость входа в клетку; `f32::INFINITY` — непроходимо
    pub travel_cost: Vec<f32>,
}

impl GridWorld {
    /// Строит сетку по результату [`crate::generate_map`]
    pub fn from_terrain(bundle: &TerrainBundle, settings: &GridSettings) -> Result<Self> {
        let rescaled = rescale_coordinates(
            bundle.width as usize,
            bundle.height as usize,
            settings.scale,
            settings.layout,
        )?;
        let geometry = Geometry::new(settings.layout, rescaled.rows, rescaled.columns);
        let source = rescaled.indices;
        let elevation: Vec<Option<f32>> = source
            .iter()
            .map(|s| s.and_then(|i| bundle.elevation.data.get(i).copied()))
            .collect();

        let mut layers = LayerGrid::new(geometry.len());
        for (cell, &src) in source.iter().enumerate() {
            let (Some(src), Some(height)) = (src, elevation[cell]) else {
                continue;
            };
            if height <= 0.0 {
                layers.insert(cell, LAYER_SEA);
                continue;
            }
            if let Some(biome) = bundle.biome_at(src).filter(|&b| b != Biome::Unknown) {
                layers.insert(cell, LayerId::from(biome.id()));
            }
            if bundle.rivers.data.get(src).is_some_and(|&flow| flow > 0.0) {
                layers.insert(cell, LAYER_RIVER);
            }
        }

        let directional = river_flow(&geometry, &layers, &elevation);
        let travel_cost = (0..geometry.len())
            .map(|cell| match elevation[cell] {
                Some(height) if !layers.contains(cell, LAYER_SEA) => {
                    let cost = BASE_COST + CLIMB_COST * height.max(0.0);
                    if layers.contains(cell, LAYER_RIVER) {
                        cost * RIVER_DISCOUNT
                    } else {
                        cost
                    }
                }
                _ => f32::INFINITY,
            })
            .collect();

        tracing::debug!(
            rows = geometry.rows,
            columns = geometry.columns,
            layout = ?geometry.layout,
            "world grid built"
        );
        Ok(Self {
            geometry,
            source,
            elevation,
            layers,
            directional,
            travel_cost,
        })
    }

    /// Маршрут наименьшей стоимости от `start` до `end`, клетки от начала к концу
    pub fn route(&self, start: usize, end: usize) -> std::result::Result<Path, PathError> {
        let deltas = self.geometry.neighbor_deltas();
        let mut path = shortest_path(
            &self.travel_cost,
            start,
            end,
            self.geometry.columns,
            &deltas,
            f64::from,
        )?;
        path.cells.reverse();
        Ok(path)
    }

    /// Тайлсет по умолчанию: море и реки связные, леса соединяются в одну группу
    #[must_use]
    pub fn default_tileset() -> Tileset {
        let forests = [
            Biome::Taiga,
            Biome::DenseForest,
            Biome::TemperateForest,
            Biome::RainForest,
        ]
        .map(|b| LayerId::from(b.id()));
        let single = Biome::ALL
            .iter()
            .filter(|&&b| b != Biome::Unknown)
            .map(|b| LayerId::from(b.id()))
            .filter(|id| !forests.contains(id))
            .collect();
        let mut connected = vec![LAYER_SEA, LAYER_RIVER];
        connected.extend(forests);
        Tileset {
            connected,
            single,
            grouped: vec![forests.to_vec()],
        }
    }

    #[must_use]
    pub fn connectivity(&self, tileset: &Tileset) -> Vec<Connection> {
        connectivity(&self.layers, &self.directional, tileset, &self.geometry)
    }
}

/// Каждая речная клетка течёт к самому низкому соседу с рекой или морем,
/// если тот ниже её самой; клетка без такого соседа направления не получает
fn river_flow(geometry: &Geometry, layers: &LayerGrid, elevation: &[Option<f32>]) -> Directional {
    let deltas = geometry.neighbor_deltas();
    let mut directional = Directional::default();
    for cell in layers.cells_with(LAYER_RIVER) {
        let Some(height) = elevation[cell] else {
            continue;
        };
        let lowest = deltas
            .neighbors(cell, geometry.columns, geometry.rows)
            .filter(|&(_, next)| {
                layers.contains(next, LAYER_RIVER) || layers.contains(next, LAYER_SEA)
            })
            .filter_map(|(_, next)| elevation[next].map(|h| (next, h)))
            .filter(|&(_, h)| h < height)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((next, _)) = lowest {
            directional.set(LAYER_RIVER, cell, next);
        }
    }
    directional
}
