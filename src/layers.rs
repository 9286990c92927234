//! Слои поверх клеток сетки
//!
//! Отрисовка тайлов в крейт не входит, но ей нужны три вещи: набор слоёв в каждой
//! клетке ([`LayerGrid`]), направление течения для ориентированных слоёв
//! ([`Directional`]) и описание тайлсета ([`Tileset`]). По ним [`connectivity`]
//! считает, к каким сторонам тянется каждый связный слой.

use crate::geometry::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Числовой идентификатор слоя
pub type LayerId = u16;

/// Набор слоёв в каждой клетке
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerGrid {
    cells: Vec<BTreeSet<LayerId>>,
}

impl LayerGrid {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            cells: vec![BTreeSet::new(); len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Добавляет слой; `false`, если он уже был или клетки нет
    pub fn insert(&mut self, cell: usize, layer: LayerId) -> bool {
        self.cells.get_mut(cell).is_some_and(|set| set.insert(layer))
    }

    pub fn remove(&mut self, cell: usize, layer: LayerId) -> bool {
        self.cells.get_mut(cell).is_some_and(|set| set.remove(&layer))
    }

    #[must_use]
    pub fn contains(&self, cell: usize, layer: LayerId) -> bool {
        self.cells.get(cell).is_some_and(|set| set.contains(&layer))
    }

    /// Слои клетки по возрастанию идентификатора
    pub fn layers(&self, cell: usize) -> impl Iterator<Item = LayerId> + '_ {
        self.cells.get(cell).into_iter().flatten().copied()
    }

    /// Клетки, в которых есть слой
    pub fn cells_with(&self, layer: LayerId) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, set)| set.contains(&layer))
            .map(|(cell, _)| cell)
    }
}

/// Для ориентированных слоёв: клетка → соседняя клетка, куда идёт течение
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directional {
    flows: HashMap<LayerId, HashMap<usize, usize>>,
}

impl Directional {
    pub fn set(&mut self, layer: LayerId, from: usize, to: usize) {
        self.flows.entry(layer).or_default().insert(from, to);
    }

    #[must_use]
    pub fn target(&self, layer: LayerId, from: usize) -> Option<usize> {
        self.flows.get(&layer)?.get(&from).copied()
    }

    #[must_use]
    pub fn has_layer(&self, layer: LayerId) -> bool {
        self.flows.contains_key(&layer)
    }

    /// Течёт ли слой из `a` в `b` или из `b` в `a`
    #[must_use]
    pub fn links(&self, layer: LayerId, a: usize, b: usize) -> bool {
        self.target(layer, a) == Some(b) || self.target(layer, b) == Some(a)
    }
}

/// Разбиение слоёв для отрисовки
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tileset {
    /// Слои, которые рисуются с учётом соседей
    pub connected: Vec<LayerId>,
    /// Слои с одной картинкой
    pub single: Vec<LayerId>,
    /// Слои, которые соединяются друг с другом как один
    #[serde(default)]
    pub grouped: Vec<Vec<LayerId>>,
}

impl Tileset {
    #[must_use]
    pub fn is_connected(&self, layer: LayerId) -> bool {
        self.connected.contains(&layer)
    }

    /// Представитель группы: первый слой группы, в которую входит `layer`, иначе сам слой
    #[must_use]
    pub fn group_of(&self, layer: LayerId) -> LayerId {
        self.grouped
            .iter()
            .find(|group| group.contains(&layer))
            .and_then(|group| group.first().copied())
            .unwrap_or(layer)
    }
}

/// Связный слой в клетке и стороны, к которым он тянется
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub cell: usize,
    pub layer: LayerId,
    /// Бит `i` — сторона `i` в порядке таблицы соседей
    pub sides: u16,
}

impl Connection {
    #[must_use]
    pub fn connects(&self, side: usize) -> bool {
        side < 16 && self.sides & (1 << side) != 0
    }
}

/// Для каждой пары (клетка, связный слой) — маска сторон.
///
/// Сосед подходит, если в нём есть слой той же группы; для ориентированных слоёв
/// вдобавок одна из двух клеток должна течь в другую.
#[must_use]
pub fn connectivity(
    grid: &LayerGrid,
    directional: &Directional,
    tileset: &Tileset,
    geometry: &Geometry,
) -> Vec<Connection> {
    let deltas = geometry.neighbor_deltas();
    let groups: Vec<BTreeSet<LayerId>> = (0..grid.len())
        .map(|cell| {
            grid.layers(cell)
                .filter(|&layer| tileset.is_connected(layer))
                .map(|layer| tileset.group_of(layer))
                .collect()
        })
        .collect();

    let mut connections = Vec::new();
    for cell in 0..grid.len().min(geometry.len()) {
        for layer in grid.layers(cell).filter(|&l| tileset.is_connected(l)) {
            let group = tileset.group_of(layer);
            let oriented = directional.has_layer(layer);
            let sides = deltas
                .neighbors(cell, geometry.columns, geometry.rows)
                .filter(|&(_, next)| groups.get(next).is_some_and(|g| g.contains(&group)))
                .filter(|&(_, next)| !oriented || directional.links(layer, cell, next))
                .fold(0_u16, |mask, (side, _)| mask | (1 << side));
            connections.push(Connection { cell, layer, sides });
        }
    }
    connections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridLayout;

    const FOREST: LayerId = 7;
    const JUNGLE: LayerId = 9;
    const RIVER: LayerId = 101;
    const TOWN: LayerId = 200;

    fn tileset() -> Tileset {
        Tileset {
            connected: vec![FOREST, JUNGLE, RIVER],
            single: vec![TOWN],
            grouped: vec![vec![FOREST, JUNGLE]],
        }
    }

    #[test]
    fn grid_keeps_sorted_unique_layers() {
        let mut grid = LayerGrid::new(4);
        assert!(grid.insert(1, RIVER));
        assert!(grid.insert(1, FOREST));
        assert!(!grid.insert(1, RIVER));
        assert!(!grid.insert(9, RIVER));
        assert_eq!(grid.layers(1).collect::<Vec<_>>(), vec![FOREST, RIVER]);
        assert_eq!(grid.layers(9).count(), 0);
        assert!(grid.remove(1, FOREST));
        assert_eq!(grid.cells_with(RIVER).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn grouped_layers_share_a_representative() {
        let tileset = tileset();
        assert_eq!(tileset.group_of(JUNGLE), FOREST);
        assert_eq!(tileset.group_of(FOREST), FOREST);
        assert_eq!(tileset.group_of(RIVER), RIVER);
        assert!(!tileset.is_connected(TOWN));
    }

    #[test]
    fn grouped_layers_connect_to_each_other() {
        // Квадратная сетка 3×1: лес, джунгли, город
        let geometry = Geometry::new(GridLayout::Square, 1, 3);
        let mut grid = LayerGrid::new(3);
        grid.insert(0, FOREST);
        grid.insert(1, JUNGLE);
        grid.insert(2, TOWN);

        let connections = connectivity(&grid, &Directional::default(), &tileset(), &geometry);
        assert_eq!(connections.len(), 2);
        // стороны квадрата: 2 — вправо, 6 — влево
        assert_eq!(connections[0].sides, 1 << 2);
        assert_eq!(connections[1].sides, 1 << 6);
        assert!(connections[1].connects(6));
    }

    #[test]
    fn rivers_connect_only_along_their_flow() {
        // Река в трёх клетках ряда, течёт 0 → 1; клетка 2 — отдельный исток
        let geometry = Geometry::new(GridLayout::Oddr, 1, 3);
        let mut grid = LayerGrid::new(3);
        for cell in 0..3 {
            grid.insert(cell, RIVER);
        }
        let mut directional = Directional::default();
        directional.set(RIVER, 0, 1);

        let connections = connectivity(&grid, &directional, &tileset(), &geometry);
        let sides: Vec<u16> = connections.iter().map(|c| c.sides).collect();
        // у ODDR сторона 1 — вправо, 4 — влево
        assert_eq!(sides, vec![1 << 1, 1 << 4, 0]);
        assert!(directional.links(RIVER, 1, 0));
        assert!(!directional.links(RIVER, 1, 2));
    }

    #[test]
    fn tileset_parses_from_toml() {
        let tileset: Tileset = toml::from_str(
            r#"
            connected = [7, 101]
            single = [200]
            "#,
        )
        .unwrap();
        assert!(tileset.grouped.is_empty());
        assert!(tileset.is_connected(101));
    }
}
