//! Поиск кратчайшего пути по сетке любой раскладки
//!
//! Поиск с равномерной стоимостью (Дейкстра) по таблицам соседей [`NeighborDeltas`].
//! Фронт — двоичная куча; при равной стоимости первым раскрывается тот элемент,
//! который попал во фронт раньше.

use crate::error::PathError;
use crate::geometry::NeighborDeltas;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Предел числа раскрытых клеток за один поиск
pub const MAX_EXPANSIONS: usize = 10_000;

/// Найденный путь.
///
/// [`shortest_path`] отдаёт клетки от конца к началу, обе включительно.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub cells: Vec<usize>,
    pub cost: f64,
}

impl Path {
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Клетки от начала к концу
    pub fn forward(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().rev().copied()
    }

    #[must_use]
    pub fn into_forward(mut self) -> Vec<usize> {
        self.cells.reverse();
        self.cells
    }
}

#[derive(Debug, Clone, Copy)]
struct FrontierEntry {
    cost: f64,
    order: u64,
    cell: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap — max-куча: меньшая стоимость и более ранняя вставка идут первыми
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Ищет путь наименьшей стоимости от `start` до `end`.
///
/// Шаг в клетку `n` стоит `cell_cost(world[n])`. Бесконечная, отрицательная или `NaN`
/// стоимость делает клетку непроходимой. Таблица соседей выбирается по чётности ряда
/// текущей клетки.
pub fn shortest_path<T, F>(
    world: &[T],
    start: usize,
    end: usize,
    columns: usize,
    deltas: &NeighborDeltas,
    cell_cost: F,
) -> Result<Path, PathError>
where
    T: Copy,
    F: Fn(T) -> f64,
{
    let len = world.len();
    for index in [start, end] {
        if index >= len || columns == 0 {
            return Err(PathError::InvalidCell { index, len });
        }
    }
    let rows = len.div_ceil(columns);

    let mut way_cost: HashMap<usize, f64> = HashMap::from([(start, 0.0)]);
    let mut previous: HashMap<usize, usize> = HashMap::new();
    let mut frontier = BinaryHeap::from([FrontierEntry {
        cost: 0.0,
        order: 0,
        cell: start,
    }]);
    let mut order = 0_u64;
    let mut expansions = 0;

    while let Some(FrontierEntry { cost, cell, .. }) = frontier.pop() {
        // Устаревшая запись: клетка уже достигнута дешевле
        if way_cost.get(&cell).is_some_and(|&best| cost > best) {
            continue;
        }
        if cell == end {
            return Ok(Path {
                cells: reconstruct(&previous, start, end),
                cost,
            });
        }
        if expansions == MAX_EXPANSIONS {
            return Err(PathError::Exhausted { expansions });
        }
        expansions += 1;

        for (_, next) in deltas.neighbors(cell, columns, rows) {
            if next >= len {
                continue;
            }
            let step = cell_cost(world[next]);
            if !step.is_finite() || step < 0.0 {
                continue;
            }
            let total = cost + step;
            if way_cost.get(&next).is_none_or(|&known| known > total) {
                way_cost.insert(next, total);
                previous.insert(next, cell);
                order += 1;
                frontier.push(FrontierEntry {
                    cost: total,
                    order,
                    cell: next,
                });
            }
        }
    }

    Err(PathError::Unreachable)
}

fn reconstruct(previous: &HashMap<usize, usize>, start: usize, end: usize) -> Vec<usize> {
    let mut cells = vec![end];
    let mut walking = end;
    while walking != start {
        match previous.get(&walking) {
            Some(&p) => {
                cells.push(p);
                walking = p;
            }
            None => break,
        }
    }
    cells
}
