//! Геометрия сетки: квадратная и три шестиугольные раскладки
//!
//! Все клетки адресуются одним построчным индексом `row * columns + column`.
//! Раскладка определяет соседство и привязку клетки к экранным координатам:
//! - `Square` — обычная сетка с 8 соседями;
//! - `Oddr` — шестиугольники, нечётные ряды сдвинуты на полклетки вправо, высота ряда 0.75;
//! - `Width2` — шестиугольники с удвоенным индексом столбца (занят каждый второй);
//! - `Axial` — шестиугольники, каждый следующий ряд сдвинут влево ещё на полклетки.

use crate::error::{MapgenError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum GridLayout {
    Square,
    #[default]
    Oddr,
    Width2,
    Axial,
}

impl GridLayout {
    #[must_use]
    pub fn is_hex(self) -> bool {
        !matches!(self, GridLayout::Square)
    }

    /// Вертикальный шаг ряда относительно ширины клетки
    #[must_use]
    pub fn row_height_ratio(self) -> f32 {
        if self.is_hex() { 0.75 } else { 1.0 }
    }
}

/// Смещение к соседней клетке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborDelta {
    pub dx: i32,
    pub dy: i32,
    /// То же смещение в виде разницы построчных индексов: `dy * columns + dx`
    pub offset: isize,
}

/// Таблицы соседей для чётных и нечётных рядов, по часовой стрелке начиная сверху
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborDeltas {
    pub even: Vec<NeighborDelta>,
    pub odd: Vec<NeighborDelta>,
}

impl NeighborDeltas {
    fn from_steps(columns: usize, even: &[(i32, i32)], odd: &[(i32, i32)]) -> Self {
        let build = |steps: &[(i32, i32)]| {
            steps
                .iter()
                .map(|&(dx, dy)| NeighborDelta {
                    dx,
                    dy,
                    offset: dy as isize * columns as isize + dx as isize,
                })
                .collect()
        };
        Self {
            even: build(even),
            odd: build(odd),
        }
    }

    /// Таблица для ряда `row` (выбор по чётности ряда)
    #[must_use]
    pub fn for_row(&self, row: usize) -> &[NeighborDelta] {
        if row % 2 == 0 { &self.even } else { &self.odd }
    }

    /// Смещения индексов для ряда `row`
    #[must_use]
    pub fn offsets(&self, row: usize) -> Vec<isize> {
        self.for_row(row).iter().map(|d| d.offset).collect()
    }

    /// Число соседей (6 для шестиугольников, 8 для квадратов)
    #[must_use]
    pub fn sides(&self) -> usize {
        self.even.len()
    }

    /// Соседи клетки в пределах сетки `columns × rows` вместе с номером стороны.
    ///
    /// Соседи за левым/правым краем отбрасываются, а не переносятся на соседний ряд.
    pub fn neighbors(
        &self,
        index: usize,
        columns: usize,
        rows: usize,
    ) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (x, y) = ind2xy(index, columns);
        self.for_row(y)
            .iter()
            .enumerate()
            .filter_map(move |(side, d)| {
                let nx = x as i64 + i64::from(d.dx);
                let ny = y as i64 + i64::from(d.dy);
                if nx < 0 || ny < 0 || nx >= columns as i64 || ny >= rows as i64 {
                    None
                } else {
                    Some((side, ny as usize * columns + nx as usize))
                }
            })
    }
}

/// Строит таблицы соседей для раскладки
#[must_use]
pub fn create_neighbor_deltas(columns: usize, layout: GridLayout) -> NeighborDeltas {
    match layout {
        GridLayout::Square => {
            let steps = [
                (0, -1),
                (1, -1),
                (1, 0),
                (1, 1),
                (0, 1),
                (-1, 1),
                (-1, 0),
                (-1, -1),
            ];
            NeighborDeltas::from_steps(columns, &steps, &steps)
        }
        GridLayout::Oddr => NeighborDeltas::from_steps(
            columns,
            &[(0, -1), (1, 0), (0, 1), (-1, 1), (-1, 0), (-1, -1)],
            &[(1, -1), (1, 0), (1, 1), (0, 1), (-1, 0), (0, -1)],
        ),
        GridLayout::Width2 => {
            let steps = [(1, -1), (2, 0), (1, 1), (-1, 1), (-2, 0), (-1, -1)];
            NeighborDeltas::from_steps(columns, &steps, &steps)
        }
        GridLayout::Axial => {
            let steps = [(0, -1), (1, 0), (1, 1), (0, 1), (-1, 0), (-1, -1)];
            NeighborDeltas::from_steps(columns, &steps, &steps)
        }
    }
}

/// Индекс → `(столбец, ряд)`
#[must_use]
pub fn ind2xy(index: usize, columns: usize) -> (usize, usize) {
    (index % columns, index / columns)
}

/// `(столбец, ряд)` → индекс
#[must_use]
pub fn xy2ind(x: usize, y: usize, columns: usize) -> usize {
    y * columns + x
}

/// Привязка клетки к непрерывным координатам на плоскости.
///
/// Без `cell_height` шаг ряда равен `0.75 · cell_width` (сжатие рядов шестиугольников).
#[must_use]
pub fn screen_pos(
    index: usize,
    columns: usize,
    cell_width: f32,
    layout: GridLayout,
    cell_height: Option<f32>,
) -> (f32, f32) {
    let (x, y) = ind2xy(index, columns);
    let (xf, yf) = (x as f32, y as f32);
    let shift = match layout {
        GridLayout::Axial => -yf * 0.5,
        GridLayout::Oddr => (y % 2) as f32 * 0.5,
        GridLayout::Width2 => -xf / 2.0,
        GridLayout::Square => 0.0,
    };
    (
        (xf + shift) * cell_width,
        yf * cell_height.unwrap_or(cell_width * 0.75),
    )
}

/// Переводит клетку в осевые координаты `(a, b)`, в которых шестиугольные соседи —
/// это `(0,-1) (1,0) (1,1) (0,1) (-1,0) (-1,-1)`.
fn to_axial(x: i64, y: i64, layout: GridLayout) -> (i64, i64) {
    match layout {
        GridLayout::Square | GridLayout::Axial => (x, y),
        // ceil(y / 2): нечётные ряды сдвинуты вправо
        GridLayout::Oddr => (x + (y + 1).div_euclid(2), y),
        GridLayout::Width2 => ((x + y).div_euclid(2), y),
    }
}

/// Расстояние между клетками в шагах по соседям
#[must_use]
pub fn distance_between_cells(a: usize, b: usize, columns: usize, layout: GridLayout) -> usize {
    let (ax, ay) = ind2xy(a, columns);
    let (bx, by) = ind2xy(b, columns);
    let (ax, ay) = to_axial(ax as i64, ay as i64, layout);
    let (bx, by) = to_axial(bx as i64, by as i64, layout);
    let (dx, dy) = (bx - ax, by - ay);
    let distance = match layout {
        // Чебышёв
        GridLayout::Square => dx.abs().max(dy.abs()),
        _ => dx.abs().max(dy.abs()).max((dx - dy).abs()),
    };
    distance as usize
}

/// Результат пересчёта мелкой растровой сетки в крупную
#[derive(Debug, Clone, PartialEq)]
pub struct Rescaled {
    /// Для каждой крупной клетки — индекс представительного пикселя, `None` вне растра
    pub indices: Vec<Option<usize>>,
    pub columns: usize,
    pub occupied_columns: usize,
    pub rows: usize,
}

/// Строит крупную сетку раскладки `layout` поверх растра `width × height`
/// с шагом `scale` пикселей на клетку.
pub fn rescale_coordinates(
    width: usize,
    height: usize,
    scale: f32,
    layout: GridLayout,
) -> Result<Rescaled> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(MapgenError::invalid(
            "scale",
            format!("must be a positive number, got {scale}"),
        ));
    }
    let scale = f64::from(scale);
    let vertical_scale = scale * f64::from(layout.row_height_ratio());

    let rows = (height as f64 / vertical_scale).floor() as usize;
    let occupied_columns = (width as f64 / scale).floor() as usize;
    let columns = match layout {
        GridLayout::Axial => (occupied_columns as f64 + rows as f64 / 2.0).ceil() as usize,
        GridLayout::Width2 => occupied_columns * 2,
        _ => occupied_columns,
    };

    let mut indices = vec![None; rows * columns];
    let step = if layout == GridLayout::Width2 { 2 } else { 1 };

    for row in 0..rows {
        let y = ((row as f64 + 0.5) * vertical_scale).floor() as usize;
        let start_x = match layout {
            GridLayout::Axial => -scale * 0.5 * row as f64,
            GridLayout::Oddr if row % 2 == 1 => scale / 2.0,
            GridLayout::Oddr => 1.0,
            _ => 0.0,
        };
        let first_column = usize::from(layout == GridLayout::Width2 && row % 2 == 1);

        for column in (first_column..columns).step_by(step) {
            let x = (start_x + column as f64 * scale / step as f64).floor();
            if x >= 0.0 && (x as usize) < width {
                indices[row * columns + column] = Some(y * width + x as usize);
            }
        }
    }

    Ok(Rescaled {
        indices,
        columns,
        occupied_columns,
        rows,
    })
}

/// Размеры и раскладка сетки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub layout: GridLayout,
    pub rows: usize,
    pub columns: usize,
}

impl Geometry {
    #[must_use]
    pub fn new(layout: GridLayout, rows: usize, columns: usize) -> Self {
        Self {
            layout,
            rows,
            columns,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows * self.columns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < self.len()
    }

    #[must_use]
    pub fn neighbor_deltas(&self) -> NeighborDeltas {
        create_neighbor_deltas(self.columns, self.layout)
    }

    #[must_use]
    pub fn distance(&self, a: usize, b: usize) -> usize {
        distance_between_cells(a, b, self.columns, self.layout)
    }

    #[must_use]
    pub fn screen_pos(&self, index: usize, cell_width: f32) -> (f32, f32) {
        screen_pos(index, self.columns, cell_width, self.layout, None)
    }
}
