use crate::field::ScalarField;
use crate::random::SinePrng;
use serde::Serialize;

/// Жёсткий предел шагов одного спуска
pub const STEP_LIMIT: usize = 10_000;
/// Река заканчивается, дойдя до моря глубже этой отметки
const SHALLOW_SEA: f32 = -0.2;
/// Насколько поднимается яма над самым низким соседом
const PIT_LIFT: f32 = 0.02;
/// Доля перепада, на которую размывается клетка при спуске
const EROSION_SHARE: f32 = 0.1;
/// Штраф к остатку шагов при впадении в уже текущую реку
const CAPTURE_PENALTY: usize = 10;

/// Порядок опроса соседей; при равной высоте побеждает последний
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
];

/// Сводка по симуляции рек
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiverStats {
    /// Всего попыток (`river_age + rivers_shown`)
    pub trials: usize,
    /// Попытки, прошедшие проверку влажностью
    pub sourced: usize,
    /// Спуски, записанные в карту рек
    pub recorded: usize,
    /// Самый длинный спуск в шагах
    pub longest_walk: usize,
    pub total_steps: usize,
}

/// Самый низкий сосед клетки `(x, y)` среди лежащих на карте
fn lowest_neighbor(elevation: &ScalarField, x: i32, y: i32) -> Option<(usize, f32)> {
    let (width, height) = (elevation.width as i32, elevation.height as i32);
    let mut lowest: Option<(usize, f32)> = None;
    for (dx, dy) in DIRECTIONS {
        let (nx, ny) = (x + dx, y + dy);
        if nx < 0 || ny < 0 || nx >= width || ny >= height {
            continue;
        }
        let index = (ny * width + nx) as usize;
        let value = elevation.data[index];
        if lowest.is_none_or(|(_, best)| value <= best) {
            lowest = Some((index, value));
        }
    }
    lowest
}

/// Прокладывает реки спуском по крутейшему склону.
///
/// Первые `river_age` спусков только прорезают русла в `elevation`, последние
/// `rivers_shown` ещё и накапливают поток. Возвращает карту потока: сколько раз
/// записанные реки проходили через клетку.
pub fn generate_rivers(
    elevation: &mut ScalarField,
    humidity: &ScalarField,
    river_age: usize,
    rivers_shown: usize,
    rng: &mut SinePrng,
) -> (ScalarField, RiverStats) {
    let mut rivers = ScalarField::new(elevation.width, elevation.height);
    let mut stats = RiverStats {
        trials: river_age + rivers_shown,
        ..RiverStats::default()
    };
    if elevation.is_empty() {
        return (rivers, stats);
    }
    let width = elevation.width as usize;

    for trial in 0..stats.trials {
        let mut current = rng.next_index(elevation.len());
        if humidity.data[current] < rng.next_f32() {
            continue;
        }
        stats.sourced += 1;
        let recorded = trial >= river_age;
        if recorded {
            stats.recorded += 1;
        }

        let mut budget = STEP_LIMIT;
        let mut steps = 0;
        while elevation.data[current] > SHALLOW_SEA && budget > 0 {
            budget -= 1;
            steps += 1;
            if recorded {
                rivers.data[current] += 1.0;
            }

            let here = elevation.data[current];
            let (x, y) = ((current % width) as i32, (current / width) as i32);
            let Some((lowest, lowest_value)) = lowest_neighbor(elevation, x, y) else {
                // карта из одной клетки: течь некуда
                break;
            };
            if lowest_value < here {
                elevation.data[current] -= (here - lowest_value) * EROSION_SHARE;
                if rivers.data[lowest] > 0.0 {
                    budget = budget.saturating_sub(CAPTURE_PENALTY);
                }
                current = lowest;
            } else {
                elevation.data[current] = lowest_value + PIT_LIFT;
            }
        }

        stats.longest_walk = stats.longest_walk.max(steps);
        stats.total_steps += steps;
    }

    tracing::debug!(
        trials = stats.trials,
        sourced = stats.sourced,
        recorded = stats.recorded,
        longest_walk = stats.longest_walk,
        "rivers traced"
    );
    (rivers, stats)
}
