use crate::error::Result;
use crate::field::ScalarField;
use crate::random::SinePrng;
use crate::sampling::{DEFAULT_PICKS, approximate_median, normalize_values};
use serde::Serialize;

/// Квантиль высоты, считающийся «самой высокой» точкой
const HIGHEST_LEVEL: f32 = 0.99;
/// Показатель спада шельфа под уровнем моря
const SHELF_POWER: f32 = 0.4;

/// Уровни, по которым высота переводится в `[-1, 0)` для моря и `(0, 1/highest]` для суши
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeaLevel {
    pub sea_level: f32,
    pub highest: f32,
}

/// Интенсивность складок: максимальна там, где тектонический шум близок к медиане
/// (границы плит), и спадает по мере удаления от неё.
pub fn compute_folds(tectonic: &ScalarField, rng: &mut SinePrng) -> Result<ScalarField> {
    let median = approximate_median(&tectonic.data, 0.5, DEFAULT_PICKS, rng)?;
    tracing::debug!(median, "tectonic median");
    let data = &tectonic.data;
    Ok(ScalarField::from_fn(tectonic.width, tectonic.height, |i| {
        1.0 / (1.0 + 5.0 * (median - data[i]).abs().atan())
    }))
}

/// Сырая высота: константа, шум, тектоника и складки минус «пангейный» член,
/// растущий с манхэттенским расстоянием от центра карты.
#[must_use]
pub fn raw_elevation(
    noise: &ScalarField,
    tectonic: &ScalarField,
    folds: &ScalarField,
    pangaea: f32,
) -> ScalarField {
    let size = noise.len() as f32;
    let width = noise.width as usize;
    ScalarField::from_fn(noise.width, noise.height, |i| {
        let from_center =
            (i as f32 / size - 0.5).abs() + ((i % width) as f32 / width as f32 - 0.5).abs();
        5.0 + noise.data[i] * 10.0 + tectonic.data[i] * 5.0 + 3.0 * folds.data[i]
            - pangaea * from_center
    })
}

/// Нормализует высоту и переводит её относительно уровня моря.
///
/// Ниже уровня моря — вогнутая кривая к −1 (шельф), выше — линейно в `(0, 1/highest]`.
pub fn normalize_elevation(
    elevation: &mut ScalarField,
    sea_ratio: f32,
    rng: &mut SinePrng,
) -> Result<SeaLevel> {
    normalize_values(&mut elevation.data, DEFAULT_PICKS, rng)?;
    let highest = approximate_median(&elevation.data, HIGHEST_LEVEL, DEFAULT_PICKS, rng)?;
    let sea_level = approximate_median(&elevation.data, sea_ratio, DEFAULT_PICKS, rng)?;

    let shelf = sea_level.abs().max(f32::EPSILON);
    let land_span = (1.0 - sea_level).max(f32::EPSILON);
    let top = highest.max(f32::EPSILON);
    for v in &mut elevation.data {
        *v = if *v < sea_level {
            -((sea_level - *v) / shelf).powf(SHELF_POWER)
        } else {
            (*v - sea_level) / land_span / top
        };
    }

    tracing::debug!(sea_level, highest, "elevation normalized");
    Ok(SeaLevel { sea_level, highest })
}

/// Смягчает сушу вне складок: `v · (1 + folds·e) / (1 + e)`, где `e = erosion²`
pub fn erode(elevation: &mut ScalarField, folds: &ScalarField, erosion: f32) {
    let e = erosion * erosion;
    if e == 0.0 {
        return;
    }
    for (v, &fold) in elevation.data.iter_mut().zip(&folds.data) {
        if *v > 0.0 {
            *v = *v * (1.0 + fold * e) / (1.0 + e);
        }
    }
}
