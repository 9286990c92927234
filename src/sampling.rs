//! Монте-Карло оценки по большим скалярным полям
//!
//! Оценки приближённые: выборка с возвращением из `picks` значений, без поправок.
//! Для формирования рельефа этого достаточно, для статистики — нет.

use crate::error::{MapgenError, Result};
use crate::random::SinePrng;

/// Размер выборки по умолчанию
pub const DEFAULT_PICKS: usize = 1000;

fn pick(values: &[f32], picks: usize, rng: &mut SinePrng) -> Result<Vec<f32>> {
    if values.is_empty() || picks == 0 {
        return Err(MapgenError::EmptyField);
    }
    Ok((0..picks)
        .map(|_| values[rng.next_index(values.len())])
        .collect())
}

/// Приближённый квантиль уровня `level` (0.5 — медиана)
pub fn approximate_median(
    values: &[f32],
    level: f32,
    picks: usize,
    rng: &mut SinePrng,
) -> Result<f32> {
    let mut picked = pick(values, picks, rng)?;
    picked.sort_by(f32::total_cmp);
    let position = ((level * picked.len() as f32).floor().max(0.0) as usize).min(picked.len() - 1);
    Ok(picked[position])
}

/// Делит все значения на выборочный максимум и возвращает этот максимум.
///
/// Значения больше выборочного максимума остаются больше 1. При неположительном
/// максимуме поле не меняется.
pub fn normalize_values(values: &mut [f32], picks: usize, rng: &mut SinePrng) -> Result<f32> {
    let max = pick(values, picks, rng)?
        .into_iter()
        .fold(0.0_f32, f32::max);
    if max > 0.0 {
        for v in values.iter_mut() {
            *v /= max;
        }
    } else {
        tracing::warn!(max, "sampled maximum is not positive, field left as is");
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|v| v as f32).collect()
    }

    #[test]
    fn median_converges_over_seeds() {
        let values = ramp(1000);
        let seeds = 100;
        let mean: f32 = (0..seeds)
            .map(|seed| {
                let mut rng = SinePrng::new(seed);
                approximate_median(&values, 0.5, DEFAULT_PICKS, &mut rng).unwrap()
            })
            .sum::<f32>()
            / seeds as f32;
        assert!((mean - 500.0).abs() < 10.0, "mean median = {mean}");
    }

    #[test]
    fn extreme_levels_stay_in_bounds() {
        let values = ramp(50);
        let mut rng = SinePrng::new(11);
        let top = approximate_median(&values, 1.0, 200, &mut rng).unwrap();
        let bottom = approximate_median(&values, 0.0, 200, &mut rng).unwrap();
        let below = approximate_median(&values, -0.5, 200, &mut rng).unwrap();
        assert!(top <= 49.0 && top >= 40.0);
        assert!(bottom <= 5.0);
        assert!(below <= 5.0);
    }

    #[test]
    fn quantiles_are_ordered() {
        let values = ramp(10_000);
        let mut rng = SinePrng::new(5);
        let low = approximate_median(&values, 0.1, DEFAULT_PICKS, &mut rng).unwrap();
        let high = approximate_median(&values, 0.9, DEFAULT_PICKS, &mut rng).unwrap();
        assert!(low < high);
    }

    #[test]
    fn empty_input_is_an_error() {
        let mut rng = SinePrng::new(1);
        assert!(matches!(
            approximate_median(&[], 0.5, 10, &mut rng),
            Err(MapgenError::EmptyField)
        ));
        assert!(normalize_values(&mut [1.0], 0, &mut rng).is_err());
    }

    #[test]
    fn normalize_divides_by_sampled_max() {
        let mut values = vec![2.0; 64];
        let mut rng = SinePrng::new(9);
        let max = normalize_values(&mut values, DEFAULT_PICKS, &mut rng).unwrap();
        assert_eq!(max, 2.0);
        assert!(values.iter().all(|&v| v == 1.0));

        let mut ramp = ramp(1000);
        let max = normalize_values(&mut ramp, 100, &mut rng).unwrap();
        assert!(max <= 999.0);
        assert!(ramp.iter().copied().fold(0.0, f32::max) >= 1.0);
    }

    #[test]
    fn non_positive_max_leaves_field() {
        let mut values = vec![-1.0, -2.0, 0.0];
        let mut rng = SinePrng::new(2);
        normalize_values(&mut values, 10, &mut rng).unwrap();
        assert_eq!(values, vec![-1.0, -2.0, 0.0]);
    }
}
