//! Шум из случайных эллипсов
//!
//! На пустой слой накладываются тысячи полупрозрачных эллипсов случайного размера
//! и поворота (смешивание альфа-каналов «поверх»), затем слой размывается.
//! Результат — альфа-канал в `[0, 1]`, целиком определённый последовательностью ГПСЧ.

use crate::field::ScalarField;
use crate::random::SinePrng;

/// Параметры шума
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    /// Число эллипсов
    pub points: usize,
    /// Масштаб радиуса: реальный радиус `u² · radius`
    pub radius: f32,
    /// Непрозрачность одного эллипса
    pub alpha: f32,
    /// Радиальное затухание к краю эллипса вместо равномерной заливки
    pub gradient_circles: bool,
    /// Сигма размытия после наложения
    pub blur: f32,
}

impl NoiseParams {
    /// Мелкий шум рельефа
    #[must_use]
    pub fn detail(diagonal: f32) -> Self {
        Self {
            points: 3000,
            radius: diagonal * 0.15,
            alpha: 0.01,
            gradient_circles: true,
            blur: 2.0,
        }
    }

    /// Крупный «тектонический» шум
    #[must_use]
    pub fn tectonic(diagonal: f32) -> Self {
        Self {
            points: 2000,
            radius: diagonal * 0.15,
            alpha: 0.03,
            gradient_circles: true,
            blur: 5.0,
        }
    }
}

/// Один эллипс: центр, полуоси и угол поворота
#[derive(Debug, Clone, Copy)]
struct Splat {
    x: f32,
    y: f32,
    semi_x: f32,
    semi_y: f32,
    angle: f32,
}

impl Splat {
    /// Шесть выборок ГПСЧ в фиксированном порядке: x, y, радиус, поворот, масштаб x, масштаб y
    fn draw(width: u32, height: u32, radius: f32, rng: &mut SinePrng) -> Self {
        let x = rng.next_f32() * width as f32;
        let y = rng.next_f32() * height as f32;
        let r = rng.next_f32().powi(2) * radius;
        let angle = rng.next_f32() * std::f32::consts::PI;
        let semi_x = r * (0.5 + rng.next_f32());
        let semi_y = r * (0.5 + rng.next_f32());
        Self {
            x,
            y,
            semi_x,
            semi_y,
            angle,
        }
    }

    fn paint(&self, field: &mut ScalarField, alpha: f32, gradient: bool) {
        if self.semi_x < 1e-3 || self.semi_y < 1e-3 {
            return;
        }
        let width = field.width as usize;
        let height = field.height as usize;
        let extent = self.semi_x.max(self.semi_y);
        let x0 = (self.x - extent).floor().max(0.0) as usize;
        let y0 = (self.y - extent).floor().max(0.0) as usize;
        let x1 = ((self.x + extent).ceil() as usize).min(width - 1);
        let y1 = ((self.y + extent).ceil() as usize).min(height - 1);
        let (sin, cos) = self.angle.sin_cos();

        for py in y0..=y1 {
            let dy = py as f32 + 0.5 - self.y;
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - self.x;
                // в систему координат эллипса
                let lx = (dx * cos + dy * sin) / self.semi_x;
                let ly = (-dx * sin + dy * cos) / self.semi_y;
                let d2 = lx * lx + ly * ly;
                if d2 >= 1.0 {
                    continue;
                }
                let a = if gradient { alpha * (1.0 - d2.sqrt()) } else { alpha };
                let dst = &mut field.data[py * width + px];
                *dst += a * (1.0 - *dst);
            }
        }
    }
}

/// Генерирует поле шума `width × height` и размывает его
pub fn gradient_noise(width: u32, height: u32, params: &NoiseParams, rng: &mut SinePrng) -> ScalarField {
    let mut field = ScalarField::new(width, height);
    if field.is_empty() {
        return field;
    }
    for _ in 0..params.points {
        Splat::draw(width, height, params.radius, rng).paint(
            &mut field,
            params.alpha,
            params.gradient_circles,
        );
    }
    field.blurred(params.blur)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(field: &ScalarField) -> f32 {
        field.data.iter().sum::<f32>() / field.len() as f32
    }

    fn params(points: usize, gradient_circles: bool) -> NoiseParams {
        NoiseParams {
            points,
            radius: 20.0,
            alpha: 0.05,
            gradient_circles,
            blur: 1.0,
        }
    }

    #[test]
    fn noise_is_deterministic_and_bounded() {
        let a = gradient_noise(48, 32, &params(400, true), &mut SinePrng::new(3));
        let b = gradient_noise(48, 32, &params(400, true), &mut SinePrng::new(3));
        assert_eq!(a, b);
        assert!(a.data.iter().all(|&v| (-1e-6..=1.0).contains(&v)));
        assert!(mean(&a) > 0.0);
    }

    #[test]
    fn no_points_means_empty_field() {
        let field = gradient_noise(16, 16, &params(0, true), &mut SinePrng::new(1));
        assert!(field.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn flat_splats_cover_more_than_gradient_splats() {
        let flat = gradient_noise(40, 40, &params(300, false), &mut SinePrng::new(8));
        let soft = gradient_noise(40, 40, &params(300, true), &mut SinePrng::new(8));
        assert!(mean(&flat) > mean(&soft));
    }

    #[test]
    fn more_points_accumulate_more_alpha() {
        let few = gradient_noise(40, 40, &params(50, true), &mut SinePrng::new(2));
        let many = gradient_noise(40, 40, &params(800, true), &mut SinePrng::new(2));
        assert!(mean(&many) > mean(&few));
    }

    #[test]
    fn each_splat_draws_six_values() {
        let mut rng = SinePrng::new(5);
        gradient_noise(8, 8, &params(10, true), &mut rng);
        let mut reference = SinePrng::new(5);
        for _ in 0..60 {
            reference.next_f64();
        }
        assert_eq!(rng.next_f64().to_bits(), reference.next_f64().to_bits());
    }
}
