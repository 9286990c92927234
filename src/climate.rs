use crate::field::{ScalarField, blur};
use crate::random::SinePrng;

/// Сколько раз влага переносится ветром
const HUMIDITY_SPLATS: usize = 1000;
/// Непрозрачность одного переноса
const HUMIDITY_OPACITY: f32 = 0.15;
/// Сигма финального размытия влажности
const HUMIDITY_BLUR: f32 = 30.0;
/// Сигма сглаживания ветра
const WIND_BLUR: f32 = 5.0;

/// Расстояние от экватора (середины карты по вертикали) в долях высоты, `[0, 0.5]`
fn latitude(index: usize, size: usize) -> f32 {
    (0.5 - index as f32 / size as f32).abs()
}

/// Температура: жарко на экваторе, холодно к полюсам и на высоте
#[must_use]
pub fn generate_temperature(elevation: &ScalarField) -> ScalarField {
    let size = elevation.len();
    let data = &elevation.data;
    ScalarField::from_fn(elevation.width, elevation.height, |i| {
        50.0 - 110.0 * latitude(i, size) - data[i].max(0.0) * 30.0
    })
}

/// Ветер в `[-1, 1]`: знак чередуется по широтным поясам, горы гасят силу
#[must_use]
pub fn generate_wind(elevation: &ScalarField) -> ScalarField {
    let size = elevation.len();
    let data = &elevation.data;
    // Кодируем в [0, 1], размываем и возвращаем в [-1, 1]
    let encoded = ScalarField::from_fn(elevation.width, elevation.height, |i| {
        let band = ((latitude(i, size) * 4.0 + 0.75) * std::f32::consts::PI).cos();
        let wind = band / (1.0 + 2.0 * data[i].max(0.0));
        (wind + 1.0) * 0.5
    });
    let blurred = encoded.blurred(WIND_BLUR);
    ScalarField::from_fn(elevation.width, elevation.height, |i| {
        (blurred.data[i] * 2.0 - 1.0).clamp(-1.0, 1.0)
    })
}

/// Буфер с полями вокруг карты: рамка по краю изображает окружающий океан
struct WetnessBuffer {
    width: usize,
    height: usize,
    border: usize,
    data: Vec<f32>,
}

impl WetnessBuffer {
    fn new(map_width: usize, map_height: usize) -> Self {
        let border = map_width / 2;
        let width = map_width + 2 * border;
        let height = map_height + 2 * border;
        let mut buffer = Self {
            width,
            height,
            border,
            data: vec![0.0; width * height],
        };
        buffer.stroke_frame(map_width, map_height);
        buffer
    }

    /// Непрозрачная рамка толщиной `border / 2` по прямоугольнику, отступившему на `border / 2`
    fn stroke_frame(&mut self, map_width: usize, map_height: usize) {
        let b = self.border as f32;
        let half_line = b / 4.0;
        let (left, top) = (b / 2.0, b / 2.0);
        let right = left + map_width as f32 + b;
        let bottom = top + map_height as f32 + b;

        for y in 0..self.height {
            let cy = y as f32 + 0.5;
            for x in 0..self.width {
                let cx = x as f32 + 0.5;
                let in_outer = cx >= left - half_line
                    && cx <= right + half_line
                    && cy >= top - half_line
                    && cy <= bottom + half_line;
                let in_inner = cx > left + half_line
                    && cx < right - half_line
                    && cy > top + half_line
                    && cy < bottom - half_line;
                if in_outer && !in_inner {
                    self.data[y * self.width + x] = 1.0;
                }
            }
        }
    }

    fn get(&self, x: isize, y: isize) -> f32 {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            0.0
        } else {
            self.data[y as usize * self.width + x as usize]
        }
    }

    /// Копирует квадрат `spot × spot` из `from` в `to` с непрозрачностью `opacity`
    fn copy_region(&mut self, from: (isize, isize), to: (isize, isize), spot: usize, opacity: f32) {
        let spot = spot as isize;
        // Снимок источника: области могут перекрываться
        let snapshot: Vec<f32> = (0..spot)
            .flat_map(|dy| (0..spot).map(move |dx| (dx, dy)))
            .map(|(dx, dy)| self.get(from.0 + dx, from.1 + dy))
            .collect();

        for dy in 0..spot {
            let y = to.1 + dy;
            if y < 0 || y >= self.height as isize {
                continue;
            }
            for dx in 0..spot {
                let x = to.0 + dx;
                if x < 0 || x >= self.width as isize {
                    continue;
                }
                let a = snapshot[(dy * spot + dx) as usize] * opacity;
                let dst = &mut self.data[y as usize * self.width + x as usize];
                *dst += a * (1.0 - *dst);
            }
        }
    }
}

/// Влажность в `[0, 1]`: море насыщено, влага разносится ветром вглубь суши.
///
/// Дешёвое стохастическое приближение переноса: тысяча копий небольших областей
/// буфера со сдвигом по ветру, затем сильное размытие.
#[must_use]
pub fn generate_humidity(elevation: &ScalarField, wind: &ScalarField, rng: &mut SinePrng) -> ScalarField {
    let width = elevation.width as usize;
    let height = elevation.height as usize;
    let coastal: Vec<f32> = elevation
        .data
        .iter()
        .map(|&v| if v <= 0.0 { 1.0 } else { 0.0 })
        .collect();

    let mut wetness = WetnessBuffer::new(width, height);
    let border = wetness.border;
    for y in 0..height {
        let row = (y + border) * wetness.width + border;
        wetness.data[row..row + width].copy_from_slice(&coastal[y * width..(y + 1) * width]);
    }

    let diagonal = ((width * width + height * height) as f32).sqrt();
    let spot = (diagonal / 10.0).round().max(1.0) as usize;
    let (w, h) = (width as f32, height as f32);

    for _ in 0..HUMIDITY_SPLATS {
        let end_x = rng.next_f32() * w;
        let end_y = rng.next_f32() * h;
        let end_cell = (end_y as usize).min(height - 1) * width + (end_x as usize).min(width - 1);
        let end_wind = wind.data[end_cell];
        let start_x = end_x + end_wind * (rng.next_f32() - 0.2) * w / 4.0;
        let start_y = end_y + end_wind.abs() * (rng.next_f32() - 0.5) * w / 16.0;

        let b = border as f32;
        wetness.copy_region(
            ((end_x + b).floor() as isize, (end_y + b).floor() as isize),
            ((start_x + b).round() as isize, (start_y + b).round() as isize),
            spot,
            HUMIDITY_OPACITY,
        );
    }

    let mut crop: Vec<f32> = (0..height)
        .flat_map(|y| {
            let row = (y + border) * wetness.width + border;
            wetness.data[row..row + width].to_vec()
        })
        .collect();
    blur(&mut crop, width, height, HUMIDITY_BLUR);

    // Размытая влага поверх береговой маски
    ScalarField::from_fn(elevation.width, elevation.height, |i| {
        let c = crop[i].clamp(0.0, 1.0);
        (c + coastal[i] * (1.0 - c)).min(1.0)
    })
}

/// Шум и высотное иссушение поверх влажности
#[must_use]
pub fn randomise_humidity(humidity: &ScalarField, noise: &ScalarField, elevation: &ScalarField) -> ScalarField {
    ScalarField::from_fn(humidity.width, humidity.height, |i| {
        (humidity.data[i] + (noise.data[i] * 50.0).sin() / 10.0 - elevation.data[i] * 0.2).max(0.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_mean(field: &ScalarField, x: u32) -> f32 {
        (0..field.height).map(|y| field.get(x, y)).sum::<f32>() / field.height as f32
    }

    #[test]
    fn temperature_falls_towards_poles_and_with_height() {
        let flat = ScalarField::filled(10, 20, 0.0);
        let t = generate_temperature(&flat);
        assert!(t.get(5, 10) > t.get(5, 2));
        assert!(t.get(5, 10) > t.get(5, 18));
        assert!((t.get(0, 0) - (50.0 - 55.0)).abs() < 1e-4);

        let mut hill = flat.clone();
        hill.set(5, 10, 1.0);
        let t_hill = generate_temperature(&hill);
        assert!((t.get(5, 10) - t_hill.get(5, 10) - 30.0).abs() < 1e-4);
        // море не охлаждает
        let sea = ScalarField::filled(10, 20, -1.0);
        assert_eq!(generate_temperature(&sea), t);
    }

    #[test]
    fn wind_bands_alternate_by_latitude() {
        let sea = ScalarField::filled(30, 80, -0.5);
        let wind = generate_wind(&sea);
        assert!(wind.data.iter().all(|v| (-1.0..=1.0).contains(v)));
        assert!(wind.get(15, 40) < 0.0, "equator {}", wind.get(15, 40));
        assert!(wind.get(15, 20) > 0.0, "mid latitude {}", wind.get(15, 20));
        assert!(wind.get(15, 60) > 0.0);
    }

    #[test]
    fn mountains_damp_the_wind() {
        let sea = ScalarField::filled(30, 80, -0.5);
        let mountains = ScalarField::filled(30, 80, 2.0);
        let calm = generate_wind(&mountains);
        let open = generate_wind(&sea);
        assert!(calm.get(15, 20).abs() < open.get(15, 20).abs());
    }

    #[test]
    fn sea_is_saturated_and_coast_is_wetter_than_inland() {
        let (width, height) = (96, 64);
        let elevation = ScalarField::from_fn(width, height, |i| {
            let x = i % width as usize;
            if !(16..80).contains(&x) { -0.5 } else { 0.3 }
        });
        let wind = generate_wind(&elevation);
        let humidity = generate_humidity(&elevation, &wind, &mut SinePrng::new(4));

        assert!(humidity.data.iter().all(|v| (0.0..=1.0).contains(v)));
        for y in 0..height {
            assert!((humidity.get(3, y) - 1.0).abs() < 1e-6);
            assert!((humidity.get(90, y) - 1.0).abs() < 1e-6);
        }
        assert!(column_mean(&humidity, 18) > column_mean(&humidity, 48));
    }

    #[test]
    fn humidity_is_deterministic() {
        let elevation = ScalarField::from_fn(40, 30, |i| if i % 7 == 0 { -0.1 } else { 0.2 });
        let wind = generate_wind(&elevation);
        let a = generate_humidity(&elevation, &wind, &mut SinePrng::new(12));
        let b = generate_humidity(&elevation, &wind, &mut SinePrng::new(12));
        assert_eq!(a, b);
    }

    #[test]
    fn randomised_humidity_is_never_negative() {
        let humidity = ScalarField::filled(8, 8, 0.05);
        let noise = ScalarField::from_fn(8, 8, |i| i as f32 / 64.0);
        let elevation = ScalarField::filled(8, 8, 1.0);
        let dried = randomise_humidity(&humidity, &noise, &elevation);
        assert!(dried.data.iter().all(|&v| v >= 0.0));
        assert!(dried.data.iter().any(|&v| v == 0.0));
    }
}
