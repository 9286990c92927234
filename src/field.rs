use crate::error::{MapgenError, Result};
use image::{ImageBuffer, Luma};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Построчный индекс клетки `(x, y)` на карте шириной `width`
#[must_use]
pub fn cell_index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// Скалярное поле: одно значение `f32` на клетку, построчная индексация `y * width + x`
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl ScalarField {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0.0)
    }

    #[must_use]
    pub fn filled(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(MapgenError::invalid(
                "data",
                format!("expected {expected} values, got {}", data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Поле, вычисленное поклеточно из индекса
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(usize) -> f32 + Sync + Send,
    {
        Self {
            width,
            height,
            data: map_cells(width as usize * height as usize, f),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[cell_index(x, y, self.width)]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        self.data[cell_index(x, y, self.width)] = value;
    }

    /// Минимум и максимум поля (`None` для пустого поля)
    #[must_use]
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.data.is_empty() {
            return None;
        }
        Some(self.data.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY),
            |(lo, hi), &v| (lo.min(v), hi.max(v)),
        ))
    }

    /// Размытая копия поля (см. [`blur`])
    #[must_use]
    pub fn blurred(&self, sigma: f32) -> Self {
        let mut data = self.data.clone();
        blur(&mut data, self.width as usize, self.height as usize, sigma);
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// Переводит `[lo, hi]` в оттенки серого `0..=255`
    #[must_use]
    pub fn to_grayscale_image(&self, lo: f32, hi: f32) -> Vec<u8> {
        let span = (hi - lo).max(f32::EPSILON);
        let to_byte = |v: f32| (((v - lo) / span).clamp(0.0, 1.0) * 255.0) as u8;
        #[cfg(feature = "parallel")]
        {
            self.data.par_iter().map(|&v| to_byte(v)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.data.iter().map(|&v| to_byte(v)).collect()
        }
    }

    pub fn save_as_png(&self, path: &str, lo: f32, hi: f32) -> Result<()> {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, self.to_grayscale_image(lo, hi))
                .ok_or(MapgenError::ImageBuffer {
                    width: self.width,
                    height: self.height,
                })?;
        img.save(path)?;
        Ok(())
    }
}

/// Поклеточное отображение индекса в значение (параллельно при фиче `parallel`)
pub(crate) fn map_cells<F>(len: usize, f: F) -> Vec<f32>
where
    F: Fn(usize) -> f32 + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..len).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..len).map(f).collect()
    }
}

/// Радиус коробочного фильтра, который за три прохода приближает гауссиан с `sigma`
fn box_radius(sigma: f32) -> usize {
    if sigma <= 0.0 {
        return 0;
    }
    let width = (4.0 * sigma * sigma + 1.0).sqrt();
    ((width - 1.0) / 2.0).round().max(1.0) as usize
}

/// Гауссово размытие: три коробочных прохода по строкам, затем по столбцам.
///
/// Границы не зацикливаются: за краем повторяется крайнее значение.
pub fn blur(data: &mut [f32], width: usize, height: usize, sigma: f32) {
    let radius = box_radius(sigma);
    if radius == 0 || width == 0 || height == 0 {
        return;
    }

    for _ in 0..3 {
        blur_rows(data, width, radius);
    }
    let mut transposed = transpose(data, width, height);
    for _ in 0..3 {
        blur_rows(&mut transposed, height, radius);
    }
    data.copy_from_slice(&transpose(&transposed, height, width));
}

fn blur_rows(data: &mut [f32], width: usize, radius: usize) {
    #[cfg(feature = "parallel")]
    data.par_chunks_mut(width)
        .for_each(|row| box_blur_row(row, radius));
    #[cfg(not(feature = "parallel"))]
    data.chunks_mut(width)
        .for_each(|row| box_blur_row(row, radius));
}

/// Скользящее среднее по строке с окном `2r + 1`
fn box_blur_row(row: &mut [f32], radius: usize) {
    let src = row.to_vec();
    let last = src.len() as isize - 1;
    let r = radius as isize;
    let at = |i: isize| src[i.clamp(0, last) as usize];
    let count = (2 * r + 1) as f32;

    let mut window_sum: f32 = (-r..=r).map(&at).sum();
    for x in 0..=last {
        row[x as usize] = window_sum / count;
        // Сдвигаем окно: убираем левый, добавляем правый
        window_sum += at(x + r + 1) - at(x - r);
    }
}

fn transpose(data: &[f32], width: usize, height: usize) -> Vec<f32> {
    let mut out = vec![0.0; data.len()];
    for y in 0..height {
        for x in 0..width {
            out[x * height + y] = data[y * width + x];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cell_index_does_not_wrap_on_huge_maps() {
        assert_eq!(cell_index(3, 2, 10), 23);
        assert_eq!(cell_index(1, 70_000, 70_000), 4_900_000_001);
        let max = u32::MAX as usize;
        assert_eq!(cell_index(u32::MAX, u32::MAX, u32::MAX), max * (max + 1));
    }

    #[test]
    fn get_and_set_are_row_major() {
        let mut field = ScalarField::new(4, 3);
        field.set(3, 1, 2.0);
        assert_eq!(field.data[7], 2.0);
        assert_eq!(field.get(3, 1), 2.0);
    }

    #[test]
    fn constant_field_survives_blur() {
        let field = ScalarField::filled(13, 7, 0.25);
        let blurred = field.blurred(5.0);
        for v in blurred.data {
            assert_relative_eq!(v, 0.25, epsilon = 1e-5);
        }
    }

    #[test]
    fn blur_spreads_a_spike_and_keeps_mass_inside() {
        let mut field = ScalarField::new(21, 21);
        field.set(10, 10, 1.0);
        let blurred = field.blurred(2.0);

        let total: f32 = blurred.data.iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-3);
        assert!(blurred.get(10, 10) < 1.0);
        assert!(blurred.get(11, 10) > 0.0);
        assert!(blurred.get(10, 10) > blurred.get(12, 10));
        // симметрия по горизонтали и вертикали
        assert_relative_eq!(blurred.get(8, 10), blurred.get(12, 10), epsilon = 1e-5);
        assert_relative_eq!(blurred.get(10, 8), blurred.get(10, 12), epsilon = 1e-5);
    }

    #[test]
    fn radius_larger_than_field_is_fine() {
        let mut field = ScalarField::new(4, 3);
        field.set(0, 0, 1.0);
        let blurred = field.blurred(30.0);
        assert!(blurred.data.iter().all(|v| v.is_finite() && *v >= -1e-6));
    }

    #[test]
    fn zero_sigma_is_identity() {
        let field = ScalarField::from_fn(5, 4, |i| i as f32);
        assert_eq!(field.blurred(0.0), field);
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(ScalarField::from_vec(3, 3, vec![0.0; 9]).is_ok());
        assert!(ScalarField::from_vec(3, 3, vec![0.0; 8]).is_err());
    }

    #[test]
    fn grayscale_maps_range() {
        let field = ScalarField::from_vec(3, 1, vec![-1.0, 0.0, 1.0]).unwrap();
        assert_eq!(field.to_grayscale_image(-1.0, 1.0), vec![0, 127, 255]);
        assert_eq!(field.min_max(), Some((-1.0, 1.0)));
    }
}
