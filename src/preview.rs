//! Превью карты в PNG
//!
//! Растровые картинки для просмотра результата: рельеф со ступенчатой
//! раскраской высот и карта биомов с морем и реками.

use crate::error::Result;
use crate::field::cell_index;
use crate::generator::TerrainBundle;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

/// Число ступеней при раскраске высот
const DISCRETE_HEIGHTS: f32 = 10.0;
/// Поток, с которого река рисуется в полную толщину
const FULL_RIVER_FLOW: f32 = 20.0;

fn channel(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

fn level(v: f32) -> f32 {
    (v * DISCRETE_HEIGHTS).floor() / DISCRETE_HEIGHTS
}

/// Цвет моря по глубине
fn sea_colour(v: f32) -> Rgba<u8> {
    let l = level(v);
    Rgba([0, channel(l * 60.0 + 60.0), channel(l * 80.0 + 100.0), 255])
}

/// Рельеф: море по глубине, суша ступенями от зелёного к жёлтому, реки голубым
#[must_use]
pub fn render_relief(bundle: &TerrainBundle) -> RgbaImage {
    RgbaImage::from_fn(bundle.width, bundle.height, |x, y| {
        let i = cell_index(x, y, bundle.width);
        let v = bundle.elevation.data[i];
        if v <= 0.0 {
            return sea_colour(v);
        }
        if bundle.rivers.data[i] > 0.0 {
            return Rgba([0, channel(v * 400.0), 200, 255]);
        }
        let l = level(v);
        Rgba([channel(l * 300.0), channel(l * 200.0 + 100.0), 50, 255])
    })
}

/// Биомы на суше, море по глубине, реки кругами толщиной по потоку
#[must_use]
pub fn render_biomes(bundle: &TerrainBundle) -> RgbaImage {
    let mut img = RgbaImage::from_fn(bundle.width, bundle.height, |x, y| {
        let i = cell_index(x, y, bundle.width);
        let v = bundle.elevation.data[i];
        if v <= 0.0 {
            sea_colour(v)
        } else {
            let [r, g, b] = bundle.biome.data[i].to_rgb();
            Rgba([r, g, b, 255])
        }
    });

    let river = Rgba([40, 110, 220, 255]);
    for (i, &flow) in bundle.rivers.data.iter().enumerate() {
        if flow <= 0.0 || bundle.elevation.data[i] <= 0.0 {
            continue;
        }
        let x = (i % bundle.width as usize) as i32;
        let y = (i / bundle.width as usize) as i32;
        // Толщина: от точки до радиуса 2 в зависимости от объёма воды
        let radius = ((flow / FULL_RIVER_FLOW).min(1.0) * 2.0).round() as i32;
        draw_filled_circle_mut(&mut img, (x, y), radius, river);
    }
    img
}

pub fn save_relief(bundle: &TerrainBundle, path: &str) -> Result<()> {
    render_relief(bundle).save(path)?;
    Ok(())
}

pub fn save_biomes(bundle: &TerrainBundle, path: &str) -> Result<()> {
    render_biomes(bundle).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapOptions;
    use crate::generator::generate_map;

    fn bundle() -> TerrainBundle {
        generate_map(&MapOptions {
            width: 40,
            height: 24,
            seed: 3,
            sea_ratio: 0.5,
            erosion: 0.0,
            pangaea: 2.0,
            river_age: 5,
            rivers_shown: 30,
            randomise_humidity: true,
        })
        .unwrap()
    }

    #[test]
    fn images_match_the_map_size() {
        let bundle = bundle();
        assert_eq!(render_relief(&bundle).dimensions(), (40, 24));
        assert_eq!(render_biomes(&bundle).dimensions(), (40, 24));
    }

    #[test]
    fn sea_is_drawn_in_blue_shades() {
        let bundle = bundle();
        let img = render_biomes(&bundle);
        let sea = (0..bundle.cell_count())
            .find(|&i| bundle.elevation.data[i] <= 0.0)
            .unwrap();
        let pixel = img.get_pixel(sea as u32 % 40, sea as u32 / 40);
        // и глубина, и круги рек дают синего больше, чем зелёного
        assert!(pixel[2] > pixel[1]);
    }

    #[test]
    fn colour_channels_saturate() {
        assert_eq!(channel(400.0), 255);
        assert_eq!(channel(-3.0), 0);
        assert_eq!(sea_colour(-1.0), Rgba([0, 0, 20, 255]));
    }
}
