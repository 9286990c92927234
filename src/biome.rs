use crate::error::{MapgenError, Result};
use crate::field::ScalarField;
use serde::{Deserialize, Serialize};

/// Биом клетки; дискриминант — числовой идентификатор слоя
#[repr(u8)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    #[default]
    Unknown = 0,
    Desert = 1,
    Grassland = 2,
    Tundra = 3,
    Savanna = 4,
    Shrubland = 5,
    Taiga = 6,
    DenseForest = 7,
    TemperateForest = 8,
    RainForest = 9,
    Swamp = 10,
    Snow = 11,
    Bare = 12,
}

use Biome::{
    Bare, DenseForest, Desert, Grassland, RainForest, Savanna, Shrubland, Snow, Taiga,
    TemperateForest, Tundra,
};

/// Строки — влажность (0 сухо … 5 мокро), столбцы — температура (0 холодно … 3 жарко)
const BIOME_TABLE: [[Biome; 4]; 6] = [
    [Bare, Savanna, Savanna, Desert],
    [Tundra, Savanna, Grassland, Grassland],
    [Tundra, Shrubland, Grassland, TemperateForest],
    [Snow, Shrubland, TemperateForest, TemperateForest],
    [Snow, Taiga, DenseForest, DenseForest],
    [Snow, Taiga, RainForest, RainForest],
];

impl Biome {
    pub const ALL: [Biome; 13] = [
        Biome::Unknown,
        Desert,
        Grassland,
        Tundra,
        Savanna,
        Shrubland,
        Taiga,
        DenseForest,
        TemperateForest,
        RainForest,
        Biome::Swamp,
        Snow,
        Bare,
    ];

    #[must_use]
    pub fn id(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Biome::Unknown => "unknown",
            Desert => "desert",
            Grassland => "grassland",
            Tundra => "tundra",
            Savanna => "savanna",
            Shrubland => "shrubland",
            Taiga => "taiga",
            DenseForest => "tropical forest",
            TemperateForest => "deciduous forest",
            RainForest => "rain forest",
            Biome::Swamp => "swamp",
            Snow => "snow",
            Bare => "bare",
        }
    }

    #[must_use]
    pub fn to_rgb(self) -> [u8; 3] {
        match self {
            Biome::Unknown => [0, 0, 0],
            Desert => [0xC8, 0x71, 0x37],
            Grassland => [0x92, 0x7E, 0x30],
            Tundra => [0x93, 0xA7, 0xAC],
            Savanna => [0x97, 0xA5, 0x27],
            Shrubland => [0xB3, 0x7C, 0x06],
            Taiga => [0x5B, 0x8F, 0x52],
            DenseForest => [0x2C, 0x89, 0xA0],
            TemperateForest => [0x0A, 0x54, 0x6D],
            RainForest => [0x07, 0x53, 0x30],
            Biome::Swamp => [0x2F, 0x66, 0x66],
            Snow => [0xFF, 0xFF, 0xFF],
            Bare => [0x80, 0x80, 0x80],
        }
    }
}

/// Биом по влажности и температуре.
///
/// Влажность квантуется в 6 корзин (`h · 4.5`), температура — в 4 (`t / 10 + 1`),
/// обе с зажимом. Нечисловые входы дают [`Biome::Unknown`].
#[must_use]
pub fn classify(humidity: f32, temperature: f32) -> Biome {
    if !humidity.is_finite() || !temperature.is_finite() {
        return Biome::Unknown;
    }
    let wet = (humidity * 4.5).clamp(0.0, 5.0).floor() as usize;
    let warm = (temperature / 10.0 + 1.0).clamp(0.0, 3.0).floor() as usize;
    BIOME_TABLE
        .get(wet)
        .and_then(|row| row.get(warm))
        .copied()
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiomeMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<Biome>,
}

/// Назначает биомы каждой клетке по влажности и температуре
pub fn assign_biomes(humidity: &ScalarField, temperature: &ScalarField) -> Result<BiomeMap> {
    if humidity.len() != temperature.len() {
        return Err(MapgenError::invalid(
            "temperature",
            format!(
                "expected {} cells, got {}",
                humidity.len(),
                temperature.len()
            ),
        ));
    }
    let data = humidity
        .data
        .iter()
        .zip(&temperature.data)
        .map(|(&h, &t)| classify(h, t))
        .collect();

    Ok(BiomeMap {
        width: humidity.width,
        height: humidity.height,
        data,
    })
}

impl BiomeMap {
    /// Сколько клеток приходится на каждый биом (нулевые не включаются)
    #[must_use]
    pub fn histogram(&self) -> Vec<(Biome, usize)> {
        let mut counts = [0_usize; Biome::ALL.len()];
        for &biome in &self.data {
            counts[usize::from(biome.id())] += 1;
        }
        Biome::ALL
            .iter()
            .zip(counts)
            .filter(|&(_, count)| count > 0)
            .map(|(&biome, count)| (biome, count))
            .collect()
    }

    #[must_use]
    pub fn to_rgba_image(&self) -> Vec<u8> {
        self.data
            .iter()
            .flat_map(|&b| {
                let rgb = b.to_rgb();
                [rgb[0], rgb[1], rgb[2], 255] // RGBA
            })
            .collect()
    }

    pub fn save_as_png(&self, path: &str) -> Result<()> {
        let img: image::ImageBuffer<image::Rgba<u8>, Vec<u8>> =
            image::ImageBuffer::from_raw(self.width, self.height, self.to_rgba_image()).ok_or(
                MapgenError::ImageBuffer {
                    width: self.width,
                    height: self.height,
                },
            )?;
        img.save(path)?;
        Ok(())
    }
}
