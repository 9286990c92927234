// src/config.rs
//! Конфигурация генерации карты
//!
//! Этот модуль определяет параметры, управляющие процедурной генерацией:
//! - Параметры конвейера рельефа (`MapOptions`)
//! - Настройки крупной сетки для маршрутов (`GridSettings`)
//!
//! Все структуры поддерживают десериализацию из TOML для настройки через конфигурационные файлы.

use crate::error::{MapgenError, Result};
use crate::geometry::GridLayout;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use validator::{Validate, ValidationError, ValidationErrors};

/// Верхняя граница `river_age + rivers_shown`
pub const MAX_RIVER_TRIALS: usize = 1_000_000;

/// Параметры конвейера рельефа
///
/// Первые семь полей обязательны: значений по умолчанию у них нет.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "river_trials"))]
pub struct MapOptions {
    /// Ширина карты в клетках
    #[validate(range(min = 1))]
    pub width: u32,

    /// Высота карты в клетках
    #[validate(range(min = 1))]
    pub height: u32,

    /// Сид генератора случайных чисел (детерминированная генерация)
    pub seed: u64,

    /// Доля клеток ниже уровня моря, `[0, 1]`
    #[validate(range(min = 0.0, max = 1.0), custom(function = "finite"))]
    pub sea_ratio: f32,

    /// Сила сглаживания суши вне складок (0 — без эрозии)
    #[validate(range(min = 0.0), custom(function = "finite"))]
    pub erosion: f32,

    /// Стягивание суши к центру карты в один континент (0 — без стягивания)
    #[validate(custom(function = "finite"))]
    pub pangaea: f32,

    /// Число «старых» рек: прорезают русла, но не попадают в карту рек
    pub river_age: usize,

    /// Число рек, записываемых в карту рек
    pub rivers_shown: usize,

    /// Добавлять шум и высотное иссушение во влажность
    #[serde(default = "default_randomise_humidity")]
    pub randomise_humidity: bool,
}

fn default_randomise_humidity() -> bool {
    true
}

impl MapOptions {
    /// Проверяет диапазоны параметров до запуска конвейера
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(|errors| invalid_options(&errors))
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Поля в порядке, в котором о них сообщается; ошибки схемы лежат под `__all__`
const CHECKED_FIELDS: [&str; 5] = ["width", "height", "sea_ratio", "erosion", "pangaea"];

fn invalid_options(errors: &ValidationErrors) -> MapgenError {
    let fields = errors.field_errors();
    let name = CHECKED_FIELDS
        .into_iter()
        .find(|name| fields.contains_key(*name))
        .unwrap_or("river_age");
    MapgenError::invalid(name, errors.to_string())
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn finite(value: f32) -> std::result::Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        let message = format!("must be finite, got {value}");
        Err(ValidationError::new("finite").with_message(Cow::from(message)))
    }
}

fn river_trials(options: &MapOptions) -> std::result::Result<(), ValidationError> {
    let trials = options.river_age.saturating_add(options.rivers_shown);
    if trials > MAX_RIVER_TRIALS {
        return Err(ValidationError::new("river_trials").with_message(Cow::from(format!(
            "river_age + rivers_shown must not exceed {MAX_RIVER_TRIALS}, got {trials}"
        ))));
    }
    Ok(())
}

/// Настройки крупной сетки, на которой строятся маршруты
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSettings {
    /// Сколько клеток рельефа приходится на одну клетку сетки по горизонтали
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Раскладка сетки (по умолчанию `ODDR`)
    #[serde(default)]
    pub layout: GridLayout,
}

fn default_scale() -> f32 {
    16.0
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            scale: 16.0,
            layout: GridLayout::Oddr,
        }
    }
}

/// Полная конфигурация одного запуска
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub map: MapOptions,

    #[serde(default)]
    pub grid: GridSettings,
}

impl WorldConfig {
    /// Загружает конфигурацию из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # world.toml
    /// [map]
    /// width = 640
    /// height = 480
    /// seed = 6
    /// sea_ratio = 0.55
    /// erosion = 0.5
    /// pangaea = 4.0
    /// river_age = 200
    /// rivers_shown = 400
    ///
    /// [grid]
    /// scale = 16.0
    /// layout = "ODDR"
    /// ```
    pub fn from_toml_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.map.validate()?;
        Ok(config)
    }
}
