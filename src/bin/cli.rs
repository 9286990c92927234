use clap::Parser;
use mapgen::{GridWorld, Path, TerrainSummary, WorldConfig, generate_map, preview};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Процедурный генератор карт
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Каталог для elevation.png, biome.png и summary.json
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Переопределить сид из конфигурации
    #[arg(short, long)]
    seed: Option<u64>,

    /// Проложить маршрут между двумя клетками крупной сетки
    #[arg(long, num_args = 2, value_names = ["START", "END"])]
    route: Option<Vec<usize>>,

    /// Сохранить промежуточные поля (влажность, температура, ...) в оттенках серого
    #[arg(long)]
    fields: bool,

    /// Подробный лог (уровень debug)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct GridReport {
    rows: usize,
    columns: usize,
    layout: mapgen::GridLayout,
}

#[derive(Serialize)]
struct RouteReport {
    cells: Vec<usize>,
    cost: f64,
}

#[derive(Serialize)]
struct Report<'a> {
    options: &'a mapgen::MapOptions,
    terrain: TerrainSummary,
    grid: GridReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<RouteReport>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn path_str(path: &std::path::Path) -> Result<&str, Box<dyn std::error::Error>> {
    path.to_str()
        .ok_or_else(|| format!("path is not valid UTF-8: {}", path.display()).into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::info!(config = %cli.config.display(), "loading configuration");
    let mut config = WorldConfig::from_toml_file(path_str(&cli.config)?)?;
    if let Some(seed) = cli.seed {
        config.map.seed = seed;
    }

    let bundle = generate_map(&config.map)?;
    let world = GridWorld::from_terrain(&bundle, &config.grid)?;

    std::fs::create_dir_all(&cli.output_dir)?;
    let out = |name: &str| cli.output_dir.join(name);

    preview::save_relief(&bundle, path_str(&out("elevation.png"))?)?;
    preview::save_biomes(&bundle, path_str(&out("biome.png"))?)?;
    if cli.fields {
        for (name, field, lo, hi) in [
            ("humidity.png", &bundle.humidity, 0.0, 1.0),
            ("temperature.png", &bundle.temperature, -30.0, 50.0),
            ("wind.png", &bundle.wind, -1.0, 1.0),
            ("folds.png", &bundle.folds, 0.0, 1.0),
            ("noise.png", &bundle.noise, 0.0, 1.0),
            ("tectonic.png", &bundle.tectonic, 0.0, 1.0),
        ] {
            field.save_as_png(path_str(&out(name))?, lo, hi)?;
        }
    }

    let route = match cli.route.as_deref() {
        Some(&[start, end]) => match world.route(start, end) {
            Ok(Path { cells, cost }) => {
                tracing::info!(start, end, steps = cells.len(), cost, "route found");
                Some(RouteReport { cells, cost })
            }
            Err(err) => {
                tracing::warn!(start, end, %err, "route not found");
                None
            }
        },
        _ => None,
    };

    let report = Report {
        options: &config.map,
        terrain: bundle.summary(),
        grid: GridReport {
            rows: world.geometry.rows,
            columns: world.geometry.columns,
            layout: world.geometry.layout,
        },
        route,
    };
    let summary_path = out("summary.json");
    std::fs::write(&summary_path, serde_json::to_string_pretty(&report)?)?;

    tracing::info!(output = %cli.output_dir.display(), "done");
    Ok(())
}
