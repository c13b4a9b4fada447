use clap::Parser;
use northfit::{
    Anchor, Composition, Crs, Extent, FitConfig, ImageFileProbe, ItemId, NaturalSize, NorthMode,
    PictureEvent, PictureSource, Rect, ResizeMode, TrueNorthCalculator,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "northfit CLI (JSON scene driven)")]
struct Cli {
    /// Path to the JSON scene file.
    #[arg(short, long, value_name = "FILE", default_value = "scene.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example scene and exit.
    #[arg(long)]
    print_example: bool,
    /// Log recomputations to stderr.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ResizeModeConfig {
    #[default]
    Zoom,
    Stretch,
    Clip,
    ZoomResizeFrame,
    FrameToImageSize,
}

impl From<ResizeModeConfig> for ResizeMode {
    fn from(value: ResizeModeConfig) -> Self {
        match value {
            ResizeModeConfig::Zoom => ResizeMode::Zoom,
            ResizeModeConfig::Stretch => ResizeMode::Stretch,
            ResizeModeConfig::Clip => ResizeMode::Clip,
            ResizeModeConfig::ZoomResizeFrame => ResizeMode::ZoomResizeFrame,
            ResizeModeConfig::FrameToImageSize => ResizeMode::FrameToImageSize,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NorthModeConfig {
    #[default]
    None,
    GridNorth,
    TrueNorth,
}

impl From<NorthModeConfig> for NorthMode {
    fn from(value: NorthModeConfig) -> Self {
        match value {
            NorthModeConfig::None => NorthMode::None,
            NorthModeConfig::GridNorth => NorthMode::GridNorth,
            NorthModeConfig::TrueNorth => NorthMode::TrueNorth,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MapJson {
    name: String,
    crs: String,
    extent: [f64; 4],
    rotation_deg: f64,
}

impl Default for MapJson {
    fn default() -> Self {
        Self {
            name: String::new(),
            crs: Crs::WGS84.to_string(),
            extent: [-180.0, -90.0, 180.0, 90.0],
            rotation_deg: 0.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PictureJson {
    name: String,
    source: Option<String>,
    /// Natural size in pixels; read from the local file when absent.
    natural_size: Option<[u32; 2]>,
    frame: [f64; 4],
    resize_mode: ResizeModeConfig,
    /// Anchor name such as `middle` or `upper-left`.
    anchor: Option<String>,
    frame_enabled: bool,
    north_mode: NorthModeConfig,
    rotation_map: Option<String>,
    north_offset_deg: f64,
    rotation_deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    output_path: Option<String>,
    pixels_per_unit: f64,
    true_north_step_deg: f64,
    maps: Vec<MapJson>,
    pictures: Vec<PictureJson>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: None,
            pixels_per_unit: FitConfig::default().pixels_per_unit,
            true_north_step_deg: TrueNorthCalculator::default().step_deg(),
            maps: Vec::new(),
            pictures: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RectRecord {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl From<Rect> for RectRecord {
    fn from(value: Rect) -> Self {
        Self {
            x: value.x,
            y: value.y,
            width: value.width,
            height: value.height,
        }
    }
}

#[derive(Debug, Serialize)]
struct PictureRecord {
    name: String,
    frame: RectRecord,
    displayed: RectRecord,
    visible: RectRecord,
    rotation_deg: f64,
    north_mode: String,
    rotation_map: Option<String>,
    conditions: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Output {
    pictures: Vec<PictureRecord>,
}

fn rect_from(values: [f64; 4]) -> Rect {
    Rect::new(values[0], values[1], values[2], values[3])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("northfit=debug".parse()?))
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.pictures.is_empty() {
        return Err("the scene must contain at least one picture".into());
    }

    let north = TrueNorthCalculator::with_step_deg(config.true_north_step_deg)?;
    let mut comp = Composition::default().with_true_north(north);
    comp.set_fit_config_all(FitConfig::default().with_pixels_per_unit(config.pixels_per_unit))?;

    let mut map_ids: HashMap<String, ItemId> = HashMap::new();
    let mut map_names: HashMap<ItemId, String> = HashMap::new();
    for map in &config.maps {
        let crs: Crs = map.crs.parse()?;
        let [xmin, ymin, xmax, ymax] = map.extent;
        let id = comp.add_map(Extent::new(xmin, ymin, xmax, ymax), crs, map.rotation_deg)?;
        if map_ids.insert(map.name.clone(), id).is_some() {
            return Err(format!("duplicate map name {:?}", map.name).into());
        }
        map_names.insert(id, map.name.clone());
    }
    tracing::info!(maps = map_ids.len(), pictures = config.pictures.len(), "scene loaded");

    let mut picture_ids = Vec::with_capacity(config.pictures.len());
    for picture in config.pictures {
        let id = comp.add_picture(rect_from(picture.frame))?;
        if let Some(anchor) = &picture.anchor {
            comp.set_anchor(id, anchor.parse::<Anchor>()?)?;
        }
        comp.set_frame_enabled(id, picture.frame_enabled)?;
        comp.set_resize_mode(id, picture.resize_mode.into())?;

        if let Some(source) = &picture.source {
            let source: PictureSource = source.parse()?;
            comp.set_picture_source(id, Some(source))?;
        }
        match picture.natural_size {
            Some([width, height]) => comp.set_natural_size(id, NaturalSize::new(width, height))?,
            None if picture.source.is_some() => {
                if let Err(err) = comp.load_natural_size(id, &ImageFileProbe) {
                    tracing::warn!(picture = %picture.name, %err, "natural size unavailable");
                }
            }
            None => {}
        }

        if let Some(rotation_deg) = picture.rotation_deg {
            comp.set_picture_rotation(id, rotation_deg)?;
        }
        comp.set_north_offset(id, picture.north_offset_deg)?;
        if let Some(name) = &picture.rotation_map {
            let map = map_ids
                .get(name)
                .copied()
                .ok_or_else(|| format!("unknown rotation map {name:?}"))?;
            comp.set_rotation_map(id, Some(map))?;
        }
        comp.set_north_mode(id, picture.north_mode.into())?;
        picture_ids.push((id, picture.name));
    }

    let mut conditions: HashMap<ItemId, Vec<String>> = HashMap::new();
    for event in comp.drain_events() {
        if let PictureEvent::Condition { picture, condition } = event {
            conditions.entry(picture).or_default().push(condition.to_string());
        }
    }

    let mut records = Vec::with_capacity(picture_ids.len());
    for (id, name) in picture_ids {
        let Some(picture) = comp.picture(id) else {
            continue;
        };
        let mut picture_conditions = conditions.remove(&id).unwrap_or_default();
        picture_conditions.dedup();
        records.push(PictureRecord {
            name,
            frame: picture.frame().into(),
            displayed: picture.displayed_rect().into(),
            visible: picture.visible_rect().into(),
            rotation_deg: picture.rotation_deg(),
            north_mode: picture.north_mode().to_string(),
            rotation_map: comp
                .rotation_map(id)?
                .and_then(|map| map_names.get(&map).cloned()),
            conditions: picture_conditions,
        });
    }

    let output = Output { pictures: records };
    let json = serde_json::to_string_pretty(&output)?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
