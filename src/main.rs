use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};

use raypick::{
    geometry::Geometry,
    pick_map::PickMap,
    picking::{unproject_ray, PickMode, Pointer, Viewport},
    scene::Scene,
};

#[cfg(feature = "viewer")]
mod viewer;

/// Find the triangle under the pointer.
#[derive(Parser)]
#[command(name = "raypick", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pick once and print the selected triangle.
    Pick {
        #[command(flatten)]
        source: SceneSource,
        /// Pointer x in pixels; defaults to the viewport center.
        #[arg(long, allow_negative_numbers = true)]
        x: Option<f64>,
        /// Pointer y in pixels, growing downward; defaults to the viewport center.
        #[arg(long, allow_negative_numbers = true)]
        y: Option<f64>,
        /// `unproject` or `project`.
        #[arg(long, default_value_t = PickMode::Unproject)]
        mode: PickMode,
    },
    /// Pick every pixel and write the selections as a PNG.
    Map {
        #[command(flatten)]
        source: SceneSource,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = PickMode::Unproject)]
        mode: PickMode,
        /// Override the scene's viewport width.
        #[arg(long)]
        width: Option<u32>,
        /// Override the scene's viewport height.
        #[arg(long)]
        height: Option<u32>,
    },
    /// Open an interactive window.
    #[cfg(feature = "viewer")]
    View {
        #[command(flatten)]
        source: SceneSource,
    },
}

#[derive(Args)]
struct SceneSource {
    /// Scene description (JSON).
    #[arg(conflicts_with = "preset")]
    scene: Option<PathBuf>,
    /// Built-in scene: `overlapping` or `pyramid`.
    #[arg(long)]
    preset: Option<String>,
}

impl SceneSource {
    fn load(&self) -> anyhow::Result<Scene> {
        match (&self.scene, &self.preset) {
            (Some(path), _) => Scene::load(path).with_context(|| format!("failed to load {}", path.display())),
            (None, Some(name)) => Scene::preset(name).ok_or_else(|| anyhow!("unknown preset {:?}", name)),
            (None, None) => Ok(Scene::overlapping()),
        }
    }
}

fn pick(scene: &Scene, x: Option<f64>, y: Option<f64>, mode: PickMode) -> anyhow::Result<()> {
    let center = scene.viewport.center();
    let pointer = Pointer::new(x.unwrap_or(center.x), y.unwrap_or(center.y));

    let result = scene.pick(pointer, mode).context("pick aborted")?;

    match result.selected {
        Some(index) => {
            println!("selected: {}", index);
            println!("distance: {:.6} ({})", result.distance, mode);

            // Report the hit in object space whatever strategy found it.
            let ray = unproject_ray(pointer, scene.viewport, &scene.frame())?;
            if let Some(hit) = scene.triangles()[index].intersection(&ray) {
                println!("point: {:.6} {:.6} {:.6}", hit.point.x, hit.point.y, hit.point.z);
                println!("normal: {:.6} {:.6} {:.6}", hit.normal.x, hit.normal.y, hit.normal.z);
            }
        }
        None => println!("selected: none"),
    }

    Ok(())
}

fn map(scene: &Scene, output: &Path, mode: PickMode, width: Option<u32>, height: Option<u32>) -> anyhow::Result<()> {
    let viewport = Viewport::new(width.unwrap_or(scene.viewport.width), height.unwrap_or(scene.viewport.height));
    let frame = scene.camera.frame(viewport);

    let map = PickMap::render(viewport, &frame, scene.triangles(), mode).context("pick map aborted")?;
    map.save(output)?;

    for (index, pixels) in map.coverage(scene.triangles().len()).iter().enumerate() {
        println!("triangle {}: {} px", index, pixels);
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Pick { source, x, y, mode } => pick(&source.load()?, x, y, mode),
        Command::Map {
            source,
            output,
            mode,
            width,
            height,
        } => map(&source.load()?, &output, mode, width, height),
        #[cfg(feature = "viewer")]
        Command::View { source } => viewer::run(source.load()?),
    }
}
