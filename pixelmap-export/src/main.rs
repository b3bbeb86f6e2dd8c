use anyhow::Context;
use clap::{Parser, ValueEnum};
use pixelmap::{
    core::config::{ExportSampling, ViewerOptions},
    data::{load_bundle, AssetManifest, FileSource},
    selection::{
        geometry::{max_side_pixels, SelectionBounds},
        heightmap::HeightmapExporter,
        settings::ExportSettings,
    },
    Point,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pixelmap-export",
    about = "Exports a skewed height-map selection as a grayscale PNG",
    allow_negative_numbers = true
)]
struct Args {
    /// Folder holding map.png, heightmap.png and zones.json
    asset_dir: PathBuf,

    /// Selection origin x in sprite pixels
    x: f64,

    /// Selection origin y in sprite pixels
    y: f64,

    /// Selection side length in sprite pixels
    side: f64,

    /// Output side length in pixels (defaults to the configured export step)
    #[arg(long)]
    resolution: Option<u32>,

    #[arg(long, value_enum)]
    sampling: Option<Sampling>,

    /// Viewer options JSON
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Sampling {
    Nearest,
    Bilinear,
    Quantized,
}

impl From<Sampling> for ExportSampling {
    fn from(sampling: Sampling) -> Self {
        match sampling {
            Sampling::Nearest => ExportSampling::Nearest,
            Sampling::Bilinear => ExportSampling::Bilinear,
            Sampling::Quantized => ExportSampling::Quantized,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let origin = Point::new(args.x, args.y);

    let options = match &args.config {
        Some(path) => ViewerOptions::from_file(path).with_context(|| format!("reading {}", path.display()))?,
        None => ViewerOptions::default(),
    };
    let mut settings = ExportSettings::from_config(&options.export);
    if let Some(sampling) = args.sampling {
        settings.sampling = sampling.into();
    }
    let resolution = args.resolution.unwrap_or_else(|| settings.resolution());

    let source = FileSource::new(&args.asset_dir);
    let assets = load_bundle(&source, &AssetManifest::default())
        .await
        .with_context(|| format!("loading assets from {}", args.asset_dir.display()))?;
    let sprite = assets.sprite_size();

    let max_side = max_side_pixels(sprite.width, &options.selection);
    if args.side > max_side {
        log::warn!("selection side {} exceeds the area cap, clamped to {:.1}", args.side, max_side);
    }
    let mut bounds = SelectionBounds::at(origin);
    bounds.drag_to(
        Point::new(origin.x + args.side, origin.y + args.side),
        max_side,
    );

    let exporter = HeightmapExporter::new(&assets.heightmap, sprite, options.selection.skew_tan());
    let png = exporter.export_png(&bounds, resolution, settings.sampling)?;

    let path = args.output.unwrap_or_else(|| PathBuf::from(&png.file_name));
    std::fs::write(&path, &png.bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {} ({}x{}, {:?})", path.display(), resolution, resolution, settings.sampling);
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("pixelmap-export").chain(list.iter().copied()))
    }

    #[test]
    fn parses_positionals_and_flags() {
        let parsed = args(&["assets", "10", "20.5", "64", "--resolution", "256", "--sampling", "nearest", "-o", "out.png"])
            .unwrap();
        assert_eq!(parsed.asset_dir, PathBuf::from("assets"));
        assert_eq!((parsed.x, parsed.y), (10.0, 20.5));
        assert_eq!(parsed.side, 64.0);
        assert_eq!(parsed.resolution, Some(256));
        assert_eq!(parsed.sampling.map(ExportSampling::from), Some(ExportSampling::Nearest));
        assert_eq!(parsed.output, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn accepts_negative_origin() {
        let parsed = args(&["assets", "-4", "-8.5", "32"]).unwrap();
        assert_eq!((parsed.x, parsed.y), (-4.0, -8.5));
        assert_eq!(parsed.sampling, None);
    }

    #[test]
    fn rejects_missing_positionals_and_bad_modes() {
        assert!(args(&["assets", "1", "2"]).is_err());
        assert!(args(&["assets", "1", "2", "3", "--sampling", "cubic"]).is_err());
        assert!(args(&["assets", "1", "2", "3", "--resolution"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
