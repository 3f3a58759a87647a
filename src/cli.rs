// Argument parsing for the bvhmake binary: a positional scene path plus
// `key=value` named arguments, matching the reference tool's own
// ad-hoc argv walk rather than a full clap-style grammar.
use crate::bvh::fit::aaellipsoid::AAEllipsoid;
use crate::bvh::fit::aabox::AABox;
use crate::bvh::fit::{AABoxEngine, AAEllipsoidEngine};
use crate::config::BuildConfig;
use crate::error::BvhError;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStrategy {
    KdTree,
    Lds,
    Sweep,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitKind {
    AABox,
    AAEllipsoid,
}

#[derive(Clone, Debug)]
pub struct Args {
    pub scene_path: PathBuf,
    pub strategy: BuildStrategy,
    pub fit: FitKind,
    pub out_dir: PathBuf,
    pub texcoord_count: u32,
}

pub const USAGE: &str = "\
bvhmake <scene-file> [b=kdtree|lds|sweep] [g=aabox|aaellipsoid] [o=<dir>] [t=<n>]

  <scene-file>  chunked scene file holding vertices/triangles/materialref
  b=            build strategy (default: sweep)
  g=            bounding-volume fit engine (default: aabox)
  o=            output directory for the built hierarchy file (default: .)
  t=            number of texture coordinate sets to expect (default: 0)
";

pub fn parse(argv: &[String]) -> Result<Args, BvhError> {
    if argv.iter().any(|a| a == "-h" || a == "--help") {
        print!("{}", USAGE);
        std::process::exit(0);
    }

    let mut scene_path = None;
    let mut strategy = BuildStrategy::Sweep;
    let mut fit = FitKind::AABox;
    let mut out_dir = PathBuf::from(".");
    let mut texcoord_count = 0u32;

    for arg in argv {
        if let Some(value) = arg.strip_prefix("b=") {
            strategy = match value {
                "kdtree" => BuildStrategy::KdTree,
                "lds" => BuildStrategy::Lds,
                "sweep" => BuildStrategy::Sweep,
                other => return Err(BvhError::Config(format!("unknown build strategy '{}'", other))),
            };
        } else if let Some(value) = arg.strip_prefix("g=") {
            fit = match value {
                "aabox" => FitKind::AABox,
                "aaellipsoid" => FitKind::AAEllipsoid,
                other => return Err(BvhError::Config(format!("unknown fit engine '{}'", other))),
            };
        } else if let Some(value) = arg.strip_prefix("o=") {
            out_dir = PathBuf::from(value);
        } else if let Some(value) = arg.strip_prefix("t=") {
            texcoord_count = value
                .parse()
                .map_err(|_| BvhError::Config(format!("invalid texcoord count '{}'", value)))?;
        } else if scene_path.is_none() {
            scene_path = Some(PathBuf::from(arg));
        } else {
            return Err(BvhError::Config(format!("unexpected argument '{}'", arg)));
        }
    }

    let scene_path = scene_path.ok_or_else(|| {
        print!("{}", USAGE);
        BvhError::Config("missing scene-file argument".into())
    })?;

    Ok(Args {
        scene_path,
        strategy,
        fit,
        out_dir,
        texcoord_count,
    })
}

// What the chosen `b=`/`g=` combination resolves to, so `main` can build
// generically without a giant match spread over every call site.
pub enum BuiltScene {
    AABox(crate::bvh::build::BuildOutput<AABox>),
    AAEllipsoid(crate::bvh::build::BuildOutput<AAEllipsoid>),
}

pub fn run_build(
    args: &Args,
    geometry: &crate::geometry::GeometryStore,
    config: &BuildConfig,
) -> Result<BuiltScene, BvhError> {
    use crate::bvh::build::{kdtree, lds, sweep};

    match args.fit {
        FitKind::AABox => {
            let engine = AABoxEngine;
            let out = match args.strategy {
                BuildStrategy::KdTree => kdtree::build(geometry, &engine)?,
                BuildStrategy::Lds => lds::build(geometry, &engine, config)?,
                BuildStrategy::Sweep => sweep::build(geometry, &engine, config)?,
            };
            Ok(BuiltScene::AABox(out))
        }
        FitKind::AAEllipsoid => {
            let engine = AAEllipsoidEngine { config: *config };
            let out = match args.strategy {
                BuildStrategy::KdTree => kdtree::build(geometry, &engine)?,
                BuildStrategy::Lds => lds::build(geometry, &engine, config)?,
                BuildStrategy::Sweep => sweep::build(geometry, &engine, config)?,
            };
            Ok(BuiltScene::AAEllipsoid(out))
        }
    }
}
