use bvhmake::cli::{self, BuiltScene};
use bvhmake::config::BuildConfig;
use bvhmake::error::BvhError;
use bvhmake::io;

fn main() {
    env_logger::init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(match run(&argv) {
        Ok(()) => 0,
        Err(err) => {
            log::error!("{}", err);
            err.exit_code()
        }
    });
}

fn run(argv: &[String]) -> Result<(), BvhError> {
    let args = cli::parse(argv)?;
    let config = BuildConfig::default();

    log::info!("reading scene {}", args.scene_path.display());
    let geometry = io::read_geometry(&args.scene_path)?;

    log::info!("sorting leaves...");
    log::info!("building tree...");
    let built = cli::run_build(&args, &geometry, &config).map_err(on_build_invariant)?;

    log::info!("computing hierarchy...");
    std::fs::create_dir_all(&args.out_dir)?;
    let out_path = args.out_dir.join(output_file_name(&args.scene_path));

    log::info!("exporting to {}...", out_path.display());
    match built {
        BuiltScene::AABox(out) => io::write_aabox_scene(&out_path, &geometry, &out)?,
        BuiltScene::AAEllipsoid(out) => io::write_ellipsoid_scene(&out_path, &geometry, &out)?,
    }

    log::info!("done.");
    Ok(())
}

fn output_file_name(scene_path: &std::path::Path) -> std::path::PathBuf {
    let stem = scene_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bvh".into());
    std::path::PathBuf::from(format!("{}.bvh", stem))
}

// A build invariant reaching the top level aborts loudly in debug
// builds (so broken assumptions fail fast during development) and
// exits with a logged error in release, per the error taxonomy.
fn on_build_invariant(err: BvhError) -> BvhError {
    if cfg!(debug_assertions) {
        if let BvhError::BuildInvariant(ref msg) = err {
            panic!("build invariant violated: {}", msg);
        }
    }
    err
}
