use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sha2::Digest as _;

#[derive(Parser, Debug)]
#[command(name = "pixsurf", version)]
struct Cli {
    /// Emit debug logs on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    /// Loader options JSON (row_alignment, retry_ignoring_color_profile, limits).
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print dimensions, stride, format and a SHA-256 of the canonical pixels.
    Info(InfoArgs),
    /// Decode an image and write it back out as BMP.
    Convert(ConvertArgs),
    /// Apply a CPU unsharp mask and write the result as BMP.
    Unsharp(UnsharpArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output BMP path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct UnsharpArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output BMP path.
    #[arg(long)]
    out: PathBuf,

    /// Effect parameters JSON; individual flags below override it.
    #[arg(long)]
    params: Option<PathBuf>,

    #[arg(long)]
    amount: Option<f64>,

    #[arg(long)]
    threshold: Option<f64>,

    #[arg(long)]
    radius: Option<u32>,

    #[arg(long)]
    sigma: Option<f32>,

    /// Print the effect's sampler/constant binding as JSON.
    #[arg(long)]
    dump_binding: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let loader = make_loader(cli.options.as_deref())?;
    match cli.cmd {
        Command::Info(args) => cmd_info(&loader, args),
        Command::Convert(args) => cmd_convert(&loader, args),
        Command::Unsharp(args) => cmd_unsharp(&loader, args),
    }
}

fn make_loader(options: Option<&Path>) -> anyhow::Result<pixsurf::SourceLoader> {
    let opts = match options {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read options '{}'", path.display()))?;
            pixsurf::LoadOptions::from_json_str(&s)?
        }
        None => pixsurf::LoadOptions::default(),
    };
    Ok(pixsurf::SourceLoader::new(opts)?)
}

fn cmd_info(loader: &pixsurf::SourceLoader, args: InfoArgs) -> anyhow::Result<()> {
    let surface = loader.load_path(&args.in_path)?;
    surface.scoped(|s| -> anyhow::Result<()> {
        let (width, height, stride, format) = (s.width(), s.height(), s.stride(), s.pixel_format());
        let digest = s.with_lock(|lock| Ok(sha2::Sha256::digest(lock.bytes())))?;
        println!("path: {}", args.in_path.display());
        println!("size: {width}x{height}");
        println!("stride: {stride}");
        println!("format: {format:?}");
        println!("sha256: {}", hex(&digest));
        Ok(())
    })
}

fn cmd_convert(loader: &pixsurf::SourceLoader, args: ConvertArgs) -> anyhow::Result<()> {
    let surface = loader.load_path(&args.in_path)?;
    surface.scoped(|s| pixsurf::save_bmp(s, &args.out))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_unsharp(loader: &pixsurf::SourceLoader, args: UnsharpArgs) -> anyhow::Result<()> {
    let mut params = match &args.params {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read params '{}'", path.display()))?;
            pixsurf::UnsharpMaskParams::from_json_str(&s)?
        }
        None => pixsurf::UnsharpMaskParams::default(),
    };
    if let Some(v) = args.amount {
        params.amount = v;
    }
    if let Some(v) = args.threshold {
        params.threshold = v;
    }
    if let Some(v) = args.radius {
        params.radius = v;
    }
    if let Some(v) = args.sigma {
        params.sigma = v;
    }
    params.validate()?;

    if args.dump_binding {
        println!("{}", serde_json::to_string_pretty(&params.binding())?);
    }

    let surface = loader.load_path(&args.in_path)?;
    surface.scoped(|s| -> anyhow::Result<()> {
        pixsurf::apply_unsharp_mask(s, &params)?;
        pixsurf::save_bmp(s, &args.out)?;
        Ok(())
    })?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}
