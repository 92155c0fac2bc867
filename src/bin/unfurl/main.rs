//! Unfurl CLI - unwrap meshes and pack UV islands.
//!
//! Usage: unfurl <COMMAND> [OPTIONS]
//!
//! Run `unfurl --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use nalgebra::{Point2, Point3, Vector3};

use unfurl::algo::pack::{pack_islands_with_progress, Align, IslandBounds, PackOptions};
use unfurl::algo::parameterize::{
    CollisionPolicy, LscmOptions, Pin, PinOptions, PlaneProjection, UVMesh, UnwrapMethod,
};
use unfurl::algo::progress::Progress;
use unfurl::io;

#[derive(Parser)]
#[command(name = "unfurl")]
#[command(author, version, about = "UV unwrapping and texture packing CLI", long_about = None)]
struct Cli {
    /// Log more detail (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Compute UV coordinates for a mesh
    Unwrap {
        /// Input mesh file
        input: PathBuf,

        /// Output PLY file with texture coordinates (prints `u v` lines if omitted)
        output: Option<PathBuf>,

        /// Unwrap method
        #[arg(short, long, value_enum, default_value = "lscm")]
        method: Method,

        /// Pin as X,Y,Z:U,V[,U1,V1][:POLICY], repeatable
        #[arg(short, long = "pin", value_parser = parse_pin)]
        pins: Vec<Pin>,

        /// Distance within which a pin matches a vertex
        #[arg(long, default_value = "0.001")]
        pin_tolerance: f64,

        /// Projection normal for the plane method, as X,Y,Z
        #[arg(long, value_parser = parse_vector, default_value = "0,0,1")]
        normal: Vector3<f64>,

        /// Rotation of the projection axes in degrees
        #[arg(long, default_value = "0")]
        angle: f64,

        /// Allow LSCM on meshes above the vertex limit
        #[arg(long)]
        allow_large_mesh: bool,
    },

    /// Pack rectangular islands into a texture
    Pack {
        /// Island size as WxH, repeatable
        #[arg(short, long = "island", value_parser = parse_size, required = true)]
        islands: Vec<(f64, f64)>,

        /// Texture resolution as WxH
        #[arg(short, long, value_parser = parse_size, default_value = "1024x1024")]
        resolution: (f64, f64),

        /// Gap in pixels around islands and at the border
        #[arg(short, long, default_value = "0")]
        buffer: f64,

        /// Maximum number of packing attempts
        #[arg(long, default_value = "100")]
        max_iter: usize,

        /// Corner islands are aligned by (bl, br, tl, tr)
        #[arg(long, default_value = "bl")]
        align: Align,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Least squares conformal map
    Lscm,
    /// Projection onto a plane
    Plane,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => cmd_info(&input)?,

        Commands::Unwrap {
            input,
            output,
            method,
            pins,
            pin_tolerance,
            normal,
            angle,
            allow_large_mesh,
        } => {
            let method = match method {
                Method::Lscm => UnwrapMethod::Lscm {
                    pins,
                    pin_options: PinOptions::default().with_tolerance(pin_tolerance),
                    options: LscmOptions::default().with_allow_large_mesh(allow_large_mesh),
                },
                Method::Plane => UnwrapMethod::Plane(PlaneProjection::new(normal).with_angle(angle)),
            };
            cmd_unwrap(&input, output.as_deref(), &method)?;
        }

        Commands::Pack {
            islands,
            resolution,
            buffer,
            max_iter,
            align,
        } => {
            let options = PackOptions::default()
                .with_resolution(resolution.0, resolution.1)
                .with_buffer(buffer)
                .with_max_iter(max_iter)
                .with_align(align);
            cmd_pack(&islands, &options)?;
        }
    }

    Ok(())
}

/// Progress reporter that draws a bar on stderr.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }
        let percent = ((current * 100) + (total / 2)) / total;
        if max_percent.fetch_max(percent, Ordering::Relaxed) >= percent && percent != 0 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);
        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();
    })
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Triangles: {}", mesh.num_triangles());

    let areas: Vec<f64> = (0..mesh.num_triangles()).map(|t| mesh.triangle_area(t)).collect();
    let min_area = areas.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_area = areas.iter().cloned().fold(0.0, f64::max);
    println!("Surface area: {:.6}", mesh.surface_area());
    println!("Triangle area range: [{:.6}, {:.6}]", min_area, max_area);

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    let boundary = mesh.boundary_edges();
    if boundary.is_empty() {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary edges)", boundary.len());
    }
    if mesh.num_vertices() > unfurl::algo::parameterize::LARGE_MESH_LIMIT {
        println!("Note: LSCM needs --allow-large-mesh for this mesh");
    }

    Ok(())
}

fn cmd_unwrap(
    input: &Path,
    output: Option<&Path>,
    method: &UnwrapMethod,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    log::info!("loaded {} vertices, {} triangles", mesh.num_vertices(), mesh.num_triangles());

    let id = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh")
        .to_string();
    let mut island = UVMesh::new(id, mesh);

    let start = Instant::now();
    island.unwrap_with(method)?;
    log::info!(
        "unwrapped in {:.2?}: uv area {:.6}, mesh area {:.6}",
        start.elapsed(),
        island.uv_area(),
        island.mesh_area()
    );

    match output {
        Some(path) => {
            io::ply::save(island.mesh(), Some(island.uv()), path)?;
            println!("Saved: {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = std::io::BufWriter::new(stdout.lock());
            for (_, p) in island.uv().iter() {
                writeln!(out, "{} {}", p.x, p.y)?;
            }
        }
    }
    Ok(())
}

fn cmd_pack(sizes: &[(f64, f64)], options: &PackOptions) -> Result<(), Box<dyn std::error::Error>> {
    let islands: Vec<IslandBounds> = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| IslandBounds::new(format!("I{i}"), Point2::origin(), Point2::new(w, h)))
        .collect();

    let progress = create_progress();
    let result = pack_islands_with_progress(&islands, options, &progress);
    eprintln!();
    let packing = result?;

    println!("# scale {:.6} after {} attempts", packing.scale, packing.attempts);
    println!("# id offset_x offset_y scale angle");
    for (id, t) in packing.layout.iter() {
        println!("{} {:.6} {:.6} {:.6} {:.1}", id, t.offset_x, t.offset_y, t.scale, t.angle_deg);
    }
    Ok(())
}

fn parse_floats(s: &str) -> Result<Vec<f64>, String> {
    s.split(',')
        .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{}': {}", v, e)))
        .collect()
}

fn parse_vector(s: &str) -> Result<Vector3<f64>, String> {
    match parse_floats(s)?.as_slice() {
        &[x, y, z] => Ok(Vector3::new(x, y, z)),
        _ => Err(format!("expected X,Y,Z, got '{}'", s)),
    }
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("width '{}': {}", w, e))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("height '{}': {}", h, e))?;
    Ok((w, h))
}

/// Parse `X,Y,Z:U,V[,U1,V1][:POLICY]`.
fn parse_pin(s: &str) -> Result<Pin, String> {
    let mut parts = s.splitn(3, ':');
    let position = parse_vector(parts.next().unwrap_or_default())?;
    let uvs = parts
        .next()
        .ok_or_else(|| format!("expected X,Y,Z:U,V, got '{}'", s))
        .and_then(parse_floats)?;

    let mut pin = match uvs.as_slice() {
        &[u, v] => Pin::vertex(Point3::from(position), Point2::new(u, v)),
        &[u0, v0, u1, v1] => {
            Pin::vertex(Point3::from(position), Point2::new(u0, v0)).with_uv1(Point2::new(u1, v1))
        }
        _ => return Err(format!("expected U,V or U0,V0,U1,V1, got '{}'", s)),
    };
    if let Some(policy) = parts.next() {
        let policy: CollisionPolicy = policy.parse().map_err(|e| format!("{}", e))?;
        pin = pin.with_policy(policy);
    }
    Ok(pin)
}
