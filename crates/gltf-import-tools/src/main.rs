//! `gltf-inspect`: prints the resolved scene graph and diagnostics of a
//! `.gltf` or `.glb` file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use gltf_import_core::{AxisConversion, GltfError};
use gltf_import_io::{
    import_with, materialize_scene, Animation, Camera, Channel, Gltf, ImportOptions, Materializer, Mesh, Node,
    Projection, Skin,
};
use log::LevelFilter;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "gltf-inspect", version, about = "Print the resolved scene graph of a glTF or GLB file")]
struct Args {
    /// Input .gltf or .glb file
    input: PathBuf,

    /// Keep glTF's Y-up coordinates instead of converting to Z-up
    #[arg(long)]
    no_axis_conversion: bool,

    /// Only build and print the root scene
    #[arg(long)]
    root_only: bool,

    /// Directory to resolve external buffers against
    #[arg(long)]
    base_path: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> ImportOptions {
        let axis = if self.no_axis_conversion {
            AxisConversion::Identity
        } else {
            AxisConversion::YUpToZUp
        };
        let mut options = ImportOptions::default()
            .with_axis_conversion(axis)
            .with_secondary_scenes(!self.root_only);
        if let Some(base) = &self.base_path {
            options = options.with_base_path(base);
        }
        options
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Error, Debug)]
enum InspectError {
    #[error(transparent)]
    Import(#[from] GltfError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Prints one line per created object, indented by depth.
struct TreePrinter<W: Write> {
    out: W,
}

impl<W: Write> TreePrinter<W> {
    /// Writes a node line and returns the depth handle for its children.
    fn line(&mut self, gltf: &Gltf, node: &Node, parent: Option<&usize>, what: String) -> Result<usize, InspectError> {
        let depth = parent.map_or(0, |d| d + 1);
        let srt = node.transform.converted(gltf.axis_conversion());
        write!(self.out, "{:indent$}{} {}", "", what, node.display_name(), indent = depth * 2)?;
        if srt.translation.length_squared() > 0.0 {
            let t = srt.translation;
            write!(self.out, " at [{:.3}, {:.3}, {:.3}]", t.x, t.y, t.z)?;
        }
        if srt.has_non_uniform_scale() {
            write!(self.out, " (non-uniform scale)")?;
        }
        writeln!(self.out)?;
        Ok(depth)
    }
}

impl<W: Write> Materializer for TreePrinter<W> {
    type Handle = usize;
    type Error = InspectError;

    fn create_mesh_object(
        &mut self,
        gltf: &Gltf,
        node: &Node,
        mesh: &Mesh,
        parent: Option<&usize>,
    ) -> Result<usize, InspectError> {
        let vertices: usize = mesh.primitives.iter().map(|p| p.vertex_count()).sum();
        let what = format!(
            "mesh[{}: {} primitive(s), {} vertices]",
            mesh.display_name(),
            mesh.primitives.len(),
            vertices
        );
        self.line(gltf, node, parent, what)
    }

    fn create_camera(
        &mut self,
        gltf: &Gltf,
        node: &Node,
        camera: &Camera,
        parent: Option<&usize>,
    ) -> Result<usize, InspectError> {
        let what = match camera.projection {
            Projection::Perspective { yfov, .. } => format!("camera[perspective, yfov {:.3}]", yfov),
            Projection::Orthographic { xmag, ymag, .. } => format!("camera[orthographic, {} x {}]", xmag, ymag),
        };
        self.line(gltf, node, parent, what)
    }

    fn create_bone(&mut self, gltf: &Gltf, node: &Node, skin: &Skin, parent: Option<&usize>) -> Result<usize, InspectError> {
        let what = format!("bone[{}: {} joints]", skin.display_name(), skin.joints.len());
        self.line(gltf, node, parent, what)
    }

    fn create_empty(&mut self, gltf: &Gltf, node: &Node, parent: Option<&usize>) -> Result<usize, InspectError> {
        self.line(gltf, node, parent, "empty".to_string())
    }

    fn apply_animation(
        &mut self,
        _gltf: &Gltf,
        depth: &usize,
        animation: &Animation,
        channels: &[Arc<Channel>],
    ) -> Result<(), InspectError> {
        let paths: Vec<&str> = channels.iter().map(|c| c.path.name()).collect();
        writeln!(
            self.out,
            "{:indent$}~ {}: {}",
            "",
            animation.display_name(),
            paths.join(", "),
            indent = depth * 2 + 2
        )?;
        Ok(())
    }
}

fn inspect<W: Write>(path: &Path, options: &ImportOptions, out: W) -> Result<(), InspectError> {
    let gltf = import_with(path, options)?;
    let mut printer = TreePrinter { out };

    for scene in gltf.scenes() {
        let label = match (&scene.name, scene.index) {
            (Some(name), _) => name.clone(),
            (None, Some(index)) => format!("Scene_{}", index),
            (None, None) => "default".to_string(),
        };
        writeln!(printer.out, "scene {} ({} nodes)", label, scene.len())?;
        materialize_scene(&gltf, scene, &mut printer)?;
    }

    let diagnostics = gltf.diagnostics();
    if !diagnostics.is_empty() {
        writeln!(printer.out, "diagnostics ({}):", diagnostics.len())?;
        for diagnostic in diagnostics {
            writeln!(printer.out, "  {}", diagnostic)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::new().filter_level(args.log_level()).init();

    let stdout = io::stdout();
    match inspect(&args.input, &args.options(), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}: {}", args.input.display(), err);
            ExitCode::FAILURE
        }
    }
}
