//! ROAM terrain fly-over benchmark.
//!
//! Generates a noise height map, orbits a camera around it and drives the
//! mesh engine frame by frame without a window.
//!
//! Usage: `roam-bench [OPTIONS]`

mod params;
mod renderer;

use std::time::{Duration, Instant};

use glam::Vec3;
use roam_core::{Camera, CameraKind, GridPos, HeightSource};
use roam_mesh::{FrameStats, MeshConfig, MeshPass, TerrainMesh};
use roam_world::deform::dig_crater;
use roam_world::generation::{TerrainConfig, TerrainGenerator};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use params::BenchParams;
use renderer::CountingRenderer;

/// Frames between two craters.
const CRATER_INTERVAL: u64 = 100;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = BenchParams::from_args();
    info!("Benchmark parameters: {:?}", params);
    run(&params)
}

fn run(params: &BenchParams) -> anyhow::Result<()> {
    let generator = TerrainGenerator::new(TerrainConfig {
        seed: params.seed,
        cells_x: params.size,
        cells_z: params.size,
        ..Default::default()
    });
    let mut map = generator.generate()?;

    let config = MeshConfig {
        patch_size: params.patch_size,
        ..Default::default()
    };
    let mut mesh = TerrainMesh::new(config, &map)?;
    let mut renderer = CountingRenderer::default();

    let (extent, extent_z) = mesh.world_extent();
    let centre = Vec3::new(extent * 0.5, 0.0, extent_z * 0.5);
    let orbit_radius = extent * 0.35;
    let altitude = map.max_height() + 150.0;

    let mut totals = Totals::default();
    for frame in 1..=params.frames {
        let started = Instant::now();

        if frame % CRATER_INTERVAL == 0 {
            let spot = GridPos::new(
                ((frame * 37) % u64::from(params.size)) as i32,
                ((frame * 61) % u64::from(params.size)) as i32,
            );
            if let Some(rect) = dig_crater(&mut map, spot, 12, 40.0)? {
                let touched = mesh.update_height_map(&map, rect);
                debug!("Crater at {:?} touched {} patches", spot, touched);
            }
        }

        let angle = frame as f32 / params.frames.max(1) as f32 * std::f32::consts::TAU;
        let position = centre + Vec3::new(angle.cos(), 0.0, angle.sin()) * orbit_radius
            + Vec3::Y * altitude;
        let camera = Camera::new(
            position,
            centre,
            std::f32::consts::FRAC_PI_3,
            16.0 / 9.0,
            1.0,
            extent * 2.0,
        );

        let frustum = camera.frustum();
        mesh.update_visibility(CameraKind::Player, frame, |aabb| frustum.test_aabb(aabb));
        let stats = mesh.update(&map, &camera, params.view_radius, MeshPass::Normal, frame);
        mesh.upload(&mut renderer, MeshPass::Normal, CameraKind::Player, frame);
        mesh.draw(&mut renderer, MeshPass::Normal, CameraKind::Player, frame);
        totals.record(&stats);

        if params.shadow {
            // High sun over the map sees every patch.
            let mut light = camera.with_kind(CameraKind::Shadow);
            light.position = centre + Vec3::new(extent * 0.25, altitude + extent, 0.0);
            light.look_at(centre);
            mesh.update_visibility(CameraKind::Shadow, frame, |_| true);
            let shadow = mesh.update(&map, &light, params.view_radius, MeshPass::Shadow, frame);
            mesh.upload(&mut renderer, MeshPass::Shadow, CameraKind::Shadow, frame);
            mesh.draw(&mut renderer, MeshPass::Shadow, CameraKind::Shadow, frame);
            totals.shadow_triangles += shadow.triangles;
        }

        let elapsed = started.elapsed();
        totals.frame_time += elapsed;
        totals.worst_frame = totals.worst_frame.max(elapsed);
        debug!(
            "Frame {}: {:.2} ms, {} visible, {} triangles, {} nodes",
            frame,
            elapsed.as_secs_f64() * 1000.0,
            stats.visible_patches,
            stats.triangles,
            stats.nodes_used
        );
    }

    totals.report(params.frames, &renderer);
    Ok(())
}

/// Accumulated per-frame statistics.
#[derive(Debug, Default)]
struct Totals {
    frame_time: Duration,
    worst_frame: Duration,
    retessellated: u64,
    triangles: usize,
    max_triangles: usize,
    max_nodes: usize,
    out_of_nodes: usize,
    pool_growths: u64,
    shadow_triangles: usize,
}

impl Totals {
    fn record(&mut self, stats: &FrameStats) {
        if stats.retessellated {
            self.retessellated += 1;
        }
        if stats.pool_grew {
            self.pool_growths += 1;
        }
        self.triangles += stats.triangles;
        self.max_triangles = self.max_triangles.max(stats.triangles);
        self.max_nodes = self.max_nodes.max(stats.nodes_used);
        self.out_of_nodes += stats.out_of_nodes;
    }

    fn report(&self, frames: u64, renderer: &CountingRenderer) {
        let frames_f = frames.max(1) as f64;
        let avg_ms = self.frame_time.as_secs_f64() * 1000.0 / frames_f;

        info!("Benchmark results ({} frames):", frames);
        info!(
            "  Frame time: avg {:.2} ms, worst {:.2} ms",
            avg_ms,
            self.worst_frame.as_secs_f64() * 1000.0
        );
        info!(
            "  Re-tessellated {} frames, triangles avg {:.0} / max {}",
            self.retessellated,
            self.triangles as f64 / frames_f,
            self.max_triangles
        );
        info!("  Peak nodes in use: {}", self.max_nodes);
        if self.shadow_triangles > 0 {
            info!(
                "  Shadow pass triangles avg {:.0}",
                self.shadow_triangles as f64 / frames_f
            );
        }
        info!(
            "  Uploaded {} KiB, drew {} patches, {} border vertices",
            renderer.uploaded_bytes / 1024,
            renderer.draws,
            renderer.border_vertices
        );
        if self.out_of_nodes > 0 {
            warn!(
                "  {} patch walks ran out of nodes, pools grew {} times",
                self.out_of_nodes, self.pool_growths
            );
        }
    }
}

fn print_help() {
    eprintln!("ROAM terrain fly-over benchmark");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    roam-bench [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    --size <N>             Map edge length in cells (default: 1024)");
    eprintln!("    --patch-size <N>       Patch edge length in cells (default: 128)");
    eprintln!("    --frames <N>           Frames to run (default: 300)");
    eprintln!("    --view-radius <R>      LOD view radius (default: 1000)");
    eprintln!("    --seed <SEED>          World generation seed (default: 42)");
    eprintln!("    --shadow               Also tessellate the shadow pass");
    eprintln!("    -h, --help             Print this help message");
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("    RUST_LOG=debug         Log every frame");
}
