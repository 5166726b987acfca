//! Frame exporter
//!
//! Draws each chain pose with plotters into a raw RGB buffer, encodes the
//! buffer as a PNG, and writes an index.json manifest next to the frames
//! for a video encoder to pick up.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use tracing::info;

use crate::config::{Scene, SceneData};
use crate::fourier::epicycle::{chain_pose, circle_outline, Animator, ChainPose};
use crate::fourier::polygon::Polygon;
use crate::fourier::spectrum::EpicycleChain;
use crate::fourier::Point;

/// Circle outlines: light gray, half transparent.
const CIRCLE_COLOR: RGBColor = RGBColor(204, 204, 204);
/// Rotation vectors: steelblue.
const ARROW_COLOR: RGBColor = RGBColor(70, 130, 180);
/// Traced curve: tab red.
const TRACE_COLOR: RGBColor = RGBColor(214, 39, 40);
/// Target polygon behind the animation: silver.
const POLYGON_COLOR: RGBColor = RGBColor(160, 160, 160);

const OUTLINE_SEGMENTS: usize = 100;

/// Export settings for one run
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Square frame edge in pixels.
    pub size: u32,
    /// Frame rate recorded in the manifest.
    pub fps: u32,
    /// Hard frame cap; loop closure stops the run earlier.
    pub max_frames: usize,
}

/// Render a scene's animation as a numbered PNG sequence plus manifest.
///
/// Stops at the frame where the trace closes its loop, or at the frame
/// cap for chains that never re-arrive. Returns the number of frames
/// written.
pub fn render_animation(
    scene: &Scene,
    data: &SceneData,
    output_dir: &Path,
    options: &RenderOptions,
) -> Result<usize> {
    std::fs::create_dir_all(output_dir)?;

    let extent = plot_extent(&data.chain);
    let mut animator = Animator::new(data.chain.clone());
    let mut files: Vec<String> = Vec::new();

    println!(
        "Rendering up to {} frames ({}x{})...",
        options.max_frames, options.size, options.size
    );

    for i in 0..options.max_frames {
        let pose = animator.advance();
        let filename = frame_filename(i);
        draw_frame(
            &output_dir.join(&filename),
            options.size,
            extent,
            &pose,
            animator.trace(),
            data.polygon.as_ref(),
        )?;
        files.push(filename);

        print!("\r[{}/{}] frames", i + 1, options.max_frames);
        std::io::stdout().flush().ok();

        if animator.is_closed() {
            info!("Loop closed after {} frames", files.len());
            break;
        }
    }

    let index = serde_json::json!({
        "generated": chrono::Local::now().to_rfc3339(),
        "scene": scene.id,
        "name": scene.name,
        "seed": data.seed,
        "fps": options.fps,
        "size": options.size,
        "frames": files.len(),
        "closed": animator.is_closed(),
        "files": files,
    });
    let index_path = output_dir.join("index.json");
    std::fs::write(&index_path, serde_json::to_string_pretty(&index)?)?;

    println!("\nDone! {} frames in {}", files.len(), output_dir.display());
    info!("Wrote {}", index_path.display());

    Ok(files.len())
}

/// Render one frozen chain pose, without a trace, to a single PNG.
pub fn render_still(data: &SceneData, frame: usize, path: &Path, size: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let extent = plot_extent(&data.chain);
    let pose = chain_pose(&data.chain, frame as f64);
    draw_frame(path, size, extent, &pose, &[], data.polygon.as_ref())?;
    info!("Saved {}", path.display());
    Ok(())
}

/// Fixed square extents covering the fully extended chain with a margin,
/// so frames do not jitter as the chain swings around.
pub fn plot_extent(chain: &EpicycleChain) -> f64 {
    (chain.total_radius() * 1.1).max(1.2)
}

fn frame_filename(index: usize) -> String {
    format!("frame_{index:05}.png")
}

fn draw_frame(
    path: &Path,
    size: u32,
    extent: f64,
    pose: &ChainPose,
    trace: &[Point],
    polygon: Option<&Polygon>,
) -> Result<()> {
    let mut buffer = vec![0u8; size as usize * size as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (size, size)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .build_cartesian_2d(-extent..extent, -extent..extent)
            .map_err(draw_err)?;

        if let Some(polygon) = polygon {
            chart
                .draw_series(LineSeries::new(
                    to_xy(&polygon.closed_points()),
                    POLYGON_COLOR.mix(0.6),
                ))
                .map_err(draw_err)?;
        }

        for circle in &pose.circles {
            chart
                .draw_series(LineSeries::new(
                    to_xy(&circle_outline(circle.center, circle.radius, OUTLINE_SEGMENTS)),
                    CIRCLE_COLOR.mix(0.5).stroke_width(2),
                ))
                .map_err(draw_err)?;
        }

        for arrow in &pose.arrows {
            chart
                .draw_series(LineSeries::new(
                    vec![(arrow.start.re, arrow.start.im), (arrow.end.re, arrow.end.im)],
                    ARROW_COLOR.stroke_width(2),
                ))
                .map_err(draw_err)?;
        }

        if trace.len() >= 2 {
            chart
                .draw_series(LineSeries::new(to_xy(trace), TRACE_COLOR.stroke_width(2)))
                .map_err(draw_err)?;
        }

        root.present().map_err(draw_err)?;
    }

    let img = image::RgbImage::from_raw(size, size, buffer)
        .ok_or_else(|| anyhow::anyhow!("frame buffer has wrong size"))?;
    img.save(path)?;
    Ok(())
}

fn to_xy<'a>(points: impl IntoIterator<Item = &'a Point>) -> Vec<(f64, f64)> {
    points.into_iter().map(|p| (p.re, p.im)).collect()
}

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow::anyhow!("frame drawing failed: {e}")
}
