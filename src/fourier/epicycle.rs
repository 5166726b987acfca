//! Epicycle synthesis - frame-by-frame chain geometry
//!
//! Each component is one circle riding the previous circle's rim. A frame
//! freezes the chain at one rotation angle per component; the traced curve
//! is the tip position accumulated over frames.

use std::f64::consts::TAU;

use num_complex::Complex64;
use tracing::debug;

use super::spectrum::EpicycleChain;
use super::Point;

/// Distance at which the trace counts as back at its start.
///
/// Early-exit heuristic only: integer-frequency chains re-arrive after one
/// fundamental period, but floating point drift can miss exact re-arrival
/// and hand-built chains may have no finite period at all. Callers still
/// need a frame cap.
pub const LOOP_CLOSE_EPS: f64 = 1e-10;

/// A circle in the chain at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

/// A rotation vector at one frame, drawn from a circle's center to its rim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub start: Point,
    pub end: Point,
}

/// The whole chain frozen at one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainPose {
    pub circles: Vec<Circle>,
    pub arrows: Vec<Arrow>,
    /// Terminal point, the synthesized curve position at this frame.
    pub tip: Point,
}

/// Chain geometry at frame `t`.
///
/// Circles chain outward from the origin in component order; each arrow
/// ends where the next circle is centered, and the last arrow ends at the
/// tip. An empty chain collapses to a tip at the origin.
pub fn chain_pose(chain: &EpicycleChain, t: f64) -> ChainPose {
    let mut circles = Vec::with_capacity(chain.len());
    let mut arrows = Vec::with_capacity(chain.len());
    let mut center = Complex64::new(0.0, 0.0);

    for component in chain.components() {
        let end = center + component.vector_at(t);
        circles.push(Circle {
            center,
            radius: component.radius,
        });
        arrows.push(Arrow { start: center, end });
        center = end;
    }

    ChainPose {
        circles,
        arrows,
        tip: center,
    }
}

/// Evenly spaced points around a circle boundary, with the first point
/// repeated at the end so renderers can draw a closed outline.
pub fn circle_outline(center: Point, radius: f64, segments: usize) -> Vec<Point> {
    (0..=segments)
        .map(|i| center + Complex64::from_polar(radius, TAU * i as f64 / segments as f64))
        .collect()
}

/// Animation state: an immutable chain plus the growing trace.
///
/// Callers drive it one [`Animator::advance`] per frame and stop once
/// [`Animator::is_closed`] reports the trace back at its starting point.
#[derive(Debug, Clone)]
pub struct Animator {
    chain: EpicycleChain,
    frame: usize,
    trace: Vec<Point>,
    closed: bool,
}

impl Animator {
    pub fn new(chain: EpicycleChain) -> Self {
        Self {
            chain,
            frame: 0,
            trace: Vec::new(),
            closed: false,
        }
    }

    /// Pose the chain at the current frame, record the tip and move on.
    ///
    /// The closure check compares the new tip against the first recorded
    /// one, before recording it, and only once more than two tips exist.
    /// That keeps the very first frames from closing the loop on the spot.
    pub fn advance(&mut self) -> ChainPose {
        let pose = chain_pose(&self.chain, self.frame as f64);
        if self.trace.len() > 2 && (pose.tip - self.trace[0]).norm() < LOOP_CLOSE_EPS {
            debug!("trace closed at frame {}", self.frame);
            self.closed = true;
        }
        self.trace.push(pose.tip);
        self.frame += 1;
        pose
    }

    /// Next frame index to be drawn.
    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn trace(&self) -> &[Point] {
        &self.trace
    }

    pub fn chain(&self) -> &EpicycleChain {
        &self.chain
    }

    /// Rewind to frame 0, clearing the trace and the closure flag.
    pub fn reset(&mut self) {
        self.frame = 0;
        self.trace.clear();
        self.closed = false;
    }
}
