//! Frame sequencing
//!
//! Drives the simulation one tick per frame and renders lazily, so frames are
//! produced only as fast as the encoder consumes them.

use crate::config::{Config, OutputFormat};
use crate::consts::IDLE_FRAME_LIMIT;
use crate::error::Result;
use crate::grid::ContributionGrid;
use crate::output::encoder_for;
use crate::renderer::{Frame, RenderContext, render};
use crate::sim::{Outcome, Simulation};

/// GIF delays are stored in centiseconds and most viewers clamp short ones
const GIF_MAX_SMOOTH_FPS: u32 = 50;

/// Lazy, capped sequence of frames for one run.
///
/// Frame 0 shows the initial state; every later frame is one tick. The
/// sequence ends after the frame of the terminal tick or at the cap.
pub struct FrameSequencer<'a> {
    grid: &'a ContributionGrid,
    config: Config,
    sim: Simulation,
    ctx: RenderContext,
    cap: Option<usize>,
    emitted: usize,
    done: bool,
}

impl<'a> FrameSequencer<'a> {
    pub fn new(grid: &'a ContributionGrid, config: &Config) -> Self {
        let sim = Simulation::new(grid, config.strategy, config.seed);
        let cap = match config.max_frame {
            Some(cap) => Some(cap),
            None if sim.is_idle() => {
                log::info!("no enemies on the grid, stopping after {IDLE_FRAME_LIMIT} frames");
                Some(IDLE_FRAME_LIMIT)
            }
            None => None,
        };
        Self {
            grid,
            config: config.clone(),
            sim,
            ctx: RenderContext::new(grid, config.watermark),
            cap,
            emitted: 0,
            done: false,
        }
    }

    /// Rewind to frame 0; the replay is identical to the first pass
    pub fn restart(&mut self) {
        self.sim = Simulation::new(self.grid, self.config.strategy, self.config.seed);
        self.emitted = 0;
        self.done = false;
    }

    pub fn frames_emitted(&self) -> usize {
        self.emitted
    }

    pub fn outcome(&self) -> Outcome {
        self.sim.outcome()
    }

    pub fn score(&self) -> u64 {
        self.sim.state().score
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }
}

impl Iterator for FrameSequencer<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.done {
            return None;
        }
        if self.cap.is_some_and(|cap| self.emitted >= cap) {
            self.done = true;
            return None;
        }
        if self.emitted > 0 {
            self.sim.step();
        }
        let frame = render(&self.sim.snapshot(), &self.ctx);
        self.emitted += 1;
        if self.sim.is_finished() {
            log::debug!("run ended at tick {}: {:?}", frame.index, self.sim.outcome());
            self.done = true;
        }
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        (0, self.cap.map(|cap| cap.saturating_sub(self.emitted)))
    }
}

/// A finished, encoded run
#[derive(Debug, Clone)]
pub struct Animation {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub frame_count: usize,
    pub outcome: Outcome,
    pub score: u64,
}

/// Validate, simulate, render and encode in one pass
pub fn encode_animation(grid: &ContributionGrid, config: &Config) -> Result<Animation> {
    config.validate()?;
    if config.output_format == OutputFormat::Gif && config.fps > GIF_MAX_SMOOTH_FPS {
        log::warn!(
            "fps {} exceeds {GIF_MAX_SMOOTH_FPS}; GIF viewers may play it slower than intended",
            config.fps
        );
    }

    let encoder = encoder_for(config.output_format);
    let mut frames = FrameSequencer::new(grid, config);
    let bytes = encoder.encode(&mut frames, config.frame_duration_ms())?;

    log::info!(
        "encoded {} frames as {} ({} bytes), outcome {:?}, score {}",
        frames.frames_emitted(),
        config.output_format.as_str(),
        bytes.len(),
        frames.outcome(),
        frames.score()
    );
    Ok(Animation {
        bytes,
        format: config.output_format,
        frame_count: frames.frames_emitted(),
        outcome: frames.outcome(),
        score: frames.score(),
    })
}
