// LogoEffect: owns the particle generation and walks it through
// Uninitialized -> Sampling -> Ready, tearing it down on (debounced) resize.
//
// Liveness is the phase itself. A generation exists only inside
// Phase::Ready, an in-flight decode only inside Phase::Sampling, and leaving
// either phase drops them. A late decode result therefore has nowhere to
// land, and Destroyed turns every method into a no-op.

use crate::config::{Config, LifecycleConfig, LogoConfig, Tuning};
use crate::error::Error;
use crate::events::{Debouncer, HostEvent};
use crate::field::ParticleField;
use crate::loader::{AssetLoader, DecodePoll, PendingDecode};
use crate::render::RenderSink;
use crate::sampler::{self, Sampled, SourceKind};
use crate::types::{PointerState, Rect, Size};
use image::RgbaImage;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Observable lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Sampling,
    Ready,
    /// Old generation torn down; waiting for a non-zero container.
    Resizing,
    Destroyed,
}

struct Sampling {
    started: Instant,
    /// `None` means go straight to the text fallback.
    decode: Option<PendingDecode>,
    /// Entered from `Resizing`: a failed attempt parks there again.
    after_resize: bool,
}

struct Generation {
    field: ParticleField,
    bounds: Rect,
    kind: SourceKind,
}

enum Phase {
    Uninitialized { retry_at: Option<Instant> },
    Sampling(Sampling),
    Ready(Generation),
    Resizing { retry_at: Option<Instant> },
    Destroyed,
}

/// How a sampling attempt resolved.
enum Resolution {
    Bitmap(RgbaImage),
    Text,
}

pub struct LogoEffect<L: AssetLoader> {
    phase: Phase,
    logo: LogoConfig,
    lifecycle: LifecycleConfig,
    decode_timeout: Duration,
    tuning: Tuning,
    loader: L,
    container: Size,
    pointer: PointerState,
    reinit: Debouncer,
    generations: u64,
}

impl<L: AssetLoader> LogoEffect<L> {
    pub fn new(config: &Config, tuning: Tuning, container: Size, loader: L) -> Self {
        Self {
            phase: Phase::Uninitialized { retry_at: None },
            logo: config.logo.clone(),
            lifecycle: config.lifecycle.clone(),
            decode_timeout: config.decode_timeout(),
            tuning,
            loader,
            container,
            pointer: PointerState::default(),
            reinit: Debouncer::default(),
            generations: 0,
        }
    }

    pub fn state(&self) -> LifecycleState {
        match self.phase {
            Phase::Uninitialized { .. } => LifecycleState::Uninitialized,
            Phase::Sampling(_) => LifecycleState::Sampling,
            Phase::Ready(_) => LifecycleState::Ready,
            Phase::Resizing { .. } => LifecycleState::Resizing,
            Phase::Destroyed => LifecycleState::Destroyed,
        }
    }

    /// Number of generations built so far.
    pub fn generation(&self) -> u64 {
        self.generations
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    fn ready(&self) -> Option<&Generation> {
        match &self.phase {
            Phase::Ready(generation) => Some(generation),
            _ => None,
        }
    }

    /// Where the artwork was drawn, once a generation exists.
    pub fn bounds(&self) -> Option<Rect> {
        self.ready().map(|g| g.bounds)
    }

    pub fn source(&self) -> Option<SourceKind> {
        self.ready().map(|g| g.kind)
    }

    pub fn particle_count(&self) -> usize {
        self.ready().map_or(0, |g| g.field.len())
    }

    /// True when (x, y) lands on the artwork.
    pub fn hit_test(&self, x: f32, y: f32) -> bool {
        self.bounds().is_some_and(|b| b.contains(x, y))
    }

    /// Apply one host event. Resize/orientation only arm the debounce.
    pub fn handle(&mut self, event: HostEvent, now: Instant) {
        if matches!(self.phase, Phase::Destroyed) {
            return;
        }
        match event {
            HostEvent::Resize { width, height } => {
                let size = Size::new(width, height);
                if size != self.container {
                    self.container = size;
                    self.reinit.trigger(now, self.lifecycle.resize_debounce());
                }
            }
            HostEvent::OrientationChange => {
                self.reinit.trigger(now, self.lifecycle.orientation_debounce());
            }
            HostEvent::PointerMove { x, y } => self.pointer.move_to(x, y),
            HostEvent::PointerLeave => self.pointer.leave(),
        }
    }

    /// Advance the lifecycle and, when ready, step the particle field once.
    pub fn update(&mut self, now: Instant, sink: &mut impl RenderSink) {
        if matches!(self.phase, Phase::Destroyed) {
            return;
        }

        if self.reinit.fire(now) {
            self.reinitialize();
        }

        // Retries wait for the debounce so one burst builds one generation.
        if let Phase::Uninitialized { retry_at } | Phase::Resizing { retry_at } = self.phase {
            if !self.reinit.is_pending() && retry_at.is_none_or(|t| now >= t) {
                self.begin_sampling(now, sink);
            }
        }

        if matches!(self.phase, Phase::Sampling(_)) {
            self.poll_sampling(now);
        } else if let Phase::Ready(generation) = &mut self.phase {
            generation.field.step(&self.pointer);
        }
    }

    /// Draw the current generation, if any.
    pub fn render(&self, sink: &mut impl RenderSink) {
        if let Some(generation) = self.ready() {
            for cmd in generation.field.draw_commands() {
                sink.draw_circle(&cmd);
            }
        }
    }

    /// Release everything. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if matches!(self.phase, Phase::Destroyed) {
            return;
        }
        self.phase = Phase::Destroyed;
        self.reinit.cancel();
        self.pointer = PointerState::default();
        info!(generations = self.generations, "logo effect destroyed");
    }

    /// Debounced resize fired: drop the generation (or in-flight decode)
    /// before anything else can touch it.
    fn reinitialize(&mut self) {
        match &mut self.phase {
            Phase::Ready(_) | Phase::Sampling(_) => {}
            Phase::Uninitialized { retry_at } | Phase::Resizing { retry_at } => {
                *retry_at = None;
                return;
            }
            Phase::Destroyed => return,
        }
        info!(
            width = self.container.width,
            height = self.container.height,
            "container changed; rebuilding particles"
        );
        self.phase = Phase::Resizing { retry_at: None };
    }

    fn schedule_retry(&mut self, now: Instant) {
        let retry_at = Some(now + self.lifecycle.zero_size_retry());
        self.phase = match self.phase {
            Phase::Resizing { .. } | Phase::Sampling(Sampling { after_resize: true, .. }) => {
                Phase::Resizing { retry_at }
            }
            _ => Phase::Uninitialized { retry_at },
        };
    }

    fn begin_sampling(&mut self, now: Instant, sink: &mut impl RenderSink) {
        if self.container.is_empty() {
            debug!(
                width = self.container.width,
                height = self.container.height,
                "container has no area yet; retrying"
            );
            self.schedule_retry(now);
            return;
        }
        sink.resize(self.container.width.round() as usize, self.container.height.round() as usize);

        let small_screen = self.container.width < self.logo.small_screen_width;
        let decode = match &self.logo.path {
            Some(path) if !small_screen => {
                debug!(path = %path.display(), "decoding logo bitmap");
                Some(self.loader.load(path))
            }
            Some(_) => {
                debug!(width = self.container.width, "small screen; using text fallback");
                None
            }
            None => None,
        };
        let after_resize = matches!(self.phase, Phase::Resizing { .. });
        self.phase = Phase::Sampling(Sampling { started: now, decode, after_resize });
    }

    fn poll_sampling(&mut self, now: Instant) {
        let Phase::Sampling(sampling) = &self.phase else {
            return;
        };
        let resolution = match &sampling.decode {
            None => Resolution::Text,
            Some(pending) => match pending.poll() {
                DecodePoll::Loaded(img) => Resolution::Bitmap(img),
                DecodePoll::Failed(e) => {
                    warn!(error = %e, "logo bitmap unavailable; using text fallback");
                    Resolution::Text
                }
                DecodePoll::Pending if now.duration_since(sampling.started) >= self.decode_timeout => {
                    warn!(timeout_ms = self.decode_timeout.as_millis() as u64, "logo decode timed out; using text fallback");
                    Resolution::Text
                }
                DecodePoll::Pending => return,
            },
        };

        match self.sample(resolution) {
            Ok(sampled) => {
                let field = ParticleField::from_samples(&sampled, &self.tuning);
                self.generations += 1;
                info!(
                    generation = self.generations,
                    source = ?sampled.kind,
                    particles = field.len(),
                    "particle generation ready"
                );
                // Replacing the Sampling phase drops the decode handle.
                self.phase = Phase::Ready(Generation { field, bounds: sampled.bounds, kind: sampled.kind });
            }
            Err(Error::ZeroDimensions(why)) => {
                debug!(%why, "nothing to sample yet; retrying");
                self.schedule_retry(now);
            }
            Err(e) => {
                error!(error = %e, "sampling failed; retrying");
                self.schedule_retry(now);
            }
        }
    }

    fn sample(&self, resolution: Resolution) -> crate::error::Result<Sampled> {
        if let Resolution::Bitmap(img) = resolution {
            match sampler::sample_bitmap(self.container, &img, &self.tuning) {
                Ok(sampled) => return Ok(sampled),
                Err(e) => warn!(error = %e, "bitmap could not be sampled; using text fallback"),
            }
        }
        sampler::sample_text(self.container, &self.logo.fallback_text, &self.tuning)
    }
}
