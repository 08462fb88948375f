// What you SEE:
// • A logo (bitmap, or the fallback initials) drawn as a field of small dots.
// • Move the mouse over it: dots scatter away from the cursor and spring back.
// • A cyan brush trail follows the cursor (disable with --no-trail).
// • Resize the window: the logo is rebuilt for the new size once you stop.
// • Click the logo: logged as an activation. H toggles the HUD. ESC quits.

mod config;
mod error;
mod events;
mod field;
mod font;
mod gamma;
mod lifecycle;
mod loader;
mod render;
mod sampler;
mod trail;
mod types;
mod window;

use clap::Parser;
use config::{Config, DeviceClass};
use error::Error;
use events::{EventQueue, HostEvent};
use font::draw_text_5x7;
use lifecycle::LogoEffect;
use loader::ThreadedLoader;
use render::{Canvas, RenderSink};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use trail::{BrushTrail, TrailParams};
use types::Size;
use window::Drawer;

const BACKGROUND: u32 = 0x00_10_10_14;
const MAX_TRAIL_DABS: usize = 600;

#[derive(Parser, Debug)]
#[command(name = "logo-particles", version, about = "Particle logo that scatters around the cursor")]
struct Cli {
    /// TOML config file; command line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logo bitmap (PNG, JPEG, ...)
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Fallback text when the bitmap is missing, slow or the window is narrow
    #[arg(long)]
    text: Option<String>,

    /// Tuning preset
    #[arg(long, value_enum)]
    device: Option<DeviceClass>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Disable the cursor trail
    #[arg(long)]
    no_trail: bool,

    /// Show the HUD line (state, particle count, FPS)
    #[arg(long)]
    hud: bool,

    /// Debug logging (RUST_LOG still wins)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// File (if any) first, then flags on top.
fn load_config(cli: &Cli) -> Result<Config, Error> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(logo) = &cli.logo {
        config.logo.path = Some(logo.clone());
    }
    if let Some(text) = &cli.text {
        config.logo.fallback_text = text.clone();
    }
    if let Some(device) = cli.device {
        config.device = device;
    }
    if let Some(width) = cli.width {
        config.window.width = width;
    }
    if let Some(height) = cli.height {
        config.window.height = height;
    }
    config.trail &= !cli.no_trail;
    config.hud |= cli.hud;
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;
    debug!(?config, "configuration loaded");

    /* --- Window (render context) ---
       If this fails the effect simply never renders; not a crash. */
    let mut drawer = match Drawer::new(&config.window.title, config.window.width, config.window.height) {
        Ok(d) => d,
        Err(e) => {
            error!(error = %e, "could not create window; logo effect disabled");
            return Ok(());
        }
    };

    let (w, h) = drawer.size();
    let container = Size::new(w as f32, h as f32);
    let device = config.resolve_device(container.width);
    let tuning = config.tuning(container.width);
    info!(?device, width = w, height = h, "starting logo effect");

    /* --- Effect + sinks ---
       The effect owns the particles; the canvas turns them into pixels. */
    let mut effect = LogoEffect::new(&config, tuning, container, ThreadedLoader);
    let mut canvas = Canvas::new(w.max(1), h.max(1), BACKGROUND);
    let mut trail = config
        .trail
        .then(|| BrushTrail::new(TrailParams::for_device(device), MAX_TRAIL_DABS));
    let mut queue = EventQueue::new();

    let mut last_size = (w, h);
    let mut show_hud = config.hud;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut fps = 0.0f32;
    let mut last_frame_time = Instant::now();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();
        let dt = (now - last_frame_time).as_secs_f32(); // drives the trail fade only
        last_frame_time = now;

        /* 1) Host events: size, orientation, pointer. */
        let size = drawer.size();
        if size != last_size {
            queue.push(HostEvent::Resize { width: size.0 as f32, height: size.1 as f32 });
            let was_portrait = last_size.1 > last_size.0;
            if (size.1 > size.0) != was_portrait {
                queue.push(HostEvent::OrientationChange);
            }
            last_size = size;
        }
        match drawer.mouse_pos() {
            Some((x, y)) => queue.push(HostEvent::PointerMove { x, y }),
            None if effect.pointer().is_active() => queue.push(HostEvent::PointerLeave),
            None => {}
        }
        for event in queue.drain() {
            effect.handle(event, now);
        }

        if drawer.left_click_once()
            && let Some((x, y)) = drawer.mouse_pos()
            && effect.hit_test(x, y)
        {
            info!(link = config.logo.link.as_deref().unwrap_or("-"), "logo activated");
        }
        if drawer.h_pressed_once() {
            show_hud = !show_hud;
        }

        /* 2) Lifecycle + one physics step. */
        effect.update(now, &mut canvas);

        /* 3) Draw: particles, trail on top, HUD last. */
        canvas.clear();
        effect.render(&mut canvas);
        if let Some(trail) = trail.as_mut() {
            trail.track(effect.pointer());
            trail.update_and_render(&mut canvas.frame, dt);
        }
        if show_hud {
            let source = match effect.source() {
                Some(sampler::SourceKind::Bitmap) => "IMG",
                Some(sampler::SourceKind::Text) => "TXT",
                None => "-",
            };
            let hud = format!(
                "{:?} {} | GEN {} | {} DOTS | FPS: {:.1}",
                effect.state(),
                source,
                effect.generation(),
                effect.particle_count(),
                fps
            );
            draw_text_5x7(&mut canvas.frame, 8, 8, &hud, 0x00_FF_FF_FF);
        }

        /* 4) Present. */
        drawer.present(&canvas.frame)?;

        /* 5) FPS, logged once per second. */
        frames_this_second += 1;
        let since = now.duration_since(last_fps_time);
        if since >= Duration::from_secs(1) {
            fps = frames_this_second as f32 / since.as_secs_f32();
            debug!(
                fps,
                particles = effect.particle_count(),
                trail = trail.as_ref().map_or(0, |t| t.len()),
                "frame rate"
            );
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    effect.destroy();
    Ok(())
}
