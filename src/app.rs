use crate::animation::{BackgroundLoop, RotationLoop};
use crate::clock::{CancelHandle, FrameClock};
use crate::config::Args;
use crate::renderer::Viewport;
use crate::state::SceneContext;
use crate::terminal::TerminalSurface;
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use log::*;
use std::time::{Duration, Instant};

/// Frames-per-second counter, updated once a second
pub struct FpsCounter {
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        FpsCounter {
            frames_since_last_update: 0,
            last_fps_calculation: now,
            fps: 0.0,
        }
    }

    pub fn frame(&mut self, now: Instant) {
        self.frames_since_last_update += 1;
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Translates terminal events into scene changes
pub struct InputState {
    /// Button held down and the cell it was last seen at
    drag: Option<(MouseButton, u16, u16)>,
    /// Show the debug overlay
    pub debug: bool,
    loops: Vec<CancelHandle>,
}

impl InputState {
    /// `loops` are cancelled when the user asks to quit
    pub fn new(loops: Vec<CancelHandle>) -> Self {
        InputState {
            drag: None,
            debug: false,
            loops,
        }
    }

    pub fn quit(&self) {
        debug!("Cancelling {} frame loops", self.loops.len());
        for handle in &self.loops {
            handle.cancel();
        }
    }

    pub fn handle(&mut self, event: Event, ctx: &mut SceneContext) {
        match event {
            Event::Resize(columns, rows) => {
                let viewport = Viewport::from_cells(columns, rows);
                debug!("Terminal resized to {columns}x{rows} cells");
                ctx.resize(viewport);
            }
            Event::Key(key) => self.handle_key(key, ctx),
            Event::Mouse(mouse) => self.handle_mouse(mouse, ctx),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut SceneContext) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            KeyCode::Char('q' | 'Q') => self.quit(),
            KeyCode::Char('d' | 'D') => self.debug = !self.debug,
            KeyCode::Char('r' | 'R') => ctx.controls.reset(&mut ctx.camera),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, ctx: &mut SceneContext) {
        let viewport_height = ctx.renderer.size().1 as f64;

        match mouse.kind {
            MouseEventKind::Down(button) => {
                self.drag = Some((button, mouse.column, mouse.row));
            }
            MouseEventKind::Drag(button) => {
                let Some((held, column, row)) = self.drag else {
                    self.drag = Some((button, mouse.column, mouse.row));
                    return;
                };

                // One cell is one pixel wide and two pixels tall
                let dx = mouse.column as f64 - column as f64;
                let dy = (mouse.row as f64 - row as f64) * 2.0;

                match held {
                    MouseButton::Left => ctx.controls.drag_rotate(dx, dy, viewport_height),
                    MouseButton::Right => {
                        ctx.controls.drag_pan(dx, dy, viewport_height, &ctx.camera)
                    }
                    MouseButton::Middle => {}
                }
                self.drag = Some((held, mouse.column, mouse.row));
            }
            MouseEventKind::Up(_) => self.drag = None,
            MouseEventKind::ScrollUp => ctx.controls.dolly_in(),
            MouseEventKind::ScrollDown => ctx.controls.dolly_out(),
            _ => {}
        }
    }
}

fn debug_overlay(ctx: &SceneContext, fps: f64) -> Vec<String> {
    let [x, y, z] = ctx.torus_rotation();
    let (width, height) = ctx.renderer.size();
    let background = ctx
        .scene
        .background
        .map(|color| color.to_string())
        .unwrap_or_else(|| "none".to_string());

    let mut lines = vec![
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        format!("Rotation X: {x:.2}, Y: {y:.2}, Z: {z:.2}"),
    ];
    if let Some(light) = ctx.scene.point_light(ctx.light) {
        let [lx, ly, lz] = light.position;
        lines.push(format!("Light: ({lx:.2}, {ly:.2}, {lz:.2})"));
    }
    lines.push(format!("Background: {background}"));
    lines.push(format!(
        "Viewport: {width}x{height}{}",
        if ctx.renderer.antialias() { " (2x2 AA)" } else { "" }
    ));
    lines.push(format!("Distance: {:.2}", ctx.controls.distance(&ctx.camera)));
    lines.push(format!("FPS: {fps:.2}"));
    lines
}

/// Opens the terminal, builds the scene and animates it until the user quits
pub fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.scene_config();

    let mut surface = TerminalSurface::open().context("couldn't open the terminal")?;
    let viewport = surface.viewport()?;
    let mut ctx =
        SceneContext::bootstrap(viewport, &config).context("couldn't set up the scene")?;

    let mut clock = FrameClock::new();
    let rotation = clock.on_next_frame(RotationLoop::new(config.rotation_delta));
    let background = clock.on_next_frame(BackgroundLoop::new(
        config.hue_delta,
        config.background_saturation,
        config.background_lightness,
    ));
    let mut input = InputState::new(vec![rotation, background]);

    let frame_interval = Duration::from_secs_f64(1.0 / args.fps);
    let mut last_frame = Instant::now();
    let mut fps = FpsCounter::new(last_frame);

    while !clock.is_idle() {
        let deadline = last_frame + frame_interval;
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            input.handle(event::read()?, &mut ctx);
        }

        let now = Instant::now();
        clock.advance(&mut ctx, now - last_frame);
        last_frame = now;
        fps.frame(now);

        let overlay = if input.debug {
            debug_overlay(&ctx, fps.fps())
        } else {
            Vec::new()
        };
        surface.present(ctx.renderer.output(), &overlay)?;

        if args.frames.is_some_and(|limit| clock.frames() >= limit) {
            input.quit();
        }
    }

    info!("Stopped after {} frames", clock.frames());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::renderer::RendererOptions;
    use assert_approx_eq::assert_approx_eq;

    fn context() -> SceneContext {
        let config = SceneConfig {
            renderer: RendererOptions { antialias: false },
            enable_damping: false,
            ..SceneConfig::default()
        };
        SceneContext::bootstrap(Viewport::new(80, 48), &config).unwrap()
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn quit_keys_cancel_loops() {
        for event in [
            key(KeyCode::Char('q'), KeyModifiers::NONE),
            key(KeyCode::Esc, KeyModifiers::NONE),
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut ctx = context();
            let handles = vec![CancelHandle::new(), CancelHandle::new()];
            let mut input = InputState::new(handles.clone());

            input.handle(event, &mut ctx);
            assert!(handles.iter().all(CancelHandle::is_cancelled));
        }
    }

    #[test]
    fn plain_c_does_not_quit() {
        let mut ctx = context();
        let handle = CancelHandle::new();
        let mut input = InputState::new(vec![handle.clone()]);

        input.handle(key(KeyCode::Char('c'), KeyModifiers::NONE), &mut ctx);
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn resize_event_resizes_scene() {
        let mut ctx = context();
        let mut input = InputState::new(Vec::new());

        input.handle(Event::Resize(100, 30), &mut ctx);
        assert_eq!(ctx.renderer.size(), (100, 60));
        assert_eq!(ctx.camera.aspect, 100.0 / 60.0);

        input.handle(Event::Resize(0, 30), &mut ctx);
        assert_eq!(ctx.renderer.size(), (100, 60));
    }

    #[test]
    fn left_drag_orbits_and_reset_restores() {
        let mut ctx = context();
        let mut input = InputState::new(Vec::new());

        input.handle(mouse(MouseEventKind::Down(MouseButton::Left), 10, 10), &mut ctx);
        input.handle(mouse(MouseEventKind::Drag(MouseButton::Left), 20, 10), &mut ctx);
        input.handle(mouse(MouseEventKind::Up(MouseButton::Left), 20, 10), &mut ctx);
        assert!(ctx.controls.update(&mut ctx.camera));
        assert!(ctx.camera.position.x < 0.0);

        input.handle(key(KeyCode::Char('r'), KeyModifiers::NONE), &mut ctx);
        assert_eq!(ctx.camera.position, glam::DVec3::new(0.0, 0.0, 30.0));
    }

    #[test]
    fn scrolling_dollies() {
        let mut ctx = context();
        let mut input = InputState::new(Vec::new());

        input.handle(mouse(MouseEventKind::ScrollUp, 0, 0), &mut ctx);
        ctx.controls.update(&mut ctx.camera);
        assert_approx_eq!(ctx.controls.distance(&ctx.camera), 28.5);

        input.handle(mouse(MouseEventKind::ScrollDown, 0, 0), &mut ctx);
        ctx.controls.update(&mut ctx.camera);
        assert_approx_eq!(ctx.controls.distance(&ctx.camera), 30.0);
    }

    #[test]
    fn debug_key_toggles_overlay() {
        let mut ctx = context();
        let mut input = InputState::new(Vec::new());
        assert!(!input.debug);

        input.handle(key(KeyCode::Char('d'), KeyModifiers::NONE), &mut ctx);
        assert!(input.debug);

        let overlay = debug_overlay(&ctx, 59.5);
        assert!(overlay[0].starts_with("torus3d"));
        assert!(overlay.iter().any(|line| line == "FPS: 59.50"));
        assert!(overlay.iter().any(|line| line == "Background: none"));
    }

    #[test]
    fn fps_counter_updates_every_second() {
        let start = Instant::now();
        let mut fps = FpsCounter::new(start);

        for i in 1..30 {
            fps.frame(start + Duration::from_millis(i * 33));
        }
        assert_eq!(fps.fps(), 0.0);

        fps.frame(start + Duration::from_secs(1));
        assert_approx_eq!(fps.fps(), 30.0);
    }
}
