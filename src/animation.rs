//! The two per-frame loops animating the scene.

use crate::clock::{FrameInfo, FrameTask};
use crate::color::Color;
use crate::math::{add, Vec3};
use crate::state::SceneContext;
use log::*;
use std::ops::ControlFlow;

/// Spins the torus, advances the orbit controls and renders the frame
#[derive(Debug, Clone)]
pub struct RotationLoop {
    delta: Vec3,
}

impl RotationLoop {
    pub fn new(delta: Vec3) -> Self {
        RotationLoop { delta }
    }
}

impl FrameTask<SceneContext> for RotationLoop {
    fn name(&self) -> &str {
        "rotation"
    }

    fn tick(&mut self, ctx: &mut SceneContext, frame: &FrameInfo) -> ControlFlow<()> {
        if let Some(torus) = ctx.scene.mesh_mut(ctx.torus) {
            torus.rotation = add(&torus.rotation, &self.delta);
        }

        ctx.controls.update(&mut ctx.camera);
        ctx.renderer.render(&ctx.scene, &ctx.camera);

        trace!(
            "Frame {} after {:?}: torus at {:?}",
            frame.number,
            frame.delta,
            ctx.torus_rotation()
        );
        ControlFlow::Continue(())
    }
}

/// Cycles the scene background through the hue circle
#[derive(Debug, Clone)]
pub struct BackgroundLoop {
    hue: f64,
    delta: f64,
    saturation: f64,
    lightness: f64,
}

impl BackgroundLoop {
    /// `delta` is in degrees per frame; saturation and lightness are in `0.0..=1.0`
    pub fn new(delta: f64, saturation: f64, lightness: f64) -> Self {
        BackgroundLoop {
            hue: 0.0,
            delta,
            saturation,
            lightness,
        }
    }

    /// CSS-style description of the current background
    pub fn style(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue,
            self.saturation * 100.0,
            self.lightness * 100.0
        )
    }

    /// Moves the hue one step forward without touching any scene
    pub fn step(&mut self) {
        self.hue = (self.hue + self.delta).rem_euclid(360.0);
    }
}

impl FrameTask<SceneContext> for BackgroundLoop {
    fn name(&self) -> &str {
        "background"
    }

    fn tick(&mut self, ctx: &mut SceneContext, _frame: &FrameInfo) -> ControlFlow<()> {
        self.step();

        let style = self.style();
        match style.parse::<Color>() {
            Ok(color) => ctx.scene.background = Some(color),
            Err(err) => warn!("Keeping previous background: {err}"),
        }
        ControlFlow::Continue(())
    }
}
