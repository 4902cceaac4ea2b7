use std::path::PathBuf;

use anyhow::{Context, Result};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use tessel_engine::asset::{load_image, read_asset};
use tessel_engine::core::{srgb_hex, App, AppControl, FrameCtx, InitCtx};
use tessel_engine::render::{
    texture_for_image, QuadBinding, QuadRenderer, Transform2, QUAD_VERTICES,
};
use tessel_engine::upload::UploadBatch;

/// Staging capacity for the startup upload.
pub const STAGING_CAPACITY: u64 = 16 * 1024 * 1024;

pub const ICON_PNG: &[u8] = include_bytes!("../assets/icon.png");
pub const ALIEN_ASSET: &str = "alienGreen_jump.png";

const CLEAR_RGB: u32 = 0x26A69A;

/// Angular speed (rad/s) and scale of each quad.
const ICON_SPIN: (f32, f32) = (1.0, 0.5);
const ALIEN_SPIN: (f32, f32) = (-1.5, 0.3);

struct Scene {
    renderer: QuadRenderer,
    vertex_buffer: wgpu::Buffer,
    icon: QuadBinding,
    alien: QuadBinding,
}

/// Two spinning textured quads, uploaded with a single batch.
pub struct QuadDemo {
    assets_root: PathBuf,
    scene: Option<Scene>,
}

impl QuadDemo {
    pub fn new(assets_root: PathBuf) -> Self {
        Self {
            assets_root,
            scene: None,
        }
    }
}

impl App for QuadDemo {
    fn on_init(&mut self, ctx: &mut InitCtx<'_, '_>) -> Result<()> {
        let gpu = ctx.gpu;
        let device = gpu.device();

        let icon_image = load_image(ICON_PNG, Some(4)).context("decoding embedded icon")?;
        let alien_bytes = read_asset(&self.assets_root, ALIEN_ASSET)?;
        let alien_image = load_image(&alien_bytes, Some(4))
            .with_context(|| format!("decoding {ALIEN_ASSET}"))?;

        let renderer = QuadRenderer::new(device, gpu.surface_format());
        let vertex_buffer = renderer.create_vertex_buffer(device, QUAD_VERTICES.len());
        let icon_texture = texture_for_image(device, &icon_image, "icon")?;
        let alien_texture = texture_for_image(device, &alien_image, "alien")?;

        let uploader = gpu.uploader();
        let mut batch = UploadBatch::begin(&uploader, STAGING_CAPACITY)?;
        batch.append_buffer(bytemuck::cast_slice(&QUAD_VERTICES), &vertex_buffer, 0)?;
        batch.append_texture(&icon_image, &icon_texture)?;
        batch.append_texture(&alien_image, &alien_texture)?;
        batch.finalize().context("uploading quad resources")?;

        let icon = renderer.bind_texture(device, &icon_texture);
        let alien = renderer.bind_texture(device, &alien_texture);

        self.scene = Some(Scene {
            renderer,
            vertex_buffer,
            icon,
            alien,
        });
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(scene) = &self.scene else {
            return AppControl::Continue;
        };

        let t = ctx.time.elapsed as f32;

        ctx.render(srgb_hex(CLEAR_RGB), |rctx, target| {
            let aspect = rctx.aspect();
            let icon_transform =
                Transform2::rotation_scale(ICON_SPIN.0 * t, ICON_SPIN.1).fit_aspect(aspect);
            let alien_transform =
                Transform2::rotation_scale(ALIEN_SPIN.0 * t, ALIEN_SPIN.1).fit_aspect(aspect);
            scene.renderer.draw(
                rctx,
                target,
                &scene.vertex_buffer,
                &[(&scene.icon, icon_transform), (&scene.alien, alien_transform)],
            );
        })
    }

    fn on_exit(&mut self) {
        log::info!("shutting down");
        self.scene = None;
    }
}
