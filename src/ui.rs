use egui::Context;
use winit::window::Window;

use crate::controller::AppState;

/// Tessellation input kept between `build` and `paint`.
struct PreparedFrame {
    shapes: Vec<egui::epaint::ClippedShape>,
    textures: egui::TexturesDelta,
    pixels_per_point: f32,
}

/// Debug overlay drawn on top of the scene.
pub struct Hud {
    ctx: Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    pending: Option<PreparedFrame>,
}

impl Hud {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let ctx = Context::default();
        let state = egui_winit::State::new(ctx.clone(), egui::ViewportId::ROOT, window, None, None, None);
        let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());
        Self { ctx, state, renderer, pending: None }
    }

    /// Returns true when egui consumed the event.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    pub fn build(&mut self, window: &Window, app: &mut AppState) {
        let raw_input = self.state.take_egui_input(window);
        let output = self.ctx.run(raw_input, |ctx| {
            draw_status_window(ctx, app);
        });
        self.state.handle_platform_output(window, output.platform_output);
        self.pending = Some(PreparedFrame {
            shapes: output.shapes,
            textures: output.textures_delta,
            pixels_per_point: window.scale_factor() as f32,
        });
    }

    /// Record the overlay pass. No-op unless `build` ran this frame.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        (width, height): (u32, u32),
    ) {
        let Some(frame) = self.pending.take() else {
            return;
        };
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: frame.pixels_per_point,
        };
        let primitives = self.ctx.tessellate(frame.shapes, frame.pixels_per_point);

        for (id, image_delta) in &frame.textures.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.renderer.update_buffers(device, queue, encoder, &primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("hud_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        for id in &frame.textures.free {
            self.renderer.free_texture(id);
        }
    }
}

fn status_lines(app: &AppState) -> [String; 3] {
    let p = app.camera.position;
    [
        format!("FPS: {:.0}", app.fps.fps),
        format!("Pos: {:.1}, {:.1}, {:.1}", p.x, p.y, p.z),
        format!("Yaw: {:.1} Pitch: {:.1}", app.camera.yaw(), app.camera.pitch()),
    ]
}

fn draw_status_window(ctx: &Context, app: &mut AppState) {
    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .default_size([160.0, 100.0])
        .show(ctx, |ui| {
            for line in status_lines(app) {
                ui.label(egui::RichText::new(line).small());
            }
            ui.separator();
            if ui.checkbox(&mut app.scene.show_light_marker, "Light marker").changed() {
                tracing::debug!(shown = app.scene.show_light_marker, "light marker toggled from HUD");
            }
            ui.separator();
            ui.label(egui::RichText::new("WASD - Move").small());
            ui.label(egui::RichText::new("Space / Shift - Up / Down").small());
            ui.label(egui::RichText::new("L - Light marker, F1 - HUD").small());
            ui.label(egui::RichText::new("Esc - Quit").small());
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn status_reports_reference_pose() {
        let app = AppState::new(&Config::default());
        let [fps, pos, angles] = status_lines(&app);
        assert_eq!(fps, "FPS: 0");
        assert_eq!(pos, "Pos: 0.0, 3.0, 0.0");
        assert_eq!(angles, "Yaw: -90.0 Pitch: 0.0");
    }
}
