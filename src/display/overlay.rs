// Overlay drawer - immediate-mode UI painted over the guest output
//
// OverlayDrawer owns the long-lived egui context and winit integration.
// OverlayRenderer holds the GPU resources bound to one presenter surface;
// it is created when presenter painting is set up and dropped when it is
// shut down.

use std::cell::RefCell;
use std::rc::Rc;

use winit::event::WindowEvent;
use winit::window::Window;

use super::presenter::Presenter;

/// Tessellated UI output for one frame, ready for the overlay pass.
pub struct OverlayFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
}

/// Immediate-mode overlay drawer.
///
/// Produces UI frames only while a presenter is attached; detached, the
/// overlay is invisible and consumes no input.
pub struct OverlayDrawer {
    ctx: egui::Context,
    state: Option<egui_winit::State>,
    presenter: Option<Rc<RefCell<Presenter>>>,
}

impl OverlayDrawer {
    pub fn new() -> Self {
        Self {
            ctx: egui::Context::default(),
            state: None,
            presenter: None,
        }
    }

    /// Create the winit input state once the native window exists.
    pub fn init_window(&mut self, window: &Window) {
        self.state = Some(egui_winit::State::new(
            self.ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        ));
    }

    /// Attach or detach the presenter the overlay paints onto.
    pub fn set_presenter(&mut self, presenter: Option<Rc<RefCell<Presenter>>>) {
        self.presenter = presenter;
    }

    /// The presenter currently attached, if any.
    pub fn presenter(&self) -> Option<&Rc<RefCell<Presenter>>> {
        self.presenter.as_ref()
    }

    /// Feed a window event to the UI. Returns true when the UI consumed
    /// the event (e.g. typing into a panel widget).
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        match &mut self.state {
            Some(state) => state.on_window_event(window, event).consumed,
            None => false,
        }
    }

    /// Run one UI frame and tessellate it for the overlay pass.
    ///
    /// Returns `None` while no presenter is attached or the window input
    /// state has not been created yet.
    pub fn run(
        &mut self,
        window: &Window,
        ui: impl FnOnce(&egui::Context),
    ) -> Option<OverlayFrame> {
        if self.presenter.is_none() {
            return None;
        }
        let state = self.state.as_mut()?;

        let raw_input = state.take_egui_input(window);
        let mut ui = Some(ui);
        let full_output = self
            .ctx
            .run(raw_input, |ctx| (ui.take().unwrap())(ctx));
        state.handle_platform_output(window, full_output.platform_output);

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width.max(1), size.height.max(1)],
            pixels_per_point: window.scale_factor() as f32,
        };
        let primitives = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        Some(OverlayFrame {
            primitives,
            textures_delta: full_output.textures_delta,
            screen_descriptor,
        })
    }
}

impl Default for OverlayDrawer {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU half of the overlay, tied to one presenter surface.
pub struct OverlayRenderer {
    renderer: Option<egui_wgpu::Renderer>,
}

impl OverlayRenderer {
    /// Create overlay GPU resources from the presenter's surface.
    ///
    /// A surfaceless presenter yields a renderer with no GPU resources,
    /// which paints nothing.
    pub fn new(presenter: &Presenter) -> Self {
        let renderer = match (presenter.device(), presenter.surface_format()) {
            (Some(device), Some(format)) => Some(egui_wgpu::Renderer::new(
                device,
                format,
                egui_wgpu::RendererOptions::default(),
            )),
            _ => None,
        };
        Self { renderer }
    }

    pub fn has_gpu_resources(&self) -> bool {
        self.renderer.is_some()
    }

    /// Record the overlay pass over an already painted frame.
    pub(crate) fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        frame: OverlayFrame,
    ) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        for (id, delta) in &frame.textures_delta.set {
            renderer.update_texture(device, queue, *id, delta);
        }
        renderer.update_buffers(
            device,
            queue,
            encoder,
            &frame.primitives,
            &frame.screen_descriptor,
        );

        {
            let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
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
            let mut pass = pass.forget_lifetime();
            renderer.render(&mut pass, &frame.primitives, &frame.screen_descriptor);
        }

        for id in &frame.textures_delta.free {
            renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawer_without_presenter_produces_no_frames() {
        let drawer = OverlayDrawer::new();
        assert!(drawer.presenter().is_none());
    }

    #[test]
    fn test_renderer_from_surfaceless_presenter_has_no_gpu_resources() {
        let presenter = Presenter::new();
        let renderer = OverlayRenderer::new(&presenter);
        assert!(!renderer.has_gpu_resources());
    }
}
