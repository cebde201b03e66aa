// Display module - Presenter-side types for painting the guest output
//
// This module provides:
// - DisplayConfig (effect selection and tuning for the paint path)
// - Persisted token mapping for the effect enums
// - Guest output framebuffer
// - Presenter (wgpu surface + blit pipeline)
// - Overlay drawer (egui over the guest output)
// - Platform window wrapper

pub mod config;
pub mod output;
pub mod overlay;
pub mod presenter;
pub mod tokens;
pub mod window;

pub use config::{AntialiasEffect, DisplayConfig, ScalingEffect};
pub use output::{GuestOutput, GUEST_HEIGHT, GUEST_WIDTH};
pub use overlay::{OverlayDrawer, OverlayFrame, OverlayRenderer};
pub use presenter::{Presenter, SurfaceInitError};
pub use window::PlatformWindow;
