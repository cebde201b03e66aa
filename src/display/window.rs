// Platform window wrapper
//
// Thin wrapper over the native window that also carries the presenter
// attachment: setting a presenter acquires a paint surface for the
// window, clearing it releases the surface. Headless instances (no
// native window) record state so controller logic runs in tests without
// a windowing backend.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use winit::window::{Fullscreen, Window};

use super::presenter::Presenter;

/// Window-side endpoint of presenter painting.
pub struct PlatformWindow {
    native: Option<Arc<Window>>,
    presenter: Option<Rc<RefCell<Presenter>>>,
    title: String,
    fullscreen: bool,
}

impl PlatformWindow {
    /// Wrap a native window.
    pub fn new(native: Arc<Window>) -> Self {
        Self {
            native: Some(native),
            presenter: None,
            title: String::new(),
            fullscreen: false,
        }
    }

    /// Create a window wrapper with no native backend.
    pub fn headless() -> Self {
        Self {
            native: None,
            presenter: None,
            title: String::new(),
            fullscreen: false,
        }
    }

    pub fn native(&self) -> Option<&Arc<Window>> {
        self.native.as_ref()
    }

    /// Attach or detach the presenter painting to this window.
    ///
    /// Attaching acquires a paint surface when a native window exists;
    /// surface acquisition failure leaves the presenter surfaceless and
    /// is not an error of the shell.
    pub fn set_presenter(&mut self, presenter: Option<Rc<RefCell<Presenter>>>) {
        if let Some(old) = self.presenter.take() {
            old.borrow_mut().release_surface();
        }
        if let Some(new) = presenter {
            if let Some(native) = &self.native {
                if let Err(err) = new.borrow_mut().acquire_surface(native.clone()) {
                    tracing::warn!("presenter surface unavailable: {}", err);
                }
            }
            self.presenter = Some(new);
        }
    }

    /// The presenter currently attached, if any.
    pub fn presenter(&self) -> Option<&Rc<RefCell<Presenter>>> {
        self.presenter.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        if let Some(native) = &self.native {
            native.set_title(title);
        }
        self.title = title.to_string();
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Enter or leave borderless fullscreen. The cursor is hidden while
    /// fullscreen.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        if let Some(native) = &self.native {
            native.set_fullscreen(fullscreen.then(|| Fullscreen::Borderless(None)));
            native.set_cursor_visible(!fullscreen);
        }
        self.fullscreen = fullscreen;
    }

    pub fn request_redraw(&self) {
        if let Some(native) = &self.native {
            native.request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_window_records_title() {
        let mut window = PlatformWindow::headless();
        window.set_title("emu-shell");
        assert_eq!(window.title(), "emu-shell");
        assert!(window.native().is_none());
    }

    #[test]
    fn test_headless_fullscreen_state() {
        let mut window = PlatformWindow::headless();
        assert!(!window.is_fullscreen());
        window.set_fullscreen(true);
        assert!(window.is_fullscreen());
        window.set_fullscreen(false);
        assert!(!window.is_fullscreen());
    }

    #[test]
    fn test_presenter_attach_detach() {
        let mut window = PlatformWindow::headless();
        let presenter = Rc::new(RefCell::new(Presenter::new()));

        window.set_presenter(Some(presenter.clone()));
        assert!(window.presenter().is_some());

        window.set_presenter(None);
        assert!(window.presenter().is_none());
        assert!(!presenter.borrow().has_surface());
    }
}
