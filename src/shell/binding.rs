// Presenter binding - attach/detach of presenter painting to the window
//
// A two-state machine: Unbound, or Bound with a complete
// (window, presenter, overlay renderer) triple. Setup always detaches
// first, so switching presenters is strictly detach-then-attach; no
// partially attached state is observable between calls.

use std::cell::RefCell;
use std::rc::Rc;

use crate::display::{OverlayDrawer, OverlayRenderer, PlatformWindow, Presenter};

use super::profiler::FrameProfiler;

struct BoundPainting {
    window: Rc<RefCell<PlatformWindow>>,
    presenter: Rc<RefCell<Presenter>>,
    renderer: OverlayRenderer,
}

enum BindingState {
    Unbound,
    Bound(BoundPainting),
}

/// Lifecycle of presenter painting on the shell window.
pub struct PresenterBinding {
    state: BindingState,
}

impl PresenterBinding {
    pub fn new() -> Self {
        Self {
            state: BindingState::Unbound,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, BindingState::Bound(_))
    }

    /// The bound presenter, if any.
    pub fn presenter(&self) -> Option<Rc<RefCell<Presenter>>> {
        match &self.state {
            BindingState::Bound(bound) => Some(bound.presenter.clone()),
            BindingState::Unbound => None,
        }
    }

    /// Bind painting of `presenter` to `window`.
    ///
    /// Always detaches any existing binding first. A missing window or
    /// presenter is an expected transient condition: the binding stays
    /// Unbound, retains nothing, and the call is not an error.
    ///
    /// Returns whether the binding is now Bound.
    pub fn setup(
        &mut self,
        window: Option<&Rc<RefCell<PlatformWindow>>>,
        presenter: Option<Rc<RefCell<Presenter>>>,
        overlay: &mut OverlayDrawer,
        profiler: &mut FrameProfiler,
    ) -> bool {
        self.shutdown(overlay, profiler);

        let (Some(window), Some(presenter)) = (window, presenter) else {
            return false;
        };

        window.borrow_mut().set_presenter(Some(presenter.clone()));
        let renderer = OverlayRenderer::new(&presenter.borrow());
        overlay.set_presenter(Some(presenter.clone()));
        profiler.set_user_io(Some(presenter.clone()));

        self.state = BindingState::Bound(BoundPainting {
            window: window.clone(),
            presenter,
            renderer,
        });
        true
    }

    /// Detach painting, in strict reverse order of attachment: profiler
    /// I/O, overlay drawer, overlay renderer, presenter from window.
    ///
    /// A no-op while Unbound.
    pub fn shutdown(&mut self, overlay: &mut OverlayDrawer, profiler: &mut FrameProfiler) {
        let state = std::mem::replace(&mut self.state, BindingState::Unbound);
        let BindingState::Bound(bound) = state else {
            return;
        };
        let BoundPainting {
            window,
            presenter,
            renderer,
        } = bound;

        profiler.set_user_io(None);
        overlay.set_presenter(None);
        drop(renderer);
        window.borrow_mut().set_presenter(None);
        drop(presenter);
    }

    /// The bound presenter and overlay renderer, for painting a frame.
    pub fn painting_mut(&mut self) -> Option<(&Rc<RefCell<Presenter>>, &mut OverlayRenderer)> {
        match &mut self.state {
            BindingState::Bound(bound) => Some((&bound.presenter, &mut bound.renderer)),
            BindingState::Unbound => None,
        }
    }
}

impl Default for PresenterBinding {
    fn default() -> Self {
        Self::new()
    }
}
