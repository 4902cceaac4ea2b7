use winit::event::WindowEvent;

use super::ctx::{FrameCtx, InitCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`crate::window::Runtime`].
pub trait App {
    /// Called once after the window and GPU context exist, before the first frame.
    ///
    /// GPU resources are created and uploaded here. An error stops the runtime and
    /// is returned from `Runtime::run`.
    fn on_init(&mut self, ctx: &mut InitCtx<'_, '_>) -> anyhow::Result<()>;

    /// Called for window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called exactly once, before the GPU context and window are dropped.
    fn on_exit(&mut self) {}
}
