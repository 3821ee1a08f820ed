//! Start/stop state for the frame-synchronized render loop.
//!
//! The loop never holds more than one outstanding frame request. Whoever
//! drives it (the browser's `requestAnimationFrame`, or a fake in tests)
//! implements [`FrameScheduler`].

use crate::error::ScheduleError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Source of one-shot frame callbacks.
pub trait FrameScheduler {
    type Handle;

    /// Ask for the frame callback to fire once on the next refresh.
    fn request(&mut self) -> Result<Self::Handle, ScheduleError>;

    /// Withdraw a request so its callback never fires.
    fn cancel(&mut self, handle: Self::Handle);
}

#[derive(Debug)]
pub struct FrameLoop<H> {
    state: RunState,
    pending: Option<H>,
}

impl<H> Default for FrameLoop<H> {
    fn default() -> Self {
        Self {
            state: RunState::Stopped,
            pending: None,
        }
    }
}

impl<H> FrameLoop<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Request the first frame unless already running.
    pub fn start<S>(&mut self, scheduler: &mut S) -> Result<(), ScheduleError>
    where
        S: FrameScheduler<Handle = H>,
    {
        if self.state == RunState::Running {
            return Ok(());
        }
        if self.pending.is_none() {
            self.pending = Some(scheduler.request()?);
        }
        self.state = RunState::Running;
        Ok(())
    }

    /// Cancel the pending request, if any. No callback fires afterwards.
    pub fn stop<S>(&mut self, scheduler: &mut S)
    where
        S: FrameScheduler<Handle = H>,
    {
        self.state = RunState::Stopped;
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
    }

    /// Called when a frame callback fires. The request it answered is spent;
    /// returns whether this frame should be drawn.
    pub fn begin_frame(&mut self) -> bool {
        self.pending = None;
        self.state == RunState::Running
    }

    /// Schedule the next frame if still running.
    pub fn end_frame<S>(&mut self, scheduler: &mut S) -> Result<(), ScheduleError>
    where
        S: FrameScheduler<Handle = H>,
    {
        if self.state != RunState::Running || self.pending.is_some() {
            return Ok(());
        }
        match scheduler.request() {
            Ok(handle) => {
                self.pending = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.state = RunState::Stopped;
                Err(err)
            }
        }
    }
}
