//! Play/pause state machine driving one tick and one draw per frame.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::error::{LifeError, Result};
use crate::grid::{TickStats, Universe};
use crate::render::{Renderer, Surface};

/// Frame timing supplied by the host.
///
/// A request is one-shot: after its frame fires the controller asks again.
pub trait FrameScheduler {
    type Handle: Copy + Eq + fmt::Debug;

    fn request_frame(&mut self) -> Result<Self::Handle>;

    /// Withdraws a pending request. Unknown or already fired handles are ignored.
    fn cancel_frame(&mut self, handle: Self::Handle);
}

/// Whether a frame request is outstanding, and which one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback<H> {
    Stopped,
    Running(H),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The universe advanced and was redrawn.
    Advanced(TickStats),
    /// The fired handle was not the outstanding request; nothing happened.
    Stale,
}

pub struct AnimationController<S: FrameScheduler> {
    scheduler: S,
    playback: Playback<S::Handle>,
}

impl<S: FrameScheduler> AnimationController<S> {
    pub fn new(scheduler: S) -> Self {
        AnimationController {
            scheduler,
            playback: Playback::Stopped,
        }
    }

    pub fn playback(&self) -> Playback<S::Handle> {
        self.playback
    }

    pub fn is_paused(&self) -> bool {
        self.playback == Playback::Stopped
    }

    /// Label for the play/pause control.
    pub fn label(&self) -> &'static str {
        if self.is_paused() {
            "▶"
        } else {
            "⏸"
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Starts the animation.
    ///
    /// # Panics
    ///
    /// If the animation is already running.
    pub fn play(&mut self) -> Result<()> {
        assert!(self.is_paused(), "play() called while the animation is running");
        let handle = self.request()?;
        self.playback = Playback::Running(handle);
        debug!(?handle, "animation started");
        Ok(())
    }

    /// Stops the animation and cancels the pending frame.
    ///
    /// # Panics
    ///
    /// If the animation is already stopped.
    pub fn pause(&mut self) {
        let Playback::Running(handle) = self.playback else {
            panic!("pause() called while the animation is stopped");
        };
        self.scheduler.cancel_frame(handle);
        self.playback = Playback::Stopped;
        debug!(?handle, "animation paused");
    }

    /// The play/pause control: runs whichever action matches the current state.
    pub fn toggle(&mut self) -> Result<()> {
        if self.is_paused() {
            self.play()
        } else {
            self.pause();
            Ok(())
        }
    }

    /// Frame callback. Advances and redraws only when `fired` is the
    /// outstanding request, then asks for the next frame.
    ///
    /// # Errors
    ///
    /// [`LifeError::Schedule`] if the next frame cannot be requested. The
    /// controller is stopped when this happens.
    pub fn on_frame<D: Surface + ?Sized>(
        &mut self,
        fired: S::Handle,
        universe: &mut Universe,
        renderer: &Renderer,
        surface: &mut D,
    ) -> Result<FrameOutcome> {
        if self.playback != Playback::Running(fired) {
            trace!(?fired, "ignoring stale frame");
            return Ok(FrameOutcome::Stale);
        }

        let stats = universe.tick();
        renderer.draw(surface, universe.cells_view());

        let next = self.request()?;
        self.playback = Playback::Running(next);
        Ok(FrameOutcome::Advanced(stats))
    }

    /// Advances a single generation out of band.
    ///
    /// # Panics
    ///
    /// If the animation is running.
    pub fn step<D: Surface + ?Sized>(
        &mut self,
        universe: &mut Universe,
        renderer: &Renderer,
        surface: &mut D,
    ) -> TickStats {
        assert!(self.is_paused(), "step() called while the animation is running");
        let stats = universe.tick();
        renderer.draw(surface, universe.cells_view());
        stats
    }

    fn request(&mut self) -> Result<S::Handle> {
        self.scheduler.request_frame().map_err(|err| {
            warn!(%err, "frame request failed, stopping animation");
            self.playback = Playback::Stopped;
            err
        })
    }
}

/// Identifies one request made to a [`FrameClock`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

/// Fixed-cadence scheduler for hosts that poll for due frames.
#[derive(Debug)]
pub struct FrameClock {
    interval: Duration,
    next_id: u64,
    pending: Option<(FrameId, Instant)>,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        FrameClock::with_interval(Duration::from_secs(1) / fps.max(1))
    }

    pub fn with_interval(interval: Duration) -> Self {
        FrameClock {
            interval,
            next_id: 0,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn pending(&self) -> Option<FrameId> {
        self.pending.map(|(id, _)| id)
    }

    /// Time left before the pending frame is due, or `None` when idle.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .map(|(_, due)| due.checked_duration_since(now).unwrap_or_default())
    }

    /// Fires the pending frame if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<FrameId> {
        match self.pending {
            Some((id, due)) if due <= now => {
                self.pending = None;
                Some(id)
            }
            _ => None,
        }
    }
}

impl FrameScheduler for FrameClock {
    type Handle = FrameId;

    fn request_frame(&mut self) -> Result<FrameId> {
        if let Some((id, _)) = self.pending {
            return Err(LifeError::Schedule(format!(
                "frame {:?} is still outstanding",
                id
            )));
        }
        let id = FrameId(self.next_id);
        self.next_id += 1;
        self.pending = Some((id, Instant::now() + self.interval));
        Ok(id)
    }

    fn cancel_frame(&mut self, handle: FrameId) {
        if self.pending() == Some(handle) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Seeding;
    use crate::raster::Raster;
    use crate::render::{CellMetrics, Palette};

    /// Hands out numbered requests and fires them on demand.
    #[derive(Default)]
    struct ManualScheduler {
        next: u32,
        pending: Vec<u32>,
        refuse: bool,
    }

    impl ManualScheduler {
        fn fire(&mut self) -> Option<u32> {
            if self.pending.is_empty() {
                None
            } else {
                Some(self.pending.remove(0))
            }
        }
    }

    impl FrameScheduler for ManualScheduler {
        type Handle = u32;

        fn request_frame(&mut self) -> Result<u32> {
            if self.refuse {
                return Err(LifeError::Schedule("refused".into()));
            }
            self.next += 1;
            self.pending.push(self.next);
            Ok(self.next)
        }

        fn cancel_frame(&mut self, handle: u32) {
            self.pending.retain(|&h| h != handle);
        }
    }

    fn fixture() -> (Universe, Renderer, Raster) {
        let universe = Universe::new(8, 8, Seeding::Random { seed: 11 }).unwrap();
        let renderer = Renderer::new(CellMetrics::new(1), Palette::default());
        let raster = Raster::with_size(renderer.metrics().surface_size(8, 8));
        (universe, renderer, raster)
    }

    #[test]
    fn test_starts_stopped() {
        let controller = AnimationController::new(ManualScheduler::default());
        assert!(controller.is_paused());
        assert_eq!(controller.playback(), Playback::Stopped);
        assert_eq!(controller.label(), "▶");
    }

    #[test]
    fn test_play_frame_pause() {
        let (mut universe, renderer, mut raster) = fixture();
        let mut controller = AnimationController::new(ManualScheduler::default());

        controller.play().unwrap();
        assert_eq!(controller.playback(), Playback::Running(1));
        assert_eq!(controller.label(), "⏸");

        let fired = controller.scheduler_mut().fire().unwrap();
        let outcome = controller
            .on_frame(fired, &mut universe, &renderer, &mut raster)
            .unwrap();
        assert!(matches!(outcome, FrameOutcome::Advanced(_)));
        assert_eq!(universe.generation(), 1);
        assert_eq!(controller.playback(), Playback::Running(2));
        assert_eq!(controller.scheduler().pending, vec![2]);

        controller.pause();
        assert!(controller.is_paused());
        assert!(controller.scheduler().pending.is_empty());
    }

    #[test]
    fn test_no_tick_after_pause() {
        let (mut universe, renderer, mut raster) = fixture();
        let mut controller = AnimationController::new(ManualScheduler::default());

        controller.play().unwrap();
        controller.pause();
        let before = raster.clone();

        // Driving the stale handle by hand must not advance anything.
        for handle in 0..4 {
            let outcome = controller
                .on_frame(handle, &mut universe, &renderer, &mut raster)
                .unwrap();
            assert_eq!(outcome, FrameOutcome::Stale);
        }
        assert_eq!(controller.scheduler_mut().fire(), None);
        assert_eq!(universe.generation(), 0);
        assert_eq!(raster, before);
    }

    #[test]
    fn test_toggle_alternates() {
        let mut controller = AnimationController::new(ManualScheduler::default());
        controller.toggle().unwrap();
        assert!(!controller.is_paused());
        controller.toggle().unwrap();
        assert!(controller.is_paused());
        controller.toggle().unwrap();
        assert_eq!(controller.playback(), Playback::Running(2));
    }

    #[test]
    #[should_panic(expected = "play() called while the animation is running")]
    fn test_double_play_panics() {
        let mut controller = AnimationController::new(ManualScheduler::default());
        controller.play().unwrap();
        let _ = controller.play();
    }

    #[test]
    #[should_panic(expected = "pause() called while the animation is stopped")]
    fn test_pause_while_stopped_panics() {
        let mut controller = AnimationController::new(ManualScheduler::default());
        controller.pause();
    }

    #[test]
    fn test_refused_request_stops_animation() {
        let (mut universe, renderer, mut raster) = fixture();
        let mut controller = AnimationController::new(ManualScheduler::default());
        controller.play().unwrap();

        controller.scheduler_mut().refuse = true;
        let fired = controller.scheduler_mut().fire().unwrap();
        let err = controller
            .on_frame(fired, &mut universe, &renderer, &mut raster)
            .unwrap_err();
        assert!(matches!(err, LifeError::Schedule(_)));
        assert!(controller.is_paused());
        assert_eq!(universe.generation(), 1);

        assert!(controller.play().is_err());
        assert!(controller.is_paused());
    }

    #[test]
    fn test_step_while_paused() {
        let (mut universe, renderer, mut raster) = fixture();
        let mut controller = AnimationController::new(ManualScheduler::default());
        controller.step(&mut universe, &renderer, &mut raster);
        assert_eq!(universe.generation(), 1);
        assert!(controller.scheduler().pending.is_empty());
    }

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::with_interval(Duration::from_millis(10));
        let start = Instant::now();
        assert_eq!(clock.time_until_due(start), None);

        let id = clock.request_frame().unwrap();
        assert!(clock.request_frame().is_err());
        assert_eq!(clock.take_due(start), None);

        let later = Instant::now() + Duration::from_millis(20);
        assert_eq!(clock.time_until_due(later), Some(Duration::ZERO));
        assert_eq!(clock.take_due(later), Some(id));
        assert_eq!(clock.pending(), None);

        let next = clock.request_frame().unwrap();
        assert_ne!(next, id);
        clock.cancel_frame(next);
        assert_eq!(clock.take_due(later + Duration::from_secs(1)), None);
    }
}
