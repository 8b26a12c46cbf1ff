//! Looping 2-D playback of logged agent positions.
//!
//! The engine is platform-free: timers go through a [`Scheduler`], image loading is
//! reported back by the host, and every draw is returned as a [`FrameDraw`] of pixel
//! positions for the host to paint. At most one frame timer is armed at any time.
//!
//! Each `play` bumps a generation counter. Timer and image events carry the generation
//! they were armed for, so events from a superseded playback are ignored.

use crate::error::PlaybackError;
use crate::protocol::RunResult;
use crate::schema::ObjectiveId;
use crate::viewport::{DomainBounds, SurfaceSize, Viewport};

/// Agent positions of one frame, in domain coordinates.
pub type AgentFrame = Vec<(f64, f64)>;

/// Static message shown in place of the animation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placeholder {
    NotTwoDimensional { dimensions: u32 },
    NoPositions,
    ImageUnavailable,
    InvalidBounds,
}

impl Placeholder {
    pub fn message(&self) -> String {
        match self {
            Placeholder::NotTwoDimensional { dimensions } => format!(
                "Animation is only available for 2 dimensions (this run has {dimensions})."
            ),
            Placeholder::NoPositions => "No position data to animate.".to_string(),
            Placeholder::ImageUnavailable => {
                "Background image could not be loaded; animation unavailable.".to_string()
            }
            Placeholder::InvalidBounds => {
                "Search bounds are invalid; animation unavailable.".to_string()
            }
        }
    }
}

/// Everything needed to start a playback.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackClip {
    pub frames: Vec<AgentFrame>,
    pub background: Option<String>,
    pub bounds: (f64, f64),
}

impl PlaybackClip {
    /// Decides whether a result can be animated.
    ///
    /// `objective` is the run's requested objective; it supplies the search domain when
    /// the result carries no bounds of its own.
    pub fn from_result(result: &RunResult, objective: &ObjectiveId) -> Result<Self, Placeholder> {
        if result.dimensions != 2 {
            return Err(Placeholder::NotTwoDimensional {
                dimensions: result.dimensions,
            });
        }

        let frames: Vec<AgentFrame> = match result.positions.as_deref() {
            Some(p) if !p.is_empty() => p
                .iter()
                .map(|frame| {
                    frame
                        .iter()
                        .filter(|pt| pt.len() >= 2)
                        .map(|pt| (pt[0], pt[1]))
                        .collect()
                })
                .collect(),
            _ => return Err(Placeholder::NoPositions),
        };

        let objective = result.objective.as_ref().unwrap_or(objective);
        let Some(bounds) = result.bounds.or_else(|| objective.domain()) else {
            tracing::warn!(
                objective = objective.as_str(),
                "{}",
                PlaybackError::MissingBounds
            );
            return Err(Placeholder::InvalidBounds);
        };
        if let Err(e) = DomainBounds::try_from(bounds) {
            tracing::warn!("{e}");
            return Err(Placeholder::InvalidBounds);
        }

        Ok(Self {
            frames,
            background: result
                .background
                .clone()
                .filter(|url| !url.trim().is_empty()),
            bounds,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Repeating: draw the next frame.
    Frame,
    /// One-shot: the background image took too long.
    LoadDeadline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerEvent {
    pub kind: TimerKind,
    pub generation: u64,
}

/// Arms and cancels host timers. When a timer fires, the host passes its event to
/// [`PlaybackEngine::handle`].
pub trait Scheduler {
    type Handle;

    fn arm_interval(
        &mut self,
        period_ms: u32,
        event: TimerEvent,
    ) -> Result<Self::Handle, PlaybackError>;

    fn arm_timeout(&mut self, delay_ms: u32, event: TimerEvent)
        -> Result<Self::Handle, PlaybackError>;

    fn cancel(&mut self, handle: Self::Handle);
}

/// Pixel positions to paint for one frame, over the background if one was loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameDraw {
    pub frame_index: usize,
    pub markers: Vec<(f64, f64)>,
}

/// What the host should do right after [`PlaybackEngine::play`].
#[derive(Clone, Debug, PartialEq)]
pub enum PlayStart {
    Placeholder(Placeholder),
    /// Start loading `url`; report back with `generation`.
    AwaitingImage { url: String, generation: u64 },
    /// No background; the loop is running and this is the first frame.
    Started(FrameDraw),
}

/// Result of a fired timer.
#[derive(Clone, Debug, PartialEq)]
pub enum TimerOutcome {
    Draw(FrameDraw),
    Placeholder(Placeholder),
    Ignored,
}

#[derive(Debug)]
pub struct PlaybackState<H> {
    pub frame_index: usize,
    pub timer: Option<H>,
    pub load_deadline: Option<H>,
    pub is_loaded: bool,
}

impl<H> Default for PlaybackState<H> {
    fn default() -> Self {
        Self {
            frame_index: 0,
            timer: None,
            load_deadline: None,
            is_loaded: false,
        }
    }
}

struct ActiveClip {
    frames: Vec<AgentFrame>,
    viewport: Viewport,
}

pub struct PlaybackEngine<S: Scheduler> {
    scheduler: S,
    frame_interval_ms: u32,
    image_timeout_ms: u32,
    generation: u64,
    clip: Option<ActiveClip>,
    state: PlaybackState<S::Handle>,
}

impl<S: Scheduler> PlaybackEngine<S> {
    pub fn new(scheduler: S, frame_interval_ms: u32, image_timeout_ms: u32) -> Self {
        Self {
            scheduler,
            frame_interval_ms: frame_interval_ms.max(1),
            image_timeout_ms: image_timeout_ms.max(1),
            generation: 0,
            clip: None,
            state: PlaybackState::default(),
        }
    }

    /// Starts a new playback, cancelling whatever was running.
    pub fn play(
        &mut self,
        clip: PlaybackClip,
        surface: SurfaceSize,
    ) -> Result<PlayStart, PlaybackError> {
        self.teardown();

        if clip.frames.is_empty() {
            return Ok(PlayStart::Placeholder(Placeholder::NoPositions));
        }
        let bounds = DomainBounds::try_from(clip.bounds)?;

        self.clip = Some(ActiveClip {
            frames: clip.frames,
            viewport: Viewport::new(surface, bounds),
        });

        match clip.background {
            Some(url) => {
                let deadline = self.scheduler.arm_timeout(
                    self.image_timeout_ms,
                    TimerEvent {
                        kind: TimerKind::LoadDeadline,
                        generation: self.generation,
                    },
                );
                match deadline {
                    Ok(h) => self.state.load_deadline = Some(h),
                    Err(e) => {
                        self.clip = None;
                        return Err(e);
                    }
                }
                tracing::debug!(generation = self.generation, %url, "awaiting background");
                Ok(PlayStart::AwaitingImage {
                    url,
                    generation: self.generation,
                })
            }
            None => {
                self.state.is_loaded = true;
                self.start_loop().map(PlayStart::Started)
            }
        }
    }

    /// The background finished loading. Returns the first frame, or `None` if the event
    /// belongs to a superseded playback.
    pub fn image_loaded(&mut self, generation: u64) -> Result<Option<FrameDraw>, PlaybackError> {
        if !self.awaiting_image(generation) {
            tracing::debug!(generation, "ignoring stale image load");
            return Ok(None);
        }
        if let Some(h) = self.state.load_deadline.take() {
            self.scheduler.cancel(h);
        }
        self.state.is_loaded = true;
        self.start_loop().map(Some)
    }

    /// The background failed to load. Returns the placeholder to show, if still current.
    pub fn image_failed(&mut self, generation: u64, reason: &str) -> Option<Placeholder> {
        if !self.awaiting_image(generation) {
            return None;
        }
        tracing::warn!("{}", PlaybackError::ImageLoad(reason.to_string()));
        self.teardown();
        Some(Placeholder::ImageUnavailable)
    }

    /// Routes a fired timer.
    pub fn handle(&mut self, event: TimerEvent) -> TimerOutcome {
        match event.kind {
            TimerKind::Frame => match self.tick(event.generation) {
                Some(draw) => TimerOutcome::Draw(draw),
                None => TimerOutcome::Ignored,
            },
            TimerKind::LoadDeadline => {
                if !self.awaiting_image(event.generation) {
                    return TimerOutcome::Ignored;
                }
                // One-shot timers are spent once they fire.
                self.state.load_deadline = None;
                tracing::warn!(
                    "{}",
                    PlaybackError::ImageTimeout {
                        after_ms: self.image_timeout_ms
                    }
                );
                self.teardown();
                TimerOutcome::Placeholder(Placeholder::ImageUnavailable)
            }
        }
    }

    /// Draws the current frame and advances, wrapping at the end of the clip.
    pub fn tick(&mut self, generation: u64) -> Option<FrameDraw> {
        if generation != self.generation || self.state.timer.is_none() {
            return None;
        }
        self.draw_current()
    }

    /// Cancels every timer and forgets the clip. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(h) = self.state.timer.take() {
            self.scheduler.cancel(h);
        }
        if let Some(h) = self.state.load_deadline.take() {
            self.scheduler.cancel(h);
        }
        self.clip = None;
        self.state = PlaybackState::default();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Follows a resize of the drawing surface.
    pub fn set_surface(&mut self, surface: SurfaceSize) {
        if let Some(clip) = self.clip.as_mut() {
            clip.viewport.size = surface;
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.timer.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> &PlaybackState<S::Handle> {
        &self.state
    }

    pub fn frame_count(&self) -> usize {
        self.clip.as_ref().map_or(0, |c| c.frames.len())
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.clip.as_ref().map(|c| c.viewport)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn awaiting_image(&self, generation: u64) -> bool {
        generation == self.generation && self.clip.is_some() && !self.state.is_loaded
    }

    fn start_loop(&mut self) -> Result<FrameDraw, PlaybackError> {
        let handle = self.scheduler.arm_interval(
            self.frame_interval_ms,
            TimerEvent {
                kind: TimerKind::Frame,
                generation: self.generation,
            },
        );
        match handle {
            Ok(h) => self.state.timer = Some(h),
            Err(e) => {
                self.teardown();
                return Err(e);
            }
        }
        tracing::debug!(
            generation = self.generation,
            frames = self.frame_count(),
            "playback started"
        );
        self.draw_current().ok_or_else(|| {
            PlaybackError::Scheduler("playback started without a clip".to_string())
        })
    }

    fn draw_current(&mut self) -> Option<FrameDraw> {
        let clip = self.clip.as_ref()?;
        let frame_index = self.state.frame_index;
        let frame = clip.frames.get(frame_index)?;
        let markers = frame
            .iter()
            .map(|&(x, y)| clip.viewport.to_pixel(x, y))
            .collect();
        self.state.frame_index = (frame_index + 1) % clip.frames.len();
        Some(FrameDraw {
            frame_index,
            markers,
        })
    }
}

/// A scheduler whose timers only fire when told to. Drives playback headlessly.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u32,
    armed: Vec<ArmedTimer>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmedTimer {
    pub id: u32,
    pub event: TimerEvent,
    pub period_ms: Option<u32>,
    pub delay_ms: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn armed(&self) -> &[ArmedTimer] {
        &self.armed
    }

    pub fn active_intervals(&self) -> usize {
        self.armed.iter().filter(|t| t.period_ms.is_some()).count()
    }

    /// Fires the armed timer of the given kind. One-shot timers are removed.
    pub fn fire(&mut self, kind: TimerKind) -> Option<TimerEvent> {
        let pos = self.armed.iter().position(|t| t.event.kind == kind)?;
        let timer = self.armed[pos];
        if timer.period_ms.is_none() {
            self.armed.remove(pos);
        }
        Some(timer.event)
    }

    fn arm(&mut self, event: TimerEvent, period_ms: Option<u32>, delay_ms: u32) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.armed.push(ArmedTimer {
            id: self.next_id,
            event,
            period_ms,
            delay_ms,
        });
        self.next_id
    }
}

impl Scheduler for ManualScheduler {
    type Handle = u32;

    fn arm_interval(&mut self, period_ms: u32, event: TimerEvent) -> Result<u32, PlaybackError> {
        Ok(self.arm(event, Some(period_ms), period_ms))
    }

    fn arm_timeout(&mut self, delay_ms: u32, event: TimerEvent) -> Result<u32, PlaybackError> {
        Ok(self.arm(event, None, delay_ms))
    }

    fn cancel(&mut self, handle: u32) {
        self.armed.retain(|t| t.id != handle);
    }
}

/// Fires the frame timer once and returns the draw, if any.
pub fn step(engine: &mut PlaybackEngine<ManualScheduler>) -> Option<FrameDraw> {
    let event = engine.scheduler_mut().fire(TimerKind::Frame)?;
    match engine.handle(event) {
        TimerOutcome::Draw(d) => Some(d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HttpReply;

    fn surface() -> SurfaceSize {
        SurfaceSize::new(100.0, 100.0)
    }

    fn clip(frames: usize, background: Option<&str>) -> PlaybackClip {
        PlaybackClip {
            frames: (0..frames)
                .map(|i| vec![(i as f64, 0.0), (-(i as f64), 5.0)])
                .collect(),
            background: background.map(str::to_string),
            bounds: (-10.0, 10.0),
        }
    }

    fn engine() -> PlaybackEngine<ManualScheduler> {
        PlaybackEngine::new(ManualScheduler::new(), 200, 10_000)
    }

    #[test]
    fn empty_positions_never_arm_a_timer() {
        let mut e = engine();
        let start = e.play(clip(0, Some("/bg.png")), surface()).unwrap();
        assert_eq!(start, PlayStart::Placeholder(Placeholder::NoPositions));
        assert!(e.scheduler().armed().is_empty());
        assert!(!e.is_running());
    }

    #[test]
    fn loop_waits_for_the_background() {
        let mut e = engine();
        let start = e.play(clip(3, Some("/bg.png")), surface()).unwrap();
        let PlayStart::AwaitingImage { url, generation } = start else {
            panic!("expected image wait, got {start:?}");
        };
        assert_eq!(url, "/bg.png");
        assert_eq!(e.scheduler().active_intervals(), 0);
        assert!(!e.state().is_loaded);

        let first = e.image_loaded(generation).unwrap().unwrap();
        assert_eq!(first.frame_index, 0);
        assert_eq!(e.scheduler().active_intervals(), 1);
        // The load deadline is disarmed once the image arrives.
        assert_eq!(e.scheduler().armed().len(), 1);
        assert_eq!(e.scheduler().armed()[0].period_ms, Some(200));
    }

    #[test]
    fn frames_wrap_modulo_frame_count() {
        let mut e = engine();
        let PlayStart::Started(first) = e.play(clip(3, None), surface()).unwrap() else {
            panic!("expected immediate start");
        };
        assert_eq!(first.frame_index, 0);
        let seq: Vec<usize> = (0..7).map(|_| step(&mut e).unwrap().frame_index).collect();
        assert_eq!(seq, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn markers_are_transformed_to_pixels() {
        let mut e = engine();
        let mut c = clip(1, None);
        c.frames = vec![vec![(-10.0, -10.0), (10.0, 10.0), (0.0, 0.0)]];
        let PlayStart::Started(draw) = e.play(c, surface()).unwrap() else {
            panic!("expected immediate start");
        };
        assert_eq!(draw.markers, vec![(0.0, 100.0), (100.0, 0.0), (50.0, 50.0)]);
    }

    #[test]
    fn replaying_leaves_exactly_one_timer() {
        let mut e = engine();
        e.play(clip(4, None), surface()).unwrap();
        e.play(clip(2, None), surface()).unwrap();
        e.play(clip(5, None), surface()).unwrap();
        assert_eq!(e.scheduler().armed().len(), 1);
        assert_eq!(e.frame_count(), 5);
        assert_eq!(e.state().frame_index, 1);
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut e = engine();
        let PlayStart::AwaitingImage { generation: old, .. } =
            e.play(clip(3, Some("/a.png")), surface()).unwrap()
        else {
            panic!("expected image wait");
        };
        let PlayStart::AwaitingImage { generation: new, .. } =
            e.play(clip(2, Some("/b.png")), surface()).unwrap()
        else {
            panic!("expected image wait");
        };
        assert_ne!(old, new);

        assert_eq!(e.image_loaded(old).unwrap(), None);
        assert_eq!(e.image_failed(old, "404"), None);
        let stale_frame = TimerEvent {
            kind: TimerKind::Frame,
            generation: old,
        };
        assert_eq!(e.handle(stale_frame), TimerOutcome::Ignored);
        assert_eq!(e.scheduler().active_intervals(), 0);

        assert!(e.image_loaded(new).unwrap().is_some());
        assert_eq!(e.image_loaded(new).unwrap(), None);
        assert_eq!(e.scheduler().active_intervals(), 1);
    }

    #[test]
    fn image_failure_shows_placeholder_without_timer() {
        let mut e = engine();
        let PlayStart::AwaitingImage { generation, .. } =
            e.play(clip(3, Some("/missing.png")), surface()).unwrap()
        else {
            panic!("expected image wait");
        };
        assert_eq!(
            e.image_failed(generation, "404"),
            Some(Placeholder::ImageUnavailable)
        );
        assert!(e.scheduler().armed().is_empty());
        assert_eq!(e.image_loaded(generation).unwrap(), None);
    }

    #[test]
    fn image_timeout_shows_placeholder_without_timer() {
        let mut e = engine();
        e.play(clip(3, Some("/slow.png")), surface()).unwrap();
        assert_eq!(e.scheduler().armed()[0].delay_ms, 10_000);

        let event = e.scheduler_mut().fire(TimerKind::LoadDeadline).unwrap();
        assert_eq!(
            e.handle(event),
            TimerOutcome::Placeholder(Placeholder::ImageUnavailable)
        );
        assert!(e.scheduler().armed().is_empty());
        assert!(!e.is_running());
    }

    #[test]
    fn degenerate_bounds_fail_fast() {
        let mut e = engine();
        e.play(clip(2, None), surface()).unwrap();
        let mut c = clip(2, None);
        c.bounds = (3.0, 3.0);
        let err = e.play(c, surface()).unwrap_err();
        assert!(matches!(err, PlaybackError::DegenerateBounds { .. }));
        assert!(e.scheduler().armed().is_empty());
    }

    #[test]
    fn teardown_cancels_everything() {
        let mut e = engine();
        e.play(clip(2, None), surface()).unwrap();
        let g = e.generation();
        e.teardown();
        e.teardown();
        assert!(e.scheduler().armed().is_empty());
        assert_eq!(e.tick(g), None);
        assert_eq!(e.state().frame_index, 0);
    }

    #[test]
    fn resize_moves_markers() {
        let mut e = engine();
        let mut c = clip(1, None);
        c.frames = vec![vec![(10.0, 10.0)]];
        e.play(c, surface()).unwrap();
        e.set_surface(SurfaceSize::new(400.0, 200.0));
        assert_eq!(step(&mut e).unwrap().markers, vec![(400.0, 0.0)]);
    }

    fn result(body: &str) -> RunResult {
        crate::protocol::interpret_reply(&HttpReply::new(200, body)).unwrap()
    }

    #[test]
    fn clip_requires_two_dimensions() {
        let r = result(r#"{"best":[0,0,0],"best_value":0,"history":[1],"dimensions":3,
                            "positions":[[[1,2,3]]],"bounds":[-5,5]}"#);
        assert_eq!(
            PlaybackClip::from_result(&r, &ObjectiveId::Sphere),
            Err(Placeholder::NotTwoDimensional { dimensions: 3 })
        );
        assert_eq!(
            Placeholder::NotTwoDimensional { dimensions: 3 }.message(),
            "Animation is only available for 2 dimensions (this run has 3)."
        );
    }

    #[test]
    fn clip_requires_positions() {
        for positions in ["", r#","positions":[]"#] {
            let body = format!(
                r#"{{"best":[0,0],"best_value":0,"history":[1],"dimensions":2{positions}}}"#
            );
            assert_eq!(
                PlaybackClip::from_result(&result(&body), &ObjectiveId::Sphere),
                Err(Placeholder::NoPositions)
            );
        }
    }

    #[test]
    fn clip_falls_back_to_catalog_domain() {
        let r = result(
            r#"{"best":[0,0],"best_value":0,"history":[1],"dimensions":2,
                "positions":[[[1,2]],[[0,0]]],"background":""}"#,
        );
        let c = PlaybackClip::from_result(&r, &ObjectiveId::Rastrigin).unwrap();
        assert_eq!(c.bounds, (-5.12, 5.12));
        assert_eq!(c.frame_count(), 2);
        assert_eq!(c.background, None);

        assert_eq!(
            PlaybackClip::from_result(&r, &ObjectiveId::parse("custom")),
            Err(Placeholder::InvalidBounds)
        );
    }

    #[test]
    fn clip_rejects_degenerate_result_bounds() {
        let r = result(
            r#"{"best":[0,0],"best_value":0,"history":[1],"dimensions":2,
                "positions":[[[1,2]]],"bounds":[2,2]}"#,
        );
        assert_eq!(
            PlaybackClip::from_result(&r, &ObjectiveId::Sphere),
            Err(Placeholder::InvalidBounds)
        );
    }
}
