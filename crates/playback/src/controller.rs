use map::{Camera, MapSurface};
use model::location::{LocationPoint, LocationSequence};

use crate::task::TaskHandle;

/// Points the cursor moves per playback tick.
pub const PLAYBACK_STEP: usize = 5;
pub const LOAD_ZOOM: f64 = 4.0;
pub const LOAD_FLY_SPEED: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing to show, the surface was left alone.
    Empty,
    Loaded(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The cursor reached the last point and playback stopped.
    Finished,
    /// The handle no longer belongs to the running chain; nothing changed.
    Stale,
}

/// Owns the loaded sequence and the playback cursor and keeps the surface in
/// sync with them. The visible path is always `sequence[0..=cursor]`.
pub struct PlaybackController<S: MapSurface> {
    surface: S,
    sequence: LocationSequence,
    cursor: usize,
    playback: Option<TaskHandle>,
    last_task_id: u64,
}

impl<S: MapSurface> PlaybackController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            sequence: LocationSequence::default(),
            cursor: 0,
            playback: None,
            last_task_id: 0,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn sequence(&self) -> &LocationSequence {
        &self.sequence
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some()
    }

    /// Replaces the sequence and shows all of it.
    pub fn load(&mut self, points: Vec<LocationPoint>) -> LoadOutcome {
        self.stop();
        self.sequence = LocationSequence::new(points);
        let Some(last) = self.sequence.last_index() else {
            self.cursor = 0;
            return LoadOutcome::Empty;
        };
        self.cursor = last;
        self.render();

        if let Some(point) = self.sequence.last() {
            let camera = Camera::new(point.coordinate(), LOAD_ZOOM).with_speed(LOAD_FLY_SPEED);
            self.surface.fly_to(camera);
        }
        LoadOutcome::Loaded(self.sequence.len())
    }

    /// Manual cursor move. Cancels a running playback.
    pub fn set_cursor(&mut self, index: i64) {
        self.stop();
        let Some(last) = self.sequence.last_index() else {
            return;
        };
        self.cursor = index.clamp(0, last as i64) as usize;
        self.render();
    }

    /// Starts a new advance chain, rewinding first if the whole path is
    /// already shown. Any previous chain is invalidated.
    pub fn play(&mut self) -> Option<TaskHandle> {
        let last = self.sequence.last_index()?;
        self.stop();
        if self.cursor >= last {
            self.cursor = 0;
            self.render();
        }

        self.last_task_id += 1;
        let handle = TaskHandle::new(self.last_task_id);
        self.playback = Some(handle.clone());
        log::debug!("playback {} started at {}", handle.id(), self.cursor);
        Some(handle)
    }

    /// One playback tick.
    pub fn advance(&mut self, handle: &TaskHandle) -> Step {
        let current = match &self.playback {
            Some(current) if current == handle && !current.is_cancelled() => current,
            _ => {
                log::trace!("ignoring tick of playback {}", handle.id());
                return Step::Stale;
            }
        };
        let id = current.id();
        let Some(last) = self.sequence.last_index() else {
            self.stop();
            return Step::Stale;
        };

        self.cursor = (self.cursor + PLAYBACK_STEP).min(last);
        self.render();

        if self.cursor == last {
            self.stop();
            log::debug!("playback {} finished", id);
            Step::Finished
        } else {
            Step::Continue
        }
    }

    pub fn pause(&mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.playback.take() {
            handle.cancel();
        }
    }

    fn render(&mut self) {
        let Some(point) = self.sequence.get(self.cursor) else {
            return;
        };
        let timestamp = point.timestamp;
        let path = self.sequence.path(self.cursor);
        self.surface.draw_path(&path);
        self.surface.set_date_label(&timestamp);
    }
}
