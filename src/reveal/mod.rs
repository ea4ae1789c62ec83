//! Revealing a line on an editing surface.
//!
//! A reveal request becomes a small per-surface pipeline:
//!
//! 1. wait until the host reports the surface ready, polling on a fixed
//!    interval and giving up after `ready_timeout_ms`
//! 2. resolve the target line against the live text
//! 3. scroll the line into view, then either
//!    - wait `settle_ms`, place the cursor and select the whole line, or
//!    - mark the line and clear the marker after `duration_ms`
//!
//! Nothing blocks. Every wait is a deadline checked by
//! [`RevealCoordinator::tick`], and time comes from an injected [`Clock`],
//! so tests drive the pipeline with a [`ManualClock`]. Only one pipeline
//! exists per surface; a new request replaces the old one and removes any
//! marker it left behind.

mod clock;
mod pipeline;


use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use clock::{Clock, ManualClock, SystemClock};
pub use pipeline::Stage;

use crate::editor::{EditingSurface, SurfaceHost, SurfaceId, SurfaceStatus};
use crate::source_map::LineSpace;
use crate::task::TaskDescriptor;
use pipeline::{Pipeline, Step};

/// How a target line is shown once the surface is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Scroll, let the scroll settle, then select the whole line.
    SelectAndScroll,
    /// Scroll and mark the line, clearing the marker after `duration_ms`.
    TimedHighlight { duration_ms: u64 },
}

/// What to reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealTarget {
    /// A line index already in the surface's numbering.
    Line(usize),
    /// A task located in the surface's text once it is ready. Indexes found
    /// in rendered space are adjusted for the surface's editing mode.
    Task {
        task: TaskDescriptor,
        space: LineSpace,
    },
}

/// Delays used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    /// Dwell between scrolling and selecting.
    pub settle_ms: u64,
    /// Interval between readiness polls.
    pub poll_interval_ms: u64,
    /// Give up waiting for the surface after this long; `None` polls forever.
    pub ready_timeout_ms: Option<u64>,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            settle_ms: 350,
            poll_interval_ms: 100,
            ready_timeout_ms: Some(5_000),
        }
    }
}

/// Observable progress of a reveal pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RevealEvent {
    /// The line was scrolled into view; selection follows after settling.
    Scrolled { surface: SurfaceId, line: usize },
    /// Cursor placed and the whole line selected.
    Selected { surface: SurfaceId, line: usize },
    /// Marker applied.
    Highlighted { surface: SurfaceId, line: usize },
    /// Marker removed, by its timer or by a newer request.
    Cleared { surface: SurfaceId, line: usize },
    /// A newer request replaced this surface's pipeline.
    Superseded { surface: SurfaceId },
    /// The task is not in the surface's text; nothing was touched.
    TaskNotFound { surface: SurfaceId },
    /// The surface stayed unready past the timeout.
    GaveUp { surface: SurfaceId },
    /// The surface or line went away mid-reveal.
    Stale { surface: SurfaceId },
}

/// Line a sequence of events left selected or highlighted.
///
/// Scrolling alone does not count. A later `Stale`, `GaveUp`, `TaskNotFound`
/// or `Superseded` event cancels an earlier landing.
pub fn landed_line(events: &[RevealEvent]) -> Option<usize> {
    events.iter().fold(None, |landed, event| match *event {
        RevealEvent::Selected { line, .. } | RevealEvent::Highlighted { line, .. } => Some(line),
        RevealEvent::Stale { .. }
        | RevealEvent::GaveUp { .. }
        | RevealEvent::TaskNotFound { .. }
        | RevealEvent::Superseded { .. } => None,
        RevealEvent::Scrolled { .. } | RevealEvent::Cleared { .. } => landed,
    })
}

/// Owns every in-flight reveal, one per surface.
#[derive(Debug)]
pub struct RevealCoordinator<C: Clock = SystemClock> {
    clock: C,
    timing: RevealTiming,
    pipelines: HashMap<SurfaceId, Pipeline>,
}

impl RevealCoordinator<SystemClock> {
    /// A coordinator running on wall-clock time.
    pub fn with_system_clock(timing: RevealTiming) -> Self {
        Self::new(SystemClock::new(), timing)
    }
}

impl<C: Clock> RevealCoordinator<C> {
    pub fn new(clock: C, timing: RevealTiming) -> Self {
        Self {
            clock,
            timing,
            pipelines: HashMap::new(),
        }
    }

    /// Start revealing `target` on `surface`, replacing any reveal already
    /// in flight there.
    ///
    /// Runs as far as it can right away: a ready surface is scrolled (and
    /// highlighted) before this returns.
    pub fn reveal<H: SurfaceHost>(
        &mut self,
        host: &mut H,
        surface: SurfaceId,
        target: RevealTarget,
        strategy: Strategy,
    ) -> Vec<RevealEvent> {
        let now = self.clock.now_ms();
        let mut events = Vec::new();

        if let Some(previous) = self.pipelines.remove(&surface) {
            tracing::debug!(surface, stage = ?previous.stage(), "superseding reveal");
            if let Some(line) = previous.marked_line()
                && let SurfaceStatus::Ready(editor) = host.surface(surface)
            {
                editor.remove_line_marker(line);
                events.push(RevealEvent::Cleared { surface, line });
            }
            events.push(RevealEvent::Superseded { surface });
        }

        self.pipelines
            .insert(surface, Pipeline::new(surface, target, strategy, now));
        self.advance(host, surface, now, &mut events);
        events
    }

    /// Advance every pipeline whose deadline has passed.
    pub fn tick<H: SurfaceHost>(&mut self, host: &mut H) -> Vec<RevealEvent> {
        let now = self.clock.now_ms();
        let mut due: Vec<SurfaceId> = self
            .pipelines
            .iter()
            .filter(|(_, pipeline)| pipeline.deadline_ms() <= now)
            .map(|(id, _)| *id)
            .collect();
        due.sort_unstable();

        let mut events = Vec::new();
        for surface in due {
            self.advance(host, surface, now, &mut events);
        }
        events
    }

    /// Earliest deadline among pending pipelines.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pipelines.values().map(Pipeline::deadline_ms).min()
    }

    /// Whether any reveal is still in flight.
    pub fn is_idle(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Stage of the reveal in flight on `surface`.
    pub fn stage(&self, surface: SurfaceId) -> Option<Stage> {
        self.pipelines.get(&surface).map(Pipeline::stage)
    }

    /// Number of highlight-clear timers pending for `surface`.
    pub fn pending_highlights(&self, surface: SurfaceId) -> usize {
        self.pipelines
            .get(&surface)
            .filter(|pipeline| pipeline.marked_line().is_some())
            .map_or(0, |_| 1)
    }

    /// Drop the reveal in flight on `surface`, removing its marker.
    pub fn cancel<H: SurfaceHost>(&mut self, host: &mut H, surface: SurfaceId) -> bool {
        let Some(pipeline) = self.pipelines.remove(&surface) else {
            return false;
        };
        if let Some(line) = pipeline.marked_line()
            && let SurfaceStatus::Ready(editor) = host.surface(surface)
        {
            editor.remove_line_marker(line);
        }
        true
    }

    /// Tick until every pipeline has finished, calling `sleep` to wait for
    /// the next deadline.
    ///
    /// With `ready_timeout_ms` set to `None` and a surface that never loads
    /// this does not return.
    pub fn run_until_idle<H, F>(&mut self, host: &mut H, mut sleep: F) -> Vec<RevealEvent>
    where
        H: SurfaceHost,
        F: FnMut(Duration),
    {
        let mut events = Vec::new();
        while let Some(deadline) = self.next_deadline() {
            let now = self.clock.now_ms();
            if deadline > now {
                sleep(Duration::from_millis(deadline - now));
            }
            events.extend(self.tick(host));
        }
        events
    }

    fn advance<H: SurfaceHost>(
        &mut self,
        host: &mut H,
        surface: SurfaceId,
        now: u64,
        events: &mut Vec<RevealEvent>,
    ) {
        let Some(mut pipeline) = self.pipelines.remove(&surface) else {
            return;
        };
        loop {
            match pipeline.step(host.surface(surface), now, &self.timing) {
                Step::Wait => {
                    self.pipelines.insert(surface, pipeline);
                    return;
                }
                Step::Continue(event) => events.push(event),
                Step::Done(event) => {
                    events.push(event);
                    return;
                }
            }
        }
    }
}
