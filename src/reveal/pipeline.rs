use crate::editor::{EditingSurface, Position, SurfaceId, SurfaceStatus};
use crate::source_map::{LineSpace, adjust};
use crate::task::document_lines;

use super::{RevealEvent, RevealTarget, RevealTiming, Strategy};

/// Where an in-flight reveal is, and the deadline it is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Polling until the surface can be edited.
    AwaitingSurface { next_poll_ms: u64 },
    /// Scrolled; waiting for the scroll to settle before selecting.
    Settling { line: usize, until_ms: u64 },
    /// Marker applied; waiting to clear it.
    Highlighting { line: usize, clear_at_ms: u64 },
}

pub(super) enum Step {
    /// Deadline not reached; keep the pipeline.
    Wait,
    /// Moved to a new stage; step again.
    Continue(RevealEvent),
    /// Pipeline finished.
    Done(RevealEvent),
}

#[derive(Debug, Clone)]
pub(super) struct Pipeline {
    surface: SurfaceId,
    target: RevealTarget,
    strategy: Strategy,
    started_ms: u64,
    stage: Stage,
}

impl Pipeline {
    pub(super) fn new(
        surface: SurfaceId,
        target: RevealTarget,
        strategy: Strategy,
        now_ms: u64,
    ) -> Self {
        Self {
            surface,
            target,
            strategy,
            started_ms: now_ms,
            stage: Stage::AwaitingSurface {
                next_poll_ms: now_ms,
            },
        }
    }

    pub(super) const fn stage(&self) -> Stage {
        self.stage
    }

    pub(super) const fn deadline_ms(&self) -> u64 {
        match self.stage {
            Stage::AwaitingSurface { next_poll_ms } => next_poll_ms,
            Stage::Settling { until_ms, .. } => until_ms,
            Stage::Highlighting { clear_at_ms, .. } => clear_at_ms,
        }
    }

    /// Line currently carrying this pipeline's marker.
    pub(super) const fn marked_line(&self) -> Option<usize> {
        match self.stage {
            Stage::Highlighting { line, .. } => Some(line),
            _ => None,
        }
    }

    pub(super) fn step<S: EditingSurface + ?Sized>(
        &mut self,
        status: SurfaceStatus<'_, S>,
        now_ms: u64,
        timing: &RevealTiming,
    ) -> Step {
        let surface_id = self.surface;
        if now_ms < self.deadline_ms() {
            return Step::Wait;
        }

        let stage = self.stage;
        match stage {
            Stage::AwaitingSurface { .. } => match status {
                SurfaceStatus::Gone => Step::Done(RevealEvent::Stale {
                    surface: surface_id,
                }),
                SurfaceStatus::Loading => {
                    if let Some(limit) = timing.ready_timeout_ms
                        && now_ms.saturating_sub(self.started_ms) >= limit
                    {
                        tracing::warn!(
                            surface = surface_id,
                            waited_ms = now_ms.saturating_sub(self.started_ms),
                            "editing surface never became ready, giving up"
                        );
                        return Step::Done(RevealEvent::GaveUp {
                            surface: surface_id,
                        });
                    }
                    tracing::trace!(surface = surface_id, "surface still loading");
                    self.stage = Stage::AwaitingSurface {
                        next_poll_ms: now_ms.saturating_add(timing.poll_interval_ms.max(1)),
                    };
                    Step::Wait
                }
                SurfaceStatus::Ready(surface) => self.begin(surface, now_ms, timing),
            },
            Stage::Settling { line, .. } => {
                let SurfaceStatus::Ready(surface) = status else {
                    return self.stale();
                };
                // Re-read the line now, its length may have changed while scrolling
                let Some(text) = surface.line(line) else {
                    return self.stale();
                };
                surface.set_cursor(Position::at(line, 0));
                surface.set_selection(Position::at(line, 0), Position::at(line, text.len()));
                tracing::trace!(surface = surface_id, line, "selected line");
                Step::Done(RevealEvent::Selected {
                    surface: surface_id,
                    line,
                })
            }
            Stage::Highlighting { line, .. } => {
                let SurfaceStatus::Ready(surface) = status else {
                    return self.stale();
                };
                surface.remove_line_marker(line);
                Step::Done(RevealEvent::Cleared {
                    surface: surface_id,
                    line,
                })
            }
        }
    }

    fn begin<S: EditingSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        now_ms: u64,
        timing: &RevealTiming,
    ) -> Step {
        let surface_id = self.surface;
        let Some(line) = resolve_line(&self.target, surface) else {
            tracing::debug!(surface = surface_id, "task not found, nothing to reveal");
            return Step::Done(RevealEvent::TaskNotFound {
                surface: surface_id,
            });
        };

        if surface.line(line).is_none() {
            return self.stale();
        }

        surface.scroll_into_view(line..line.saturating_add(1));
        match self.strategy {
            Strategy::SelectAndScroll => {
                self.stage = Stage::Settling {
                    line,
                    until_ms: now_ms.saturating_add(timing.settle_ms),
                };
                Step::Continue(RevealEvent::Scrolled {
                    surface: surface_id,
                    line,
                })
            }
            Strategy::TimedHighlight { duration_ms } => {
                surface.add_line_marker(line);
                self.stage = Stage::Highlighting {
                    line,
                    clear_at_ms: now_ms.saturating_add(duration_ms),
                };
                Step::Continue(RevealEvent::Highlighted {
                    surface: surface_id,
                    line,
                })
            }
        }
    }

    fn stale(&self) -> Step {
        tracing::debug!(surface = self.surface, "reveal target went away");
        Step::Done(RevealEvent::Stale {
            surface: self.surface,
        })
    }
}

/// Resolve a target against the live text of a surface.
fn resolve_line<S: EditingSurface + ?Sized>(target: &RevealTarget, surface: &S) -> Option<usize> {
    match target {
        RevealTarget::Line(line) => Some(*line),
        RevealTarget::Task { task, space } => {
            let text = surface.text();
            let lines = document_lines(&text);
            let found = task.locate(&lines)?;
            Some(match space {
                LineSpace::Rendered => adjust(found, surface.mode(), &lines),
                LineSpace::Source => found,
            })
        }
    }
}
