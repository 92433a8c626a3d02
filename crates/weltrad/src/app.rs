use crate::catalog::{self, Reaction, ReactionKind, Worldview};
use crate::command::{Command, ControlKind, PointerAction};
use crate::config::{Config, ConfigError};
use derive_more::Display;
use kreisel::arena::{ControlArena, Handle};
use kreisel::dial::RotationDial;
use kreisel::geometry::Point;
use kreisel::gesture::{Gesture, Millis, PointerEvent, PointerTracker};
use kreisel::quadrant::{Direction, QuadrantConfig, RadialQuadrantSelector};
use kreisel::scroll::{ScrollSnapSelector, SnapOutcome};
use palette::Srgba;
use std::fmt;
use std::time::Duration;

/// Something the host view has to act on.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum Notification {
    #[display("worldview {_0}")]
    WorldviewChanged(Worldview),
    /// The reaction cross committed. The cross closes itself and the host
    /// switches to the statistics view.
    #[display("reaction {direction} {reaction}")]
    ReactionChosen {
        direction: Direction,
        reaction: ReactionKind,
    },
    #[display("thought {_0}")]
    ThoughtChanged(usize),
    #[display("scroll-to {_0}")]
    ScrollTo(f64),
}

enum Control {
    Dial(RotationDial),
    Cross(RadialQuadrantSelector<Reaction>),
    List(ScrollSnapSelector),
}

impl Control {
    fn advance(&mut self, dt: Duration) -> bool {
        match self {
            Control::Dial(dial) => dial.advance(dt),
            Control::Cross(cross) => cross.advance(dt),
            Control::List(_) => false,
        }
    }
}

/// Drives the worldview dial, the reaction cross and the thought list from
/// line commands, keeping one clock for all of them.
pub struct AppModel {
    controls: ControlArena<Control>,
    dial: Handle,
    list: Handle,
    cross: Option<Handle>,
    dial_pointer: PointerTracker,
    cross_pointer: PointerTracker,
    quadrant: QuadrantConfig,
    reactions: Vec<Reaction>,
    now: Millis,
}

impl AppModel {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let initial = config
            .initial_worldview
            .map_or(0, |w| w.as_index());
        let dial = RotationDial::new(config.dial_config(), initial)?;
        let list = ScrollSnapSelector::new(config.scroll_config(), 0)?;
        let quadrant = config.quadrant_config();
        let reactions = config.reactions()?;
        RadialQuadrantSelector::new(quadrant, reactions.clone())?;

        let mut controls = ControlArena::new();
        let dial = controls.attach(Control::Dial(dial));
        let list = controls.attach(Control::List(list));

        Ok(Self {
            controls,
            dial,
            list,
            cross: None,
            dial_pointer: PointerTracker::new(),
            cross_pointer: PointerTracker::new(),
            quadrant,
            reactions,
            now: Millis(0),
        })
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn worldview(&self) -> Option<Worldview> {
        self.dial_ref()
            .and_then(|d| Worldview::from_index(d.committed_index()))
    }

    pub fn dial_rotation_degrees(&self) -> f64 {
        self.dial_ref().map_or(0.0, RotationDial::rotation_degrees)
    }

    pub fn cross_visible(&self) -> bool {
        self.cross.is_some()
    }

    pub fn cross_offset(&self) -> Point {
        self.cross_ref().map_or(Point::ORIGIN, |c| c.offset())
    }

    pub fn indicator_color(&self) -> Srgba<f64> {
        let indicator = self.cross_ref().map_or(-1, |c| c.indicator());
        catalog::indicator_color(&self.reactions, indicator)
    }

    pub fn list_offset(&self) -> f64 {
        self.list_ref().map_or(0.0, ScrollSnapSelector::offset)
    }

    pub fn selected_thought(&self) -> Option<usize> {
        self.list_ref().and_then(ScrollSnapSelector::selected)
    }

    pub fn is_animating(&self) -> bool {
        self.dial_ref().is_some_and(|d| d.animation().is_animating())
            || self.cross_ref().is_some_and(|c| c.animation().is_animating())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            now: self.now,
            worldview: self.worldview(),
            rotation_degrees: self.dial_rotation_degrees(),
            cross_visible: self.cross_visible(),
            cross_offset: self.cross_offset(),
            thought: self.selected_thought(),
            list_offset: self.list_offset(),
        }
    }

    pub fn apply(&mut self, command: Command) -> Vec<Notification> {
        log::debug!("{:?}", command);
        match command {
            Command::Pointer {
                control,
                action,
                at,
                t,
            } => {
                let t = self.stamp(t);
                let event = match action {
                    PointerAction::Down => PointerEvent::Down(at, t),
                    PointerAction::Move => PointerEvent::Move(at, t),
                    PointerAction::Up => PointerEvent::Up(at, t),
                };
                match control {
                    ControlKind::Dial => self.dial_pointer(event),
                    ControlKind::Cross => self.cross_pointer(event),
                    ControlKind::Scroll => Vec::new(),
                }
            }
            Command::SelectWorldview(index) => {
                if let Some(dial) = self.dial_mut() {
                    dial.set_external_index(index);
                }
                Vec::new()
            }
            Command::ShowCross => {
                self.show_cross();
                Vec::new()
            }
            Command::HideCross => {
                self.hide_cross();
                Vec::new()
            }
            Command::ScrollBegin => {
                if let Some(list) = self.list_mut() {
                    list.begin_drag();
                }
                Vec::new()
            }
            Command::ScrollOffset(offset) => {
                if let Some(list) = self.list_mut() {
                    list.on_scroll(offset);
                }
                Vec::new()
            }
            Command::ScrollRelease(t) => self.scroll(t, |list, now| list.on_drag_end(now)),
            Command::ScrollSettle(t) => self.scroll(t, |list, now| list.on_momentum_end(now)),
            Command::ScrollPress(index, t) => {
                self.scroll(t, |list, now| list.press_item(index, now))
            }
            Command::ScrollGoto(index, t) => self.scroll(t, |list, now| SnapOutcome {
                scroll_to: list.scroll_to_index(index, now),
                changed: None,
            }),
            Command::ScrollItems(count, t) => {
                self.scroll(t, |list, now| list.set_item_count(count, now))
            }
            Command::Frame(ms) => {
                self.now = self.now.saturating_add(ms);
                let dt = Duration::from_millis(ms.into());
                for (_, control) in self.controls.iter_mut() {
                    control.advance(dt);
                }
                Vec::new()
            }
        }
    }

    /// Rebuilds the controls from a new configuration while keeping the
    /// committed worldview and the thought selection.
    pub fn reload(&mut self, config: &Config) -> Result<(), ConfigError> {
        let committed = self.dial_ref().map_or(0, RotationDial::committed_index);
        let dial = RotationDial::new(config.dial_config(), committed)?;
        let item_count = self.list_ref().map_or(0, ScrollSnapSelector::item_count);
        let selected = self.selected_thought();
        let mut list = ScrollSnapSelector::new(config.scroll_config(), item_count)?;
        if let Some(index) = selected {
            list.scroll_to_index(index, self.now);
        }
        let quadrant = config.quadrant_config();
        let reactions = config.reactions()?;
        RadialQuadrantSelector::new(quadrant, reactions.clone())?;

        self.controls.detach(self.dial);
        self.controls.detach(self.list);
        self.dial = self.controls.attach(Control::Dial(dial));
        self.list = self.controls.attach(Control::List(list));
        self.quadrant = quadrant;
        self.reactions = reactions;
        self.dial_pointer = PointerTracker::new();
        if self.cross.is_some() {
            self.hide_cross();
        }
        Ok(())
    }

    fn stamp(&mut self, t: Option<Millis>) -> Millis {
        if let Some(t) = t {
            self.now = self.now.max(t);
        }
        self.now
    }

    fn dial_pointer(&mut self, event: PointerEvent) -> Vec<Notification> {
        let gestures = self.dial_pointer.handle(event);
        let Some(dial) = self.dial_mut() else {
            return Vec::new();
        };

        let mut changed = None;
        for gesture in gestures {
            match gesture {
                Gesture::DragStart { origin, .. } => dial.begin_drag(origin),
                Gesture::DragMove(sample) => dial.update_drag(&sample),
                Gesture::DragEnd(sample) => changed = dial.end_drag(sample.t).or(changed),
                Gesture::Tap { at, t } => {
                    changed = dial.position_at(at).and_then(|i| dial.tap(i, t)).or(changed)
                }
            }
        }

        changed
            .and_then(Worldview::from_index)
            .map(|w| {
                log::info!("Worldview changed to {}", w);
                vec![Notification::WorldviewChanged(w)]
            })
            .unwrap_or_default()
    }

    fn cross_pointer(&mut self, event: PointerEvent) -> Vec<Notification> {
        let Some(handle) = self.cross else {
            return Vec::new();
        };
        let gestures = self.cross_pointer.handle(event);
        let Some(Control::Cross(cross)) = self.controls.get_mut(handle) else {
            return Vec::new();
        };

        let mut commit = None;
        for gesture in gestures {
            match gesture {
                Gesture::DragStart { .. } => {}
                Gesture::DragMove(sample) => cross.update_drag(sample.dx, sample.dy),
                Gesture::DragEnd(sample) => {
                    cross.update_drag(sample.dx, sample.dy);
                    commit = cross.end_drag();
                }
                Gesture::Tap { .. } => commit = cross.end_drag(),
            }
        }

        let Some(commit) = commit else {
            return Vec::new();
        };
        log::info!(
            "Reaction {} chosen ({})",
            commit.outcome.kind,
            commit.direction
        );
        self.hide_cross();
        vec![Notification::ReactionChosen {
            direction: commit.direction,
            reaction: commit.outcome.kind,
        }]
    }

    fn scroll(
        &mut self,
        t: Option<Millis>,
        f: impl FnOnce(&mut ScrollSnapSelector, Millis) -> SnapOutcome,
    ) -> Vec<Notification> {
        let now = self.stamp(t);
        let Some(list) = self.list_mut() else {
            return Vec::new();
        };
        let outcome = f(list, now);

        let mut notifications = Vec::new();
        if let Some(y) = outcome.scroll_to {
            notifications.push(Notification::ScrollTo(y));
        }
        if let Some(index) = outcome.changed {
            log::info!("Thought {} selected", index);
            notifications.push(Notification::ThoughtChanged(index));
        }
        notifications
    }

    fn show_cross(&mut self) {
        if self.cross.is_some() {
            return;
        }
        match RadialQuadrantSelector::new(self.quadrant, self.reactions.clone()) {
            Ok(cross) => {
                self.cross = Some(self.controls.attach(Control::Cross(cross)));
                self.cross_pointer = PointerTracker::new();
                log::debug!(
                    "Reaction cross opened, {} controls mounted",
                    self.controls.mounted()
                );
            }
            Err(e) => log::error!("Failed to open reaction cross: {}", e),
        }
    }

    fn hide_cross(&mut self) {
        if let Some(handle) = self.cross.take() {
            self.controls.detach(handle);
            log::debug!(
                "Reaction cross closed, {} controls mounted",
                self.controls.mounted()
            );
        }
    }

    fn dial_ref(&self) -> Option<&RotationDial> {
        match self.controls.get(self.dial) {
            Some(Control::Dial(dial)) => Some(dial),
            _ => None,
        }
    }

    fn dial_mut(&mut self) -> Option<&mut RotationDial> {
        match self.controls.get_mut(self.dial) {
            Some(Control::Dial(dial)) => Some(dial),
            _ => None,
        }
    }

    fn cross_ref(&self) -> Option<&RadialQuadrantSelector<Reaction>> {
        match self.controls.get(self.cross?) {
            Some(Control::Cross(cross)) => Some(cross),
            _ => None,
        }
    }

    fn list_ref(&self) -> Option<&ScrollSnapSelector> {
        match self.controls.get(self.list) {
            Some(Control::List(list)) => Some(list),
            _ => None,
        }
    }

    fn list_mut(&mut self) -> Option<&mut ScrollSnapSelector> {
        match self.controls.get_mut(self.list) {
            Some(Control::List(list)) => Some(list),
            _ => None,
        }
    }
}

/// Final state printed after a replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub now: Millis,
    pub worldview: Option<Worldview>,
    pub rotation_degrees: f64,
    pub cross_visible: bool,
    pub cross_offset: Point,
    pub thought: Option<usize>,
    pub list_offset: f64,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "clock: {}", self.now)?;
        match self.worldview {
            Some(w) => writeln!(f, "worldview: {} ({:.1}°)", w, self.rotation_degrees)?,
            None => writeln!(f, "worldview: none ({:.1}°)", self.rotation_degrees)?,
        }
        if self.cross_visible {
            writeln!(
                f,
                "cross: open at ({:.1}, {:.1})",
                self.cross_offset.x, self.cross_offset.y
            )?;
        } else {
            writeln!(f, "cross: closed")?;
        }
        match self.thought {
            Some(i) => write!(f, "thought: {} at {:.1}", i, self.list_offset),
            None => write!(f, "thought: none at {:.1}", self.list_offset),
        }
    }
}
