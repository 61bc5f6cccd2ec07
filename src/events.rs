use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use crate::error::MindMapError;
use crate::layout::{Link, PositionedNode};
use crate::view::ViewTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Updated,
    Zoom,
    NodeClick,
    NodeDoubleClick,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Zoom => "zoom",
            Self::NodeClick => "nodeClick",
            Self::NodeDoubleClick => "nodeDoubleClick",
        }
    }
}

impl FromStr for EventKind {
    type Err = MindMapError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "updated" => Ok(Self::Updated),
            "zoom" => Ok(Self::Zoom),
            "nodeClick" => Ok(Self::NodeClick),
            "nodeDoubleClick" => Ok(Self::NodeDoubleClick),
            other => Err(MindMapError::UnknownEvent(other.to_string())),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MindMapEvent {
    Updated {
        nodes: Vec<PositionedNode>,
        links: Vec<Link>,
    },
    Zoom(ViewTransform),
    NodeClick(PositionedNode),
    NodeDoubleClick(PositionedNode),
}

impl MindMapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Updated { .. } => EventKind::Updated,
            Self::Zoom(_) => EventKind::Zoom,
            Self::NodeClick(_) => EventKind::NodeClick,
            Self::NodeDoubleClick(_) => EventKind::NodeDoubleClick,
        }
    }
}

pub type Listener = Box<dyn FnMut(&MindMapEvent)>;

/// Named-event register.
///
/// `emit` only queues; the owner drains the queue with `take_pending` and hands
/// each event to `notify` once its own reactions have run. Listener failures are
/// not caught.
#[derive(Default)]
pub struct EventBus {
    listeners: BTreeMap<EventKind, Vec<Listener>>,
    pending: VecDeque<MindMapEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&MindMapEvent) + 'static) {
        self.listeners
            .entry(kind)
            .or_default()
            .push(Box::new(listener));
    }

    pub fn emit(&mut self, event: MindMapEvent) {
        self.pending.push_back(event);
    }

    pub fn take_pending(&mut self) -> Vec<MindMapEvent> {
        self.pending.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Calls every listener registered for the event's kind, in subscription order.
    pub fn notify(&mut self, event: &MindMapEvent) {
        if let Some(listeners) = self.listeners.get_mut(&event.kind()) {
            for listener in listeners.iter_mut() {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map(Vec::len).unwrap_or(0)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(kind, listeners)| (kind.as_str(), listeners.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .field("pending", &self.pending.len())
            .finish()
    }
}
