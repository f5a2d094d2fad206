use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, trace, warn};

use crate::api::{CollisionWorldApi, NarrowphaseApi};
use crate::geom::Point;
use crate::narrowphase::Narrowphase;
use crate::shape::Shape;
use crate::types::*;
use crate::DEFAULT_LAYER;

/// Collision callback. Called synchronously, in registration order.
pub type Listener = Box<dyn FnMut(&Event)>;

/// Last known state of each ordered (actor, interactor) pair.
#[derive(Debug, Default)]
pub struct PairStates {
    states: HashMap<(ShapeId, ShapeId), CollisionState>,
}

impl PairStates {
    pub fn get(&self, actor: ShapeId, interactor: ShapeId) -> Option<CollisionState> {
        self.states.get(&(actor, interactor)).copied()
    }

    /// Store `next` and return the events its edge produces.
    pub fn update(&mut self, actor: ShapeId, interactor: ShapeId, next: CollisionState) -> Vec<EventKind> {
        let previous = self.states.insert((actor, interactor), next);
        CollisionState::transition(previous, next)
    }

    /// Forget every pair involving `id`. Returns how many were dropped.
    pub fn evict(&mut self, id: ShapeId) -> usize {
        let before = self.states.len();
        self.states.retain(|&(a, b), _| a != id && b != id);
        before - self.states.len()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Subscription of one actor against one target, with its own listeners and pair states.
pub struct Watcher {
    id: String,
    actor: ShapeId,
    target: Target,
    listeners: HashMap<EventKind, Vec<Listener>>,
    pairs: PairStates,
}

impl Watcher {
    fn new(actor: ShapeId, target: Target) -> Self {
        Self {
            id: target.watcher_id(),
            actor,
            target,
            listeners: HashMap::new(),
            pairs: PairStates::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn actor(&self) -> ShapeId {
        self.actor
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn pairs(&self) -> &PairStates {
        &self.pairs
    }

    pub fn listen(&mut self, kind: EventKind, listener: Listener) {
        self.listeners.entry(kind).or_default().push(listener);
    }

    /// Drop every listener for `kind`.
    pub fn clear(&mut self, kind: EventKind) -> usize {
        self.listeners.remove(&kind).map_or(0, |l| l.len())
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    fn notify(&mut self, event: &Event) {
        if let Some(listeners) = self.listeners.get_mut(&event.kind) {
            for listener in listeners.iter_mut() {
                listener(event);
            }
        }
    }

    /// Current interactors. Layers are looked up on every call.
    fn interactors(&self, layers: &HashMap<String, BTreeSet<ShapeId>>) -> Vec<ShapeId> {
        let ids: Vec<ShapeId> = match &self.target {
            Target::Layer(name) => layers
                .get(name)
                .map(|members| members.iter().copied().collect())
                .unwrap_or_default(),
            Target::Shape(id) => vec![*id],
            Target::Shapes(ids) => ids.clone(),
        };
        ids.into_iter().filter(|&id| id != self.actor).collect()
    }

    fn run(
        &mut self,
        actor: &Shape,
        shapes: &BTreeMap<ShapeId, Shape>,
        layers: &HashMap<String, BTreeSet<ShapeId>>,
        journal: &mut EventJournal,
    ) {
        for interactor_id in self.interactors(layers) {
            let Some(interactor) = shapes.get(&interactor_id) else {
                continue;
            };
            let Some(raw) = Narrowphase::classify(actor, interactor) else {
                continue;
            };
            for kind in self.pairs.update(self.actor, interactor_id, raw.into()) {
                let event = Event {
                    kind,
                    actor: self.actor,
                    interactor: interactor_id,
                };
                debug!(actor = %event.actor, interactor = %event.interactor, event = %kind, "collision event");
                journal.record(event);
                self.notify(&event);
            }
        }
    }
}

impl core::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.id)
            .field("actor", &self.actor)
            .field("target", &self.target)
            .field("listeners", &self.listener_count())
            .field("pairs", &self.pairs.len())
            .finish()
    }
}

/// Bounded record of emitted events.
#[derive(Debug, Default)]
struct EventJournal {
    enabled: bool,
    capacity: usize,
    events: Vec<Event>,
    /// Events lost to a full journal since the last drain.
    dropped: usize,
}

impl EventJournal {
    fn record(&mut self, event: Event) {
        if !self.enabled {
            return;
        }
        if self.events.len() >= self.capacity {
            if self.dropped == 0 {
                warn!(capacity = self.capacity, "event journal full, dropping events until drained");
            }
            self.dropped += 1;
            return;
        }
        self.events.push(event);
    }

    fn drain(&mut self) -> Vec<Event> {
        if self.dropped > 0 {
            debug!(dropped = self.dropped, "event journal drained after overflow");
            self.dropped = 0;
        }
        std::mem::take(&mut self.events)
    }
}

/// Arena of shapes, their layers and their watchers.
pub struct World {
    pub cfg: WorldConfig,
    shapes: BTreeMap<ShapeId, Shape>,
    layers: HashMap<String, BTreeSet<ShapeId>>,
    watchers: BTreeMap<ShapeId, Vec<Watcher>>,
    journal: EventJournal,
}

impl World {
    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Members of `name`, in id order. Unknown layers are empty.
    pub fn layer(&self, name: &str) -> Vec<ShapeId> {
        self.layers
            .get(name)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn watchers(&self, actor: ShapeId) -> &[Watcher] {
        self.watchers.get(&actor).map(Vec::as_slice).unwrap_or(&[])
    }

    fn watcher_mut(&mut self, actor: ShapeId, target: &Target) -> Option<&mut Watcher> {
        let id = target.watcher_id();
        self.watchers.get_mut(&actor)?.iter_mut().find(|w| w.id == id)
    }

    fn run_watchers(&mut self, actor_id: ShapeId) {
        let Self {
            shapes,
            layers,
            watchers,
            journal,
            ..
        } = self;
        let Some(actor) = shapes.get(&actor_id) else {
            return;
        };
        if !actor.is_collidable() {
            return;
        }
        if let Some(list) = watchers.get_mut(&actor_id) {
            for watcher in list.iter_mut() {
                watcher.run(actor, shapes, layers, journal);
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        <Self as CollisionWorldApi>::new(WorldConfig::default())
    }
}

impl CollisionWorldApi for World {
    fn new(cfg: WorldConfig) -> Self {
        let mut layers = HashMap::new();
        layers.insert(DEFAULT_LAYER.to_owned(), BTreeSet::new());
        let journal = EventJournal {
            enabled: cfg.record_events,
            capacity: cfg.max_events,
            events: Vec::new(),
            dropped: 0,
        };
        Self {
            cfg,
            shapes: BTreeMap::new(),
            layers,
            watchers: BTreeMap::new(),
            journal,
        }
    }

    fn insert(&mut self, shape: Shape) -> ShapeId {
        self.insert_into(shape, DEFAULT_LAYER)
    }

    fn insert_into(&mut self, shape: Shape, layer: &str) -> ShapeId {
        let id = shape.id();
        self.shapes.insert(id, shape);
        self.add(id, layer);
        id
    }

    fn add(&mut self, id: ShapeId, layer: &str) -> bool {
        if !self.shapes.contains_key(&id) {
            warn!(shape = %id, layer, "cannot add unknown shape to layer");
            return false;
        }
        self.layers.entry(layer.to_owned()).or_default().insert(id)
    }

    fn remove(&mut self, id: ShapeId, layer: &str) -> bool {
        self.layers
            .get_mut(layer)
            .is_some_and(|members| members.remove(&id))
    }

    fn despawn(&mut self, id: ShapeId) -> Option<Shape> {
        let shape = self.shapes.remove(&id)?;
        for members in self.layers.values_mut() {
            members.remove(&id);
        }
        let watchers = self.watchers.remove(&id).map_or(0, |w| w.len());
        let evicted: usize = self
            .watchers
            .values_mut()
            .flatten()
            .map(|w| w.pairs.evict(id))
            .sum();
        debug!(shape = %id, watchers, evicted, "despawned shape");
        Some(shape)
    }

    fn on<F>(&mut self, actor: ShapeId, kind: EventKind, target: impl Into<Target>, listener: F) -> bool
    where
        F: FnMut(&Event) + 'static,
    {
        if !self.shapes.contains_key(&actor) {
            warn!(actor = %actor, event = %kind, "subscription for a shape this world does not own");
            return false;
        }
        let target = target.into();
        let id = target.watcher_id();
        let list = self.watchers.entry(actor).or_default();
        let index = match list.iter().position(|w| w.id == id) {
            Some(index) => index,
            None => {
                debug!(actor = %actor, watcher = %id, "created watcher");
                list.push(Watcher::new(actor, target));
                list.len() - 1
            }
        };
        list[index].listen(kind, Box::new(listener));
        true
    }

    fn on_named<F>(&mut self, actor: ShapeId, event: &str, target: impl Into<Target>, listener: F) -> bool
    where
        F: FnMut(&Event) + 'static,
    {
        match event.parse::<EventKind>() {
            Ok(kind) => self.on(actor, kind, target, listener),
            Err(err) => {
                warn!(actor = %actor, %err, "ignoring subscription");
                false
            }
        }
    }

    fn off(&mut self, actor: ShapeId, kind: EventKind, target: impl Into<Target>) -> usize {
        let target = target.into();
        let removed = self.watcher_mut(actor, &target).map_or(0, |w| w.clear(kind));
        debug!(actor = %actor, event = %kind, removed, "removed listeners");
        removed
    }

    fn off_all(&mut self, actor: ShapeId) -> usize {
        let dropped = self.watchers.remove(&actor).map_or(0, |w| w.len());
        debug!(actor = %actor, dropped, "dropped watchers");
        dropped
    }

    fn run(&mut self, id: ShapeId, delta: f64) {
        let Some(shape) = self.shapes.get_mut(&id) else {
            trace!(shape = %id, "run on unknown shape");
            return;
        };
        shape.run(delta);
        self.run_watchers(id);
    }

    fn step(&mut self, delta: f64) {
        for shape in self.shapes.values_mut() {
            shape.run(delta);
        }
        let actors: Vec<ShapeId> = self.watchers.keys().copied().collect();
        for actor in actors {
            self.run_watchers(actor);
        }
    }

    fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain()
    }

    fn check(&self, actor: ShapeId, interactor: ShapeId) -> Option<CollisionState> {
        let a = self.shapes.get(&actor)?;
        let b = self.shapes.get(&interactor)?;
        Narrowphase::classify(a, b).map(CollisionState::from)
    }

    fn contains(&self, id: ShapeId, point: Point) -> bool {
        self.shapes.get(&id).is_some_and(|s| s.contains(point))
    }

    fn debug_stats(&self) -> WorldStats {
        let watchers = self.watchers.values().flatten();
        WorldStats {
            shapes: self.shapes.len(),
            layers: self.layers.len(),
            watchers: self.watchers.values().map(Vec::len).sum(),
            listeners: watchers.clone().map(Watcher::listener_count).sum(),
            tracked_pairs: watchers.map(|w| w.pairs.len()).sum(),
        }
    }
}
