//! Channel assignment
//!
//! Treats channel selection as online graph coloring: rooms closer than
//! `min_separation` must not share a channel.
//!
//! # Modes
//!
//! - **Static**: one greedy pass over every room, most conflicted first.
//!   Results are written immediately.
//! - **Dynamic**: driven by the observer. Rooms near the observer are
//!   re-colored first, rooms at the border only change on collision and
//!   far rooms only receive a channel when they have none. Writes are
//!   rate limited per room.
//!
//! The dynamic heuristics are greedy and local; they avoid visible channel
//! swaps near the observer but do not guarantee a minimal coloring.

use std::collections::HashMap;

use crate::core::ChannelConfig;
use crate::foundation::math::Vec3;
use crate::render::{RenderCommand, RenderCommandBatch};
use crate::scene::{Cell, CellRegistry, NodeHandle, SceneHost};
use super::{ChannelPalette, ConflictGraph, UNASSIGNED};

/// Shortest allowed cooldown between two writes for one room
pub const MIN_COOLDOWN_SECONDS: f32 = 0.01;

/// Parameters of one assignment call
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentInput {
    /// Rooms closer than this conflict
    pub min_separation: f32,
    /// Multiple of `min_separation` inside which rooms are proximate
    pub proximity_factor: f32,
    /// Include inactive nodes when collecting rooms
    pub include_inactive: bool,
    /// Observer position; `None` selects static mode
    pub observer: Option<Vec3>,
    /// Inner classification radius
    pub radius_in: f32,
    /// Outer classification radius
    pub radius_out: f32,
    /// Minimum observer displacement between dynamic recomputes
    pub move_gate: f32,
    /// Minimum seconds between two writes for one room
    pub cooldown_seconds: f32,
    /// Current time in seconds
    pub now: f64,
}

impl AssignmentInput {
    /// Static-mode input from a channel configuration
    pub fn from_config(config: &ChannelConfig) -> Self {
        Self {
            min_separation: config.min_separation,
            proximity_factor: config.proximity_factor,
            include_inactive: config.include_inactive_children,
            observer: None,
            radius_in: config.radius_in,
            radius_out: config.radius_out.max(config.radius_in),
            move_gate: config.move_gate,
            cooldown_seconds: config.cooldown_seconds,
            now: 0.0,
        }
    }

    /// Switch to dynamic mode around `observer` at time `now`
    pub fn with_observer(mut self, observer: Vec3, now: f64) -> Self {
        self.observer = Some(observer);
        self.now = now;
        self
    }

    /// Whether this input runs the observer-driven pass
    pub fn is_dynamic(&self) -> bool {
        self.observer.is_some() && self.radius_in > 0.0
    }
}

/// Why an assignment call did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The root has no rooms
    NoCells,
    /// The observer has not moved past the move gate
    BelowMoveGate,
    /// The tick interval has not elapsed
    NotDue,
    /// Dynamic mode is switched off in the configuration
    DynamicModeDisabled,
}

/// Result of an assignment call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// A pass ran and wrote `writes` rooms
    Applied {
        /// Rooms whose channel was written
        writes: usize,
    },
    /// No pass ran
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Inside,
    Border,
    Outside,
}

/// Assigns channels to rooms and keeps the applied state across calls
#[derive(Debug, Default)]
pub struct ChannelAssignmentEngine {
    palette: ChannelPalette,
    registry: CellRegistry,
    graph: ConflictGraph,
    current: HashMap<NodeHandle, u32>,
    cooldown_until: HashMap<NodeHandle, f64>,
    last_observer: Option<Vec3>,
}

impl ChannelAssignmentEngine {
    /// Create an engine handing out channels from `palette`
    pub fn new(palette: ChannelPalette) -> Self {
        Self {
            palette,
            ..Self::default()
        }
    }

    /// Run one assignment pass over the rooms under `root`
    pub fn assign(
        &mut self,
        host: &dyn SceneHost,
        root: NodeHandle,
        input: &AssignmentInput,
        out: &mut RenderCommandBatch,
    ) -> AssignOutcome {
        let dynamic_observer = input.observer.filter(|_| input.is_dynamic());

        if let (Some(observer), Some(last)) = (dynamic_observer, self.last_observer) {
            let gate = input.move_gate.max(0.0);
            if (observer - last).norm_squared() < gate * gate {
                return AssignOutcome::Skipped(SkipReason::BelowMoveGate);
            }
        }

        self.registry.rebuild(host, root, input.include_inactive);
        if self.registry.is_empty() {
            return AssignOutcome::Skipped(SkipReason::NoCells);
        }
        let bounds = self.registry.iter().map(Cell::bounds).collect();
        self.graph = ConflictGraph::build(bounds, input.min_separation, input.proximity_factor);

        let writes = match dynamic_observer {
            Some(observer) => self.assign_dynamic(host, observer, input, out),
            None => self.assign_static(host, out),
        };
        AssignOutcome::Applied { writes }
    }

    /// Channel last written for a room, or [`UNASSIGNED`]
    pub fn current_channel(&self, room: NodeHandle) -> u32 {
        self.current.get(&room).copied().unwrap_or(UNASSIGNED)
    }

    /// Palette position of a channel mask
    pub fn channel_index(&self, mask: u32) -> Option<u32> {
        self.palette.index_of(mask)
    }

    /// Channel palette in use
    pub fn palette(&self) -> &ChannelPalette {
        &self.palette
    }

    /// Rooms seen by the last call
    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    /// Conflict graph of the last call
    pub fn graph(&self) -> &ConflictGraph {
        &self.graph
    }

    fn assign_static(&mut self, host: &dyn SceneHost, out: &mut RenderCommandBatch) -> usize {
        let mut assigned = vec![UNASSIGNED; self.graph.len()];
        for index in self.graph.order_by_degree() {
            let banned = self.neighbor_channels(index, &assigned);
            assigned[index] = self.palette.choose(banned, UNASSIGNED);
        }

        let mut writes = 0;
        for (cell, &mask) in self.registry.iter().zip(&assigned) {
            write_channel(cell, mask, host, out);
            self.current.insert(cell.anchor(), mask);
            writes += 1;
        }

        log::debug!(
            "ChannelAssignmentEngine: static pass over {} rooms, {} unassigned",
            assigned.len(),
            assigned.iter().filter(|mask| **mask == UNASSIGNED).count()
        );
        writes
    }

    fn assign_dynamic(
        &mut self,
        host: &dyn SceneHost,
        observer: Vec3,
        input: &AssignmentInput,
        out: &mut RenderCommandBatch,
    ) -> usize {
        let radius_out = input.radius_out.max(input.radius_in);
        let zones: Vec<Zone> = self
            .registry
            .iter()
            .map(|cell| {
                let distance = cell.bounds().distance_to_point(observer);
                if distance <= input.radius_in {
                    Zone::Inside
                } else if distance <= radius_out {
                    Zone::Border
                } else {
                    Zone::Outside
                }
            })
            .collect();
        let inside: Vec<usize> = (0..zones.len()).filter(|i| zones[*i] == Zone::Inside).collect();

        let mut assigned = self.snapshot(host);

        for index in self.graph.order_by_degree_among(&inside) {
            let banned = self.banned_by_inside(index, &assigned, &inside);
            let used_by_others = self.palette.restrict(
                inside
                    .iter()
                    .filter(|other| **other != index)
                    .fold(0, |acc, other| acc | assigned[*other]),
            );
            let is_free = |mask: u32| banned & mask == 0 && used_by_others & mask == 0;

            let own = assigned[index];
            let prefer = if self.palette.is_allowed(own) && is_free(own) {
                own
            } else {
                self.palette.masks().find(|mask| is_free(*mask)).unwrap_or(UNASSIGNED)
            };

            let chosen = self.least_crowded(index, banned, prefer, &assigned);
            if chosen != UNASSIGNED {
                assigned[index] = chosen;
            }
        }

        for index in (0..zones.len()).filter(|i| zones[*i] == Zone::Border) {
            let keep = assigned[index];
            let collides = self
                .graph
                .neighbors(index)
                .iter()
                .any(|other| zones[*other] == Zone::Inside && assigned[*other] == keep);
            if keep != UNASSIGNED && !collides {
                continue;
            }

            let banned = self.banned_by_inside(index, &assigned, &inside);
            let chosen = self.palette.choose(banned, keep);
            assigned[index] = if chosen == UNASSIGNED { keep } else { chosen };
        }

        for index in (0..zones.len()).filter(|i| zones[*i] == Zone::Outside) {
            if assigned[index] != UNASSIGNED {
                continue;
            }
            let banned = self.neighbor_channels(index, &assigned) | self.proximate_channels(index, &assigned);
            let chosen = self.palette.choose(banned, UNASSIGNED);
            assigned[index] = if chosen == UNASSIGNED { self.palette.first() } else { chosen };
        }

        let writes = self.apply_deltas(host, &assigned, input.now, input.cooldown_seconds, out);
        self.last_observer = Some(observer);

        log::debug!(
            "ChannelAssignmentEngine: dynamic pass at {:?}, {} inside, {} writes",
            observer,
            inside.len(),
            writes
        );
        writes
    }

    /// Channels currently held by each room
    ///
    /// The last written channel wins when it is still in the palette;
    /// otherwise the most common palette channel among the room's
    /// renderables (first seen on ties).
    fn snapshot(&self, host: &dyn SceneHost) -> Vec<u32> {
        self.registry
            .iter()
            .map(|cell| {
                if let Some(&stored) = self.current.get(&cell.anchor()) {
                    if self.palette.is_allowed(stored) {
                        return stored;
                    }
                }

                // (mask, count) in first-seen renderable order
                let mut counts: Vec<(u32, usize)> = Vec::new();
                for &renderable in cell.renderables() {
                    let Some(mask) = host.renderable_channel_mask(renderable) else {
                        continue;
                    };
                    if !self.palette.is_allowed(mask) {
                        continue;
                    }
                    match counts.iter_mut().find(|(seen, _)| *seen == mask) {
                        Some((_, count)) => *count += 1,
                        None => counts.push((mask, 1)),
                    }
                }

                let mut best = (UNASSIGNED, 0);
                for (mask, count) in counts {
                    if count > best.1 {
                        best = (mask, count);
                    }
                }
                best.0
            })
            .collect()
    }

    /// Channels of conflicting rooms
    fn neighbor_channels(&self, index: usize, assigned: &[u32]) -> u32 {
        let used = self
            .graph
            .neighbors(index)
            .iter()
            .fold(0, |acc, other| acc | assigned[*other]);
        self.palette.restrict(used)
    }

    /// Channels of proximate rooms anywhere in the scene
    fn proximate_channels(&self, index: usize, assigned: &[u32]) -> u32 {
        let used = (0..assigned.len())
            .filter(|other| self.graph.is_proximate(index, *other))
            .fold(0, |acc, other| acc | assigned[other]);
        self.palette.restrict(used)
    }

    /// Channels of other inside rooms that conflict with or are proximate to `index`
    fn banned_by_inside(&self, index: usize, assigned: &[u32], inside: &[usize]) -> u32 {
        let used = inside
            .iter()
            .copied()
            .filter(|other| *other != index)
            .filter(|other| self.graph.conflicts(index, *other) || self.graph.is_proximate(index, *other))
            .fold(0, |acc, other| acc | assigned[other]);
        self.palette.restrict(used)
    }

    /// `prefer` when free, otherwise the free channel shared by the fewest proximate rooms
    fn least_crowded(&self, index: usize, banned: u32, prefer: u32, assigned: &[u32]) -> u32 {
        if self.palette.is_allowed(prefer) && banned & prefer == 0 {
            return prefer;
        }

        let mut best = UNASSIGNED;
        let mut best_score = usize::MAX;
        for mask in self.palette.masks().filter(|mask| banned & mask == 0) {
            let score = (0..assigned.len())
                .filter(|other| assigned[*other] == mask && self.graph.is_proximate(index, *other))
                .count();
            if score < best_score {
                best = mask;
                best_score = score;
                if score == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Write changed channels of rooms whose cooldown has expired
    fn apply_deltas(
        &mut self,
        host: &dyn SceneHost,
        assigned: &[u32],
        now: f64,
        cooldown_seconds: f32,
        out: &mut RenderCommandBatch,
    ) -> usize {
        let mut writes = 0;
        for (cell, &mask) in self.registry.iter().zip(assigned) {
            let room = cell.anchor();
            let old = self.current.get(&room).copied().unwrap_or(UNASSIGNED);
            if mask == UNASSIGNED || mask == old {
                continue;
            }
            if self.cooldown_until.get(&room).is_some_and(|until| now < *until) {
                continue;
            }

            write_channel(cell, mask, host, out);
            self.current.insert(room, mask);
            self.cooldown_until
                .insert(room, now + f64::from(cooldown_seconds.max(MIN_COOLDOWN_SECONDS)));
            writes += 1;
        }
        writes
    }
}

fn write_channel(cell: &Cell, mask: u32, host: &dyn SceneHost, out: &mut RenderCommandBatch) {
    for &renderable in cell.renderables() {
        if host.renderable_exists(renderable) {
            out.push(RenderCommand::SetRenderableChannel { renderable, mask });
        }
    }
    for &light in cell.lights() {
        if host.light(light).is_some() {
            out.push(RenderCommand::SetLightChannel { light, mask });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::AABB;
    use crate::render::ShadowMode;
    use crate::scene::{MemoryScene, RenderableHandle};

    const CH1: u32 = 1 << 1;
    const CH2: u32 = 1 << 2;

    /// Unit boxes along x starting at each offset; one renderable and one light per room
    fn row_of_rooms(offsets: &[f32]) -> (MemoryScene, Vec<NodeHandle>, Vec<RenderableHandle>) {
        let mut scene = MemoryScene::new();
        let root = scene.root();
        let mut rooms = Vec::new();
        let mut renderables = Vec::new();
        for &x in offsets {
            let min = Vec3::new(x, 0.0, 0.0);
            let room = scene.add_node(root, min).unwrap();
            renderables.push(scene.add_renderable(room, AABB::new(min, min + Vec3::new(1.0, 1.0, 1.0))).unwrap());
            scene.add_light(room, min, 1.0, ShadowMode::None).unwrap();
            rooms.push(room);
        }
        (scene, rooms, renderables)
    }

    fn input(min_separation: f32, proximity_factor: f32) -> AssignmentInput {
        AssignmentInput {
            min_separation,
            proximity_factor,
            include_inactive: false,
            observer: None,
            radius_in: 25.0,
            radius_out: 75.0,
            move_gate: 0.5,
            cooldown_seconds: 0.5,
            now: 0.0,
        }
    }

    #[test]
    fn test_static_line_of_three() {
        let (mut scene, rooms, _) = row_of_rooms(&[0.0, 3.0, 6.0]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();

        let outcome = engine.assign(&scene, scene.root(), &input(5.0, 3.0), &mut out);
        scene.apply(&out);

        assert_eq!(outcome, AssignOutcome::Applied { writes: 3 });
        let middle = engine.current_channel(rooms[1]);
        assert_ne!(middle, UNASSIGNED);
        assert!(engine.channel_index(middle).is_some_and(|index| index < 2));
        assert_ne!(middle, engine.current_channel(rooms[0]));
        assert_ne!(middle, engine.current_channel(rooms[2]));
        assert_eq!(scene.light_channel(crate::scene::LightHandle(1)), Some(middle));
    }

    #[test]
    fn test_static_conflicting_rooms_never_share() {
        let offsets: Vec<f32> = (0..12).map(|i| i as f32 * 1.5).collect();
        let (scene, rooms, _) = row_of_rooms(&offsets);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 8, 8));
        let mut out = RenderCommandBatch::new();
        engine.assign(&scene, scene.root(), &input(2.5, 0.0), &mut out);

        let graph = engine.graph();
        for a in 0..rooms.len() {
            assert_ne!(engine.current_channel(rooms[a]), UNASSIGNED);
            for &b in graph.neighbors(a) {
                assert_ne!(engine.current_channel(rooms[a]), engine.current_channel(rooms[b]));
            }
        }
    }

    #[test]
    fn test_static_leaves_unresolvable_rooms_unassigned() {
        let (scene, rooms, _) = row_of_rooms(&[0.0, 1.5, 3.0]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 1, 8));
        let mut out = RenderCommandBatch::new();
        engine.assign(&scene, scene.root(), &input(5.0, 0.0), &mut out);

        let assigned = rooms.iter().filter(|room| engine.current_channel(**room) != UNASSIGNED).count();
        assert_eq!(assigned, 1);
        assert!(out.iter().any(|c| matches!(c, RenderCommand::SetRenderableChannel { mask: 0, .. })));
    }

    #[test]
    fn test_dynamic_separates_nearby_rooms() {
        let (scene, rooms, _) = row_of_rooms(&[0.0, 3.0, 6.0]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();

        let dynamic = input(5.0, 1.0).with_observer(Vec3::new(3.5, 0.5, 0.5), 0.0);
        let outcome = engine.assign(&scene, scene.root(), &dynamic, &mut out);

        assert_eq!(outcome, AssignOutcome::Applied { writes: 3 });
        let middle = engine.current_channel(rooms[1]);
        assert_ne!(middle, engine.current_channel(rooms[0]));
        assert_ne!(middle, engine.current_channel(rooms[2]));
    }

    #[test]
    fn test_dynamic_snapshot_reads_renderable_masks() {
        let mut scene = MemoryScene::new();
        let room = scene.add_node(scene.root(), Vec3::zeros()).unwrap();
        let bounds = AABB::around_point(Vec3::zeros(), 1.0);
        for mask in [CH2, CH2, CH1] {
            let renderable = scene.add_renderable(room, bounds).unwrap();
            scene.set_renderable_channel_mask(renderable, mask);
        }

        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();
        let dynamic = input(5.0, 3.0).with_observer(Vec3::zeros(), 0.0);
        engine.assign(&scene, scene.root(), &dynamic, &mut out);

        assert_eq!(engine.current_channel(room), CH2);
    }

    #[test]
    fn test_dynamic_outside_rooms_get_a_channel() {
        let (scene, rooms, _) = row_of_rooms(&[0.0, 2.0, 500.0]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();
        let dynamic = input(5.0, 1.0).with_observer(Vec3::new(1000.0, 0.0, 0.0), 0.0);
        engine.assign(&scene, scene.root(), &dynamic, &mut out);

        assert_eq!(engine.current_channel(rooms[0]), CH1);
        assert_eq!(engine.current_channel(rooms[1]), CH2);
        assert_eq!(engine.current_channel(rooms[2]), CH1);
    }

    /// Dynamic input with a tight inner radius around `observer`
    fn zoned(min_separation: f32, proximity_factor: f32, radius_in: f32, observer: Vec3) -> AssignmentInput {
        AssignmentInput {
            radius_in,
            radius_out: 10.0,
            ..input(min_separation, proximity_factor)
        }
        .with_observer(observer, 0.0)
    }

    fn preset(scene: &mut MemoryScene, renderables: &[RenderableHandle], masks: &[u32]) {
        for (renderable, mask) in renderables.iter().zip(masks) {
            scene.set_renderable_channel_mask(*renderable, *mask);
        }
    }

    #[test]
    fn test_dynamic_border_room_keeps_channel_without_collision() {
        // Proximate to the inside room but not conflicting with it
        let (mut scene, rooms, renderables) = row_of_rooms(&[0.0, 3.0, 40.0]);
        preset(&mut scene, &renderables, &[CH1, CH1, UNASSIGNED]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();

        let dynamic = zoned(1.0, 5.0, 1.0, Vec3::new(0.5, 0.5, 0.5));
        engine.assign(&scene, scene.root(), &dynamic, &mut out);

        assert_eq!(engine.current_channel(rooms[0]), CH1);
        assert_eq!(engine.current_channel(rooms[1]), CH1);
        assert_eq!(engine.current_channel(rooms[2]), CH1);
    }

    #[test]
    fn test_dynamic_border_room_moves_off_inside_channel() {
        let (mut scene, rooms, renderables) = row_of_rooms(&[0.0, 3.0, 40.0]);
        preset(&mut scene, &renderables, &[CH1, CH1, UNASSIGNED]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();

        let dynamic = zoned(5.0, 1.0, 1.0, Vec3::new(0.5, 0.5, 0.5));
        assert_eq!(
            engine.assign(&scene, scene.root(), &dynamic, &mut out),
            AssignOutcome::Applied { writes: 3 }
        );

        let channels: Vec<u32> = rooms.iter().map(|room| engine.current_channel(*room)).collect();
        assert_eq!(channels, vec![CH1, CH2, CH1]);
    }

    #[test]
    fn test_dynamic_border_room_keeps_channel_when_all_banned() {
        let (mut scene, rooms, renderables) = row_of_rooms(&[0.0, 3.0]);
        preset(&mut scene, &renderables, &[CH1, CH1]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 1, 8));
        let mut out = RenderCommandBatch::new();

        let dynamic = zoned(5.0, 1.0, 1.0, Vec3::new(0.5, 0.5, 0.5));
        engine.assign(&scene, scene.root(), &dynamic, &mut out);

        assert_eq!(engine.current_channel(rooms[0]), CH1);
        assert_eq!(engine.current_channel(rooms[1]), CH1);
    }

    #[test]
    fn test_dynamic_inside_room_takes_least_crowded_channel() {
        // Both channels are held by other inside rooms; only the border room
        // at 31 is proximate to the room at 28, and it holds CH1
        let (mut scene, rooms, renderables) = row_of_rooms(&[0.0, 10.0, 28.0, 31.0]);
        preset(&mut scene, &renderables, &[CH1, CH2, CH1, CH1]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();

        let dynamic = AssignmentInput {
            radius_out: 75.0,
            ..zoned(1.0, 4.0, 30.0, Vec3::new(0.0, 0.5, 0.5))
        };
        engine.assign(&scene, scene.root(), &dynamic, &mut out);

        let channels: Vec<u32> = rooms.iter().map(|room| engine.current_channel(*room)).collect();
        assert_eq!(channels, vec![CH1, CH2, CH2, CH1]);
    }

    #[test]
    fn test_snapshot_ties_keep_first_seen_channel() {
        let mut scene = MemoryScene::new();
        let room = scene.add_node(scene.root(), Vec3::zeros()).unwrap();
        let bounds = AABB::around_point(Vec3::zeros(), 1.0);
        for mask in [CH2, CH1, CH1, CH2] {
            let renderable = scene.add_renderable(room, bounds).unwrap();
            scene.set_renderable_channel_mask(renderable, mask);
        }

        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();
        let dynamic = input(5.0, 3.0).with_observer(Vec3::zeros(), 0.0);
        engine.assign(&scene, scene.root(), &dynamic, &mut out);

        assert_eq!(engine.current_channel(room), CH2);
    }

    #[test]
    fn test_cooldown_holds_after_long_uptime() {
        let start = 1.0e7;
        let (scene, rooms, _) = row_of_rooms(&[0.0]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();
        let dynamic = input(5.0, 1.0).with_observer(Vec3::zeros(), start);
        engine.assign(&scene, scene.root(), &dynamic, &mut out);
        assert_eq!(engine.current_channel(rooms[0]), CH1);

        assert_eq!(engine.apply_deltas(&scene, &[CH2], start + 0.2, 0.5, &mut out), 0);
        assert_eq!(engine.apply_deltas(&scene, &[CH2], start + 0.5, 0.5, &mut out), 1);
    }

    #[test]
    fn test_move_gate() {
        let (scene, _, _) = row_of_rooms(&[0.0, 3.0]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();
        let at = |x: f32, now: f64| input(5.0, 1.0).with_observer(Vec3::new(x, 0.0, 0.0), now);

        assert!(matches!(
            engine.assign(&scene, scene.root(), &at(0.0, 0.0), &mut out),
            AssignOutcome::Applied { .. }
        ));
        assert_eq!(
            engine.assign(&scene, scene.root(), &at(0.3, 1.0), &mut out),
            AssignOutcome::Skipped(SkipReason::BelowMoveGate)
        );
        assert!(matches!(
            engine.assign(&scene, scene.root(), &at(0.6, 2.0), &mut out),
            AssignOutcome::Applied { .. }
        ));
    }

    #[test]
    fn test_cooldown_blocks_rewrites() {
        let (scene, rooms, _) = row_of_rooms(&[0.0]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();
        let dynamic = input(5.0, 1.0).with_observer(Vec3::zeros(), 0.0);
        engine.assign(&scene, scene.root(), &dynamic, &mut out);
        assert_eq!(engine.current_channel(rooms[0]), CH1);

        out.clear();
        assert_eq!(engine.apply_deltas(&scene, &[CH2], 0.2, 0.5, &mut out), 0);
        assert!(out.is_empty());

        assert_eq!(engine.apply_deltas(&scene, &[CH2], 0.5, 0.5, &mut out), 1);
        assert_eq!(engine.current_channel(rooms[0]), CH2);
        assert_eq!(engine.apply_deltas(&scene, &[CH1], 0.9, 0.5, &mut out), 0);
    }

    #[test]
    fn test_dangling_handles_are_skipped() {
        let (mut scene, _, renderables) = row_of_rooms(&[0.0]);
        let mut engine = ChannelAssignmentEngine::new(ChannelPalette::new(1, 2, 8));
        let mut out = RenderCommandBatch::new();
        engine.assign(&scene, scene.root(), &input(5.0, 1.0), &mut out);

        scene.remove_renderable(renderables[0]);
        scene.remove_light(crate::scene::LightHandle(0));
        let mut out = RenderCommandBatch::new();
        engine.assign(&scene, scene.root(), &input(5.0, 1.0), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_empty_root() {
        let scene = MemoryScene::new();
        let mut engine = ChannelAssignmentEngine::default();
        let mut out = RenderCommandBatch::new();
        assert_eq!(
            engine.assign(&scene, scene.root(), &input(5.0, 1.0), &mut out),
            AssignOutcome::Skipped(SkipReason::NoCells)
        );
    }
}
