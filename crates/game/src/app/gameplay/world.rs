use std::path::Path;

use engine::blocks::{BlockEditor, BlockLoad, BlockSet};
use engine::collision::slide_move;
use engine::fsm::FsmError;
use engine::tiles::TileMap;
use engine::{Aabb, Camera2D, InputEvent, Painter, Rgba, SpriteFrame, Vec2};
use tracing::{info, warn};

use crate::app::config::{BackgroundLayer, SpawnKind, SpawnPoint};

use super::actor::{Actor, ActorId};
use super::combat::{CombatResolver, HitReport};
use super::monster::{Monster, Species, GNOME, ORBITER, PADDLEFISH, PANDA, PATROLLER, WANDERER};
use super::player::{PlayerCharacter, PlayerProfile, CHILD, WARRIOR};

const BODY_BOX_COLOR: Rgba = [70, 200, 255, 255];
const ATTACK_BOX_COLOR: Rgba = [255, 70, 70, 255];
const BLOCK_OVERLAY_COLOR: Rgba = [255, 150, 40, 255];
const HP_BACK_COLOR: Rgba = [60, 20, 20, 255];
const HP_FILL_COLOR: Rgba = [80, 220, 90, 255];
const HP_BAR_WIDTH: f32 = 60.0;
const HP_BAR_HEIGHT: f32 = 6.0;
const HP_BAR_GAP: f32 = 8.0;

/// What happened during one simulation tick.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct TickReport {
    pub(crate) hits: Vec<HitReport>,
    pub(crate) removed: Vec<ActorId>,
}

/// Owns everything the play scene simulates.
pub(crate) struct World {
    actors: Vec<Box<dyn Actor>>,
    next_id: u64,
    tiles: TileMap,
    background: Option<BackgroundLayer>,
    blocks: BlockSet,
    editor: BlockEditor,
    camera: Camera2D,
    combat: CombatResolver,
    /// Player characters in swap order.
    roster: Vec<ActorId>,
    active: Option<ActorId>,
    show_collision_boxes: bool,
}

impl World {
    pub(crate) fn new(tiles: TileMap, viewport: Vec2) -> Self {
        Self {
            actors: Vec::new(),
            next_id: 1,
            tiles,
            background: None,
            blocks: BlockSet::new(),
            editor: BlockEditor::new(),
            camera: Camera2D::new(viewport.x, viewport.y),
            combat: CombatResolver::new(),
            roster: Vec::new(),
            active: None,
            show_collision_boxes: false,
        }
    }

    pub(crate) fn spawn(&mut self, spawn: &SpawnPoint) -> Result<ActorId, FsmError> {
        let position = spawn.position();
        match spawn.kind {
            SpawnKind::Warrior => self.spawn_player(&WARRIOR, position),
            SpawnKind::Child => self.spawn_player(&CHILD, position),
            SpawnKind::Gnome => self.spawn_monster(&GNOME, position),
            SpawnKind::Paddlefish => self.spawn_monster(&PADDLEFISH, position),
            SpawnKind::Panda => self.spawn_monster(&PANDA, position),
            SpawnKind::Patroller => self.spawn_monster(&PATROLLER, position),
            SpawnKind::Orbiter => self.spawn_monster(&ORBITER, position),
            SpawnKind::Wanderer => self.spawn_monster(&WANDERER, position),
        }
    }

    pub(crate) fn spawn_player(
        &mut self,
        profile: &'static PlayerProfile,
        position: Vec2,
    ) -> Result<ActorId, FsmError> {
        let id = self.allocate_id();
        self.actors
            .push(Box::new(PlayerCharacter::new(id, profile, position)?));
        self.roster.push(id);
        if self.active.is_none() {
            self.active = Some(id);
            self.camera.follow(position);
            self.camera.snap_to_target();
        }
        info!(id = id.0, character = profile.name, x = position.x, y = position.y, "character_spawned");
        Ok(id)
    }

    pub(crate) fn spawn_monster(
        &mut self,
        species: &'static Species,
        position: Vec2,
    ) -> Result<ActorId, FsmError> {
        let id = self.allocate_id();
        self.actors
            .push(Box::new(Monster::new(id, species, position)?));
        info!(id = id.0, species = species.name, x = position.x, y = position.y, "monster_spawned");
        Ok(id)
    }

    fn allocate_id(&mut self) -> ActorId {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub(crate) fn actor(&self, id: ActorId) -> Option<&dyn Actor> {
        self.actors
            .iter()
            .find(|actor| actor.id() == id)
            .map(|actor| actor.as_ref())
    }

    pub(crate) fn actor_mut(&mut self, id: ActorId) -> Option<&mut (dyn Actor + 'static)> {
        self.actors
            .iter_mut()
            .find(|actor| actor.id() == id)
            .map(|actor| actor.as_mut())
    }

    #[cfg(test)]
    pub(crate) fn active_id(&self) -> Option<ActorId> {
        self.active
    }

    pub(crate) fn active_actor(&self) -> Option<&dyn Actor> {
        self.active.and_then(|id| self.actor(id))
    }

    pub(crate) fn set_background(&mut self, background: Option<BackgroundLayer>) {
        self.background = background;
    }

    pub(crate) fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
    }

    pub(crate) fn blocks(&self) -> &BlockSet {
        &self.blocks
    }

    pub(crate) fn editor(&self) -> &BlockEditor {
        &self.editor
    }

    pub(crate) fn toggle_collision_boxes(&mut self) -> bool {
        self.show_collision_boxes = !self.show_collision_boxes;
        self.show_collision_boxes
    }

    /// Routes a gameplay input event to the controlled character.
    pub(crate) fn dispatch_input(&mut self, event: &InputEvent) {
        if let Some(id) = self.active {
            if let Some(actor) = self.actor_mut(id) {
                actor.handle_event(event);
            }
        }
    }

    /// Hands control to the next living roster member.
    pub(crate) fn swap_character(&mut self) -> Option<ActorId> {
        let previous = self.active?;
        let start = self.roster.iter().position(|id| *id == previous)?;
        let count = self.roster.len();
        let next = (1..count)
            .map(|offset| self.roster[(start + offset) % count])
            .find(|id| self.actor(*id).is_some_and(|actor| actor.is_alive()))?;

        if let Some(actor) = self.actor_mut(previous) {
            actor.halt();
        }
        for actor in &mut self.actors {
            if actor.target() == Some(previous) {
                actor.set_target(Some(next));
            }
        }
        self.active = Some(next);
        info!(from = previous.0, to = next.0, "character_swapped");
        Some(next)
    }

    /// True when `rect` overlaps terrain or an authored collision block.
    #[cfg(test)]
    pub(crate) fn blocked(&self, rect: &Aabb) -> bool {
        rect_blocked(&self.tiles, &self.blocks, rect)
    }

    pub(crate) fn tick(&mut self, dt: f32) -> TickReport {
        self.refresh_targets();

        for actor in &mut self.actors {
            let before = actor.position();
            actor.update(dt);
            settle(actor.as_mut(), before, &self.tiles, &self.blocks);
        }

        let settled: Vec<Vec2> = self.actors.iter().map(|actor| actor.position()).collect();
        let hits = self.combat.resolve(&mut self.actors);
        for (actor, before) in self.actors.iter_mut().zip(settled) {
            settle(actor.as_mut(), before, &self.tiles, &self.blocks);
        }
        let removed = self.remove_fallen();

        self.tiles.update(dt);
        self.update_camera(dt);
        TickReport { hits, removed }
    }

    /// Camera only; used while the editor freezes the simulation.
    pub(crate) fn update_camera(&mut self, dt: f32) {
        if let Some(position) = self.active_actor().map(|actor| actor.position()) {
            self.camera.follow(position);
        }
        self.camera.update(dt);
    }

    /// Drops stale target handles, aims idle AI at the controlled character
    /// and tells every AI where its target currently stands.
    fn refresh_targets(&mut self) {
        let positions: Vec<(ActorId, Vec2)> = self
            .actors
            .iter()
            .filter(|actor| actor.is_alive())
            .map(|actor| (actor.id(), actor.position()))
            .collect();
        let locate = |id: ActorId| {
            positions
                .iter()
                .find(|(candidate, _)| *candidate == id)
                .map(|(_, position)| *position)
        };

        for actor in &mut self.actors {
            if actor.is_player_controlled() {
                continue;
            }
            let valid = actor.target().and_then(locate).is_some();
            if !valid {
                actor.set_target(self.active);
            }
            actor.observe_target(actor.target().and_then(locate));
        }
    }

    fn remove_fallen(&mut self) -> Vec<ActorId> {
        let removed: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|actor| !actor.is_alive())
            .map(|actor| actor.id())
            .collect();
        if removed.is_empty() {
            return removed;
        }

        for id in &removed {
            if let Some(actor) = self.actor(*id) {
                info!(id = id.0, name = actor.name(), "actor_removed");
            }
        }
        self.actors.retain(|actor| actor.is_alive());
        self.roster.retain(|id| !removed.contains(id));

        if self.active.is_some_and(|id| removed.contains(&id)) {
            self.active = self.roster.first().copied();
            match self.active {
                Some(id) => info!(to = id.0, "control_passed_to_survivor"),
                None => warn!("no_characters_left"),
            }
        }
        removed
    }

    pub(crate) fn editor_active(&self) -> bool {
        self.editor.is_active()
    }

    /// Enters or leaves block editing. The controlled character is halted
    /// so no key stays latched while the simulation is frozen.
    pub(crate) fn toggle_editor(&mut self) -> bool {
        let active = self.editor.toggle();
        if active {
            if let Some(id) = self.active {
                if let Some(actor) = self.actor_mut(id) {
                    actor.halt();
                }
            }
        }
        info!(active, "block_editor_toggled");
        active
    }

    /// Forwards input to the block editor, converting pointer positions to
    /// world space.
    pub(crate) fn editor_input(&mut self, event: &InputEvent) {
        let to_world = |position: Vec2| self.camera.screen_to_world(position);
        match *event {
            InputEvent::MouseDown { button, position } => {
                let point = to_world(position);
                self.editor.mouse_down(&mut self.blocks, button, point);
            }
            InputEvent::MouseUp { button, position } => {
                let point = to_world(position);
                self.editor.mouse_up(&mut self.blocks, button, point);
            }
            InputEvent::MouseMotion { position } => {
                let point = to_world(position);
                self.editor.mouse_motion(&mut self.blocks, point);
            }
            InputEvent::KeyDown(key) => {
                self.editor.key_down(&mut self.blocks, key);
            }
            InputEvent::KeyUp(_) => {}
        }
    }

    pub(crate) fn save_blocks(&self, path: &Path) {
        if let Err(err) = self.blocks.save_json(path) {
            warn!(path = %path.display(), error = %err, "collision_blocks_save_failed");
        }
    }

    pub(crate) fn load_blocks(&mut self, path: &Path) {
        match self.blocks.load_json(path) {
            Ok(BlockLoad::Loaded(_)) | Ok(BlockLoad::Missing) => {}
            Err(err) => {
                warn!(path = %path.display(), error = %err, "collision_blocks_load_failed");
            }
        }
    }

    pub(crate) fn draw(&self, painter: &mut dyn Painter) {
        let camera = &self.camera;
        if let Some(background) = &self.background {
            let mut frame = SpriteFrame::new(&background.sheet, 0, background.width);
            frame.cell_height = background.height;
            painter.draw_frame(frame, camera.apply(background.center()));
        }
        self.tiles.draw(painter, camera);

        let mut order: Vec<&dyn Actor> = self.actors.iter().map(|actor| actor.as_ref()).collect();
        order.sort_by(|a, b| b.position().y.total_cmp(&a.position().y));
        for actor in &order {
            actor.draw(painter, camera);
        }
        for actor in &order {
            draw_health_bar(*actor, painter, camera);
        }

        if self.show_collision_boxes {
            for actor in &order {
                painter.outline_rect(camera.apply_rect(&actor.bounding_box()), BODY_BOX_COLOR);
                if let Some(hitbox) = actor.attack_bounding_box() {
                    let hitbox = camera.apply_rect(&hitbox);
                    painter.outline_rect(hitbox, ATTACK_BOX_COLOR);
                    painter.outline_rect(hitbox.expanded(1.0), ATTACK_BOX_COLOR);
                }
            }
        }

        if self.editor.is_active() {
            self.editor.draw(&self.blocks, painter, camera);
        } else if self.show_collision_boxes {
            for block in self.blocks.iter() {
                painter.outline_rect(camera.apply_rect(&block.bounds()), BLOCK_OVERLAY_COLOR);
            }
        }
    }
}

fn rect_blocked(tiles: &TileMap, blocks: &BlockSet, rect: &Aabb) -> bool {
    tiles.collides_rect(rect) || blocks.collides_rect(rect)
}

/// Pulls an actor that moved since `before` back out of terrain and blocks.
/// Covers both its own movement and knockback from a hit.
fn settle(actor: &mut dyn Actor, before: Vec2, tiles: &TileMap, blocks: &BlockSet) {
    let after = actor.position();
    if before == after {
        return;
    }
    let body = actor.bounding_box();
    let size = Vec2::new(body.width(), body.height());
    let resolved = slide_move(before, after, size, |rect| rect_blocked(tiles, blocks, rect));
    if resolved != after {
        actor.set_position(resolved);
    }
}

fn draw_health_bar(actor: &dyn Actor, painter: &mut dyn Painter, camera: &Camera2D) {
    let body = actor.bounding_box();
    let center_x = body.center().x;
    let bottom = body.top + HP_BAR_GAP;
    let back = Aabb::new(
        center_x - HP_BAR_WIDTH * 0.5,
        bottom,
        center_x + HP_BAR_WIDTH * 0.5,
        bottom + HP_BAR_HEIGHT,
    );
    painter.fill_rect(camera.apply_rect(&back), HP_BACK_COLOR);
    let filled = HP_BAR_WIDTH * actor.vitals().fraction();
    if filled > 0.0 {
        let fill = Aabb::new(back.left, back.bottom, back.left + filled, back.top);
        painter.fill_rect(camera.apply_rect(&fill), HP_FILL_COLOR);
    }
}
