//! The map: authoritative registry of the actors in one scene.
//!
//! Besides the actor registry the map owns its library list, actor groups,
//! preset cameras, game events and descriptive metadata, and tracks whether
//! any of it changed since the last save.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::actor::{ActorIterator, ActorPtr, BaseActorObject};
use crate::config::MapConfig;
use crate::factory::ActorFactory;
use crate::game_event::{GameEvent, GameEventManager};
use crate::naming::{leading_int, number_to_string, split_proxy_name, wild_match};
use crate::property::DataType;
use crate::types::{Quat, UniqueId, Vec3};

/// Extension appended to map file names that have none.
pub const MAP_FILE_EXTENSION: &str = "dtmap";
/// Extension appended to prefab file names that have none.
pub const PREFAB_FILE_EXTENSION: &str = "dtprefab";

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Whether the map is a full scene or a reusable prefab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapKind {
    /// A scene map.
    #[default]
    Map,
    /// A prefab.
    Prefab,
}

impl MapKind {
    /// File extension for this kind.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Map => MAP_FILE_EXTENSION,
            Self::Prefab => PREFAB_FILE_EXTENSION,
        }
    }
}

/// Placeability filter for [`ProxyQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaceableFilter {
    /// Only placeable actors.
    Placeable,
    /// Only non-placeable actors.
    NotPlaceable,
    /// Either.
    #[default]
    Either,
}

/// Search criteria for [`Map::find_proxies`]. Empty strings match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyQuery {
    name: String,
    category: String,
    type_name: String,
    class_name: String,
    placeable: PlaceableFilter,
}

impl ProxyQuery {
    /// Query matching every actor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wildcard name pattern (`*`, `?`).
    #[must_use]
    pub fn name(mut self, pattern: &str) -> Self {
        self.name = pattern.to_string();
        self
    }

    /// Category prefix, matched on `.` boundaries.
    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    /// Exact actor type name.
    #[must_use]
    pub fn type_name(mut self, type_name: &str) -> Self {
        self.type_name = type_name.to_string();
        self
    }

    /// Class name the actor must be an instance of.
    #[must_use]
    pub fn class_name(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    /// Placeability filter.
    #[must_use]
    pub fn placeable(mut self, placeable: PlaceableFilter) -> Self {
        self.placeable = placeable;
        self
    }

    /// Whether every criterion is at its default.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.name.is_empty()
            && self.category.is_empty()
            && self.type_name.is_empty()
            && self.class_name.is_empty()
            && self.placeable == PlaceableFilter::Either
    }

    fn matches(&self, actor: &dyn BaseActorObject) -> bool {
        if !self.name.is_empty() && !wild_match(&self.name, actor.name()) {
            return false;
        }
        if !self.class_name.is_empty() && !actor.is_instance_of(&self.class_name) {
            return false;
        }
        if (!self.type_name.is_empty() || !self.category.is_empty())
            && !actor
                .actor_type()
                .ancestry()
                .any(|t| self.type_matches(t.name(), t.category()))
        {
            return false;
        }
        match self.placeable {
            PlaceableFilter::Placeable => actor.is_placeable(),
            PlaceableFilter::NotPlaceable => !actor.is_placeable(),
            PlaceableFilter::Either => true,
        }
    }

    fn type_matches(&self, name: &str, category: &str) -> bool {
        let name_matches = self.type_name.is_empty() || name == self.type_name;
        let category_matches = self.category.is_empty()
            || (category.starts_with(&self.category)
                && (category.len() == self.category.len()
                    || category.as_bytes()[self.category.len()] == b'.'));
        name_matches && category_matches
    }
}

/// Stored camera placement for one of the map's preset slots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetCameraData {
    /// Whether the slot holds a saved camera.
    pub is_valid: bool,
    /// Perspective view position.
    pub pers_position: Vec3,
    /// Perspective view rotation.
    pub pers_rotation: Quat,
    /// Top view position.
    pub top_position: Vec3,
    /// Top view zoom.
    pub top_zoom: f64,
    /// Side view position.
    pub side_position: Vec3,
    /// Side view zoom.
    pub side_zoom: f64,
    /// Front view position.
    pub front_position: Vec3,
    /// Front view zoom.
    pub front_zoom: f64,
}

impl Default for PresetCameraData {
    fn default() -> Self {
        Self {
            is_valid: false,
            pers_position: Vec3::default(),
            pers_rotation: Quat::default(),
            top_position: Vec3::default(),
            top_zoom: 1.0,
            side_position: Vec3::default(),
            side_zoom: 1.0,
            front_position: Vec3::default(),
            front_zoom: 1.0,
        }
    }
}

/// Game-event access that marks the owning map modified on every change.
pub struct MapGameEvents<'a> {
    events: &'a mut GameEventManager,
    modified: &'a mut bool,
}

impl MapGameEvents<'_> {
    /// Add an event and mark the map modified.
    pub fn add_event(&mut self, event: GameEvent) -> bool {
        *self.modified = true;
        self.events.add_event(event)
    }

    /// Remove an event by id and mark the map modified.
    pub fn remove_event(&mut self, id: &UniqueId) -> Option<GameEvent> {
        *self.modified = true;
        self.events.remove_event(id)
    }

    /// Remove every event and mark the map modified.
    pub fn clear_all_events(&mut self) {
        *self.modified = true;
        self.events.clear_all_events();
    }
}

impl Deref for MapGameEvents<'_> {
    type Target = GameEventManager;

    fn deref(&self) -> &GameEventManager {
        self.events
    }
}

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// Registry of the actors, libraries, groups and metadata of one scene.
#[derive(Debug)]
pub struct Map {
    kind: MapKind,
    modified: bool,
    name: String,
    saved_name: String,
    file_name: String,
    description: String,
    author: String,
    comment: String,
    copyright: String,
    create_date_time: String,
    icon_file: String,
    default_library_version: String,
    env_actor: Option<ActorPtr>,
    event_manager: GameEventManager,
    actors: BTreeMap<UniqueId, ActorPtr>,
    proxy_actor_classes: BTreeSet<String>,
    library_versions: BTreeMap<String, String>,
    library_order: Vec<String>,
    proxy_numbers: BTreeMap<String, i32>,
    missing_libraries: Vec<String>,
    missing_actor_types: BTreeSet<String>,
    groups: Vec<Vec<UniqueId>>,
    preset_cameras: Vec<PresetCameraData>,
}

impl Map {
    /// New, modified, empty map.
    #[must_use]
    pub fn new(file_name: &str, name: &str) -> Self {
        Self::with_config(MapKind::Map, file_name, name, &MapConfig::default())
    }

    /// New, modified, empty prefab.
    #[must_use]
    pub fn new_prefab(file_name: &str, name: &str) -> Self {
        Self::with_config(MapKind::Prefab, file_name, name, &MapConfig::default())
    }

    /// New map using `config` for camera slots and library defaults.
    #[must_use]
    pub fn with_config(kind: MapKind, file_name: &str, name: &str, config: &MapConfig) -> Self {
        let mut map = Self {
            kind,
            modified: true,
            name: name.to_string(),
            saved_name: String::new(),
            file_name: String::new(),
            description: String::new(),
            author: String::new(),
            comment: String::new(),
            copyright: String::new(),
            create_date_time: String::new(),
            icon_file: String::new(),
            default_library_version: config.default_library_version.clone(),
            env_actor: None,
            event_manager: GameEventManager::new(),
            actors: BTreeMap::new(),
            proxy_actor_classes: BTreeSet::new(),
            library_versions: BTreeMap::new(),
            library_order: Vec::new(),
            proxy_numbers: BTreeMap::new(),
            missing_libraries: Vec::new(),
            missing_actor_types: BTreeSet::new(),
            groups: Vec::new(),
            preset_cameras: vec![PresetCameraData::default(); config.preset_camera_slots],
        };
        map.set_file_name(file_name);
        map
    }

    /// Map or prefab.
    #[must_use]
    pub fn kind(&self) -> MapKind {
        self.kind
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Actor by id.
    #[must_use]
    pub fn get_proxy_by_id(&self, id: &UniqueId) -> Option<ActorPtr> {
        self.actors.get(id).cloned()
    }

    /// Every actor, ordered by id.
    #[must_use]
    pub fn all_proxies(&self) -> Vec<ActorPtr> {
        self.actors.values().cloned().collect()
    }

    /// Number of registered actors.
    #[must_use]
    pub fn proxy_count(&self) -> usize {
        self.actors.len()
    }

    /// Actors matching `query`; an unfiltered query returns every actor.
    #[must_use]
    pub fn find_proxies(&self, query: &ProxyQuery) -> Vec<ActorPtr> {
        if query.is_unfiltered() {
            return self.all_proxies();
        }
        self.actors
            .values()
            .filter(|actor| query.matches(&*actor.borrow()))
            .cloned()
            .collect()
    }

    /// Register an actor.
    ///
    /// With `renumber` the actor is renamed `Prefix_NN` using one more than
    /// the prefix's high-water mark (or `01` for a new prefix). An id that is
    /// already registered leaves the map untouched and returns false.
    pub fn add_proxy(&mut self, actor: ActorPtr, renumber: bool) -> bool {
        let id = actor.borrow().id();
        if self.actors.contains_key(&id) {
            debug!(actor = %id, "Actor already in map, ignoring");
            return false;
        }

        let (prefix, mut number) = split_proxy_name(actor.borrow().name());
        if renumber {
            number = match self.proxy_numbers.get(&prefix) {
                Some(high) => number_to_string(high.saturating_add(1)),
                None => "01".to_string(),
            };
            actor.borrow_mut().set_name(&format!("{prefix}_{number}"));
        }
        if !number.is_empty() {
            self.record_proxy_number(prefix, leading_int(&number));
        }

        {
            let a = actor.borrow();
            let class_info = a.core().class_info();
            if class_info.class_name().is_empty() {
                error!(
                    actor_type = %a.actor_type().full_name(),
                    "Empty class name on actor with type {}",
                    a.actor_type().full_name()
                );
            }
            self.proxy_actor_classes.extend(class_info.class_hierarchy().iter().cloned());
        }
        self.actors.insert(id, actor);
        self.modified = true;
        true
    }

    /// Remove an actor and, for containers, all of its descendants.
    ///
    /// A container is first detached from its parent. Returns true when at
    /// least one actor was removed.
    pub fn remove_proxy(&mut self, actor: &ActorPtr) -> bool {
        let keep_alive = Rc::clone(actor);
        let is_container = keep_alive.borrow().as_component_container().is_some();
        if !is_container {
            return self.remove_proxy_internal(&keep_alive);
        }

        if let Some(container) = keep_alive.borrow_mut().as_component_container_mut() {
            container.set_parent_base_actor(None);
        }

        let mut removed = 0;
        for current in ActorIterator::new(Rc::clone(&keep_alive)) {
            if self.remove_proxy_internal(&current) {
                removed += 1;
            }
        }
        removed > 0
    }

    /// Remove one actor and clear every reference property pointing at it.
    fn remove_proxy_internal(&mut self, actor: &ActorPtr) -> bool {
        let id = actor.borrow().id();
        if !self.actors.contains_key(&id) {
            return false;
        }
        self.modified = true;
        actor.borrow().on_remove();

        let mut cleared = 0usize;
        for other in self.actors.values() {
            let other = other.borrow();
            for property in other.properties().properties() {
                if property.data_type() != DataType::Actor {
                    continue;
                }
                if let Some(reference) = property.as_actor_reference() {
                    if reference.refers_to(actor) {
                        reference.set_target(None);
                        cleared += 1;
                    }
                } else if let Some(reference) = property.as_actor_id_reference() {
                    if reference.actor_id() == id {
                        reference.set_actor_id(UniqueId::null());
                        cleared += 1;
                    }
                }
            }
        }

        self.actors.remove(&id);
        debug!(actor = %id, cleared_references = cleared, "Removed actor from map");
        true
    }

    /// Re-record the high-water mark after an actor was renamed.
    pub fn on_proxy_renamed(&mut self, actor: &ActorPtr) {
        let (prefix, number) = split_proxy_name(actor.borrow().name());
        if !number.is_empty() {
            self.record_proxy_number(prefix, leading_int(&number));
        }
    }

    fn record_proxy_number(&mut self, prefix: String, number: i32) {
        let high = self.proxy_numbers.entry(prefix).or_insert(number);
        if number > *high {
            *high = number;
        }
    }

    /// Highest number seen for `prefix`.
    #[must_use]
    pub fn proxy_number_high_water(&self, prefix: &str) -> Option<i32> {
        self.proxy_numbers.get(prefix).copied()
    }

    /// Drop every actor and the class-name cache.
    pub fn clear_proxies(&mut self) {
        self.actors.clear();
        self.proxy_actor_classes.clear();
    }

    /// Class names (with ancestors) of every actor ever added.
    #[must_use]
    pub fn proxy_actor_classes(&self) -> &BTreeSet<String> {
        &self.proxy_actor_classes
    }

    /// Recompute the class-name cache from the current actors.
    pub fn rebuild_proxy_actor_class_set(&mut self) {
        self.proxy_actor_classes = self
            .actors
            .values()
            .flat_map(|a| a.borrow().core().class_info().class_hierarchy().clone())
            .collect();
    }

    /// Give every actor a fresh id and re-key the registry.
    ///
    /// Groups follow their actors. Actor-id reference properties keep the
    /// old ids; the returned old-to-new map is the caller's tool for fixing them.
    pub fn reset_uuids(&mut self) -> BTreeMap<UniqueId, UniqueId> {
        let mut changes = BTreeMap::new();
        let actors = std::mem::take(&mut self.actors);
        for (old_id, actor) in actors {
            let new_id = UniqueId::new();
            actor.borrow_mut().set_id(new_id);
            changes.insert(old_id, new_id);
            self.actors.insert(new_id, actor);
        }
        for group in &mut self.groups {
            for member in group.iter_mut() {
                if let Some(new_id) = changes.get(member) {
                    *member = *new_id;
                }
            }
        }
        changes
    }

    // -----------------------------------------------------------------------
    // Environment actor
    // -----------------------------------------------------------------------

    /// Install (and register) an environment actor, or remove the current one.
    ///
    /// Actors that are not environment actors are logged and ignored.
    pub fn set_environment_actor(&mut self, actor: Option<ActorPtr>) -> bool {
        match actor {
            None => {
                if let Some(current) = self.env_actor.take() {
                    self.remove_proxy(&current);
                }
                true
            }
            Some(actor) => {
                if !actor.borrow().is_environment_actor() {
                    error!("The actor specified is not an environment actor. Ignoring.");
                    return false;
                }
                self.env_actor = Some(Rc::clone(&actor));
                self.add_proxy(actor, false);
                true
            }
        }
    }

    /// Current environment actor.
    #[must_use]
    pub fn environment_actor(&self) -> Option<ActorPtr> {
        self.env_actor.clone()
    }

    // -----------------------------------------------------------------------
    // Libraries
    // -----------------------------------------------------------------------

    /// Insert or move `name` to `pos` (appended when `pos` is past the end).
    pub fn insert_library(&mut self, pos: usize, name: &str, version: &str) {
        self.library_versions.insert(name.to_string(), version.to_string());
        self.library_order.retain(|l| l != name);
        if pos < self.library_order.len() {
            self.library_order.insert(pos, name.to_string());
        } else {
            self.library_order.push(name.to_string());
        }
        self.modified = true;
    }

    /// Append (or move to the end) a library.
    pub fn add_library(&mut self, name: &str, version: &str) {
        self.insert_library(self.library_order.len(), name, version);
    }

    /// Remove a library; false when it was not registered.
    pub fn remove_library(&mut self, name: &str) -> bool {
        if self.library_versions.remove(name).is_none() {
            return false;
        }
        self.library_order.retain(|l| l != name);
        self.modified = true;
        true
    }

    /// Whether the library is registered.
    #[must_use]
    pub fn has_library(&self, name: &str) -> bool {
        self.library_versions.contains_key(name)
    }

    /// Version of a library.
    #[must_use]
    pub fn library_version(&self, name: &str) -> Option<&str> {
        self.library_versions.get(name).map(String::as_str)
    }

    /// Library name to version.
    #[must_use]
    pub fn library_version_map(&self) -> &BTreeMap<String, String> {
        &self.library_versions
    }

    /// Libraries in load order.
    #[must_use]
    pub fn all_libraries(&self) -> &[String] {
        &self.library_order
    }

    /// Add every library that provides the type of an actor (or of one of
    /// its components). With `remove_unused`, drop libraries nothing uses.
    pub fn correct_library_list(&mut self, factory: &ActorFactory, remove_unused: bool) {
        let mut used = BTreeSet::new();
        for actor in self.actors.values() {
            let actor = actor.borrow();
            let mut types = vec![actor.actor_type().clone()];
            if let Some(container) = actor.as_component_container() {
                types.extend(container.component_actor_types());
            }
            for actor_type in types {
                if let Some(library) = factory.library_for_type(&actor_type) {
                    if !library.is_empty() {
                        used.insert(library.to_string());
                    }
                }
            }
        }

        let version = self.default_library_version.clone();
        for library in &used {
            if !self.has_library(library) {
                self.add_library(library, &version);
            }
        }
        if remove_unused {
            let unused: Vec<String> = self
                .library_order
                .iter()
                .filter(|l| !used.contains(*l))
                .cloned()
                .collect();
            for library in unused {
                self.remove_library(&library);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Loading errors
    // -----------------------------------------------------------------------

    /// Record actor types that could not be created while loading.
    pub fn add_missing_actor_types<I: IntoIterator<Item = String>>(&mut self, types: I) {
        self.missing_actor_types.extend(types);
    }

    /// Record libraries that could not be loaded.
    pub fn add_missing_libraries<I: IntoIterator<Item = String>>(&mut self, libraries: I) {
        self.missing_libraries.extend(libraries);
    }

    /// Actor types missing at load time.
    #[must_use]
    pub fn missing_actor_types(&self) -> &BTreeSet<String> {
        &self.missing_actor_types
    }

    /// Libraries missing at load time.
    #[must_use]
    pub fn missing_libraries(&self) -> &[String] {
        &self.missing_libraries
    }

    /// Whether anything was missing at load time.
    #[must_use]
    pub fn has_loading_errors(&self) -> bool {
        !self.missing_libraries.is_empty() || !self.missing_actor_types.is_empty()
    }

    // -----------------------------------------------------------------------
    // Modified tracking
    // -----------------------------------------------------------------------

    /// Whether the map changed since the last [`Map::clear_modified`].
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Force the modified flag.
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }

    /// Mark saved: clears the flag, records the saved name, forgets load errors.
    pub fn clear_modified(&mut self) {
        self.modified = false;
        self.saved_name.clone_from(&self.name);
        self.missing_actor_types.clear();
        self.missing_libraries.clear();
    }

    // -----------------------------------------------------------------------
    // Game events
    // -----------------------------------------------------------------------

    /// Read access to the map's game events.
    #[must_use]
    pub fn event_manager(&self) -> &GameEventManager {
        &self.event_manager
    }

    /// Write access to the map's game events; changes mark the map modified.
    pub fn event_manager_mut(&mut self) -> MapGameEvents<'_> {
        MapGameEvents {
            events: &mut self.event_manager,
            modified: &mut self.modified,
        }
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// Number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Members in a group, `None` for an invalid index.
    #[must_use]
    pub fn group_actor_count(&self, group: usize) -> Option<usize> {
        self.groups.get(group).map(Vec::len)
    }

    /// Append to group `group`, or to a new group when the index is invalid.
    pub fn add_actor_to_group(&mut self, group: usize, actor: &ActorPtr) {
        let id = actor.borrow().id();
        match self.groups.get_mut(group) {
            Some(members) => members.push(id),
            None => self.groups.push(vec![id]),
        }
    }

    /// Remove every occurrence of the actor and prune empty groups.
    pub fn remove_actor_from_groups(&mut self, actor: &ActorPtr) -> bool {
        let id = actor.borrow().id();
        let mut found = false;
        for members in &mut self.groups {
            let before = members.len();
            members.retain(|m| *m != id);
            found |= members.len() != before;
        }
        if found {
            self.groups.retain(|members| !members.is_empty());
        }
        found
    }

    /// Index of the first group containing the actor.
    #[must_use]
    pub fn find_group_for_actor(&self, actor: &ActorPtr) -> Option<usize> {
        let id = actor.borrow().id();
        self.groups.iter().position(|members| members.contains(&id))
    }

    /// Group member, resolved through the registry.
    #[must_use]
    pub fn actor_from_group(&self, group: usize, index: usize) -> Option<ActorPtr> {
        let id = self.groups.get(group)?.get(index)?;
        self.get_proxy_by_id(id)
    }

    // -----------------------------------------------------------------------
    // Preset cameras
    // -----------------------------------------------------------------------

    /// Camera in slot `index`; default data for an invalid slot.
    #[must_use]
    pub fn preset_camera_data(&self, index: usize) -> PresetCameraData {
        self.preset_cameras.get(index).copied().unwrap_or_default()
    }

    /// Store a camera; invalid slots are ignored.
    pub fn set_preset_camera_data(&mut self, index: usize, data: PresetCameraData) {
        if let Some(slot) = self.preset_cameras.get_mut(index) {
            *slot = data;
        }
    }

    /// Number of preset camera slots.
    #[must_use]
    pub fn preset_camera_count(&self) -> usize {
        self.preset_cameras.len()
    }

    // -----------------------------------------------------------------------
    // Metadata
    // -----------------------------------------------------------------------

    /// File name, with extension.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Set the file name, appending the map extension when it has none.
    pub fn set_file_name(&mut self, file_name: &str) {
        self.file_name = file_name.to_string();
        if !self.file_name.is_empty() && file_extension(&self.file_name).is_empty() {
            self.file_name.push('.');
            self.file_name.push_str(self.kind.extension());
        }
    }

    /// Map name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the name; marks the map modified.
    pub fn set_name(&mut self, name: &str) {
        self.modified = true;
        self.name = name.to_string();
    }

    /// Name the map had when last saved.
    #[must_use]
    pub fn saved_name(&self) -> &str {
        &self.saved_name
    }

    /// Set the saved name without marking the map modified.
    pub fn set_saved_name(&mut self, name: &str) {
        self.saved_name = name.to_string();
    }

    /// Description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description; marks the map modified.
    pub fn set_description(&mut self, description: &str) {
        self.modified = true;
        self.description = description.to_string();
    }

    /// Author.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Set the author; marks the map modified.
    pub fn set_author(&mut self, author: &str) {
        self.modified = true;
        self.author = author.to_string();
    }

    /// Comment.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Set the comment; marks the map modified.
    pub fn set_comment(&mut self, comment: &str) {
        self.modified = true;
        self.comment = comment.to_string();
    }

    /// Copyright.
    #[must_use]
    pub fn copyright(&self) -> &str {
        &self.copyright
    }

    /// Set the copyright; marks the map modified.
    pub fn set_copyright(&mut self, copyright: &str) {
        self.modified = true;
        self.copyright = copyright.to_string();
    }

    /// Creation timestamp text.
    #[must_use]
    pub fn create_date_time(&self) -> &str {
        &self.create_date_time
    }

    /// Set the creation timestamp text; marks the map modified.
    pub fn set_create_date_time(&mut self, create_date_time: &str) {
        self.modified = true;
        self.create_date_time = create_date_time.to_string();
    }

    /// Stamp the creation time with the current UTC time (RFC 3339).
    pub fn stamp_create_date_time(&mut self) {
        let now = chrono::Utc::now().to_rfc3339();
        self.set_create_date_time(&now);
    }

    /// Icon file.
    #[must_use]
    pub fn icon_file(&self) -> &str {
        &self.icon_file
    }

    /// Set the icon file.
    pub fn set_icon_file(&mut self, icon_file: &str) {
        self.icon_file = icon_file.to_string();
    }
}

/// Extension of the last path component, without the dot.
fn file_extension(path: &str) -> &str {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    file.rfind('.').map_or("", |dot| &file[dot + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::BasicActor;
    use crate::actor_type::ActorType;
    use crate::property::{ActorIdActorProperty, ActorProperty, PropertyValue};

    fn actor(name: &str) -> ActorPtr {
        let t = ActorType::new("Thing", "test", "").with_class_name("Thing").into_ptr();
        BasicActor::new(t, name).into_ptr()
    }

    #[test]
    fn new_map_is_modified_with_extension_and_cameras() {
        let map = Map::new("levels/town", "Town");
        assert!(map.is_modified());
        assert_eq!(map.file_name(), "levels/town.dtmap");
        assert_eq!(map.preset_camera_count(), 10);
        assert_eq!(map.name(), "Town");

        let prefab = Map::new_prefab("house", "House");
        assert_eq!(prefab.file_name(), "house.dtprefab");
        assert_eq!(Map::new("", "x").file_name(), "");
        assert_eq!(Map::new("a.xml", "x").file_name(), "a.xml");
        assert_eq!(Map::new("dir.v2/a", "x").file_name(), "dir.v2/a.dtmap");
    }

    #[test]
    fn config_controls_camera_slots() {
        let config = MapConfig {
            preset_camera_slots: 3,
            ..MapConfig::default()
        };
        let map = Map::with_config(MapKind::Map, "m", "m", &config);
        assert_eq!(map.preset_camera_count(), 3);
    }

    #[test]
    fn file_extension_helper() {
        assert_eq!(file_extension("a/b.c/d"), "");
        assert_eq!(file_extension("a/b.c/d.e"), "e");
        assert_eq!(file_extension("x"), "");
    }

    #[test]
    fn add_proxy_records_class_hierarchy() {
        let mut map = Map::new("m", "m");
        let a = actor("Foo");
        assert!(map.add_proxy(a.clone(), false));
        assert!(map.proxy_actor_classes().contains("Thing"));
        assert_eq!(map.proxy_count(), 1);
        assert!(!map.add_proxy(a, false));
        assert_eq!(map.proxy_count(), 1);
    }

    #[test]
    fn remove_clears_id_references() {
        let mut map = Map::new("m", "m");
        let target = actor("Target");
        let holder_t = ActorType::new("Holder", "test", "").into_ptr();
        let reference = Rc::new(ActorIdActorProperty::new("Ref", ""));
        let holder: ActorPtr = BasicActor::new(holder_t, "Holder")
            .with_property(reference.clone())
            .into_ptr();
        reference.set_actor_id(target.borrow().id());

        map.add_proxy(target.clone(), false);
        map.add_proxy(holder, false);
        map.clear_modified();

        assert!(map.remove_proxy(&target));
        assert!(map.is_modified());
        assert_eq!(reference.value(), PropertyValue::Actor(UniqueId::null()));
        assert!(!map.remove_proxy(&target));
    }

    #[test]
    fn preset_camera_bounds() {
        let mut map = Map::new("m", "m");
        let data = PresetCameraData {
            is_valid: true,
            top_zoom: 3.0,
            ..PresetCameraData::default()
        };
        map.set_preset_camera_data(2, data);
        map.set_preset_camera_data(10, data);
        assert_eq!(map.preset_camera_data(2), data);
        assert_eq!(map.preset_camera_data(10), PresetCameraData::default());
        assert!(!map.preset_camera_data(0).is_valid);
        assert!((map.preset_camera_data(0).front_zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn metadata_setters_mark_modified_except_saved_name() {
        let mut map = Map::new("m", "m");
        map.clear_modified();
        map.set_saved_name("other");
        assert!(!map.is_modified());
        map.set_author("me");
        assert!(map.is_modified());
        map.clear_modified();
        assert_eq!(map.saved_name(), "m");
        map.stamp_create_date_time();
        assert!(map.is_modified());
        assert!(!map.create_date_time().is_empty());
    }

    #[test]
    fn event_guard_marks_modified() {
        let mut map = Map::new("m", "m");
        map.clear_modified();
        let event = GameEvent::new("Go", "");
        let id = event.id();
        map.event_manager_mut().add_event(event);
        assert!(map.is_modified());
        assert_eq!(map.event_manager().num_events(), 1);

        map.clear_modified();
        assert_eq!(map.event_manager_mut().num_events(), 1);
        assert!(!map.is_modified());
        map.event_manager_mut().remove_event(&id);
        assert!(map.is_modified());
    }
}
