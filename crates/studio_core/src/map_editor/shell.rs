//! Editor shell logic: menu commands, the version switch flow and toasts.
//!
//! The ImGui pass (`ui`) only records what the user asked for
//! in `MenuRequests` and in the modal. The systems here act on it afterwards,
//! still inside `Update`, so they run headless in tests.

use super::dialogs::{ModalChoice, Toasts, UnsavedChangesModal};
use super::document::MapDocument;
use super::map_io::{load_map, JsonMapSaver};
use crate::config::StudioConfig;
use crate::session::{
    AppStateMachine, ClientData, ClientDataCache, ClientVersionManager, DocumentLoadQueue,
    LifecycleCoordinator, MapRenderer, Notifier, PendingVersionSwitch, RenderStates,
    SessionBinding, SessionRegistry, SessionSet, SwitchOutcome, VersionSwitch,
    VersionSwitchHooks,
};
use bevy::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sprite atlas pages assumed per client load.
const ATLAS_PAGES: usize = 4;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditorShellSet {
    /// ImGui drawing (only present with a window).
    Ui,
    /// Acting on what the UI recorded.
    Actions,
}

/// Commands picked from the menu bar this frame.
#[derive(Resource, Debug, Default)]
pub struct MenuRequests {
    /// File > New.
    pub new_map: bool,
    /// Map files to open (`--open` on the command line).
    pub open_paths: Vec<PathBuf>,
    /// File > Close (synchronous close of the active tab).
    pub close_active: bool,
    /// File > Switch Client Version, with the version to switch to.
    pub switch_version: Option<u32>,
}

/// Client version used for the next map when no client is loaded.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ClientSelection {
    pub version: u32,
}

/// Set by the modal's save callback; consumed when the switch resumes.
#[derive(Resource, Debug, Default, Clone)]
pub struct SaveAllFlag(pub Arc<AtomicBool>);

/// Target of a switch waiting on the modal.
#[derive(Resource, Debug, Default)]
struct SwitchTarget(Option<u32>);

pub struct EditorShellPlugin;

impl Plugin for EditorShellPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<StudioConfig>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(Toasts::new(config.notification_ms))
            .insert_resource(ClientSelection {
                version: config.default_client_version,
            })
            .insert_resource(config)
            .init_resource::<UnsavedChangesModal>()
            .init_resource::<MenuRequests>()
            .init_resource::<SaveAllFlag>()
            .init_resource::<SwitchTarget>();

        app.configure_sets(
            Update,
            (EditorShellSet::Ui, EditorShellSet::Actions)
                .chain()
                .before(SessionSet::BindingSync),
        );
        app.add_systems(
            Update,
            (handle_menu_requests, handle_version_switch, tick_toasts)
                .chain()
                .in_set(EditorShellSet::Actions),
        );
    }
}

/// Make sure client data for `version` and the renderer are loaded before a
/// map is opened.
fn ensure_client_loaded(
    version: u32,
    client: &mut ClientVersionManager,
    cache: &mut ClientDataCache,
    renderer: &mut MapRenderer,
) {
    if !client.has_client_data() {
        let data = match cache.reusable_for(version) {
            Some(cached) => client.set_client_data((*cached).clone()),
            None => client.set_client_data(ClientData::new(version, 0, 0)),
        };
        cache.set(data);
    }
    if !renderer.is_loaded() {
        renderer.initialize(ATLAS_PAGES);
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_menu_requests(
    mut menu: ResMut<MenuRequests>,
    selection: Res<ClientSelection>,
    config: Res<StudioConfig>,
    mut registry: ResMut<SessionRegistry>,
    mut lifecycle: ResMut<LifecycleCoordinator>,
    mut render_states: ResMut<RenderStates>,
    mut renderer: ResMut<MapRenderer>,
    mut client: ResMut<ClientVersionManager>,
    mut cache: ResMut<ClientDataCache>,
    mut loads: ResMut<DocumentLoadQueue>,
    mut toasts: ResMut<Toasts>,
    mut untitled: Local<usize>,
) {
    if std::mem::take(&mut menu.new_map) {
        let version = client.version().unwrap_or(selection.version);
        ensure_client_loaded(version, &mut client, &mut cache, &mut renderer);

        *untitled += 1;
        let (width, height) = config.default_map_size;
        let name = format!("Untitled-{}", *untitled);
        info!("Editor: new map {} ({}x{}, client {})", name, width, height, version);
        loads.request(Box::new(MapDocument::new(name, width, height, version)), None);
    }

    for path in std::mem::take(&mut menu.open_paths) {
        match load_map(&path) {
            Ok(map) => {
                let version = client.version().unwrap_or(map.client_version);
                if version != map.client_version {
                    warn!(
                        "Editor: {:?} was made for client {}, client {} is loaded",
                        path, map.client_version, version
                    );
                }
                ensure_client_loaded(version, &mut client, &mut cache, &mut renderer);
                info!("Editor: opening {:?}", path);
                loads.request(Box::new(map), Some(path));
            }
            Err(e) => {
                warn!("Editor: failed to open {:?}: {}", path, e);
                toasts.notify(&format!("Could not open {}", path.display()));
            }
        }
    }

    if std::mem::take(&mut menu.close_active) {
        if let Some(index) = registry.active_index() {
            info!("Editor: closing tab {}", index);
            registry.close_tab(index, &mut *render_states);
            lifecycle.note_tab_removed(index);
        }
    }
}

/// Teardown run by a version switch, in the order `VersionSwitch::perform`
/// expects.
fn switch_hooks<'a>(
    renderer: &'a mut MapRenderer,
    client: &'a mut ClientVersionManager,
    binding: &'a mut SessionBinding,
    cache: &'a mut ClientDataCache,
    state: &'a mut AppStateMachine,
    toasts: &'a mut Toasts,
) -> VersionSwitchHooks<'a> {
    VersionSwitchHooks {
        renderer: Some(renderer),
        client_resources: Some(client),
        ui: Some(binding),
        cached_references: Some(cache),
        state: Some(state),
        notifier: Some(toasts),
    }
}

/// Save every modified map. Returns false, leaving the sessions open, if
/// any of them could not be written.
fn save_before_switch(
    registry: &mut SessionRegistry,
    config: &StudioConfig,
    toasts: &mut Toasts,
) -> bool {
    let mut saver = JsonMapSaver::new(&config.maps_dir);
    let report = registry.save_modified(&mut saver);
    if report.all_saved() {
        info!("Editor: saved {} map(s) before switching", report.saved.len());
        return true;
    }
    warn!("Editor: version switch stopped, {} map(s) not saved", report.failed.len());
    toasts.notify(&format!(
        "Could not save {} map(s), client version not switched",
        report.failed.len()
    ));
    false
}

#[allow(clippy::too_many_arguments)]
fn handle_version_switch(
    mut menu: ResMut<MenuRequests>,
    config: Res<StudioConfig>,
    mut selection: ResMut<ClientSelection>,
    mut target: ResMut<SwitchTarget>,
    mut pending: ResMut<PendingVersionSwitch>,
    save_all: Res<SaveAllFlag>,
    mut modal: ResMut<UnsavedChangesModal>,
    mut toasts: ResMut<Toasts>,
    mut registry: ResMut<SessionRegistry>,
    mut lifecycle: ResMut<LifecycleCoordinator>,
    mut renderer: ResMut<MapRenderer>,
    mut client: ResMut<ClientVersionManager>,
    mut binding: ResMut<SessionBinding>,
    mut cache: ResMut<ClientDataCache>,
    mut state: ResMut<AppStateMachine>,
) {
    let mut completed = false;

    if let Some(version) = menu.switch_version.take() {
        if pending.armed {
            debug!("Editor: version switch already waiting on the modal");
        } else {
            target.0 = Some(version);
            let flag = save_all.0.clone();
            let on_save = Box::new(move || flag.store(true, Ordering::SeqCst));
            let hooks = switch_hooks(
                &mut renderer,
                &mut client,
                &mut binding,
                &mut cache,
                &mut state,
                &mut toasts,
            );
            let outcome = VersionSwitch::new(&mut registry, &mut lifecycle)
                .with_notice(&config.switch_notice)
                .with_prompt_name(&config.unsaved_prompt_name)
                .initiate(Some(&mut *modal), on_save, hooks);
            match outcome {
                SwitchOutcome::Pending => pending.armed = true,
                SwitchOutcome::Completed => completed = true,
            }
        }
    } else if pending.armed {
        let resume = match modal.take_choice() {
            Some(ModalChoice::Save) => {
                let saved = !save_all.0.swap(false, Ordering::SeqCst)
                    || save_before_switch(&mut registry, &config, &mut toasts);
                if !saved {
                    pending.armed = false;
                    target.0 = None;
                }
                saved
            }
            Some(ModalChoice::Discard) => true,
            Some(ModalChoice::Cancel) => {
                info!("Editor: version switch cancelled");
                pending.armed = false;
                target.0 = None;
                false
            }
            None => false,
        };

        if resume {
            pending.armed = false;
            let hooks = switch_hooks(
                &mut renderer,
                &mut client,
                &mut binding,
                &mut cache,
                &mut state,
                &mut toasts,
            );
            VersionSwitch::new(&mut registry, &mut lifecycle)
                .with_notice(&config.switch_notice)
                .perform(hooks);
            completed = true;
        }
    }

    if completed {
        if let Some(version) = target.0.take() {
            selection.version = version;
        }
    }
}

fn tick_toasts(time: Res<Time>, mut toasts: ResMut<Toasts>) {
    if toasts.is_empty() {
        return;
    }
    toasts.tick(time.delta().as_millis() as u64);
}
