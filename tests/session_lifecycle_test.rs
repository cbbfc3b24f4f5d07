//! Headless end-to-end tests of the editor: session plugin plus editor shell,
//! driven one frame at a time without a window or ImGui.

use bevy::prelude::*;
use studio_core::config::StudioConfig;
use studio_core::map_editor::{
    load_map, save_map, ClientSelection, EditorShellPlugin, MapDocument, MenuRequests,
    ModalChoice, Toasts, UnsavedChangesModal,
};
use studio_core::session::{
    AppState, AppStateMachine, ClientVersionManager, LifecycleCoordinator, MapRenderer,
    PendingVersionSwitch, RenderStates, SessionBinding, SessionId, SessionLifecyclePlugin,
    SessionRegistry,
};
use tempfile::tempdir;

fn editor_app(config: StudioConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(SessionLifecyclePlugin {
        undo_limit: config.undo_limit,
    });
    app.insert_resource(config);
    app.add_plugins(EditorShellPlugin);
    app
}

fn new_maps(app: &mut App, count: usize) {
    for _ in 0..count {
        app.world_mut().resource_mut::<MenuRequests>().new_map = true;
        app.update();
    }
}

fn tab_count(app: &App) -> usize {
    app.world().resource::<SessionRegistry>().tab_count()
}

fn is_in_state(app: &App, state: AppState) -> bool {
    app.world().resource::<AppStateMachine>().is_in_state(state)
}

#[test]
fn test_new_map_enters_editor() {
    let mut app = editor_app(StudioConfig::default());
    assert!(is_in_state(&app, AppState::Startup));

    new_maps(&mut app, 1);

    let world = app.world();
    let registry = world.resource::<SessionRegistry>();
    assert_eq!(registry.tab_count(), 1);
    assert_eq!(registry.active_index(), Some(0));
    assert_eq!(registry.session(0).unwrap().display_name(), "Untitled-1");
    assert!(is_in_state(&app, AppState::Editor));
    assert!(world.resource::<MapRenderer>().is_loaded());
    assert_eq!(world.resource::<ClientVersionManager>().version(), Some(1098));
}

#[test]
fn test_deferred_close_of_inactive_tab() {
    let mut app = editor_app(StudioConfig::default());
    new_maps(&mut app, 2);
    assert_eq!(
        app.world().resource::<SessionRegistry>().active_index(),
        Some(1)
    );

    let ids: Vec<SessionId> = app
        .world()
        .resource::<SessionRegistry>()
        .iter()
        .map(|s| s.id())
        .collect();

    // Two clicks on the same close button in one frame.
    {
        let mut lifecycle = app.world_mut().resource_mut::<LifecycleCoordinator>();
        lifecycle.request_close_tab(0);
        lifecycle.request_close_tab(0);
    }
    assert_eq!(tab_count(&app), 2);

    app.update();

    let world = app.world();
    let registry = world.resource::<SessionRegistry>();
    assert_eq!(registry.tab_count(), 1);
    assert_eq!(registry.active_index(), Some(0));
    assert_eq!(registry.session(0).unwrap().display_name(), "Untitled-2");

    let render_states = world.resource::<RenderStates>();
    assert_eq!(render_states.destroyed_total(), 1);
    assert!(!render_states.contains(ids[0]));
    assert!(render_states.contains(ids[1]));
    assert!(is_in_state(&app, AppState::Editor));
}

#[test]
fn test_sync_close_of_last_tab_returns_to_startup() {
    let mut app = editor_app(StudioConfig::default());
    new_maps(&mut app, 1);
    assert!(app.world().resource::<SessionBinding>().is_bound());

    app.world_mut().resource_mut::<MenuRequests>().close_active = true;
    app.update();

    let world = app.world();
    assert_eq!(tab_count(&app), 0);
    assert!(!world.resource::<SessionBinding>().is_bound());
    assert!(world.resource::<RenderStates>().is_empty());
    assert!(!world.resource::<ClientVersionManager>().has_client_data());
    assert!(!world.resource::<MapRenderer>().is_loaded());
    assert!(is_in_state(&app, AppState::Startup));
}

#[test]
fn test_sync_close_rebinds_to_remaining_tab() {
    let mut app = editor_app(StudioConfig::default());
    new_maps(&mut app, 2);
    let first = app.world().resource::<SessionRegistry>().session(0).unwrap().id();

    app.world_mut().resource_mut::<MenuRequests>().close_active = true;
    app.update();

    assert_eq!(tab_count(&app), 1);
    assert_eq!(app.world().resource::<SessionBinding>().bound(), Some(first));
}

#[test]
fn test_sync_close_does_not_retarget_deferred_close() {
    let mut app = editor_app(StudioConfig::default());
    new_maps(&mut app, 3);
    let ids: Vec<SessionId> = app
        .world()
        .resource::<SessionRegistry>()
        .iter()
        .map(|s| s.id())
        .collect();
    app.world_mut().resource_mut::<SessionRegistry>().set_active_tab(0);

    // Close button on the third tab plus File > Close on the first, same frame.
    app.world_mut()
        .resource_mut::<LifecycleCoordinator>()
        .request_close_tab(2);
    app.world_mut().resource_mut::<MenuRequests>().close_active = true;
    app.update();

    let remaining: Vec<SessionId> = app
        .world()
        .resource::<SessionRegistry>()
        .iter()
        .map(|s| s.id())
        .collect();
    assert_eq!(remaining, vec![ids[1]]);
    assert_eq!(app.world().resource::<RenderStates>().len(), 1);
}

#[test]
fn test_switch_without_unsaved_changes_completes_in_one_frame() {
    let mut app = editor_app(StudioConfig::default());
    new_maps(&mut app, 2);

    app.world_mut().resource_mut::<MenuRequests>().switch_version = Some(860);
    app.update();

    let world = app.world();
    assert_eq!(tab_count(&app), 0);
    assert!(world.resource::<RenderStates>().is_empty());
    assert_eq!(world.resource::<RenderStates>().destroyed_total(), 2);
    assert!(!world.resource::<UnsavedChangesModal>().is_visible());
    assert!(!world.resource::<PendingVersionSwitch>().armed);
    assert!(!world.resource::<ClientVersionManager>().has_client_data());
    assert_eq!(world.resource::<ClientSelection>().version, 860);
    assert!(world
        .resource::<Toasts>()
        .iter()
        .any(|t| t.message == "Ready to open new map"));
    assert!(is_in_state(&app, AppState::Startup));

    // The next map opens against the new client version.
    new_maps(&mut app, 1);
    assert_eq!(
        app.world().resource::<ClientVersionManager>().version(),
        Some(860)
    );
}

#[test]
fn test_switch_with_unsaved_changes_waits_for_discard() {
    let mut app = editor_app(StudioConfig::default());
    new_maps(&mut app, 2);
    app.world_mut()
        .resource_mut::<SessionRegistry>()
        .session_mut(0)
        .unwrap()
        .record("place tile");

    app.world_mut().resource_mut::<MenuRequests>().switch_version = Some(860);
    app.update();

    {
        let world = app.world();
        assert_eq!(tab_count(&app), 2);
        let modal = world.resource::<UnsavedChangesModal>();
        assert!(modal.is_visible());
        assert_eq!(modal.name(), "All open maps");
        assert!(world.resource::<PendingVersionSwitch>().armed);
        assert!(is_in_state(&app, AppState::Editor));
    }

    // Nothing happens while the modal is open.
    app.update();
    assert_eq!(tab_count(&app), 2);

    app.world_mut()
        .resource_mut::<UnsavedChangesModal>()
        .resolve(ModalChoice::Discard);
    app.update();

    let world = app.world();
    assert_eq!(tab_count(&app), 0);
    assert_eq!(world.resource::<RenderStates>().destroyed_total(), 2);
    assert!(!world.resource::<PendingVersionSwitch>().armed);
    assert_eq!(world.resource::<ClientSelection>().version, 860);
    assert!(is_in_state(&app, AppState::Startup));
}

#[test]
fn test_switch_cancel_keeps_sessions() {
    let mut app = editor_app(StudioConfig::default());
    new_maps(&mut app, 1);
    app.world_mut()
        .resource_mut::<SessionRegistry>()
        .session_mut(0)
        .unwrap()
        .set_modified(true);

    app.world_mut().resource_mut::<MenuRequests>().switch_version = Some(860);
    app.update();
    app.world_mut()
        .resource_mut::<UnsavedChangesModal>()
        .resolve(ModalChoice::Cancel);
    app.update();

    let world = app.world();
    assert_eq!(tab_count(&app), 1);
    assert!(world.resource::<SessionRegistry>().has_unsaved_changes());
    assert!(!world.resource::<PendingVersionSwitch>().armed);
    assert_eq!(world.resource::<ClientSelection>().version, 1098);
    assert_eq!(world.resource::<ClientVersionManager>().version(), Some(1098));
    assert!(is_in_state(&app, AppState::Editor));
}

#[test]
fn test_switch_save_writes_maps_before_teardown() {
    let dir = tempdir().unwrap();
    let maps_dir = dir.path().join("maps");
    let mut app = editor_app(StudioConfig {
        maps_dir: maps_dir.clone(),
        ..Default::default()
    });
    new_maps(&mut app, 2);
    app.world_mut()
        .resource_mut::<SessionRegistry>()
        .session_mut(1)
        .unwrap()
        .record("place tile");

    app.world_mut().resource_mut::<MenuRequests>().switch_version = Some(1310);
    app.update();
    app.world_mut()
        .resource_mut::<UnsavedChangesModal>()
        .resolve(ModalChoice::Save);
    app.update();

    let world = app.world();
    assert_eq!(tab_count(&app), 0);
    assert_eq!(world.resource::<ClientSelection>().version, 1310);
    assert!(is_in_state(&app, AppState::Startup));

    // Only the modified map was written.
    let saved = load_map(maps_dir.join("Untitled-2.json")).unwrap();
    assert_eq!((saved.width, saved.height, saved.client_version), (256, 256, 1098));
    assert!(!maps_dir.join("Untitled-1.json").exists());
}

#[test]
fn test_switch_save_failure_keeps_sessions() {
    let dir = tempdir().unwrap();
    // A regular file where the maps directory should be.
    let blocked = dir.path().join("maps");
    std::fs::write(&blocked, "not a directory").unwrap();
    let mut app = editor_app(StudioConfig {
        maps_dir: blocked,
        ..Default::default()
    });
    new_maps(&mut app, 1);
    app.world_mut()
        .resource_mut::<SessionRegistry>()
        .session_mut(0)
        .unwrap()
        .record("place tile");

    app.world_mut().resource_mut::<MenuRequests>().switch_version = Some(860);
    app.update();
    app.world_mut()
        .resource_mut::<UnsavedChangesModal>()
        .resolve(ModalChoice::Save);
    app.update();

    let world = app.world();
    assert_eq!(tab_count(&app), 1);
    assert!(world.resource::<SessionRegistry>().has_unsaved_changes());
    assert!(world.resource::<SessionBinding>().is_bound());
    assert!(!world.resource::<PendingVersionSwitch>().armed);
    assert_eq!(world.resource::<ClientSelection>().version, 1098);
    assert_eq!(world.resource::<RenderStates>().destroyed_total(), 0);
    assert!(world
        .resource::<Toasts>()
        .iter()
        .any(|t| t.message.starts_with("Could not save 1 map")));
    assert!(is_in_state(&app, AppState::Editor));
}

#[test]
fn test_open_map_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("harbor.json");
    let mut map = MapDocument::new("harbor", 16, 8, 860);
    map.set(3, 5, 412);
    save_map(&map, &path).unwrap();

    let mut app = editor_app(StudioConfig::default());
    {
        let mut menu = app.world_mut().resource_mut::<MenuRequests>();
        menu.open_paths.push(path.clone());
        menu.open_paths.push(dir.path().join("missing.json"));
    }
    app.update();

    let world = app.world();
    let registry = world.resource::<SessionRegistry>();
    assert_eq!(registry.tab_count(), 1);
    let session = registry.session(0).unwrap();
    assert_eq!(session.display_name(), "harbor.json");
    assert_eq!(session.file_path(), Some(path.as_path()));
    assert_eq!(session.document_as::<MapDocument>().unwrap().get(3, 5), 412);
    assert_eq!(world.resource::<ClientVersionManager>().version(), Some(860));
    assert!(world
        .resource::<Toasts>()
        .iter()
        .any(|t| t.message.starts_with("Could not open")));
    assert!(is_in_state(&app, AppState::Editor));
}

#[test]
fn test_loaded_config_drives_the_shell() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("studio.json");
    let config = StudioConfig {
        undo_limit: 2,
        default_client_version: 860,
        default_map_size: (8, 4),
        switch_notice: "Pick a map".to_string(),
        ..Default::default()
    };
    config.save(&path).unwrap();

    let mut app = editor_app(StudioConfig::load(&path).unwrap());
    new_maps(&mut app, 1);

    {
        let mut registry = app.world_mut().resource_mut::<SessionRegistry>();
        let session = registry.session_mut(0).unwrap();
        let map = session.document_as::<MapDocument>().unwrap();
        assert_eq!((map.width, map.height, map.client_version), (8, 4, 860));

        session.record("a");
        session.record("b");
        session.record("c");
        assert_eq!(session.history().undo_len(), 2);
    }

    app.world_mut().resource_mut::<MenuRequests>().switch_version = Some(1098);
    app.world_mut()
        .resource_mut::<SessionRegistry>()
        .session_mut(0)
        .unwrap()
        .set_modified(false);
    app.update();
    assert!(app
        .world()
        .resource::<Toasts>()
        .iter()
        .any(|t| t.message == "Pick a map"));
}
