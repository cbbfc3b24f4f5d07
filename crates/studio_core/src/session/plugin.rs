//! Bevy wiring for the session core.
//!
//! Frame order:
//! - `Update`: the editor UI and shell actions (the tab strip may call
//!   `request_close_tab` here, menu commands may close a tab synchronously)
//! - `Update`, `SessionSet::BindingSync`: the workspace binding follows the
//!   tab changes recorded so far
//! - `Last`, `SessionSet::DeferredActions`: the lifecycle protocol
//! - `Last`, `SessionSet::DocumentLoads`: documents parked during the frame,
//!   then the binding follows again
//!
//! Per-state systems are gated with `in_app_state`.

use super::app_state::AppStateMachine;
use super::binding::{SessionBinding, TabChanges};
use super::capabilities::Resettable;
use super::client_version::{ClientDataCache, ClientVersionManager};
use super::id::SessionIdGenerator;
use super::lifecycle::LifecycleCoordinator;
use super::loader::DocumentLoadQueue;
use super::registry::SessionRegistry;
use super::render_state::{MapRenderer, RenderStates};
use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionSet {
    /// The workspace binding follows recorded tab changes.
    BindingSync,
    /// Deferred close/destroy protocol, after the UI pass.
    DeferredActions,
    /// Deferred document loads, after `DeferredActions`.
    DocumentLoads,
}

/// Set while a version switch waits on the unsaved-changes modal.
#[derive(Resource, Debug, Default)]
pub struct PendingVersionSwitch {
    pub armed: bool,
}

/// Plugin that owns the session resources and the per-frame protocol.
pub struct SessionLifecyclePlugin {
    /// Undo entries kept per session (0 = unlimited).
    pub undo_limit: usize,
}

impl Default for SessionLifecyclePlugin {
    fn default() -> Self {
        Self { undo_limit: 500 }
    }
}

impl Plugin for SessionLifecyclePlugin {
    fn build(&self, app: &mut App) {
        let changes = TabChanges::default();
        let mut registry =
            SessionRegistry::with_ids(SessionIdGenerator::new()).with_undo_limit(self.undo_limit);
        registry.add_listener(changes.listener());

        app.insert_resource(registry).insert_resource(changes);
        app.init_resource::<LifecycleCoordinator>()
            .init_resource::<RenderStates>()
            .init_resource::<MapRenderer>()
            .init_resource::<AppStateMachine>()
            .init_resource::<ClientVersionManager>()
            .init_resource::<ClientDataCache>()
            .init_resource::<SessionBinding>()
            .init_resource::<DocumentLoadQueue>()
            .init_resource::<PendingVersionSwitch>();

        app.configure_sets(
            Last,
            (SessionSet::DeferredActions, SessionSet::DocumentLoads).chain(),
        );

        app.add_systems(Update, follow_tab_changes.in_set(SessionSet::BindingSync));
        app.add_systems(
            Last,
            process_deferred_actions_system.in_set(SessionSet::DeferredActions),
        );
        app.add_systems(
            Last,
            (process_document_loads_system, follow_tab_changes)
                .chain()
                .in_set(SessionSet::DocumentLoads),
        );
    }
}

/// Cleanup run when the last tab closes: renderer, client data and cached
/// client references, in that order.
struct ClientTeardown<'a> {
    renderer: &'a mut MapRenderer,
    client: &'a mut ClientVersionManager,
    cache: &'a mut ClientDataCache,
}

impl Resettable for ClientTeardown<'_> {
    fn reset(&mut self) {
        self.renderer.release();
        self.client.release_all();
        self.cache.reset();
    }
}

/// Re-sync the binding if the registry reported any tab change.
fn follow_tab_changes(
    changes: Res<TabChanges>,
    mut binding: ResMut<SessionBinding>,
    mut registry: ResMut<SessionRegistry>,
) {
    let drained = changes.drain();
    if drained.is_empty() {
        return;
    }
    debug!("SessionBinding: {} tab change(s) {:?}", drained.len(), drained);
    binding.sync(&mut registry);
}

#[allow(clippy::too_many_arguments)]
fn process_deferred_actions_system(
    mut registry: ResMut<SessionRegistry>,
    mut lifecycle: ResMut<LifecycleCoordinator>,
    mut render_states: ResMut<RenderStates>,
    mut renderer: ResMut<MapRenderer>,
    mut state: ResMut<AppStateMachine>,
    mut client: ResMut<ClientVersionManager>,
    mut cache: ResMut<ClientDataCache>,
    mut binding: ResMut<SessionBinding>,
) {
    let mut teardown = ClientTeardown {
        renderer: &mut *renderer,
        client: &mut *client,
        cache: &mut *cache,
    };
    let report = lifecycle.process_deferred_actions(
        &mut registry,
        &mut *render_states,
        Some(&mut *binding),
        &mut state,
        Some(&mut teardown),
    );
    if report.destroyed > 0 {
        debug!("SessionLifecycle: frame report {:?}", report);
    }
}

fn process_document_loads_system(
    mut queue: ResMut<DocumentLoadQueue>,
    mut registry: ResMut<SessionRegistry>,
    mut render_states: ResMut<RenderStates>,
    mut state: ResMut<AppStateMachine>,
) {
    if !queue.has_pending() {
        return;
    }
    queue.process(&mut registry, &mut *render_states, &mut state);
}
