//! ImGui pass for the editor shell.
//!
//! Drawn in `Update` under `EditorShellSet::Ui`. This is the frame's render
//! pass as far as sessions are concerned: tab close buttons are handled
//! while the tab list is being iterated, so they may only request a
//! deferred close.
//!
//! The Welcome window and the tab strip are separate systems gated with
//! `in_app_state`, so only the one for the current state runs.

use super::dialogs::{ModalChoice, Toasts, UnsavedChangesModal, UNSAVED_MODAL_ID};
use super::document::MapDocument;
use super::shell::{ClientSelection, MenuRequests};
use crate::session::{ClientVersionManager, LifecycleCoordinator, SessionBinding, SessionRegistry};
use bevy::prelude::*;
use bevy_mod_imgui::prelude::{Condition, ImguiContext};
use imgui::{TabItemFlags, Ui};

/// Client versions offered by File > Switch Client Version.
const CLIENT_VERSIONS: [u32; 4] = [860, 1098, 1310, 1320];

/// Tab strip bookkeeping between frames.
#[derive(Resource, Debug, Default)]
pub struct TabStripState {
    /// Active index the registry reported last frame.
    last_active: Option<usize>,
}

/// Menu bar, the unsaved-changes modal and toasts. Drawn in every state.
#[allow(clippy::too_many_arguments)]
pub fn draw_menu_and_dialogs(
    mut context: NonSendMut<ImguiContext>,
    registry: Res<SessionRegistry>,
    mut menu: ResMut<MenuRequests>,
    mut modal: ResMut<UnsavedChangesModal>,
    toasts: Res<Toasts>,
    client: Res<ClientVersionManager>,
    selection: Res<ClientSelection>,
    windows: Query<&Window>,
) {
    let ui = context.ui();

    draw_menu_bar(ui, &mut menu, &registry, &client, &selection);
    draw_modal(ui, &mut modal);

    let (width, height) = windows
        .iter()
        .next()
        .map(|w| (w.width(), w.height()))
        .unwrap_or((1280.0, 800.0));
    draw_toasts(ui, &toasts, [width, height]);
}

/// Welcome window shown while no map is open (Startup state).
pub fn draw_welcome(
    mut context: NonSendMut<ImguiContext>,
    mut menu: ResMut<MenuRequests>,
    selection: Res<ClientSelection>,
) {
    let ui = context.ui();
    ui.window("Welcome")
        .size([320.0, 120.0], Condition::FirstUseEver)
        .position([40.0, 60.0], Condition::FirstUseEver)
        .build(|| {
            ui.text(format!("Client version: {}", selection.version));
            ui.separator();
            if ui.button("New Map") {
                menu.new_map = true;
            }
        });
}

/// Tab strip and the active map (Editor state).
pub fn draw_map_tabs(
    mut context: NonSendMut<ImguiContext>,
    mut registry: ResMut<SessionRegistry>,
    mut lifecycle: ResMut<LifecycleCoordinator>,
    mut strip: ResMut<TabStripState>,
    binding: Res<SessionBinding>,
) {
    let ui = context.ui();
    draw_tabs(ui, &mut registry, &mut lifecycle, &mut strip, &binding);
}

fn draw_menu_bar(
    ui: &Ui,
    menu: &mut MenuRequests,
    registry: &SessionRegistry,
    client: &ClientVersionManager,
    selection: &ClientSelection,
) {
    ui.main_menu_bar(|| {
        ui.menu("File", || {
            if ui.menu_item("New") {
                menu.new_map = true;
            }
            if ui
                .menu_item_config("Close")
                .enabled(registry.active_index().is_some())
                .build()
            {
                menu.close_active = true;
            }
            ui.separator();
            ui.menu("Switch Client Version", || {
                let current = client.version().unwrap_or(selection.version);
                for version in CLIENT_VERSIONS {
                    if ui
                        .menu_item_config(format!("{}", version))
                        .selected(version == current)
                        .build()
                    {
                        menu.switch_version = Some(version);
                    }
                }
            });
        });
    });
}

fn draw_tabs(
    ui: &Ui,
    registry: &mut SessionRegistry,
    lifecycle: &mut LifecycleCoordinator,
    strip: &mut TabStripState,
    binding: &SessionBinding,
) {
    let active = registry.active_index();
    // Force ImGui's selection when the registry changed the active tab itself
    // (open, close, extraction).
    let forced = active != strip.last_active;
    let mut clicked = None;

    ui.window("Maps")
        .size([720.0, 520.0], Condition::FirstUseEver)
        .position([20.0, 40.0], Condition::FirstUseEver)
        .build(|| {
            let Some(_bar) = ui.tab_bar("##map_tabs") else {
                return;
            };

            for (index, session) in registry.iter().enumerate() {
                let mut open = true;
                let marker = if session.is_modified() { "*" } else { "" };
                let label = format!("{}{}###{}", session.display_name(), marker, session.id());
                let flags = if forced && Some(index) == active {
                    TabItemFlags::SET_SELECTED
                } else {
                    TabItemFlags::empty()
                };

                if let Some(_tab) = ui.tab_item_with_flags(&label, Some(&mut open), flags) {
                    if !forced && Some(index) != active {
                        clicked = Some(index);
                    }
                    draw_session_body(ui, session.document_as::<MapDocument>(), binding);
                }

                if !open {
                    lifecycle.request_close_tab(index);
                }
            }
        });

    if let Some(index) = clicked {
        registry.set_active_tab(index);
    }
    strip.last_active = registry.active_index();
}

fn draw_session_body(ui: &Ui, map: Option<&MapDocument>, binding: &SessionBinding) {
    let Some(map) = map else {
        ui.text_disabled("(unknown document)");
        return;
    };
    ui.text(format!("{}x{} tiles, client {}", map.width, map.height, map.client_version));
    ui.text(format!("{} placed tiles", map.tile_count()));
    ui.separator();
    ui.text(format!(
        "Camera ({:.0}, {:.0})  zoom {:.2}  floor {}",
        binding.view.camera_x, binding.view.camera_y, binding.view.zoom, binding.view.current_floor
    ));
}

fn draw_modal(ui: &Ui, modal: &mut UnsavedChangesModal) {
    if modal.take_open_request() {
        ui.open_popup(UNSAVED_MODAL_ID);
    }

    let mut choice = None;
    ui.modal_popup(UNSAVED_MODAL_ID, || {
        ui.text(format!("Save changes to {}?", modal.name()));
        ui.separator();
        if ui.button("Save") {
            choice = Some(ModalChoice::Save);
        }
        ui.same_line();
        if ui.button("Discard") {
            choice = Some(ModalChoice::Discard);
        }
        ui.same_line();
        if ui.button("Cancel") {
            choice = Some(ModalChoice::Cancel);
        }
        if choice.is_some() {
            ui.close_current_popup();
        }
    });

    if let Some(choice) = choice {
        modal.resolve(choice);
    }
}

fn draw_toasts(ui: &Ui, toasts: &Toasts, window_size: [f32; 2]) {
    for (i, toast) in toasts.iter().enumerate() {
        ui.window(format!("##toast{}", i))
            .position(
                [window_size[0] - 20.0, window_size[1] - 20.0 - i as f32 * 40.0],
                Condition::Always,
            )
            .position_pivot([1.0, 1.0])
            .title_bar(false)
            .resizable(false)
            .movable(false)
            .always_auto_resize(true)
            .build(|| {
                ui.text(&toast.message);
            });
    }
}
