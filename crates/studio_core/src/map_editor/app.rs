//! Map Editor Application Builder
//!
//! Fluent builder that assembles the multi-tab map editor: window, logging,
//! ImGui, the session core and the editor shell.
//!
//! # CLI Arguments
//!
//! - `--config <path>` - Config file to load (default: `assets/map_editor/studio.json`)
//! - `--exit-frame <N>` - Exit after N frames (optional, runs forever if not set)
//! - `--open <path>` - Map file to open on the first frame (repeatable)
//!
//! # Examples
//!
//! ```bash
//! cargo run -- --config assets/map_editor/studio.json
//! cargo run -- --exit-frame 60
//! cargo run -- --open maps/harbor.json
//! ```

use super::shell::{EditorShellPlugin, EditorShellSet};
use super::shell::MenuRequests;
use super::ui::{draw_map_tabs, draw_menu_and_dialogs, draw_welcome, TabStripState};
use crate::config::{StudioConfig, DEFAULT_CONFIG_PATH};
use crate::session::{in_app_state, AppState, SessionLifecyclePlugin};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use std::path::PathBuf;

/// Exit after a fixed number of frames.
#[derive(Resource, Debug, Clone, Copy)]
pub struct AutoExitConfig {
    /// Frame number to exit on.
    pub exit_frame: u32,
}

impl AutoExitConfig {
    pub fn new(exit_frame: u32) -> Self {
        Self { exit_frame }
    }
}

/// Frames run so far.
#[derive(Resource, Default)]
struct FrameCounter(u32);

/// Fluent builder for the map editor.
///
/// # Example
///
/// ```ignore
/// use studio_core::map_editor::MapEditorApp;
///
/// fn main() {
///     MapEditorApp::new()
///         .with_cli_args() // Parse --config, --exit-frame
///         .run();
/// }
/// ```
pub struct MapEditorApp {
    config_path: PathBuf,
    config: Option<StudioConfig>,
    exit_frame: Option<u32>,
    open_paths: Vec<PathBuf>,
}

impl Default for MapEditorApp {
    fn default() -> Self {
        Self::new()
    }
}

impl MapEditorApp {
    /// Create a builder that loads the config from the default path.
    pub fn new() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            config: None,
            exit_frame: None,
            open_paths: Vec::new(),
        }
    }

    /// Load the config from `path` instead of the default location.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Use `config` as-is and skip loading from disk.
    pub fn with_config(mut self, config: StudioConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Configure automatic exit after N frames.
    pub fn with_exit_frame(mut self, exit_frame: u32) -> Self {
        self.exit_frame = Some(exit_frame);
        self
    }

    /// Open the map at `path` on the first frame.
    pub fn with_open_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.open_paths.push(path.into());
        self
    }

    /// Parse command-line arguments to configure the app.
    ///
    /// Supported args:
    /// - `--config <path>` - Config file to load
    /// - `--exit-frame <N>` - Exit after N frames
    /// - `--open <path>` - Map file to open
    pub fn with_cli_args(self) -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        self.apply_args(&args)
    }

    fn apply_args(mut self, args: &[String]) -> Self {
        let mut i = 0;

        while i < args.len() {
            match args[i].as_str() {
                "--config" => {
                    if i + 1 < args.len() {
                        self.config_path = PathBuf::from(&args[i + 1]);
                        i += 2;
                    } else {
                        eprintln!("Warning: --config requires a path argument");
                        i += 1;
                    }
                }
                "--exit-frame" => {
                    if i + 1 < args.len() {
                        if let Ok(frame) = args[i + 1].parse() {
                            self.exit_frame = Some(frame);
                        } else {
                            eprintln!("Warning: --exit-frame requires a number");
                        }
                        i += 2;
                    } else {
                        eprintln!("Warning: --exit-frame requires a number argument");
                        i += 1;
                    }
                }
                "--open" => {
                    if i + 1 < args.len() {
                        self.open_paths.push(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        eprintln!("Warning: --open requires a path argument");
                        i += 1;
                    }
                }
                _ => {
                    i += 1; // Skip unknown args
                }
            }
        }

        self
    }

    /// Run the application.
    pub fn run(self) {
        let config = match self.config {
            Some(config) => config,
            None => StudioConfig::load_or_default(&self.config_path),
        };

        let mut app = App::new();

        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        resolution: config.resolution.into(),
                        title: config.title.clone(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: config.log_filter.clone(),
                    ..default()
                }),
        );
        app.add_plugins(bevy_mod_imgui::ImguiPlugin::default());

        app.insert_resource(ClearColor(Color::srgb(0.15, 0.15, 0.15)));
        app.add_plugins(SessionLifecyclePlugin {
            undo_limit: config.undo_limit,
        });
        app.insert_resource(config);
        app.add_plugins(EditorShellPlugin);
        app.world_mut()
            .resource_mut::<MenuRequests>()
            .open_paths
            .extend(self.open_paths);

        if let Some(exit_frame) = self.exit_frame {
            app.insert_resource(AutoExitConfig::new(exit_frame));
        }
        app.init_resource::<FrameCounter>();
        app.init_resource::<TabStripState>();

        app.add_systems(Startup, setup);
        app.add_systems(
            Update,
            (
                draw_menu_and_dialogs,
                draw_welcome.run_if(in_app_state(AppState::Startup)),
                draw_map_tabs.run_if(in_app_state(AppState::Editor)),
            )
                .chain()
                .in_set(EditorShellSet::Ui),
        );
        app.add_systems(Last, auto_exit_system);

        app.run();
    }
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Exit once the configured frame is reached.
#[allow(deprecated)]
fn auto_exit_system(
    mut frame_counter: ResMut<FrameCounter>,
    exit_config: Option<Res<AutoExitConfig>>,
    mut exit: EventWriter<AppExit>,
) {
    frame_counter.0 += 1;

    if let Some(ref config) = exit_config {
        if frame_counter.0 >= config.exit_frame {
            info!("Exiting after {} frames", frame_counter.0);
            exit.write(AppExit::Success);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cli_args() {
        let app = MapEditorApp::new().apply_args(&args(&[
            "--config",
            "custom/studio.json",
            "--exit-frame",
            "45",
            "--open",
            "maps/a.json",
            "--open",
            "maps/b.json",
        ]));
        assert_eq!(app.config_path, PathBuf::from("custom/studio.json"));
        assert_eq!(app.exit_frame, Some(45));
        assert_eq!(
            app.open_paths,
            vec![PathBuf::from("maps/a.json"), PathBuf::from("maps/b.json")]
        );
    }

    #[test]
    fn test_bad_cli_args_are_skipped() {
        let app = MapEditorApp::new().apply_args(&args(&["--exit-frame", "soon", "--unknown", "--config"]));
        assert_eq!(app.exit_frame, None);
        assert_eq!(app.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_auto_exit_after_frames() {
        let mut app = App::new();
        app.init_resource::<FrameCounter>();
        app.insert_resource(AutoExitConfig::new(2));
        app.add_systems(Update, auto_exit_system);

        app.update();
        assert!(app.should_exit().is_none());
        app.update();
        assert_eq!(app.should_exit(), Some(AppExit::Success));
    }
}
