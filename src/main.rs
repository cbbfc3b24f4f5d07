use studio_core::MapEditorApp;

fn main() {
    MapEditorApp::new().with_cli_args().run();
}
