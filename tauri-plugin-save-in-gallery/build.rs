const COMMANDS: &[&str] = &[
    "save_image",
    "save_images",
    "save_named_images",
    "invoke_method",
];

fn main() {
    tauri_plugin::Builder::new(COMMANDS)
        .android_path("android")
        .ios_path("ios")
        .build();
}
