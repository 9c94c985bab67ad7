use tauri::{
    plugin::{Builder, TauriPlugin},
    Manager, Runtime,
};

pub use save_in_gallery_core::{
    Config, Error, GalleryFormat, MethodCall, NamedImage, ResolvedFileName, Result, SaveBatch,
    SaveImageRequest, SaveImagesRequest, SaveMethod, SaveNamedImagesRequest,
};

#[cfg(desktop)]
mod desktop;
#[cfg(mobile)]
mod mobile;
#[cfg(any(mobile, test))]
mod status;

mod commands;
mod gallery;

pub use gallery::SaveInGallery;

/// Extensions to [`tauri::App`], [`tauri::AppHandle`] and [`tauri::Window`] to access the save-in-gallery APIs.
pub trait SaveInGalleryExt<R: Runtime> {
    fn save_in_gallery(&self) -> &SaveInGallery;
}

impl<R: Runtime, T: Manager<R>> crate::SaveInGalleryExt<R> for T {
    fn save_in_gallery(&self) -> &SaveInGallery {
        self.state::<SaveInGallery>().inner()
    }
}

/// Initializes the save-in-gallery plugin.
///
/// Configuration is read from `plugins."save-in-gallery"` in `tauri.conf.json`:
///
/// ```json
/// { "plugins": { "save-in-gallery": { "jpegQuality": 100 } } }
/// ```
pub fn init<R: Runtime>() -> TauriPlugin<R, Option<Config>> {
    Builder::<R, Option<Config>>::new("save-in-gallery")
        .invoke_handler(tauri::generate_handler![
            commands::save_image,
            commands::save_images,
            commands::save_named_images,
            commands::invoke_method,
        ])
        .setup(|app, api| {
            #[cfg(mobile)]
            let gallery = mobile::init(app, api)?;
            #[cfg(desktop)]
            let gallery = desktop::init(app, api)?;
            app.manage(gallery);
            Ok(())
        })
        .build()
}
