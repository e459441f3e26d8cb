#![forbid(unsafe_code)]

//! `automap` renders wiki page metadata as markers on an embedded map.
//!
//! Layers of points are registered per page, merged per map container with first-layer-wins
//! deduplication, and turned into popups linking back to the wiki. See `automap-core` for the
//! model and `automap-render` for widget output.
//!
//! # Features
//!
//! - `render`: mount composed maps onto a widget and emit Leaflet HTML (`automap::render`)

pub use automap_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use automap_render::{
        GroupHandle, LeafletScript, MapWidget, MarkerHandle, RecordingWidget, WidgetCall, mount,
        render_map_html, sanitize_container_id,
    };

    use automap_core::{ComposeOptions, MapConfig, MergedView, PageManifest, Registry};

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Load(#[from] automap_core::Error),
        #[error(transparent)]
        Render(#[from] automap_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Synchronous compose + HTML helper (executor-free).
    pub fn compose_and_render_sync<S: AsRef<str>>(
        registry: &Registry,
        container: &str,
        layers: &[S],
        options: &ComposeOptions,
        config: &MapConfig,
    ) -> Result<String> {
        let view = automap_core::compose_map(registry, container, layers, options);
        Ok(automap_render::render_map_html(&view, config)?)
    }

    pub async fn compose_and_render<S: AsRef<str>>(
        registry: &Registry,
        container: &str,
        layers: &[S],
        options: &ComposeOptions,
        config: &MapConfig,
    ) -> Result<String> {
        compose_and_render_sync(registry, container, layers, options, config)
    }

    /// A composed map together with the widget settings it should be rendered with.
    #[derive(Debug, Clone)]
    pub struct PageMap {
        pub view: MergedView,
        pub config: MapConfig,
    }

    impl PageMap {
        pub fn html(&self) -> Result<String> {
            Ok(automap_render::render_map_html(&self.view, &self.config)?)
        }
    }

    /// Loads every layer of a manifest, runs the page hooks and returns the composed maps in
    /// manifest order.
    pub fn compose_manifest_sync(
        manifest: &PageManifest,
        source: &dyn automap_core::LayerSource,
        options: automap_core::LoadOptions,
    ) -> Result<Vec<PageMap>> {
        let mut session = manifest.session(source, options);
        session.on_load()?;
        let ctx = session.into_context();
        Ok(ctx
            .into_maps()
            .into_iter()
            .map(|view| {
                let config = manifest
                    .map_entry(&view.container)
                    .map(|entry| entry.map_config())
                    .unwrap_or_default();
                PageMap { view, config }
            })
            .collect())
    }

    pub async fn compose_manifest(
        manifest: &PageManifest,
        source: &dyn automap_core::LayerSource,
        options: automap_core::LoadOptions,
    ) -> Result<Vec<PageMap>> {
        compose_manifest_sync(manifest, source, options)
    }
}
