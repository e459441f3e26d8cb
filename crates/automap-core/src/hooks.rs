use crate::Result;
use crate::compose::{ComposeOptions, MergedView, compose_map};
use crate::registry::Registry;
use indexmap::IndexMap;

/// Hook run first on page load; callbacks populate the registry.
pub const MAP_LAYERS_HOOK: &str = "map_layers";
/// Hook run second on page load; callbacks compose maps.
pub const MAPS_HOOK: &str = "maps";

type HookFn<'a, C> = Box<dyn FnOnce(&mut C) -> Result<()> + 'a>;

/// Named callback lists, run on demand in registration order.
pub struct Hooks<'a, C> {
    hooks: IndexMap<String, Vec<HookFn<'a, C>>>,
}

impl<C> Default for Hooks<'_, C> {
    fn default() -> Self {
        Self {
            hooks: IndexMap::new(),
        }
    }
}

impl<C> std::fmt::Debug for Hooks<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, fns) in &self.hooks {
            map.entry(name, &fns.len());
        }
        map.finish()
    }
}

impl<'a, C> Hooks<'a, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hook(&mut self, name: &str, f: impl FnOnce(&mut C) -> Result<()> + 'a) {
        self.hooks
            .entry(name.to_string())
            .or_default()
            .push(Box::new(f));
    }

    pub fn pending(&self, name: &str) -> usize {
        self.hooks.get(name).map_or(0, Vec::len)
    }

    /// Runs and removes every callback registered under `name`, stopping at the first error.
    ///
    /// Returns how many callbacks ran.
    pub fn run_hooks(&mut self, name: &str, ctx: &mut C) -> Result<usize> {
        let Some(fns) = self.hooks.shift_remove(name) else {
            return Ok(0);
        };
        let mut ran = 0usize;
        for f in fns {
            f(ctx)?;
            ran += 1;
        }
        Ok(ran)
    }
}

/// State shared by a page's hooks: the registry and the maps composed from it.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub registry: Registry,
    maps: IndexMap<String, MergedView>,
}

impl PageContext {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            maps: IndexMap::new(),
        }
    }

    /// Composes a map for `container` and keeps it; a second call for the same container
    /// replaces the earlier view.
    pub fn create_map<S: AsRef<str>>(
        &mut self,
        container: &str,
        layers: &[S],
        options: &ComposeOptions,
    ) -> &MergedView {
        let view = compose_map(&self.registry, container, layers, options);
        tracing::debug!(
            container,
            groups = view.groups.len(),
            markers = view.marker_count(),
            duplicates = view.duplicates_skipped,
            "composed map"
        );
        let (index, _) = self.maps.insert_full(container.to_string(), view);
        &self.maps[index]
    }

    pub fn map(&self, container: &str) -> Option<&MergedView> {
        self.maps.get(container)
    }

    pub fn maps(&self) -> impl Iterator<Item = &MergedView> {
        self.maps.values()
    }

    pub fn into_maps(self) -> Vec<MergedView> {
        self.maps.into_values().collect()
    }
}

/// One page view: hooks are registered while the page is assembled, then [`PageSession::on_load`]
/// runs the layer hooks before the map hooks.
#[derive(Debug, Default)]
pub struct PageSession<'a> {
    hooks: Hooks<'a, PageContext>,
    ctx: PageContext,
    loaded: bool,
}

impl<'a> PageSession<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_map_layers(&mut self, f: impl FnOnce(&mut PageContext) -> Result<()> + 'a) {
        self.hooks.hook(MAP_LAYERS_HOOK, f);
    }

    pub fn on_maps(&mut self, f: impl FnOnce(&mut PageContext) -> Result<()> + 'a) {
        self.hooks.hook(MAPS_HOOK, f);
    }

    /// Runs `map_layers` then `maps`. Only the first call does anything.
    pub fn on_load(&mut self) -> Result<&PageContext> {
        if !self.loaded {
            self.loaded = true;
            self.hooks.run_hooks(MAP_LAYERS_HOOK, &mut self.ctx)?;
            self.hooks.run_hooks(MAPS_HOOK, &mut self.ctx)?;
        }
        Ok(&self.ctx)
    }

    pub fn into_context(self) -> PageContext {
        self.ctx
    }
}
