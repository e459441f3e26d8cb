use crate::compose::ComposeOptions;
use crate::config::MapConfig;
use crate::hooks::PageSession;
use crate::registry::{LayerSpec, LoadOptions};
use crate::source::LayerSource;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything a page declares about its maps, in one JSON document:
///
/// ```json
/// {
///   "layers": [{"name": "pubs", "path": "pubs.json", "description": "Pubs", "cluster": true}],
///   "main": {"map": [{"id": "home", "coord": [51.5, -0.1], "page": "home", "title": "Home"}]},
///   "maps": [{"container": "map", "layers": ["pubs"], "base_url": "/wiki", "page": "home"}]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageManifest {
    #[serde(default)]
    pub layers: Vec<LayerEntry>,
    /// Main data per container: either the points inline or a location to fetch them from.
    #[serde(default)]
    pub main: IndexMap<String, Value>,
    #[serde(default)]
    pub maps: Vec<MapEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub name: String,
    /// Location handed to the [`LayerSource`].
    pub path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cluster: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl LayerEntry {
    pub fn spec(&self) -> LayerSpec {
        LayerSpec {
            name: self.name.clone(),
            description: self.description.clone(),
            clustered: self.cluster,
            hidden_by_default: self.hidden,
            base_url: self.base_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub container: String,
    #[serde(default)]
    pub layers: Vec<String>,
    #[serde(flatten)]
    pub options: ComposeOptions,
    /// Widget overrides merged onto [`MapConfig::default`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl MapEntry {
    pub fn map_config(&self) -> MapConfig {
        match &self.config {
            Some(overrides) => MapConfig::with_overrides(overrides),
            None => MapConfig::default(),
        }
    }
}

impl PageManifest {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Manifest {
            message: e.to_string(),
        })
    }

    pub fn map_entry(&self, container: &str) -> Option<&MapEntry> {
        self.maps.iter().find(|m| m.container == container)
    }

    /// Wires the manifest into a page session: layer loading on `map_layers`, map composition
    /// on `maps`. Call [`PageSession::on_load`] to run it.
    pub fn session<'a>(
        &'a self,
        source: &'a dyn LayerSource,
        options: LoadOptions,
    ) -> PageSession<'a> {
        let mut session = PageSession::new();

        for entry in &self.layers {
            session.on_map_layers(move |ctx| {
                ctx.registry
                    .load_layer(source, entry.spec(), &entry.path, options)?;
                Ok(())
            });
        }
        for (container, raw) in &self.main {
            session.on_map_layers(move |ctx| {
                match raw {
                    Value::String(location) => {
                        ctx.registry
                            .load_main_data(source, container, location, options)?;
                    }
                    _ => {
                        ctx.registry
                            .register_main_data_json(container, raw, options)?;
                    }
                }
                Ok(())
            });
        }
        for map in &self.maps {
            session.on_maps(move |ctx| {
                ctx.create_map(&map.container, &map.layers, &map.options);
                Ok(())
            });
        }
        session
    }
}
