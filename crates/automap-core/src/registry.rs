use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::point::Point;
use crate::source::LayerSource;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the synthetic layer built from a container's main data.
pub const SELF_LAYER: &str = "self";

/// A named, independently toggleable collection of points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub points: Vec<Point>,
    pub description: String,
    pub clustered: bool,
    pub hidden_by_default: bool,
    /// Prefix for page links; the map-level base URL is used when unset.
    pub base_url: Option<String>,
}

/// Display metadata for a layer, as declared by the embedding page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "cluster")]
    pub clustered: bool,
    #[serde(default, alias = "hidden")]
    pub hidden_by_default: bool,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn clustered(mut self, clustered: bool) -> Self {
        self.clustered = clustered;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden_by_default = hidden;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn into_layer(self, points: Vec<Point>) -> Layer {
        let description = if self.description.is_empty() {
            self.name.clone()
        } else {
            self.description
        };
        Layer {
            name: self.name,
            points,
            description,
            clustered: self.clustered,
            hidden_by_default: self.hidden_by_default,
            base_url: self.base_url,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub suppress_errors: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::lenient()
    }
}

impl LoadOptions {
    /// Malformed JSON and invalid points are returned as errors.
    pub fn strict() -> Self {
        Self {
            suppress_errors: false,
        }
    }

    /// Malformed JSON skips the layer and invalid points are dropped; both are logged and
    /// recorded in [`Registry::diagnostics`].
    pub fn lenient() -> Self {
        Self {
            suppress_errors: true,
        }
    }
}

/// Layer definitions and per-container main data for one page view.
///
/// Written while the page loads, read-only once maps are composed.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    layers: IndexMap<String, Layer>,
    main_data: IndexMap<String, Vec<Point>>,
    diagnostics: Vec<Diagnostic>,
}

/// Identifies what a batch of raw points belongs to, for errors and diagnostics.
#[derive(Clone, Copy)]
enum Target<'a> {
    Layer(&'a str),
    Main(&'a str),
}

impl Target<'_> {
    fn label(&self) -> String {
        match self {
            Target::Layer(name) => (*name).to_string(),
            Target::Main(container) => format!("{SELF_LAYER}@{container}"),
        }
    }

    fn owns(&self, diagnostic: &Diagnostic) -> bool {
        match self {
            Target::Layer(name) => diagnostic.container.is_none() && diagnostic.layer == *name,
            Target::Main(container) => diagnostic.container.as_deref() == Some(*container),
        }
    }

    fn diagnostic(&self, index: Option<usize>, kind: DiagnosticKind) -> Diagnostic {
        match self {
            Target::Layer(name) => Diagnostic {
                layer: (*name).to_string(),
                container: None,
                index,
                kind,
            },
            Target::Main(container) => Diagnostic {
                layer: SELF_LAYER.to_string(),
                container: Some((*container).to_string()),
                index,
                kind,
            },
        }
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the named layer, returning the previous definition.
    ///
    /// Diagnostics left by an earlier load of the same layer are dropped.
    pub fn register_layer(&mut self, spec: LayerSpec, points: Vec<Point>) -> Option<Layer> {
        self.forget_diagnostics(Target::Layer(&spec.name));
        self.insert_layer(spec, points)
    }

    /// Associates main data (points of the page embedding the map) with a container.
    pub fn register_main_data(&mut self, container: impl Into<String>, points: Vec<Point>) {
        let container = container.into();
        self.forget_diagnostics(Target::Main(&container));
        self.main_data.insert(container, points);
    }

    fn insert_layer(&mut self, spec: LayerSpec, points: Vec<Point>) -> Option<Layer> {
        let layer = spec.into_layer(points);
        self.layers.insert(layer.name.clone(), layer)
    }

    fn forget_diagnostics(&mut self, target: Target<'_>) {
        self.diagnostics.retain(|d| !target.owns(d));
    }

    pub fn lookup_layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn main_data(&self, container: &str) -> Option<&[Point]> {
        self.main_data.get(container).map(Vec::as_slice)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn containers(&self) -> impl Iterator<Item = &str> {
        self.main_data.keys().map(String::as_str)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Validates a raw JSON array and registers the accepted points.
    ///
    /// Returns the number of points kept, or `None` when the layer was skipped (lenient mode
    /// only).
    pub fn register_layer_json(
        &mut self,
        spec: LayerSpec,
        raw: &Value,
        options: LoadOptions,
    ) -> Result<Option<usize>> {
        let name = spec.name.clone();
        self.forget_diagnostics(Target::Layer(&name));
        let Some(points) = self.decode_points(Target::Layer(&name), raw, options)? else {
            return Ok(None);
        };
        let count = points.len();
        self.insert_layer(spec, points);
        Ok(Some(count))
    }

    pub fn register_main_data_json(
        &mut self,
        container: &str,
        raw: &Value,
        options: LoadOptions,
    ) -> Result<Option<usize>> {
        self.forget_diagnostics(Target::Main(container));
        let Some(points) = self.decode_points(Target::Main(container), raw, options)? else {
            return Ok(None);
        };
        let count = points.len();
        self.main_data.insert(container.to_string(), points);
        Ok(Some(count))
    }

    /// Fetches, decodes and registers one layer.
    ///
    /// Empty or unavailable data leaves the layer unregistered (`Ok(None)`), so the composer
    /// treats it like any unknown layer name.
    pub fn load_layer(
        &mut self,
        source: &dyn LayerSource,
        spec: LayerSpec,
        location: &str,
        options: LoadOptions,
    ) -> Result<Option<usize>> {
        let name = spec.name.clone();
        self.forget_diagnostics(Target::Layer(&name));
        let Some(raw) = self.fetch_json(source, Target::Layer(&name), location, options)? else {
            return Ok(None);
        };
        self.register_layer_json(spec, &raw, options)
    }

    pub fn load_main_data(
        &mut self,
        source: &dyn LayerSource,
        container: &str,
        location: &str,
        options: LoadOptions,
    ) -> Result<Option<usize>> {
        self.forget_diagnostics(Target::Main(container));
        let Some(raw) = self.fetch_json(source, Target::Main(container), location, options)?
        else {
            return Ok(None);
        };
        self.register_main_data_json(container, &raw, options)
    }

    fn fetch_json(
        &mut self,
        source: &dyn LayerSource,
        target: Target<'_>,
        location: &str,
        options: LoadOptions,
    ) -> Result<Option<Value>> {
        let text = source.fetch_text(location).unwrap_or_default();
        if text.trim().is_empty() {
            tracing::debug!(layer = %target.label(), location, "no layer data, skipping");
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(v) => Ok(Some(v)),
            Err(err) => {
                let message = err.to_string();
                if !options.suppress_errors {
                    return Err(Error::LayerJson {
                        layer: target.label(),
                        message,
                    });
                }
                tracing::warn!(
                    layer = %target.label(),
                    location,
                    %message,
                    "malformed layer JSON, skipping layer"
                );
                self.diagnostics
                    .push(target.diagnostic(None, DiagnosticKind::MalformedJson { message }));
                Ok(None)
            }
        }
    }

    fn decode_points(
        &mut self,
        target: Target<'_>,
        raw: &Value,
        options: LoadOptions,
    ) -> Result<Option<Vec<Point>>> {
        let Some(items) = raw.as_array() else {
            if !options.suppress_errors {
                return Err(Error::LayerNotArray {
                    layer: target.label(),
                });
            }
            tracing::warn!(layer = %target.label(), "layer data is not an array, skipping layer");
            self.diagnostics
                .push(target.diagnostic(None, DiagnosticKind::NotAnArray));
            return Ok(None);
        };

        let mut points = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match Point::from_value(item) {
                Ok(p) => points.push(p),
                Err(issue) => {
                    if !options.suppress_errors {
                        return Err(Error::InvalidPoint {
                            layer: target.label(),
                            index,
                            reason: issue,
                        });
                    }
                    tracing::warn!(
                        layer = %target.label(),
                        index,
                        %issue,
                        "skipping invalid point"
                    );
                    self.diagnostics.push(
                        target.diagnostic(Some(index), DiagnosticKind::InvalidPoint { issue }),
                    );
                }
            }
        }
        Ok(Some(points))
    }
}
