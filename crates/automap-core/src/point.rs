use crate::geom::{LatLng, latlng};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A point of interest taken from a wiki page's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub coord: LatLng,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub title: String,
    /// The page does not exist yet; the popup offers to create it.
    #[serde(default)]
    pub create: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointIssue {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing or empty `id`")]
    MissingId,
    #[error("`coord` must be a [lat, lon] pair of numbers")]
    InvalidCoord,
    #[error("coordinate out of range")]
    CoordOutOfRange,
}

impl Point {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            coord: latlng(lat, lon),
            page: String::new(),
            title: String::new(),
            create: false,
            address: None,
        }
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn creating(mut self) -> Self {
        self.create = true;
        self
    }

    /// The text shown in the popup: the title, or the page name when the title is empty.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.page
        } else {
            &self.title
        }
    }

    /// Builds a point from one element of a layer's JSON array.
    ///
    /// Accepted keys: `id`, `coord` (`[lat, lon]`), `page`, `title`, `create` and
    /// `prop.address`. `id` may be a string or a number. `create` follows JSON truthiness, since
    /// page generators emit both `true` and `1`.
    pub fn from_value(value: &Value) -> Result<Self, PointIssue> {
        let Some(obj) = value.as_object() else {
            return Err(PointIssue::NotAnObject);
        };

        let id = match obj.get("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(PointIssue::MissingId),
        };

        let coord = parse_coord(obj.get("coord"))?;
        if !coord.is_valid() {
            return Err(PointIssue::CoordOutOfRange);
        }

        let page = string_field(obj, "page").unwrap_or_default();
        let title = string_field(obj, "title").unwrap_or_default();
        let create = obj.get("create").is_some_and(truthy);
        let address = obj
            .get("prop")
            .and_then(Value::as_object)
            .and_then(|prop| string_field(prop, "address"))
            .filter(|s| !s.is_empty());

        Ok(Self {
            id,
            coord,
            page,
            title,
            create,
            address,
        })
    }
}

fn parse_coord(value: Option<&Value>) -> Result<LatLng, PointIssue> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Err(PointIssue::InvalidCoord);
    };
    // A third element (altitude) is tolerated and ignored.
    let (Some(lat), Some(lon)) = (
        items.first().and_then(number_like),
        items.get(1).and_then(number_like),
    ) else {
        return Err(PointIssue::InvalidCoord);
    };
    if !lat.is_finite() || !lon.is_finite() {
        return Err(PointIssue::InvalidCoord);
    }
    Ok(latlng(lat, lon))
}

fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(_) | Value::Object(_) => true,
    }
}
