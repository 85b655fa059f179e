//! Typed parameter dictionary of a recording.
//!
//! Parameters are organised in named groups (`POINT`, `EVENT`, `MANUFACTURER`, ...)
//! and carry typed scalar or array payloads. Group and parameter names are
//! compared case-insensitively.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Payload of a parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Float(Vec<f32>),
    Strings(Vec<String>),
}

impl ParamData {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Strings(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int8(_) => "int8",
            Self::Int16(_) => "int16",
            Self::Float(_) => "float",
            Self::Strings(_) => "string",
        }
    }
}

/// A single named parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Array shape, innermost first. Empty for scalars and plain lists.
    #[serde(default)]
    pub dims: SmallVec<[usize; 4]>,
    pub value: ParamData,
}

impl Parameter {
    /// Create a parameter from raw data.
    pub fn new(name: impl Into<String>, description: impl Into<String>, value: ParamData) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            dims: SmallVec::new(),
            value,
        }
    }

    /// Single string parameter.
    pub fn string(name: impl Into<String>, description: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, description, ParamData::Strings(vec![value.into()]))
    }

    /// String list parameter.
    pub fn strings<S: Into<String>>(
        name: impl Into<String>,
        description: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            description,
            ParamData::Strings(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Signed 8-bit scalar.
    pub fn int8(name: impl Into<String>, description: impl Into<String>, value: i8) -> Self {
        Self::new(name, description, ParamData::Int8(vec![value]))
    }

    /// Signed 16-bit array.
    pub fn int16s(name: impl Into<String>, description: impl Into<String>, values: Vec<i16>) -> Self {
        Self::new(name, description, ParamData::Int16(values))
    }

    /// Signed 16-bit scalar.
    pub fn int16(name: impl Into<String>, description: impl Into<String>, value: i16) -> Self {
        Self::int16s(name, description, vec![value])
    }

    /// Float array with an explicit shape.
    pub fn floats(
        name: impl Into<String>,
        description: impl Into<String>,
        dims: &[usize],
        values: Vec<f32>,
    ) -> Self {
        let mut p = Self::new(name, description, ParamData::Float(values));
        p.dims = SmallVec::from_slice(dims);
        p
    }

    /// First string, trimmed of the padding fixed-width records carry.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ParamData::Strings(v) => v.first().map(|s| s.trim()),
            _ => None,
        }
    }

    /// All strings (untrimmed).
    pub fn as_strings(&self) -> Option<&[String]> {
        match &self.value {
            ParamData::Strings(v) => Some(v),
            _ => None,
        }
    }

    /// First element as an integer. Floats with an integral value are accepted.
    pub fn as_int(&self) -> Option<i64> {
        match &self.value {
            ParamData::Int8(v) => v.first().map(|&x| x as i64),
            ParamData::Int16(v) => v.first().map(|&x| x as i64),
            ParamData::Float(v) => v
                .first()
                .filter(|x| x.fract() == 0.0 && x.is_finite())
                .map(|&x| x as i64),
            ParamData::Strings(_) => None,
        }
    }

    /// Float elements.
    pub fn as_floats(&self) -> Option<&[f32]> {
        match &self.value {
            ParamData::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Integer elements widened to i64.
    pub fn as_ints(&self) -> Option<Vec<i64>> {
        match &self.value {
            ParamData::Int8(v) => Some(v.iter().map(|&x| x as i64).collect()),
            ParamData::Int16(v) => Some(v.iter().map(|&x| x as i64).collect()),
            _ => None,
        }
    }

    #[inline]
    fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A named group of parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub params: Vec<Parameter>,
}

impl ParameterGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Get a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.is_named(name))
    }

    /// Check if a parameter exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert a parameter, replacing any parameter of the same name.
    pub fn set(&mut self, param: Parameter) {
        // Update existing or add new
        if let Some(existing) = self.params.iter_mut().find(|p| p.is_named(&param.name)) {
            *existing = param;
            return;
        }
        self.params.push(param);
    }

    /// Builder-style insert.
    pub fn with(mut self, param: Parameter) -> Self {
        self.set(param);
        self
    }

    /// Add a single string parameter.
    pub fn add_str(&mut self, name: &str, description: &str, value: &str) {
        self.set(Parameter::string(name, description, value));
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[inline]
    fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// The full parameter dictionary of a recording.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    groups: Vec<ParameterGroup>,
}

impl ParameterSet {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a group by name.
    pub fn group(&self, name: &str) -> Option<&ParameterGroup> {
        self.groups.iter().find(|g| g.is_named(name))
    }

    /// Get a mutable group by name.
    pub fn group_mut(&mut self, name: &str) -> Option<&mut ParameterGroup> {
        self.groups.iter_mut().find(|g| g.is_named(name))
    }

    /// Get a group, creating an empty one if missing.
    pub fn get_create(&mut self, name: &str) -> &mut ParameterGroup {
        match self.groups.iter().position(|g| g.is_named(name)) {
            Some(pos) => &mut self.groups[pos],
            None => {
                self.groups.push(ParameterGroup::new(name, ""));
                let last = self.groups.len() - 1;
                &mut self.groups[last]
            }
        }
    }

    /// Insert a group, replacing any group of the same name.
    pub fn insert_group(&mut self, group: ParameterGroup) {
        if let Some(existing) = self.group_mut(&group.name) {
            *existing = group;
        } else {
            self.groups.push(group);
        }
    }

    /// Look up `GROUP:PARAM`.
    pub fn get(&self, group: &str, param: &str) -> Option<&Parameter> {
        self.group(group).and_then(|g| g.get(param))
    }

    /// Iterate groups in storage order.
    pub fn groups(&self) -> impl Iterator<Item = &ParameterGroup> {
        self.groups.iter()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<ParameterGroup> for ParameterSet {
    fn from_iter<T: IntoIterator<Item = ParameterGroup>>(iter: T) -> Self {
        let mut set = Self::new();
        for g in iter {
            set.insert_group(g);
        }
        set
    }
}
