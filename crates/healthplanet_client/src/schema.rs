//! Measurement schema registry.
//!
//! Each category has a fixed table mapping a field name to the tag code the
//! service uses for it and the type its value is parsed as. The tables and
//! the typed record structs are generated together by `measurement!` so a
//! field cannot exist in one and not the other.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::HealthPlanetError;

/// One of the four measurement domains served by the API.
///
/// Serialized and displayed under the service's own name, the same string
/// used for its OAuth scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Category {
    #[serde(rename = "innerscan")]
    BodyComposition,
    #[serde(rename = "sphygmomanometer")]
    BloodPressure,
    #[serde(rename = "pedometer")]
    Pedometer,
    #[serde(rename = "smug")]
    UrinarySugar,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::BodyComposition,
        Category::BloodPressure,
        Category::Pedometer,
        Category::UrinarySugar,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            Category::BodyComposition => "/status/innerscan.json",
            Category::BloodPressure => "/status/sphygmomanometer.json",
            Category::Pedometer => "/status/pedometer.json",
            Category::UrinarySugar => "/status/smug.json",
        }
    }

    /// OAuth scope that grants access to this category.
    pub fn scope(self) -> Scope {
        match self {
            Category::BodyComposition => Scope::Innerscan,
            Category::BloodPressure => Scope::Sphygmomanometer,
            Category::Pedometer => Scope::Pedometer,
            Category::UrinarySugar => Scope::Smug,
        }
    }

    pub fn schema(self) -> &'static [FieldSpec] {
        match self {
            Category::BodyComposition => BodyComposition::SCHEMA,
            Category::BloodPressure => BloodPressure::SCHEMA,
            Category::Pedometer => Pedometer::SCHEMA,
            Category::UrinarySugar => UrinarySugar::SCHEMA,
        }
    }

    /// Comma-joined tag codes of the whole schema, as sent in the `tag` parameter.
    pub fn tag_codes(self) -> String {
        self.schema()
            .iter()
            .map(|f| f.tag)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Every field a record of this category carries, common fields first.
    pub fn field_names(self) -> Vec<&'static str> {
        let mut names = vec!["measured_at", "registered_at", "model"];
        names.extend(self.schema().iter().map(|f| f.name));
        names
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scope().as_str())
    }
}

/// OAuth scope names accepted by `/oauth/auth`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Innerscan,
    Sphygmomanometer,
    Pedometer,
    Smug,
}

impl Scope {
    pub fn all() -> Vec<Scope> {
        vec![
            Scope::Innerscan,
            Scope::Sphygmomanometer,
            Scope::Pedometer,
            Scope::Smug,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Innerscan => "innerscan",
            Scope::Sphygmomanometer => "sphygmomanometer",
            Scope::Pedometer => "pedometer",
            Scope::Smug => "smug",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = HealthPlanetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "innerscan" => Ok(Scope::Innerscan),
            "sphygmomanometer" => Ok(Scope::Sphygmomanometer),
            "pedometer" => Ok(Scope::Pedometer),
            "smug" => Ok(Scope::Smug),
            other => Err(HealthPlanetError::Config(format!("unknown scope: {other}"))),
        }
    }
}

/// Declared type of a schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
        }
    }
}

/// One row of a category schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub tag: &'static str,
    pub kind: ValueKind,
}

/// A reading value after coercion to its declared type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    /// Parse a raw `keydata` string as `kind`.
    pub fn parse(
        field: &'static str,
        kind: ValueKind,
        raw: &str,
    ) -> Result<FieldValue, HealthPlanetError> {
        let trimmed = raw.trim();
        let parsed = match kind {
            ValueKind::Integer => trimmed.parse::<i64>().ok().map(FieldValue::Integer),
            ValueKind::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FieldValue::Float),
        };
        parsed.ok_or_else(|| HealthPlanetError::TypeCoercion {
            field,
            expected: kind.as_str(),
            value: raw.to_string(),
        })
    }
}

/// Rust types a schema field may be stored as.
pub trait FieldType: Sized {
    const KIND: ValueKind;
    fn from_value(value: FieldValue) -> Option<Self>;
}

impl FieldType for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(v) => Some(v),
            FieldValue::Float(_) => None,
        }
    }
}

impl FieldType for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Float(v) => Some(v),
            FieldValue::Integer(_) => None,
        }
    }
}

/// Typed per-category values of a single reading.
pub trait Measurement: Default + Clone + fmt::Debug + Send + Sync + 'static {
    const CATEGORY: Category;
    const SCHEMA: &'static [FieldSpec];

    /// Store `value` in the field called `field`.
    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), HealthPlanetError>;
}

macro_rules! measurement {
    (
        $(#[$meta:meta])*
        $name:ident => $category:expr, {
            $( $field:ident : $ty:ty = $tag:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
        pub struct $name {
            $( pub $field: Option<$ty>, )+
        }

        impl Measurement for $name {
            const CATEGORY: Category = $category;
            const SCHEMA: &'static [FieldSpec] = &[
                $( FieldSpec {
                    name: stringify!($field),
                    tag: $tag,
                    kind: <$ty as FieldType>::KIND,
                }, )+
            ];

            fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), HealthPlanetError> {
                $(
                    if field == stringify!($field) {
                        let typed = <$ty as FieldType>::from_value(value).ok_or_else(|| {
                            HealthPlanetError::TypeCoercion {
                                field: stringify!($field),
                                expected: <$ty as FieldType>::KIND.as_str(),
                                value: format!("{value:?}"),
                            }
                        })?;
                        self.$field = Some(typed);
                        return Ok(());
                    }
                )+
                Err(HealthPlanetError::UnknownTag {
                    category: Self::CATEGORY,
                    tag: field.to_string(),
                })
            }
        }
    };
}

// The service once split visceral fat over tags 6025 and 6026. Only 6025 is
// requested; a 6026 tuple is reported as an unknown tag.
measurement! {
    /// Body composition scale reading (`innerscan`).
    BodyComposition => Category::BodyComposition, {
        weight: f64 = "6021",
        body_fat: f64 = "6022",
        muscle_mass: f64 = "6023",
        physique_rating: i64 = "6024",
        visceral_fat_rating: f64 = "6025",
        basal_metabolic_rate: i64 = "6027",
        metabolic_age: i64 = "6028",
        bone_mass: f64 = "6029",
    }
}

measurement! {
    /// Blood pressure monitor reading (`sphygmomanometer`).
    BloodPressure => Category::BloodPressure, {
        maximal_pressure: i64 = "622E",
        minimal_pressure: i64 = "622F",
        pulse: i64 = "6230",
    }
}

measurement! {
    /// Pedometer reading.
    Pedometer => Category::Pedometer, {
        steps: i64 = "6331",
        exercise: i64 = "6335",
        calories: i64 = "6336",
    }
}

measurement! {
    /// Urine glucose meter reading (`smug`).
    UrinarySugar => Category::UrinarySugar, {
        urinary_sugar: i64 = "6240",
    }
}
