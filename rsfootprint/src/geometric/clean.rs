use serde_json::{Map, Value};

use crate::commons::basic_functions::python_repr;
use crate::geometric::footprint::FootprintCollection;

/// Replace every sequence-valued attribute with its text form so the
/// collection serializes to flat attribute columns.
/// Other values are left untouched; applying it twice changes nothing.
pub fn clean_collection(collection: &mut FootprintCollection) {
    for footprint in &mut collection.footprints {
        clean_properties(&mut footprint.properties);
    }
}

pub fn clean_properties(properties: &mut Map<String, Value>) {
    for value in properties.values_mut() {
        if value.is_array() {
            *value = Value::String(python_repr(value));
        }
    }
}
