use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Anything that can contribute structured key/value pairs to a record.
pub trait Loggable {
    fn log(&self) -> Data;
}

/// Flat set of structured fields passed to [`Logger::with`](crate::logger::Logger::with).
///
/// ```
/// use fieldlog::fields::Data;
/// use serde_json::json;
///
/// let data = Data::new().with("user_id", 42).with("role", "admin");
/// assert_eq!(data.get("user_id"), Some(&json!(42)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Data(BTreeMap<String, Value>);

impl Data {
    pub fn new() -> Self {
        Data(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Flatten a serializable value into fields. The value must serialize
    /// to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(serde::ser::Error::custom(format!(
                "expected a JSON object for log fields, got {other}"
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Data {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Data(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Data {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl IntoIterator for Data {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Loggable for Data {
    fn log(&self) -> Data {
        self.clone()
    }
}

impl Loggable for BTreeMap<String, Value> {
    fn log(&self) -> Data {
        Data(self.clone())
    }
}

impl Loggable for HashMap<String, Value> {
    fn log(&self) -> Data {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl Loggable for serde_json::Map<String, Value> {
    fn log(&self) -> Data {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<T: Loggable + ?Sized> Loggable for &T {
    fn log(&self) -> Data {
        (**self).log()
    }
}

/// Value stored for one key in the pending buffer.
///
/// `Many` comes from key collisions. A JSON array supplied by the caller is
/// stored as `One` but counts as a sequence when the key collides again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(Value),
    Many(Vec<Value>),
}

/// Pending structured fields of a logger, drained by the next record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, FieldValue>);

impl FieldSet {
    pub fn new() -> Self {
        FieldSet(BTreeMap::new())
    }

    /// Add one value under `key`: a new key is stored as given, a collision
    /// with a sequence (collected or caller-supplied) appends to it, and a
    /// collision with a scalar turns it into `[old, new]`.
    pub fn absorb(&mut self, key: String, value: Value) {
        match self.0.remove(&key) {
            None => {
                self.0.insert(key, FieldValue::One(value));
            }
            Some(FieldValue::One(Value::Array(mut values))) | Some(FieldValue::Many(mut values)) => {
                values.push(value);
                self.0.insert(key, FieldValue::Many(values));
            }
            Some(FieldValue::One(old)) => {
                self.0.insert(key, FieldValue::Many(vec![old, value]));
            }
        }
    }

    /// Merge every item in argument order.
    pub fn absorb_all<'a, I>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'a dyn Loggable>,
    {
        for item in items {
            for (key, value) in item.log() {
                self.absorb(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Move the fields out, leaving the set empty.
    pub fn take(&mut self) -> FieldSet {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collisions_become_ordered_sequences() {
        let mut set = FieldSet::new();
        set.absorb("k".into(), json!("v1"));
        assert_eq!(set.get("k"), Some(&FieldValue::One(json!("v1"))));

        set.absorb("k".into(), json!("v2"));
        assert_eq!(set.get("k"), Some(&FieldValue::Many(vec![json!("v1"), json!("v2")])));

        set.absorb("k".into(), json!("v3"));
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({ "k": ["v1", "v2", "v3"] })
        );
    }

    #[test]
    fn caller_arrays_are_extended_on_collision() {
        let mut set = FieldSet::new();
        set.absorb("tags".into(), json!(["a", "b"]));
        assert_eq!(set.get("tags"), Some(&FieldValue::One(json!(["a", "b"]))));

        set.absorb("tags".into(), json!("c"));
        assert_eq!(serde_json::to_value(&set).unwrap(), json!({ "tags": ["a", "b", "c"] }));
    }

    #[test]
    fn array_values_are_appended_whole() {
        let mut set = FieldSet::new();
        set.absorb("ids".into(), json!(1));
        set.absorb("ids".into(), json!([2, 3]));
        assert_eq!(serde_json::to_value(&set).unwrap(), json!({ "ids": [1, [2, 3]] }));
    }

    #[test]
    fn absorb_all_follows_argument_order() {
        let first = Data::from([("k", "a"), ("x", "1")]);
        let second = Data::from([("k", "b")]);
        let mut set = FieldSet::new();
        set.absorb_all([&first as &dyn Loggable, &second]);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({ "k": ["a", "b"], "x": "1" })
        );
    }

    #[test]
    fn take_leaves_empty_set() {
        let mut set = FieldSet::new();
        set.absorb("k".into(), json!(1));
        let taken = set.take();
        assert!(set.is_empty());
        assert_eq!(taken.len(), 1);
    }

    #[derive(Serialize)]
    struct Request {
        id: u64,
        path: &'static str,
    }

    #[test]
    fn from_serialize_flattens_structs() {
        let data = Data::from_serialize(&Request { id: 7, path: "/health" }).unwrap();
        assert_eq!(data.get("id"), Some(&json!(7)));
        assert_eq!(data.get("path"), Some(&json!("/health")));
        assert!(Data::from_serialize(&3).is_err());
    }

    #[test]
    fn maps_are_loggable() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), json!(true));
        assert_eq!(map.log().get("a"), Some(&json!(true)));

        let object = json!({ "b": 2 });
        let data = object.as_object().unwrap().log();
        assert_eq!(data.get("b"), Some(&json!(2)));
    }
}
