//! SensorId - shared sensor identifier
//!
//! Backed by `Arc<str>` so the id can be cloned into every log line and metric
//! label without reallocating.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Sensor identifier.
///
/// # Examples
/// ```
/// use contracts::SensorId;
///
/// let id: SensorId = "counter_fast".into();
/// assert_eq!(id, "counter_fast");
/// assert_eq!(id.clone().as_str(), "counter_fast");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SensorId(Arc<str>);

impl SensorId {
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SensorId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SensorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SensorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SensorId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<SensorId> for String {
    fn from(id: SensorId) -> Self {
        id.0.to_string()
    }
}

impl PartialEq<str> for SensorId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SensorId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensorId({:?})", &*self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_lookup_by_str() {
        let mut cache: HashMap<SensorId, u64> = HashMap::new();
        cache.insert("camera".into(), 0);
        cache.insert("counter_slow".into(), 7);

        assert_eq!(cache.get("counter_slow"), Some(&7));
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id = SensorId::new("camera");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"camera\"");

        let back: SensorId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
