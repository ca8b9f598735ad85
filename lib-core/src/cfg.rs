use std::sync::{Arc, RwLock};

use state::TypeMap;

/// A replaceable config value stored once per type in the map.
struct ConfigSlot<AC: AcceptsConfig>(RwLock<ConfigHolder<AC>>);

/// A configuration map.
pub struct ConfigMap(Arc<RwLock<TypeMap![Sync + Send]>>);
impl ConfigMap {
    /// Fetches a configuration holder for a type that accepts stored config.
    /// The holder is a snapshot: a later [`ConfigMap::set`] does not change it.
    /// # Panics
    /// Panics if the read-write lock is poisoned.
    #[must_use]
    pub fn fetch<AC: AcceptsConfig>(&self) -> ConfigHolder<AC> {
        if let Some(slot) = self.0.read().unwrap().try_get::<ConfigSlot<AC>>() {
            return slot.0.read().unwrap().clone()
        }
        let map = self.0.write().unwrap();
        if map.try_get::<ConfigSlot<AC>>().is_none() {
            map.set(ConfigSlot::<AC>(RwLock::new(ConfigHolder(Arc::new(AC::Cfg::default())))));
        }
        let ch = map.get::<ConfigSlot<AC>>().0.read().unwrap().clone();
        ch
    }

    /// Sets (or replaces) a config for a type that accepts it.
    /// Holders fetched before keep the previous value, so it should be used before a pipeline runs.
    /// # Panics
    /// Panics if the read-write lock is poisoned.
    pub fn set<AC: AcceptsConfig>(&self, cfg: AC::Cfg) {
        let ch = ConfigHolder(Arc::new(cfg));
        let map = self.0.read().unwrap();
        if let Some(slot) = map.try_get::<ConfigSlot<AC>>() {
            *slot.0.write().unwrap() = ch;
            return
        }
        drop(map);
        let map = self.0.write().unwrap();
        if let Some(slot) = map.try_get::<ConfigSlot<AC>>() {
            *slot.0.write().unwrap() = ch;
        } else {
            map.set(ConfigSlot::<AC>(RwLock::new(ch)));
        }
    }
}
impl Clone for ConfigMap {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
impl Default for ConfigMap {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(<TypeMap![Sync + Send]>::new())))
    }
}

/// A type that accepts a stored config. It usually is an empty enum.
pub trait AcceptsConfig: 'static {
    /// A configuration type.
    type Cfg: 'static + Send + Sync + Default;
}

/// A configuration holder. Any type that wants to use the config must implement methods for config holder.
pub struct ConfigHolder<AC: AcceptsConfig>(Arc<AC::Cfg>);
impl<AC: AcceptsConfig> Clone for ConfigHolder<AC> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
impl<AC: AcceptsConfig> std::ops::Deref for ConfigHolder<AC> {
    type Target = AC::Cfg;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

macro_rules! acfg {
    ($(#[doc = $doc:expr])? $ac:ident : $cfg:ty) => {
        $(#[doc = $doc])?
        /// This empty enum type should not be used without [`ConfigHolder`].
        pub enum $ac {}
        impl crate::cfg::AcceptsConfig for $ac {
            type Cfg = $cfg;
        }
    };
}
pub(crate) use acfg;

#[cfg(feature = "zopfli")]
/// Universal configuration for Zopfli.
/// It determines if Zopfli will be enabled and how many iterations will be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum CfgZopfli {
    /// A switch value (`true` or `false`).
    /// If it is enabled then Zopfli will be enabled with 10 iterations by default.
    Switch(bool),
    /// An iteration count. If it is 0 then Zopfli will be disabled.
    Iter(u8)
}
#[cfg(feature = "zopfli")]
impl Default for CfgZopfli {
    fn default() -> Self {
        Self::Switch(false)
    }
}

#[cfg(feature = "zopfli")]
impl CfgZopfli {
    /// Returns the iteration count based on its state.
    #[inline]
    pub const fn iter_count(&self) -> Option<std::num::NonZeroU8> {
        match self {
            Self::Switch(false) => None,
            Self::Iter(x) => std::num::NonZeroU8::new(*x),
            Self::Switch(true) => std::num::NonZeroU8::new(10)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, PartialEq, Debug)]
    pub struct Level(u32);
    acfg!(Leveled: Level);

    #[test]
    fn fetch_returns_default_then_set_value() {
        let cm = ConfigMap::default();
        assert_eq!(*cm.fetch::<Leveled>(), Level(0));
        cm.set::<Leveled>(Level(7));
        assert_eq!(*cm.fetch::<Leveled>(), Level(7));
    }

    #[test]
    fn set_replaces_value_but_not_fetched_holders() {
        let cm = ConfigMap::default();
        cm.set::<Leveled>(Level(1));
        let old = cm.fetch::<Leveled>();
        cm.set::<Leveled>(Level(2));
        assert_eq!(*old, Level(1));
        assert_eq!(*cm.fetch::<Leveled>(), Level(2));
    }

    #[test]
    fn clones_share_settings() {
        let cm = ConfigMap::default();
        let other = cm.clone();
        assert_eq!(*cm.fetch::<Leveled>(), Level(0));
        other.set::<Leveled>(Level(3));
        assert_eq!(*cm.fetch::<Leveled>(), Level(3));
    }

    #[cfg(feature = "zopfli")]
    #[test]
    fn zopfli_iterations() {
        assert_eq!(CfgZopfli::Switch(false).iter_count(), None);
        assert_eq!(CfgZopfli::Switch(true).iter_count().map(|x| x.get()), Some(10));
        assert_eq!(CfgZopfli::Iter(0).iter_count(), None);
        assert_eq!(CfgZopfli::Iter(4).iter_count().map(|x| x.get()), Some(4));
    }
}
