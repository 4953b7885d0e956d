//! Per-stream effect registry.
//!
//! One mutex guards both the stream map and the STFT settings new effects are
//! built with. Every operation takes it for its whole duration, so a bulk
//! reconfiguration is seen by `process` either not at all or completely.
//! Hold times are bounded by the number of live streams (a handful) times one
//! effect construction, and nothing inside the lock blocks on I/O.

use crate::config::StftSettings;
use crate::effect::{EffectFactory, EffectParams, ShiftEffect};
use crate::sample::StereoSample;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

struct Inner<K> {
    stft: StftSettings,
    effects: HashMap<K, Box<dyn ShiftEffect>>,
}

/// Thread-safe map from stream identity to its live pitch-shift effect.
pub struct EffectRegistry<K> {
    inner: Mutex<Inner<K>>,
    factory: Arc<dyn EffectFactory>,
}

impl<K> EffectRegistry<K>
where
    K: Eq + Hash + fmt::Debug,
{
    pub fn new(factory: Arc<dyn EffectFactory>, stft: StftSettings) -> Result<Self> {
        stft.validate()?;
        Ok(Self {
            inner: Mutex::new(Inner {
                stft,
                effects: HashMap::new(),
            }),
            factory,
        })
    }

    /// Make sure `key` has an effect running at `sample_rate`.
    ///
    /// A new stream gets a neutral effect with the current STFT settings. An
    /// existing stream whose sample rate changed is rebuilt the same way.
    /// Returns a copy of the entry's parameters.
    pub fn ensure(&self, key: K, sample_rate: u32) -> Result<EffectParams> {
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate(sample_rate));
        }

        let mut inner = self.inner.lock();
        let stft = inner.stft;
        let params = match inner.effects.entry(key) {
            Entry::Occupied(mut entry) => {
                let current = entry.get().params();
                if current.sample_rate != sample_rate {
                    tracing::debug!(
                        "Stream {:?} sample rate {} -> {}, rebuilding effect",
                        entry.key(),
                        current.sample_rate,
                        sample_rate
                    );
                    entry.insert(self.factory.create(EffectParams::neutral(sample_rate, stft)));
                }
                entry.get().params()
            }
            Entry::Vacant(entry) => {
                tracing::debug!("New stream {:?} at {} Hz", entry.key(), sample_rate);
                entry
                    .insert(self.factory.create(EffectParams::neutral(sample_rate, stft)))
                    .params()
            }
        };
        Ok(params)
    }

    /// Rebuild every effect with new STFT settings, keeping each stream's
    /// sample rate and shift factor. Returns the number of effects rebuilt.
    ///
    /// Invalid settings are rejected before anything changes.
    pub fn reconfigure_all(&self, window_size: usize, overlap: usize) -> Result<usize> {
        self.reconfigure_with(|_| StftSettings {
            window_size,
            overlap,
        })
    }

    /// Like [`reconfigure_all`](Self::reconfigure_all), with the new settings
    /// derived from the current ones under the same lock. Used to change
    /// window size or overlap alone without racing a change to the other.
    pub fn reconfigure_with(
        &self,
        update: impl FnOnce(StftSettings) -> StftSettings,
    ) -> Result<usize> {
        let mut inner = self.inner.lock();
        let stft = update(inner.stft);
        stft.validate()?;

        inner.stft = stft;
        for effect in inner.effects.values_mut() {
            let params = effect.params().with_stft(stft);
            *effect = self.factory.create(params);
        }
        let count = inner.effects.len();
        drop(inner);

        tracing::info!(
            "Reconfigured {} effects: window={}, overlap={}",
            count,
            stft.window_size,
            stft.overlap
        );
        Ok(count)
    }

    /// Set the shift factor of `key` and run its effect over `frame`.
    ///
    /// Returns `false` and leaves `frame` alone if the stream is unknown.
    pub fn process(&self, key: &K, shift_factor: f32, frame: &mut [StereoSample]) -> bool {
        let mut inner = self.inner.lock();
        match inner.effects.get_mut(key) {
            Some(effect) => {
                effect.set_shift_factor(shift_factor);
                effect.apply(frame);
                true
            }
            None => false,
        }
    }

    /// Drop the effect of a stream that went away.
    pub fn remove(&self, key: &K) -> bool {
        let removed = self.inner.lock().effects.remove(key).is_some();
        if removed {
            tracing::debug!("Removed stream {:?}", key);
        }
        removed
    }

    /// Keep only the streams for which `keep` returns true.
    pub fn retain(&self, mut keep: impl FnMut(&K, &EffectParams) -> bool) {
        self.inner
            .lock()
            .effects
            .retain(|key, effect| keep(key, &effect.params()));
    }

    /// Parameters of the effect for `key`, if any.
    pub fn snapshot(&self, key: &K) -> Option<EffectParams> {
        self.inner.lock().effects.get(key).map(|e| e.params())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().effects.contains_key(key)
    }

    /// STFT settings used for effects built from now on.
    pub fn stft(&self) -> StftSettings {
        self.inner.lock().stft
    }

    pub fn len(&self) -> usize {
        self.inner.lock().effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().effects.is_empty()
    }
}

impl<K> fmt::Debug for EffectRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("EffectRegistry")
            .field("stft", &inner.stft)
            .field("streams", &inner.effects.len())
            .finish()
    }
}
