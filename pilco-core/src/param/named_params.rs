use anyhow::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    iter::FromIterator,
    path::Path,
};

/// Named parameter values, used to exchange parameters with an optimizer
/// and to persist them.
///
/// Values are written with `bincode`, so a save and load cycle reproduces
/// every `f64` exactly.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct NamedParams {
    named_params: BTreeMap<String, Array2<f64>>,
}

impl NamedParams {
    /// Returns the value of the given name.
    pub fn get(&self, name: &str) -> Option<&Array2<f64>> {
        self.named_params.get(name)
    }

    /// Inserts a value.
    pub fn insert(&mut self, name: impl Into<String>, value: Array2<f64>) {
        self.named_params.insert(name.into(), value);
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.named_params.len()
    }

    /// Returns `true` if there is no entry.
    pub fn is_empty(&self) -> bool {
        self.named_params.is_empty()
    }

    /// Names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.named_params.keys()
    }

    /// Iterates over `(name, value)` in ascending order of names.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Array2<f64>)> {
        self.named_params.iter()
    }

    /// Prepends `prefix/` to every name.
    pub fn prefixed(self, prefix: &str) -> Self {
        self.named_params
            .into_iter()
            .map(|(k, v)| (format!("{}/{}", prefix, k), v))
            .collect()
    }

    /// Saves the values into a file.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        bincode::serialize_into(file, self)?;
        Ok(())
    }

    /// Loads values from a file.
    pub fn load<T: AsRef<Path>>(path: T) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(file)?)
    }
}

impl FromIterator<(String, Array2<f64>)> for NamedParams {
    fn from_iter<I: IntoIterator<Item = (String, Array2<f64>)>>(iter: I) -> Self {
        Self {
            named_params: BTreeMap::from_iter(iter),
        }
    }
}
