//! Objects holding named numeric parameters.
use crate::{NamedParams, Param, PilcoError, Precision};
use anyhow::Result;
use log::info;
use std::path::Path;

/// An object owning a set of named [`Param`]s.
///
/// Optimizers read and write the unconstrained representation through
/// [`Parameterized::trainable_params`] and [`Parameterized::set_named_params`];
/// serializers use [`Parameterized::save`] and [`Parameterized::load`].
/// Names of nested objects are joined with `/`, e.g. `linear/W`.
pub trait Parameterized {
    /// Returns all parameters with their names.
    fn params(&self) -> Vec<(String, &Param)>;

    /// Returns all parameters with their names, mutably.
    fn params_mut(&mut self) -> Vec<(String, &mut Param)>;

    /// Copies the unconstrained values of all parameters.
    fn named_params(&self) -> NamedParams {
        self.params()
            .into_iter()
            .map(|(name, p)| (name, p.unconstrained().clone()))
            .collect()
    }

    /// Copies the unconstrained values of the trainable parameters.
    fn trainable_params(&self) -> NamedParams {
        self.params()
            .into_iter()
            .filter(|(_, p)| p.trainable())
            .map(|(name, p)| (name, p.unconstrained().clone()))
            .collect()
    }

    /// Numeric precision applied to values written by
    /// [`Parameterized::set_named_params`].
    fn precision(&self) -> Precision {
        Precision::F64
    }

    /// Writes unconstrained values into the parameters of the same names.
    ///
    /// Parameters absent from `src` are left untouched; names in `src` that
    /// match no parameter are rejected. Every entry is checked before any
    /// parameter is written, so a rejected update leaves all parameters as
    /// they were.
    fn set_named_params(&mut self, src: &NamedParams) -> Result<()> {
        let precision = self.precision();
        let params = self.params_mut();

        let unknown: Vec<&String> = src
            .names()
            .filter(|name| params.iter().all(|(n, _)| n != *name))
            .collect();
        if !unknown.is_empty() {
            return Err(PilcoError::ParamKey(format!(
                "{:?} did not match any parameter",
                unknown
            ))
            .into());
        }
        for (name, param) in params.iter() {
            if let Some(v) = src.get(name) {
                param.check_shape(v)?;
            }
        }

        for (name, param) in params {
            if let Some(v) = src.get(&name) {
                param.set_unconstrained(precision.cast_array(v.clone()))?;
            }
        }
        Ok(())
    }

    /// Saves all parameters into a file.
    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()>
    where
        Self: Sized,
    {
        self.named_params().save(&path)?;
        info!("Save parameters to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads all parameters from a file.
    ///
    /// The file must contain exactly the parameters of this object.
    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()>
    where
        Self: Sized,
    {
        let src = NamedParams::load(&path)?;
        for (name, _) in self.params() {
            if src.get(&name).is_none() {
                return Err(PilcoError::ParamKey(format!("{} not found in file", name)).into());
            }
        }
        self.set_named_params(&src)?;
        info!("Load parameters from {:?}", path.as_ref());
        Ok(())
    }
}
