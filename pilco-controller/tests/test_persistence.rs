use anyhow::Result;
use ndarray::{arr1, Array2};
use pilco_controller::{
    CombinedController, CombinedControllerConfig, GateShape, LinearController,
    LinearControllerConfig, RbfController, RbfControllerConfig,
};
use pilco_core::{Configurable, Controller, NamedParams, Parameterized, PilcoError};
use tempdir::TempDir;

fn combined(seed: u64) -> Result<CombinedController> {
    let config = CombinedControllerConfig::new(3, 2, 7)
        .max_action(vec![1.0, 2.5])
        .controller_location(vec![0.1, 0.0, -0.1])
        .gate_shape(GateShape::Full)
        .seed(seed);
    CombinedController::build(config)
}

#[test_log::test]
fn test_save_load_combined() -> Result<()> {
    let mut c1 = combined(1)?;
    c1.randomize()?;
    let mut c2 = combined(2)?;
    assert_ne!(c1.named_params(), c2.named_params());

    let dir = TempDir::new("combined_controller")?;
    let path = dir.path().join("params.bin");
    c1.save(&path)?;
    c2.load(&path)?;
    assert_eq!(c1.named_params(), c2.named_params());

    let mean = arr1(&[0.3, -0.1, 0.2]);
    let cov = Array2::eye(3) * 0.1;
    assert_eq!(
        c1.compute_action(&mean, &cov, true)?,
        c2.compute_action(&mean, &cov, true)?
    );
    Ok(())
}

#[test_log::test]
fn test_load_rejects_other_controller() -> Result<()> {
    let linear = LinearController::build(LinearControllerConfig::new(3, 2))?;
    let dir = TempDir::new("linear_controller")?;
    let path = dir.path().join("params.bin");
    linear.save(&path)?;

    let mut rbf = RbfController::build(RbfControllerConfig::new(3, 2, 5))?;
    let err = rbf.load(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PilcoError>(),
        Some(PilcoError::ParamKey(_))
    ));
    Ok(())
}

#[test_log::test]
fn test_partial_update() -> Result<()> {
    let mut c = combined(1)?;
    let before = c.named_params();

    let mut src = NamedParams::default();
    src.insert("linear/b", Array2::from_elem((1, 2), 0.25));
    c.set_named_params(&src)?;
    assert_eq!(c.linear().b(), arr1(&[0.25, 0.25]));
    assert_eq!(c.named_params().get("rbf/inputs"), before.get("rbf/inputs"));

    // A rejected update leaves every parameter untouched.
    let snapshot = c.named_params();
    let mut src = NamedParams::default();
    src.insert("linear/W", Array2::from_elem((2, 3), 9.0));
    src.insert("linear/unknown", Array2::zeros((1, 1)));
    assert!(c.set_named_params(&src).is_err());
    assert_eq!(c.named_params(), snapshot);

    let mut src = NamedParams::default();
    src.insert("linear/W", Array2::from_elem((2, 3), 9.0));
    src.insert("linear/b", Array2::zeros((2, 2)));
    assert!(c.set_named_params(&src).is_err());
    assert_eq!(c.named_params(), snapshot);
    Ok(())
}

#[test_log::test]
fn test_trainable_params_exclude_fixed() -> Result<()> {
    let c = combined(1)?;
    let all = c.named_params();
    let trainable = c.trainable_params();
    assert_eq!(all.len(), trainable.len() + 3);
    assert!(trainable.get("gate/a").is_none());
    assert!(trainable.get("rbf/kernel0/variance").is_none());
    assert!(trainable.get("rbf/kernel1/variance").is_none());
    Ok(())
}

#[test_log::test]
fn test_build_from_yaml() -> Result<()> {
    let config = CombinedControllerConfig::new(3, 2, 7).seed(5).zeta(1.5);
    let dir = TempDir::new("combined_controller_yaml")?;
    let path = dir.path().join("combined.yaml");
    config.save(&path)?;

    let c1 = CombinedController::build_from_path(&path)?;
    let c2 = CombinedController::build(config)?;
    assert_eq!(c1.named_params(), c2.named_params());
    assert!((c1.zeta() - 1.5).abs() < 1e-12);
    Ok(())
}
