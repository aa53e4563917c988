//! Soft (Polyak) updates of target networks.
//!
//! $$\theta_{target} \leftarrow \tau \theta_{local} + (1 - \tau) \theta_{target}$$
//!
//! [`soft_update`] is the pure blend of two parameter tensors, [`track`] applies
//! it to every local / target parameter pair stored in a [`VarMap`].
use {
    candle_core::{
        Error,
        Result,
        Tensor,
        Var,
    },
    candle_nn::VarMap,
};


/// Blend `local` into `target` with weight `tau`, returning the new target.
///
/// `tau = 1.0` returns a copy of `local`, `tau = 0.0` a copy of `target`.
pub fn soft_update(
    local: &Tensor,
    target: &Tensor,
    tau: f64,
) -> Result<Tensor> {
    if local.shape() != target.shape() {
        Err(Error::Msg(format!(
            "cannot blend parameters of shape {:?} into {:?}",
            local.shape(),
            target.shape(),
        )))?
    }
    Ok((local.affine(tau, 0.0)? + target.affine(1.0 - tau, 0.0)?)?.detach())
}

/// All parameters whose name starts with `{prefix}-`, ordered by name.
///
/// Two networks of identical architecture built under different prefixes yield
/// lists that line up element by element.
pub fn parameters(
    varmap: &VarMap,
    prefix: &str,
) -> Result<Vec<(String, Var)>> {
    let head = format!("{prefix}-");
    let data = varmap
        .data()
        .lock()
        .map_err(|e| Error::Msg(format!("poisoned parameter lock: {e}")))?;
    let mut params = data
        .iter()
        .filter(|(name, _)| name.starts_with(&head))
        .map(|(name, var)| (name.clone(), var.clone()))
        .collect::<Vec<(String, Var)>>();
    params.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(params)
}

/// Move every `{target_prefix}-*` parameter towards its `{local_prefix}-*`
/// counterpart by `tau`. The target parameters are overwritten in place and
/// never change shape.
pub fn track(
    varmap: &VarMap,
    target_prefix: &str,
    local_prefix: &str,
    tau: f64,
) -> Result<()> {
    let locals = parameters(varmap, local_prefix)?;
    let targets = parameters(varmap, target_prefix)?;
    if locals.len() != targets.len() {
        Err(Error::Msg(format!(
            "{local_prefix} has {} parameters but {target_prefix} has {}",
            locals.len(),
            targets.len(),
        )))?
    }

    for ((local_name, local), (target_name, target)) in locals.iter().zip(targets.iter()) {
        if local_name[local_prefix.len()..] != target_name[target_prefix.len()..] {
            Err(Error::Msg(format!(
                "parameter {local_name} has no counterpart {target_name}"
            )))?
        }
        target.set(&soft_update(local.as_tensor(), target.as_tensor(), tau)?)?;
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use {
        super::*,
        candle_core::{
            DType,
            Device,
        },
        candle_nn::{
            linear,
            VarBuilder,
        },
    };

    fn values(t: &Tensor) -> Vec<f64> {
        t.flatten_all().unwrap().to_vec1::<f64>().unwrap()
    }

    #[test]
    fn tau_one_copies_local() {
        let local = Tensor::new(&[1.0, 2.0, 3.0], &Device::Cpu).unwrap();
        let target = Tensor::new(&[-4.0, 0.5, 9.0], &Device::Cpu).unwrap();
        assert_eq!(values(&soft_update(&local, &target, 1.0).unwrap()), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn tau_zero_keeps_target() {
        let local = Tensor::new(&[1.0, 2.0, 3.0], &Device::Cpu).unwrap();
        let target = Tensor::new(&[-4.0, 0.5, 9.0], &Device::Cpu).unwrap();
        assert_eq!(values(&soft_update(&local, &target, 0.0).unwrap()), vec![-4.0, 0.5, 9.0]);
    }

    #[test]
    fn blends_elementwise() {
        let local = Tensor::new(&[[2.0, 0.0], [4.0, 8.0]], &Device::Cpu).unwrap();
        let target = Tensor::new(&[[0.0, 2.0], [4.0, 0.0]], &Device::Cpu).unwrap();
        let blended = soft_update(&local, &target, 0.25).unwrap();
        assert_eq!(blended.dims(), &[2, 2]);
        assert_eq!(values(&blended), vec![0.5, 1.5, 4.0, 2.0]);
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        let local = Tensor::new(&[1.0, 2.0], &Device::Cpu).unwrap();
        let target = Tensor::new(&[1.0, 2.0, 3.0], &Device::Cpu).unwrap();
        assert!(soft_update(&local, &target, 0.5).is_err());
    }

    #[test]
    fn track_moves_targets_in_place() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F64, &Device::Cpu);
        linear(3, 2, vb.pp("net-fc0")).unwrap();
        linear(3, 2, vb.pp("target-net-fc0")).unwrap();

        let before: Vec<Vec<f64>> = parameters(&varmap, "target-net")
            .unwrap()
            .iter()
            .map(|(_, v)| values(v.as_tensor()))
            .collect();
        let locals: Vec<Vec<f64>> = parameters(&varmap, "net")
            .unwrap()
            .iter()
            .map(|(_, v)| values(v.as_tensor()))
            .collect();

        track(&varmap, "target-net", "net", 0.5).unwrap();

        let after = parameters(&varmap, "target-net").unwrap();
        assert_eq!(after.len(), 2);
        for (i, (_, var)) in after.iter().enumerate() {
            let expected: Vec<f64> = locals[i]
                .iter()
                .zip(before[i].iter())
                .map(|(l, t)| 0.5 * l + 0.5 * t)
                .collect();
            for (a, e) in values(var.as_tensor()).iter().zip(expected.iter()) {
                assert!((a - e).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn track_with_tau_one_makes_networks_equal() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F64, &Device::Cpu);
        linear(4, 4, vb.pp("net-fc0")).unwrap();
        linear(4, 4, vb.pp("target-net-fc0")).unwrap();

        track(&varmap, "target-net", "net", 1.0).unwrap();

        let locals = parameters(&varmap, "net").unwrap();
        let targets = parameters(&varmap, "target-net").unwrap();
        for ((_, l), (_, t)) in locals.iter().zip(targets.iter()) {
            assert_eq!(values(l.as_tensor()), values(t.as_tensor()));
        }
    }
}
