// crates/wl_physics/tests/friction_pipeline.rs
//!
//! 糙率分配到植被阻力的完整流程测试

use wl_config::{default_friction_classes, ModelConfig};
use wl_physics::{
    apply_cold_start, assign_friction, BaptistOperator, BaptistParams, ChezyConversion, Domain,
    ForcingOperator, OperatorRegistry, RoughnessError, SimulationHost, TideProvider,
};

// ============================================================
// Test 1: 类别 -> 算子
// ============================================================

#[test]
fn test_classes_drive_operator() {
    // 0: 无类别, 1: ocean, 4: subtidal, 5: intertidal
    let mut domain = Domain::new(vec![-2.0, -2.0, -0.5, 0.1], 9.81);
    apply_cold_start(&mut domain, 0.26).unwrap();
    domain.set_momentum(vec![0.2; 4], vec![0.0; 4]).unwrap();
    domain.set_timestep(10.0).unwrap();

    let friction = assign_friction(&[0, 1, 4, 5], &default_friction_classes()).unwrap();
    friction.apply_manning(&mut domain).unwrap();
    assert_eq!(domain.get_field("friction"), Some(&[0.0, 0.015, 0.0, 0.0][..]));
    assert_eq!(friction.n_vegetated(), 2);

    let mut op = BaptistOperator::attach(&mut domain, friction.baptist_params()).unwrap();
    op.apply(&mut domain);

    let xmom = domain.momentum().0;
    assert_eq!(xmom[0], 0.2);
    assert_eq!(xmom[1], 0.2);
    assert!(xmom[2] < 0.2);
    assert!(xmom[3] < 0.2);
    // intertidal 更密，阻力更大
    assert!(xmom[3] < xmom[2]);
}

#[test]
fn test_unknown_class_rejected() {
    let err = assign_friction(&[1, 9], &default_friction_classes()).unwrap_err();
    assert!(matches!(err, RoughnessError::UnknownClass { cell: 1, class_id: 9, .. }));
    assert!(assign_friction(&[-1], &default_friction_classes()).is_err());
}

// ============================================================
// Test 2: 配置 -> 参数
// ============================================================

#[test]
fn test_settings_flow_into_operator() {
    let json = r#"{
        "vegetation": {
            "bed_friction": 50.0,
            "use_diffusivity": true,
            "drag_coefficient": { "method": "nepf1999", "alpha": 1.0 }
        }
    }"#;
    let config = ModelConfig::from_json_str(json).unwrap();

    let mut domain = Domain::new(vec![0.0], 9.81);
    domain.set_stage(vec![0.5]).unwrap();
    let params = BaptistParams::from_settings(&config.vegetation)
        .with_diameter(0.01)
        .with_density(120.0)
        .with_height(1.0);
    let op = BaptistOperator::attach(&mut domain, params).unwrap();

    assert_eq!(op.bed_friction(), &[50.0]);
    assert!(op.use_diffusivity());
    assert_eq!(op.drag().name(), "nepf1999");
    assert!(domain.viscosity_enabled());
}

// ============================================================
// Test 3: 有效 Chezy 与潮位
// ============================================================

#[test]
fn test_effective_chezy_after_run() {
    let mut domain = Domain::new(vec![-1.0, -0.5, 0.0], 9.81);
    let tide = TideProvider::constant(0.5);
    apply_cold_start(&mut domain, tide.cached()).unwrap();
    domain.set_momentum(vec![0.1; 3], vec![0.0; 3]).unwrap();
    domain.set_timestep(5.0).unwrap();

    let friction = assign_friction(&[2, 4, 0], &default_friction_classes()).unwrap();
    let op = BaptistOperator::attach(&mut domain, friction.baptist_params()).unwrap();
    let mut registry = OperatorRegistry::new();
    registry.register(op);
    domain.evolve(&mut registry, 30.0, 60.0, |_| {}).unwrap();

    let chezy = ChezyConversion::default()
        .effective_chezy(&domain.depth(), &friction)
        .unwrap();
    // channels: Manning, h = 1.5
    assert!((chezy[0] - 1.5_f64.powf(1.0 / 6.0) / 0.028).abs() < 1e-9);
    // subtidal: 植被 Chezy 低于裸床
    assert!(chezy[1] > 0.0 && chezy[1] < 65.0);
    // 无类别：回退到裸床
    assert_eq!(chezy[2], 65.0);
}
