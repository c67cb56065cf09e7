// crates/wl_physics/src/domain.rs

//! 内存宿主域
//!
//! [`Domain`] 是 [`SimulationHost`] 的内存实现：持有单元中心的核心状态、
//! 命名字段和时间控制，并按输出间隔推进时间、在每个内部时间步调用算子。
//! 通量计算属于外部求解器，本实现只负责算子调度。

use glam::DVec2;
use tracing::debug;
use wl_foundation::error::{WlError, WlResult};

use crate::fields::FieldStore;
use crate::host::SimulationHost;
use crate::operators::OperatorRegistry;

/// 默认内部时间步长 [s]
const DEFAULT_TIMESTEP: f64 = 1.0;

/// 内存宿主域
#[derive(Debug, Clone)]
pub struct Domain {
    stage: Vec<f64>,
    elevation: Vec<f64>,
    xmomentum: Vec<f64>,
    ymomentum: Vec<f64>,
    /// 单元中心坐标（可为空）
    centroids: Vec<DVec2>,
    fields: FieldStore,
    gravity: f64,
    time: f64,
    /// 当前内部时间步长
    timestep: f64,
    /// 最大内部时间步长
    max_timestep: f64,
    /// 已执行的内部时间步数
    n_steps: u64,
    use_viscosity: bool,
}

impl Domain {
    /// 从底高程创建干域（水位等于底高程，动量为零）
    pub fn new(elevation: Vec<f64>, gravity: f64) -> Self {
        let n = elevation.len();
        Self {
            stage: elevation.clone(),
            elevation,
            xmomentum: vec![0.0; n],
            ymomentum: vec![0.0; n],
            centroids: Vec::new(),
            fields: FieldStore::new(n),
            gravity,
            time: 0.0,
            timestep: DEFAULT_TIMESTEP,
            max_timestep: DEFAULT_TIMESTEP,
            n_steps: 0,
            use_viscosity: false,
        }
    }

    /// 创建矩形网格域
    ///
    /// 单元按行优先编号（`j * nx + i`），单元中心位于
    /// `((i + 0.5) dx, (j + 0.5) dy)`，底高程由 `bed` 在单元中心求值。
    pub fn rectangular(
        nx: usize,
        ny: usize,
        dx: f64,
        dy: f64,
        gravity: f64,
        bed: impl Fn(DVec2) -> f64,
    ) -> Self {
        let centroids: Vec<DVec2> = (0..ny)
            .flat_map(|j| {
                (0..nx).map(move |i| DVec2::new((i as f64 + 0.5) * dx, (j as f64 + 0.5) * dy))
            })
            .collect();
        let elevation = centroids.iter().map(|&p| bed(p)).collect();
        let mut domain = Self::new(elevation, gravity);
        domain.centroids = centroids;
        domain
    }

    /// 设置单元中心坐标
    pub fn set_centroids(&mut self, centroids: Vec<DVec2>) -> WlResult<()> {
        WlError::check_size("centroids", self.n_cells(), centroids.len())?;
        self.centroids = centroids;
        Ok(())
    }

    /// 单元中心坐标
    pub fn centroids(&self) -> &[DVec2] {
        &self.centroids
    }

    /// 设置水位
    pub fn set_stage(&mut self, stage: Vec<f64>) -> WlResult<()> {
        WlError::check_size("stage", self.n_cells(), stage.len())?;
        self.stage = stage;
        Ok(())
    }

    /// 设置动量
    pub fn set_momentum(&mut self, xmom: Vec<f64>, ymom: Vec<f64>) -> WlResult<()> {
        WlError::check_size("xmomentum", self.n_cells(), xmom.len())?;
        WlError::check_size("ymomentum", self.n_cells(), ymom.len())?;
        self.xmomentum = xmom;
        self.ymomentum = ymom;
        Ok(())
    }

    /// 设置内部时间步长（允许为 0）
    pub fn set_timestep(&mut self, dt: f64) -> WlResult<()> {
        WlError::check_range("timestep", dt, 0.0, f64::MAX)?;
        self.timestep = dt;
        self.max_timestep = dt;
        Ok(())
    }

    /// 设置模拟时间
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// 单元水深 `stage - elevation`
    pub fn depth(&self) -> Vec<f64> {
        self.stage
            .iter()
            .zip(&self.elevation)
            .map(|(s, z)| s - z)
            .collect()
    }

    /// 涡粘性项是否启用
    pub fn viscosity_enabled(&self) -> bool {
        self.use_viscosity
    }

    /// 已执行的内部时间步数
    pub fn n_steps(&self) -> u64 {
        self.n_steps
    }

    /// 执行一个内部时间步
    pub fn step(&mut self, registry: &mut OperatorRegistry) {
        registry.apply_all(self);
        self.time += self.timestep;
        self.n_steps += 1;
    }

    /// 按输出间隔推进到结束时间
    ///
    /// 起始时刻、每个输出时刻和结束时刻调用一次 `on_yield`，
    /// 返回输出次数。最后一个内部时间步会截短以准确到达输出时刻。
    pub fn evolve<F>(
        &mut self,
        registry: &mut OperatorRegistry,
        yieldstep: f64,
        final_time: f64,
        mut on_yield: F,
    ) -> WlResult<usize>
    where
        F: FnMut(&Self),
    {
        WlError::check_range("yieldstep", yieldstep, f64::MIN_POSITIVE, f64::MAX)?;
        WlError::check_range("final_time", final_time, f64::MIN, f64::MAX)?;
        WlError::check_range("timestep", self.max_timestep, f64::MIN_POSITIVE, f64::MAX)?;

        let eps = 1e-9 * yieldstep.max(1.0);
        let mut yields = 0;
        let mut next_yield = self.time;

        loop {
            let at_end = self.time >= final_time - eps;
            if self.time >= next_yield - eps || at_end {
                on_yield(self);
                yields += 1;
                while next_yield <= self.time + eps {
                    next_yield += yieldstep;
                }
            }
            if at_end {
                break;
            }

            let target = next_yield.min(final_time);
            while self.time < target - eps {
                self.timestep = self.max_timestep.min(target - self.time);
                self.step(registry);
            }
            self.time = target;
            debug!(time = self.time, steps = self.n_steps, "yield");
        }

        self.timestep = self.max_timestep;
        Ok(yields)
    }

    /// 时间步统计（首行为时间信息，其后每个启用算子一行）
    pub fn timestepping_statistics(&self, registry: &OperatorRegistry) -> String {
        let mut msg = format!(
            "Time = {:.4}, delta t = {:.8}, steps = {}",
            self.time, self.timestep, self.n_steps
        );
        for line in registry.statistics(self) {
            msg.push('\n');
            msg.push_str(&line);
        }
        msg
    }
}

impl SimulationHost for Domain {
    fn n_cells(&self) -> usize {
        self.elevation.len()
    }

    fn gravity(&self) -> f64 {
        self.gravity
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn timestep(&self) -> f64 {
        self.timestep
    }

    fn stage(&self) -> &[f64] {
        &self.stage
    }

    fn elevation(&self) -> &[f64] {
        &self.elevation
    }

    fn momentum(&self) -> (&[f64], &[f64]) {
        (&self.xmomentum, &self.ymomentum)
    }

    fn momentum_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        (&mut self.xmomentum, &mut self.ymomentum)
    }

    fn fields(&self) -> &FieldStore {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut FieldStore {
        &mut self.fields
    }

    fn enable_viscosity(&mut self, enabled: bool) {
        self.use_viscosity = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldLocation;
    use crate::host::ForcingOperator;

    /// 记录被调用时的时间和步长
    struct Recorder {
        calls: std::sync::Arc<std::sync::Mutex<Vec<(f64, f64)>>>,
    }

    impl ForcingOperator for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn apply(&mut self, host: &mut dyn SimulationHost) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((host.time(), host.timestep()));
            }
        }

        fn timestepping_statistics(&self, host: &dyn SimulationHost) -> String {
            format!("recorder, time {}", host.time())
        }
    }

    #[test]
    fn test_new_domain_is_dry() {
        let domain = Domain::new(vec![1.0, -2.0], 9.81);
        assert_eq!(domain.n_cells(), 2);
        assert_eq!(domain.depth(), vec![0.0, 0.0]);
        assert_eq!(domain.momentum().0, &[0.0, 0.0]);
    }

    #[test]
    fn test_rectangular_layout() {
        let domain = Domain::rectangular(3, 2, 10.0, 5.0, 9.81, |p| -p.x / 10.0);
        assert_eq!(domain.n_cells(), 6);
        assert_eq!(domain.centroids()[4], DVec2::new(15.0, 7.5));
        assert!((domain.elevation()[2] + 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_core_fields_by_name() {
        let mut domain = Domain::new(vec![0.0, 0.0], 9.81);
        domain.set_stage(vec![1.0, 2.0]).unwrap();
        domain.set_momentum(vec![0.1, 0.2], vec![0.3, 0.4]).unwrap();
        domain
            .set_field("veg_height", vec![0.5, 0.5], FieldLocation::Cell)
            .unwrap();

        assert_eq!(domain.get_field("stage"), Some(&[1.0, 2.0][..]));
        assert_eq!(domain.get_field("ymomentum"), Some(&[0.3, 0.4][..]));
        assert_eq!(domain.get_field("veg_height"), Some(&[0.5, 0.5][..]));
        assert!(domain.get_field("veg_density").is_none());
        assert!(domain.set_stage(vec![1.0]).is_err());
    }

    #[test]
    fn test_evolve_yields_and_steps() {
        let mut domain = Domain::new(vec![0.0], 9.81);
        domain.set_timestep(400.0).unwrap();

        let calls = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = OperatorRegistry::new();
        registry.register(Recorder { calls: calls.clone() });

        let mut yield_times = Vec::new();
        let yields = domain
            .evolve(&mut registry, 900.0, 2000.0, |d| yield_times.push(d.time()))
            .unwrap();

        assert_eq!(yields, 4);
        assert_eq!(yield_times, vec![0.0, 900.0, 1800.0, 2000.0]);

        let calls = calls.lock().unwrap();
        let dts: Vec<f64> = calls.iter().map(|c| c.1).collect();
        assert_eq!(dts, vec![400.0, 400.0, 100.0, 400.0, 400.0, 100.0, 200.0]);
        assert_eq!(domain.n_steps(), 7);
        assert_eq!(domain.timestep(), 400.0);
    }

    #[test]
    fn test_evolve_rejects_bad_steps() {
        let mut domain = Domain::new(vec![0.0], 9.81);
        let mut registry = OperatorRegistry::new();
        assert!(domain.evolve(&mut registry, 0.0, 10.0, |_| {}).is_err());
        domain.set_timestep(0.0).unwrap();
        assert!(domain.evolve(&mut registry, 1.0, 10.0, |_| {}).is_err());
        assert!(domain.set_timestep(-1.0).is_err());
    }

    #[test]
    fn test_evolve_rejects_non_finite_final_time() {
        let mut domain = Domain::new(vec![0.0], 9.81);
        domain.set_timestep(1.0).unwrap();
        let mut registry = OperatorRegistry::new();
        let mut yields = 0;
        for final_time in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = domain
                .evolve(&mut registry, 10.0, final_time, |_| yields += 1)
                .unwrap_err();
            assert!(matches!(err, WlError::OutOfRange { field: "final_time", .. }));
        }
        assert_eq!(yields, 0);
        assert_eq!(domain.n_steps(), 0);
        assert!(domain.set_timestep(f64::NAN).is_err());
    }

    #[test]
    fn test_statistics_lines() {
        let domain = Domain::new(vec![0.0], 9.81);
        let mut registry = OperatorRegistry::new();
        registry.register(Recorder {
            calls: Default::default(),
        });
        let stats = domain.timestepping_statistics(&registry);
        let lines: Vec<&str> = stats.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Time = 0.0000"));
        assert_eq!(lines[1], "recorder, time 0");
    }
}
