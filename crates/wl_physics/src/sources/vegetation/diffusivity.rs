// crates/wl_physics/src/sources/vegetation/diffusivity.rs

//! 植被涡扩散闭合
//!
//! 基于 Nepf (1999)，由茎几何和局部流速计算涡扩散系数：
//!
//! ```text
//! ad   = m D²                       茎体积分数
//! s    = m^(-1/2)                   茎间距
//! ad_s = D² / h²                    混合长度过渡点
//! l    = h                          s > h
//!      = D                          ad >= 0.01
//!      = 线性插值 (ad_s, h) -> (0.01, D)   其余
//! k    = ((1 - ad) Cb + (Cd ad)^0.66) U²
//! ν_t  = k^(1/4) l + ad U D
//! ```
//!
//! 只在有植被的单元上调用；`h > 0.01`、`m > 0` 由调用方保证。

/// 裸床湍动能系数
pub const BED_TKE_COEFFICIENT: f64 = 0.001;

/// 混合长度取茎直径的体积分数阈值
pub const DENSE_CANOPY_FRACTION: f64 = 0.01;

/// 混合长度 [m]
#[inline]
pub fn mixing_length(depth: f64, diameter: f64, density: f64) -> f64 {
    let ad = density * diameter * diameter;
    if ad >= DENSE_CANOPY_FRACTION {
        return diameter;
    }
    let spacing = density.sqrt().recip();
    if spacing > depth {
        return depth;
    }
    // 此处 s <= h 蕴含 ad >= ad_s，且 ad < 0.01，分母不为零
    let ad_s = diameter * diameter / (depth * depth);
    let slope = (diameter - depth) / (DENSE_CANOPY_FRACTION - ad_s);
    slope * ad + (depth - slope * ad_s)
}

/// 单元涡扩散系数 [m²/s]
///
/// `discharge` 为单宽流量大小 `sqrt(hu² + hv²)`。
#[inline]
pub fn cell_diffusivity(depth: f64, discharge: f64, diameter: f64, density: f64, cd: f64) -> f64 {
    let ad = density * diameter * diameter;
    let velocity = discharge / depth;
    let tke = ((1.0 - ad) * BED_TKE_COEFFICIENT + (cd * ad).powf(0.66)) * velocity * velocity;
    tke.sqrt().sqrt() * mixing_length(depth, diameter, density) + ad * velocity * diameter
}
